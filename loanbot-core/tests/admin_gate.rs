//! Tests for the admin gate: credential checks, token issue, and expiry.

use std::time::Duration;

use loanbot_core::auth::{AdminCredentials, AdminGate};
use loanbot_core::AuthError;

// Low bcrypt cost keeps the tests fast.
fn gate() -> AdminGate {
    let password_hash = bcrypt::hash("s3cret", 4).unwrap();
    AdminGate::new(
        Some(AdminCredentials { username: "ops".into(), password_hash }),
        Duration::from_secs(600),
    )
}

#[test]
fn correct_credentials_issue_an_expiring_token() {
    let token = gate().login("ops", "s3cret", 1_000).unwrap();
    assert_eq!(token.issued_at, 1_000);
    assert_eq!(token.expires_at, 1_600);
    assert!(uuid::Uuid::parse_str(&token.token).is_ok());
}

#[test]
fn tokens_are_unique_per_login() {
    let g = gate();
    let a = g.login("ops", "s3cret", 0).unwrap();
    let b = g.login("ops", "s3cret", 0).unwrap();
    assert_ne!(a.token, b.token);
}

#[test]
fn wrong_username_or_password_is_rejected() {
    let g = gate();
    assert!(matches!(g.login("ops", "nope", 0), Err(AuthError::InvalidCredentials)));
    assert!(matches!(g.login("admin", "s3cret", 0), Err(AuthError::InvalidCredentials)));
    assert_eq!(
        g.login("", "", 0).unwrap_err().to_string(),
        "Invalid credentials"
    );
}

#[test]
fn unconfigured_gate_is_disabled() {
    let g = AdminGate::new(None, Duration::from_secs(600));
    assert!(!g.is_enabled());
    assert!(matches!(g.login("admin", "admin123", 0), Err(AuthError::Disabled)));
}

#[test]
fn token_validity_follows_expiry() {
    let g = gate();
    let token = g.login("ops", "s3cret", 1_000).unwrap();
    assert!(g.is_valid(&token, 1_000));
    assert!(g.is_valid(&token, 1_599));
    assert!(!g.is_valid(&token, 1_600));
}
