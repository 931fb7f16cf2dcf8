//! Admin gate for the dashboard screen.
//!
//! Credentials come from configuration as a username plus a bcrypt hash. A
//! successful login yields an [`AdminToken`]: a random UUID v4 with an expiry,
//! which the binary persists in the local store and sends as a bearer header on
//! stats requests. The gate only decides what this client shows; authorising the
//! stats data is the server's responsibility.

use std::time::Duration;

use crate::error::AuthError;
use crate::types::AdminToken;

#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password_hash: String, // bcrypt
}

#[derive(Debug, Clone)]
pub struct AdminGate {
    credentials: Option<AdminCredentials>,
    ttl: Duration,
}

impl AdminGate {
    /// Creates a gate. With `credentials = None` every login fails with
    /// `AuthError::Disabled`.
    pub fn new(credentials: Option<AdminCredentials>, ttl: Duration) -> Self {
        Self { credentials, ttl }
    }

    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    /// Checks `username` / `password` and issues a fresh token valid from `now`.
    ///
    /// The password is always run through bcrypt, even when the username does
    /// not match, so both failure cases take the same time.
    ///
    /// # Errors
    ///
    /// `Disabled` when no credentials are configured, `InvalidCredentials` on
    /// mismatch, `Hash` when the configured hash is malformed.
    pub fn login(&self, username: &str, password: &str, now: i64) -> Result<AdminToken, AuthError> {
        let creds = self.credentials.as_ref().ok_or(AuthError::Disabled)?;
        let password_ok = bcrypt::verify(password, &creds.password_hash)?;
        if !(password_ok && username == creds.username) {
            tracing::warn!(username, "admin login rejected");
            return Err(AuthError::InvalidCredentials);
        }
        tracing::info!(username, "admin login accepted");
        Ok(AdminToken {
            token: uuid::Uuid::new_v4().to_string(),
            issued_at: now,
            expires_at: now.saturating_add(self.ttl.as_secs() as i64),
        })
    }

    /// True while `token` has not expired at `now`.
    pub fn is_valid(&self, token: &AdminToken, now: i64) -> bool {
        !token.is_expired(now)
    }
}

/// Hashes `password` for the `[admin] password_hash` config key.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}
