//! Local store: a small WAL-mode SQLite file holding the admin token.
//!
//! Stands in for the browser storage slot the dashboard gate used to read. All
//! access goes through `tokio_rusqlite::Connection::call`, so callers on the UI
//! task never block on disk I/O.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use crate::error::StoreError;
use crate::types::AdminToken;

/// Opens (or creates) the store at `path`, configures WAL mode, and applies
/// schema migrations.
///
/// # Errors
///
/// Returns `StoreError` if the file cannot be opened, WAL configuration fails,
/// or schema DDL fails.
pub async fn open_db(path: &str) -> Result<Connection, StoreError> {
    let conn = Connection::open(path).await?;

    conn.call(|db| {
        db.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;",
        )?;
        db.busy_timeout(Duration::from_secs(5))?;
        crate::schema::migrate(db)?;
        Ok::<_, rusqlite::Error>(())
    })
    .await?;

    Ok(conn)
}

/// Returns the current Unix timestamp in seconds.
pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Stores `token` as the current admin token, replacing any previous one.
pub async fn save_admin_token(conn: &Connection, token: &AdminToken) -> Result<(), StoreError> {
    let token = token.clone();

    conn.call(move |db| {
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO admin_tokens (slot, token, issued_at, expires_at)
             VALUES ('current', ?1, ?2, ?3)
             ON CONFLICT(slot)
             DO UPDATE SET token = excluded.token,
                           issued_at = excluded.issued_at,
                           expires_at = excluded.expires_at",
            rusqlite::params![&token.token, token.issued_at, token.expires_at],
        )?;
        tx.commit()?;
        Ok::<_, rusqlite::Error>(())
    })
    .await?;
    Ok(())
}

/// Loads the current admin token, if one was saved.
///
/// Expired tokens are returned as-is; deciding validity is the gate's job.
pub async fn load_admin_token(conn: &Connection) -> Result<Option<AdminToken>, StoreError> {
    let token = conn
        .call(|db| {
            db.query_row(
                "SELECT token, issued_at, expires_at FROM admin_tokens WHERE slot = 'current'",
                [],
                |r| {
                    Ok(AdminToken {
                        token: r.get(0)?,
                        issued_at: r.get(1)?,
                        expires_at: r.get(2)?,
                    })
                },
            )
            .optional()
        })
        .await?;
    Ok(token)
}

/// Removes the current admin token. A no-op when none is stored.
pub async fn clear_admin_token(conn: &Connection) -> Result<(), StoreError> {
    conn.call(|db| {
        db.execute("DELETE FROM admin_tokens WHERE slot = 'current'", [])?;
        Ok::<_, rusqlite::Error>(())
    })
    .await?;
    Ok(())
}
