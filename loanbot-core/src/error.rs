//! Error types shared by the client, admin gate, and local store.

use thiserror::Error;

/// Failure talking to the decision service.
///
/// The `Display` text is shown verbatim inside the transcript's error message,
/// so variants read as short sentences rather than debug dumps.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Server error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("request cancelled")]
    Cancelled,
    #[error("could not reach server: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("invalid server url: {0}")]
    Url(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("admin login is not configured")]
    Disabled,
    #[error("password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database connection error: {0}")]
    Connection(#[from] tokio_rusqlite::Error),
}
