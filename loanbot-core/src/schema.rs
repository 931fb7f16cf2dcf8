/// DDL to create the schema_version tracking table.
///
/// Applied unconditionally on every DB open (before checking the version),
/// using `IF NOT EXISTS` so it is safe to run multiple times.
pub const SCHEMA_VERSION_DDL: &str = "
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER NOT NULL
    ) STRICT;
";

/// DDL for the v1 schema.
///
/// `admin_tokens` holds at most one row: the `slot` column is constrained to
/// `'current'`, so saving a token is an upsert on that key and logging out is a
/// delete.
pub const SCHEMA_V1_SQL: &str = "
    CREATE TABLE IF NOT EXISTS admin_tokens (
        slot        TEXT    PRIMARY KEY CHECK(slot = 'current'),
        token       TEXT    NOT NULL,
        issued_at   INTEGER NOT NULL,
        expires_at  INTEGER NOT NULL
    ) STRICT;
";

pub const CURRENT_VERSION: i64 = 1;

/// Runs forward-only schema migration to the latest version.
///
/// Idempotent: reads the recorded version (`0` when the table is empty) and
/// applies each missing step inside a `BEGIN IMMEDIATE` transaction.
///
/// # Errors
///
/// Returns `rusqlite::Error` if the DDL fails or the version row cannot be written.
pub fn migrate(db: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    db.execute_batch(SCHEMA_VERSION_DDL)?;

    let version: i64 = db
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if version < 1 {
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute_batch(SCHEMA_V1_SQL)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
        tx.commit()?;
    }

    Ok(())
}
