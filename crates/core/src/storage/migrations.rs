//! Schema migrations for the local cache database
//!
//! Each migration runs once, in version order, inside its own transaction.

use rusqlite::{params, Connection};
use tracing::{debug, info, instrument};

use crate::error::Result;

/// A schema step
pub struct Migration {
    /// Sequential, starting from 1
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Cached session of the signed-in user",
        sql: r#"
            -- At most one row: slot is pinned to 1
            CREATE TABLE IF NOT EXISTS cached_session (
                slot INTEGER PRIMARY KEY CHECK (slot = 1),
                username TEXT NOT NULL,
                account_type TEXT NOT NULL DEFAULT 'User',
                logged_in_at TEXT NOT NULL
            );
        "#,
    },
];

fn applied_version(conn: &Connection) -> Result<u32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
        [],
    )?;

    let version: Option<u32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })?;
    Ok(version.unwrap_or(0))
}

/// Bring the schema up to the latest version
#[instrument(skip(conn))]
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current = applied_version(conn)?;
    debug!(current, "Checking for pending migrations");

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        info!(
            version = migration.version,
            description = migration.description,
            "Applying migration"
        );

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
            params![
                migration.version,
                migration.description,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        tx.commit()?;
    }

    Ok(())
}
