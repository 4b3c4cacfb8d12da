//! Cached session of the signed-in user
//!
//! Holds at most one identity so a restarted client comes back signed in.
//! Passwords are never stored.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::instrument;

use super::parse::{parse_datetime, OptionalExt};
use crate::error::Result;
use crate::models::{AccountType, Identity};

/// Stored session record
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSession {
    pub identity: Identity,
    pub logged_in_at: DateTime<Utc>,
}

/// Session cache store
pub struct SessionCacheStore<'a> {
    conn: &'a Connection,
}

impl<'a> SessionCacheStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Replace the cached session
    #[instrument(skip(self, identity), fields(username = %identity.username))]
    pub fn save(&self, identity: &Identity) -> Result<()> {
        self.conn.execute(
            "INSERT INTO cached_session (slot, username, account_type, logged_in_at)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(slot) DO UPDATE SET
                username = excluded.username,
                account_type = excluded.account_type,
                logged_in_at = excluded.logged_in_at",
            params![
                identity.username,
                identity.account_type.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Load the cached session, if any
    #[instrument(skip(self))]
    pub fn load(&self) -> Result<Option<CachedSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT username, account_type, logged_in_at FROM cached_session WHERE slot = 1",
        )?;

        let session = stmt
            .query_row([], |row| {
                let account_type: String = row.get(1)?;
                Ok(CachedSession {
                    identity: Identity {
                        username: row.get(0)?,
                        account_type: AccountType::from_str_lossy(&account_type),
                    },
                    logged_in_at: parse_datetime(&row.get::<_, String>(2)?)?,
                })
            })
            .optional()?;

        Ok(session)
    }

    /// Forget the cached session
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM cached_session", [])?;
        Ok(())
    }
}
