//! Session repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Tokens are opaque and unique; lookups never return expired rows.

use crate::model::user::Session;
use crate::repo::{ensure_connection_ready, parse_uuid, RepoResult};
use rusqlite::{params, Connection};

/// Repository interface for login sessions.
pub trait SessionRepository {
    fn create_session(&self, session: &Session) -> RepoResult<()>;
    /// Returns the session when it exists and has not expired at `now_ms`.
    fn find_active(&self, token: &str, now_ms: i64) -> RepoResult<Option<Session>>;
    /// Returns whether a row was removed.
    fn delete_session(&self, token: &str) -> RepoResult<bool>;
    /// Removes sessions expired at `now_ms`; returns the number removed.
    fn purge_expired(&self, now_ms: i64) -> RepoResult<usize>;
}

/// SQLite-backed session repository.
pub struct SqliteSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "sessions",
            &["token", "user_id", "created_at", "expires_at"],
        )?;
        Ok(Self { conn })
    }
}

impl SessionRepository for SqliteSessionRepository<'_> {
    fn create_session(&self, session: &Session) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                session.token.as_str(),
                session.user_id.to_string(),
                session.created_at,
                session.expires_at,
            ],
        )?;
        Ok(())
    }

    fn find_active(&self, token: &str, now_ms: i64) -> RepoResult<Option<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT token, user_id, created_at, expires_at
             FROM sessions
             WHERE token = ?1 AND expires_at > ?2;",
        )?;
        let mut rows = stmt.query(params![token, now_ms])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let user_text: String = row.get("user_id")?;
        Ok(Some(Session {
            token: row.get("token")?,
            user_id: parse_uuid(&user_text, "sessions.user_id")?,
            created_at: row.get("created_at")?,
            expires_at: row.get("expires_at")?,
        }))
    }

    fn delete_session(&self, token: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE token = ?1;", [token])?;
        Ok(changed > 0)
    }

    fn purge_expired(&self, now_ms: i64) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE expires_at <= ?1;", [now_ms])?;
        Ok(changed)
    }
}
