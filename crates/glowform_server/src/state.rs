use std::{path::Path, sync::Arc};

use glowform_core::db::{close_db, open_db, open_db_in_memory, DbError};
use glowform_core::repo::form_repo::SqliteFormRepository;
use glowform_core::repo::session_repo::SqliteSessionRepository;
use glowform_core::repo::submission_repo::SqliteSubmissionRepository;
use glowform_core::repo::user_repo::SqliteUserRepository;
use glowform_core::{AuthService, FormService};
use parking_lot::Mutex;
use rusqlite::Connection;

use crate::{config::Config, error::ApiError};

pub type SharedState = Arc<AppState>;

pub type SqliteFormService<'conn> =
    FormService<SqliteFormRepository<'conn>, SqliteSubmissionRepository<'conn>>;
pub type SqliteAuthService<'conn> =
    AuthService<SqliteUserRepository<'conn>, SqliteSessionRepository<'conn>>;

pub struct AppState {
    pub config: Config,
    pub storage: Storage,
}

impl AppState {
    pub fn new(config: Config, storage: Storage) -> SharedState {
        Arc::new(Self { config, storage })
    }
}

/// Owned database handle, opened at startup and closed at shutdown.
///
/// The connection is locked for the duration of one service call and never
/// held across an `.await`.
pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        Ok(Self::from_connection(open_db(path)?))
    }

    pub fn in_memory() -> Result<Self, DbError> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Runs `f` against form use-cases.
    pub fn forms<T>(
        &self,
        f: impl FnOnce(&SqliteFormService<'_>) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let conn = self.conn.lock();
        let service = FormService::new(
            SqliteFormRepository::try_new(&conn)?,
            SqliteSubmissionRepository::try_new(&conn)?,
        );
        f(&service)
    }

    /// Runs `f` against account use-cases.
    pub fn auth<T>(
        &self,
        f: impl FnOnce(&SqliteAuthService<'_>) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let conn = self.conn.lock();
        let service = AuthService::new(
            SqliteUserRepository::try_new(&conn)?,
            SqliteSessionRepository::try_new(&conn)?,
        );
        f(&service)
    }

    /// Raw access for maintenance and tests.
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        f(&self.conn.lock())
    }

    pub fn close(self) -> Result<(), DbError> {
        close_db(self.conn.into_inner())
    }
}
