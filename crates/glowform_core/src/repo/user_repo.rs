//! User repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Emails are stored normalized; the UNIQUE index makes duplicates a
//!   `RepoError::Conflict`.

use crate::model::user::{normalize_email, User, UserId, UserRole};
use crate::repo::{
    bool_to_int, ensure_connection_ready, is_unique_violation, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    password_hash,
    is_verified,
    role,
    created_at
FROM users";

/// Repository interface for accounts.
pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "users",
            &[
                "id",
                "name",
                "email",
                "password_hash",
                "is_verified",
                "role",
                "created_at",
            ],
        )?;
        Ok(Self { conn })
    }

    fn find_one(&self, filter: &str, value: String) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE {filter} = ?1;"))?;
        let mut rows = stmt.query([value])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        let result = self.conn.execute(
            "INSERT INTO users (id, name, email, password_hash, is_verified, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                user.id.to_string(),
                user.name.as_str(),
                normalize_email(&user.email),
                user.password_hash.as_str(),
                bool_to_int(user.is_verified),
                user.role.as_str(),
                user.created_at,
            ],
        );

        match result {
            Ok(_) => Ok(user.id),
            Err(err) if is_unique_violation(&err) => Err(RepoError::Conflict(
                "user with this email already exists".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.find_one("id", id.to_string())
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.find_one("email", normalize_email(email))
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    let role_text: String = row.get("role")?;
    let role = UserRole::parse(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in users.role"))
    })?;
    let is_verified = match row.get::<_, i64>("is_verified")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_verified value `{other}` in users.is_verified"
            )));
        }
    };

    Ok(User {
        id: parse_uuid(&id_text, "users.id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        is_verified,
        role,
        created_at: row.get("created_at")?,
    })
}
