//! Account registration and session lifecycle.
//!
//! # Responsibility
//! - Register accounts with hashed passwords.
//! - Issue, resolve and revoke session tokens.
//!
//! # Invariants
//! - Emails are unique after normalization.
//! - Login failures never reveal whether the email exists.
//! - Expired sessions never authenticate.

use crate::model::user::{normalize_email, Session, User, UserRole};
use crate::repo::session_repo::SessionRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use crate::security::{generate_token, hash_password, verify_password};
use crate::service::now_epoch_ms;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Session lifetime: 24 hours.
pub const SESSION_TTL_MS: i64 = 24 * 60 * 60 * 1000;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex must compile")
});

/// Service error for account use-cases.
#[derive(Debug)]
pub enum AuthServiceError {
    InvalidInput(String),
    EmailTaken,
    InvalidCredentials,
    /// Token is missing, unknown or expired.
    Unauthenticated,
    Repo(RepoError),
}

impl Display for AuthServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "{message}"),
            Self::EmailTaken => write!(f, "email is already registered"),
            Self::InvalidCredentials => write!(f, "invalid email or password"),
            Self::Unauthenticated => write!(f, "authentication required"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Conflict(_) => Self::EmailTaken,
            other => Self::Repo(other),
        }
    }
}

/// Returns whether `email` has a plausible `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Account service facade over repository implementations.
pub struct AuthService<U: UserRepository, S: SessionRepository> {
    users: U,
    sessions: S,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    pub fn new(users: U, sessions: S) -> Self {
        Self { users, sessions }
    }

    /// Creates an unverified `USER` account.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthServiceError> {
        let name = name.trim();
        if name.is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(AuthServiceError::InvalidInput(
                "name, email and password are required".to_string(),
            ));
        }
        if !is_valid_email(email) {
            return Err(AuthServiceError::InvalidInput(
                "email address is invalid".to_string(),
            ));
        }

        let email = normalize_email(email);
        if self.users.find_by_email(&email)?.is_some() {
            return Err(AuthServiceError::EmailTaken);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email,
            password_hash: hash_password(password),
            is_verified: false,
            role: UserRole::User,
            created_at: now_epoch_ms(),
        };
        self.users.create_user(&user)?;
        info!(
            "event=user_register module=service status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    /// Verifies credentials and opens a new session.
    pub fn login(&self, email: &str, password: &str) -> Result<(User, Session), AuthServiceError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthServiceError::InvalidInput(
                "email and password are required".to_string(),
            ));
        }

        let user = match self.users.find_by_email(&normalize_email(email))? {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                warn!("event=user_login module=service status=rejected");
                return Err(AuthServiceError::InvalidCredentials);
            }
        };

        let now = now_epoch_ms();
        let session = Session {
            token: generate_token(),
            user_id: user.id,
            created_at: now,
            expires_at: now + SESSION_TTL_MS,
        };
        self.sessions.create_session(&session)?;
        info!(
            "event=user_login module=service status=ok user_id={}",
            user.id
        );
        Ok((user, session))
    }

    /// Revokes a session. Returns whether a session was removed.
    pub fn logout(&self, token: &str) -> Result<bool, AuthServiceError> {
        let removed = self.sessions.delete_session(token)?;
        info!(
            "event=user_logout module=service status=ok removed={}",
            removed
        );
        Ok(removed)
    }

    /// Resolves a session token to its account.
    pub fn authenticate(&self, token: &str) -> Result<User, AuthServiceError> {
        if token.is_empty() {
            return Err(AuthServiceError::Unauthenticated);
        }
        let session = self
            .sessions
            .find_active(token, now_epoch_ms())?
            .ok_or(AuthServiceError::Unauthenticated)?;
        self.users
            .get_user(session.user_id)?
            .ok_or(AuthServiceError::Unauthenticated)
    }

    /// Drops sessions past their expiry. Returns the number removed.
    pub fn purge_expired_sessions(&self) -> Result<usize, AuthServiceError> {
        Ok(self.sessions.purge_expired(now_epoch_ms())?)
    }
}
