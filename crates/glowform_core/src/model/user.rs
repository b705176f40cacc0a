//! Account and session model.
//!
//! # Invariants
//! - `email` is stored lowercased and trimmed; uniqueness is case-insensitive.
//! - `password_hash` never leaves the core through serialization.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an account.
pub type UserId = Uuid;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "USER" => Some(Self::User),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_verified: bool,
    pub role: UserRole,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Server-side login state addressed by an opaque token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds; the session is rejected at or after this.
    pub expires_at: i64,
}

impl Session {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }
}

/// Normalizes an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
