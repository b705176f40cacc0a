//! Client-side persistence adapter for form configurations.
//!
//! # Responsibility
//! - Store full form snapshots in a key-value backend and read them back.
//! - Export forms as CSV text and build share URLs.
//!
//! # Invariants
//! - One entry per form, keyed by `FORM_KEY_PREFIX` + form id.
//! - Save is a full overwrite; nothing is persisted partially.
//! - Ill-formed configurations are rejected before anything is written.
//! - Unreadable stored values are reported as absent, never repaired.

use crate::model::form::FormValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod csv;
mod dir_store;
mod form_store;
mod memory_store;

pub use csv::{export_csv, CsvLayout};
pub use dir_store::DirStore;
pub use form_store::{form_key, FormStore, DEFAULT_SHARE_BASE, FORM_KEY_PREFIX};
pub use memory_store::MemoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
    /// Key contains characters the backend cannot address.
    InvalidKey(String),
    Validation(FormValidationError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize form: {err}"),
            Self::InvalidKey(key) => write!(f, "invalid storage key `{key}`"),
            Self::Validation(err) => write!(f, "form not saved: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::InvalidKey(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<FormValidationError> for StoreError {
    fn from(value: FormValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// String key-value backend, shaped after browser local storage.
pub trait KeyValueStore {
    /// Returns `Ok(None)` when the key was never written or was removed.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;
    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}
