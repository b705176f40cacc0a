//! Core domain logic for Glowform feedback forms.
//! This crate is the single source of truth for form and account invariants.

pub mod builder;
pub mod db;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod preview;
pub mod repo;
pub mod security;
pub mod service;

pub use builder::{BuilderError, FormBuilder};
pub use logging::{default_log_level, init_console_logging, init_logging, logging_status};
pub use model::field::{ConditionalLogic, Field, FieldId, FieldType, FieldValidationError};
pub use model::form::{FormConfig, FormId, FormValidationError};
pub use model::profile::{ProfileWizard, StepData, WizardStep};
pub use model::record::{NewForm, StoredForm, Submission};
pub use model::user::{Session, User, UserRole};
pub use persistence::{export_csv, CsvLayout, DirStore, FormStore, KeyValueStore, MemoryStore};
pub use preview::{render, FormPreview, Widget};
pub use repo::{RepoError, RepoResult};
pub use service::auth_service::{AuthService, AuthServiceError};
pub use service::form_service::{FormService, FormServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
