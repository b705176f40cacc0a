//! Backend persistence records for forms and submissions.
//!
//! # Invariants
//! - `StoredForm.id` and `Submission.id` are server-assigned.
//! - Submissions are immutable once created.

use crate::model::field::Field;
use crate::model::form::{FormConfig, FormId};
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Stable identifier for a submission.
pub type SubmissionId = Uuid;

/// Form row as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredForm {
    pub id: FormId,
    pub title: String,
    pub description: String,
    pub fields: Vec<Field>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl StoredForm {
    /// Projects the stored row back into a builder configuration.
    pub fn to_config(&self) -> FormConfig {
        FormConfig {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            fields: self.fields.clone(),
        }
    }
}

/// Input for creating a stored form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewForm {
    pub title: String,
    pub description: String,
    pub fields: Vec<Field>,
}

/// One respondent's answer payload for a given form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: SubmissionId,
    pub form_id: FormId,
    pub user_id: UserId,
    /// Opaque answer payload.
    pub data: Value,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}
