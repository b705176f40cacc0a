//! Form and submission use-case service.
//!
//! # Responsibility
//! - Create and list stored forms with server-assigned ids.
//! - Record submissions only for forms that exist.
//!
//! # Invariants
//! - A form is stored only when its title is non-blank and every field
//!   validates.
//! - A submission for an unknown form creates no row.

use crate::model::field::Field;
use crate::model::form::{FormId, FormValidationError};
use crate::model::record::{NewForm, StoredForm, Submission};
use crate::model::user::UserId;
use crate::repo::form_repo::FormRepository;
use crate::repo::submission_repo::SubmissionRepository;
use crate::repo::RepoError;
use crate::service::now_epoch_ms;
use log::info;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for form use-cases.
#[derive(Debug)]
pub enum FormServiceError {
    /// Request is missing required data.
    InvalidInput(String),
    /// A field definition is ill-formed.
    Validation(FormValidationError),
    FormNotFound(FormId),
    Repo(RepoError),
    /// Write succeeded but read-back did not find the row.
    InconsistentState(&'static str),
}

impl Display for FormServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "{message}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::FormNotFound(id) => write!(f, "form not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent form state: {details}"),
        }
    }
}

impl Error for FormServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for FormServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<FormValidationError> for FormServiceError {
    fn from(value: FormValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Form service facade over repository implementations.
pub struct FormService<F: FormRepository, S: SubmissionRepository> {
    forms: F,
    submissions: S,
}

impl<F: FormRepository, S: SubmissionRepository> FormService<F, S> {
    pub fn new(forms: F, submissions: S) -> Self {
        Self { forms, submissions }
    }

    /// Stores a new form and returns the persisted record.
    ///
    /// Fields without an id receive a fresh one; sub-fields their type
    /// ignores are dropped.
    pub fn create_form(&self, request: NewForm) -> Result<StoredForm, FormServiceError> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(FormServiceError::InvalidInput(
                "form title is required".to_string(),
            ));
        }

        let fields = request
            .fields
            .into_iter()
            .map(assign_field_id)
            .collect::<Vec<_>>();
        let form = StoredForm {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: request.description,
            fields,
            created_at: now_epoch_ms(),
        };
        form.to_config().validate()?;

        let id = self.forms.create_form(&form)?;
        info!(
            "event=form_create module=service status=ok form_id={} field_count={}",
            id,
            form.fields.len()
        );
        self.forms
            .get_form(id)?
            .ok_or(FormServiceError::InconsistentState(
                "created form not found in read-back",
            ))
    }

    pub fn list_forms(&self) -> Result<Vec<StoredForm>, FormServiceError> {
        Ok(self.forms.list_forms()?)
    }

    pub fn get_form(&self, id: FormId) -> Result<StoredForm, FormServiceError> {
        self.forms
            .get_form(id)?
            .ok_or(FormServiceError::FormNotFound(id))
    }

    /// Records one response. The form must exist.
    pub fn create_submission(
        &self,
        form_id: FormId,
        user_id: UserId,
        data: Value,
    ) -> Result<Submission, FormServiceError> {
        if data.is_null() {
            return Err(FormServiceError::InvalidInput(
                "submission data is required".to_string(),
            ));
        }
        if !self.forms.form_exists(form_id)? {
            return Err(FormServiceError::FormNotFound(form_id));
        }

        let submission = Submission {
            id: Uuid::new_v4(),
            form_id,
            user_id,
            data,
            created_at: now_epoch_ms(),
        };
        self.submissions.create_submission(&submission)?;
        info!(
            "event=submission_create module=service status=ok form_id={} submission_id={}",
            form_id, submission.id
        );
        Ok(submission)
    }

    pub fn list_submissions(&self, form_id: FormId) -> Result<Vec<Submission>, FormServiceError> {
        if !self.forms.form_exists(form_id)? {
            return Err(FormServiceError::FormNotFound(form_id));
        }
        Ok(self.submissions.list_submissions(form_id)?)
    }
}

fn assign_field_id(mut field: Field) -> Field {
    if field.id.is_nil() {
        field.id = Uuid::new_v4();
    }
    field.normalize();
    field
}
