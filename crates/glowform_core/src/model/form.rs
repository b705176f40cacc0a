//! Form configuration model.
//!
//! # Responsibility
//! - Own the ordered field list together with title and description.
//! - Validate a whole form before it is saved or submitted to the backend.
//!
//! # Invariants
//! - Field ids are unique within one form.
//! - A form owns its fields exclusively; nothing is shared across forms.

use crate::model::field::{Field, FieldId, FieldValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a form.
pub type FormId = Uuid;

/// Whole-form validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValidationError {
    /// One field is ill-formed.
    Field {
        field_id: FieldId,
        source: FieldValidationError,
    },
    /// Two fields share the same id.
    DuplicateFieldId(FieldId),
    /// A field was never assigned an id.
    NilFieldId,
}

impl Display for FormValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field { field_id, source } => write!(f, "field {field_id}: {source}"),
            Self::DuplicateFieldId(id) => write!(f, "duplicate field id: {id}"),
            Self::NilFieldId => write!(f, "field id must be assigned"),
        }
    }
}

impl Error for FormValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Field { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A complete form definition: title, description and ordered fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    pub id: FormId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl FormConfig {
    /// Creates an empty form with a fresh identifier.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Creates an empty form with a caller-provided identifier.
    pub fn with_id(id: FormId) -> Self {
        Self {
            id,
            title: String::new(),
            description: String::new(),
            fields: Vec::new(),
        }
    }

    /// Returns field ids in form order.
    pub fn field_ids(&self) -> Vec<FieldId> {
        self.fields.iter().map(|field| field.id).collect()
    }

    /// Finds a field by id.
    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|field| field.id == id)
    }

    /// Returns the position of a field by id.
    pub fn position(&self, id: FieldId) -> Option<usize> {
        self.fields.iter().position(|field| field.id == id)
    }

    /// Validates every field and id uniqueness.
    pub fn validate(&self) -> Result<(), FormValidationError> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if field.id.is_nil() {
                return Err(FormValidationError::NilFieldId);
            }
            if !seen.insert(field.id) {
                return Err(FormValidationError::DuplicateFieldId(field.id));
            }
            field
                .validate()
                .map_err(|source| FormValidationError::Field {
                    field_id: field.id,
                    source,
                })?;
        }
        Ok(())
    }

    /// Returns the fields a respondent sees for the given answers.
    pub fn visible_fields<'a>(&'a self, answers: &HashMap<FieldId, Value>) -> Vec<&'a Field> {
        let known = self.field_ids();
        self.fields
            .iter()
            .filter(|field| field.is_visible(answers, &known))
            .collect()
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self::new()
    }
}
