//! In-memory form builder.
//!
//! # Responsibility
//! - Apply add/edit/delete/reorder operations to one form being edited.
//! - Derive progress, level and reward display values from field count.
//!
//! # Invariants
//! - Field ids stay unique; edits and reorders never change the id set.
//! - Ill-formed fields are rejected before they enter the form.
//! - Deleting a field clears conditional rules that pointed at it.

use crate::model::field::{ConditionalLogic, Field, FieldId, FieldValidationError};
use crate::model::form::FormConfig;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Field count at which progress reaches 100%.
pub const PROGRESS_TARGET_FIELDS: usize = 10;
/// Fields needed per level.
pub const FIELDS_PER_LEVEL: usize = 3;

const REWARDS: [&str; 5] = [
    "Novice Researcher",
    "Data Explorer",
    "Insight Gatherer",
    "Survey Master",
    "Research Guru",
];

/// Builder operation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    Validation(FieldValidationError),
    DuplicateFieldId(FieldId),
    FieldNotFound(FieldId),
    IndexOutOfRange { index: usize, len: usize },
    /// Rule target is missing or does not precede the field.
    InvalidDependency { field_id: FieldId, depends_on: FieldId },
}

impl Display for BuilderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateFieldId(id) => write!(f, "field already exists: {id}"),
            Self::FieldNotFound(id) => write!(f, "field not found: {id}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for {len} fields")
            }
            Self::InvalidDependency {
                field_id,
                depends_on,
            } => write!(
                f,
                "field {field_id} can only depend on an earlier field, got {depends_on}"
            ),
        }
    }
}

impl Error for BuilderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FieldValidationError> for BuilderError {
    fn from(value: FieldValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Editing session over one form configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBuilder {
    config: FormConfig,
}

impl FormBuilder {
    /// Starts building an empty form with a fresh identifier.
    pub fn new() -> Self {
        Self {
            config: FormConfig::new(),
        }
    }

    /// Resumes editing an existing configuration.
    pub fn from_config(config: FormConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn into_config(self) -> FormConfig {
        self.config
    }

    pub fn fields(&self) -> &[Field] {
        &self.config.fields
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.config.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.config.description = description.into();
    }

    /// Appends a field, assigning a fresh id when it has none.
    ///
    /// Returns the id the field was stored under.
    pub fn add(&mut self, mut field: Field) -> Result<FieldId, BuilderError> {
        if field.id.is_nil() {
            field.id = Uuid::new_v4();
        }
        field.normalize();
        field.validate()?;
        if self.config.position(field.id).is_some() {
            return Err(BuilderError::DuplicateFieldId(field.id));
        }
        if let Some(rule) = &field.conditional_logic {
            // A new field goes last, so every existing field precedes it.
            if self.config.position(rule.depends_on).is_none() {
                return Err(BuilderError::InvalidDependency {
                    field_id: field.id,
                    depends_on: rule.depends_on,
                });
            }
        }

        let id = field.id;
        self.config.fields.push(field);
        debug!(
            "event=field_add module=builder status=ok field_count={}",
            self.config.fields.len()
        );
        Ok(id)
    }

    /// Replaces the field with the same id in place.
    pub fn edit(&mut self, mut field: Field) -> Result<(), BuilderError> {
        field.normalize();
        field.validate()?;
        let index = self
            .config
            .position(field.id)
            .ok_or(BuilderError::FieldNotFound(field.id))?;
        if let Some(rule) = &field.conditional_logic {
            self.ensure_precedes(field.id, rule.depends_on, index)?;
        }
        self.config.fields[index] = field;
        Ok(())
    }

    /// Removes a field and clears rules that referenced it.
    pub fn delete(&mut self, id: FieldId) -> Result<Field, BuilderError> {
        let index = self
            .config
            .position(id)
            .ok_or(BuilderError::FieldNotFound(id))?;
        let removed = self.config.fields.remove(index);

        let mut cleared = 0usize;
        for field in &mut self.config.fields {
            if field
                .conditional_logic
                .as_ref()
                .is_some_and(|rule| rule.depends_on == id)
            {
                field.conditional_logic = None;
                cleared += 1;
            }
        }
        debug!(
            "event=field_delete module=builder status=ok field_count={} cleared_rules={}",
            self.config.fields.len(),
            cleared
        );
        Ok(removed)
    }

    /// Moves one field; all other fields keep their relative order.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), BuilderError> {
        let len = self.config.fields.len();
        for index in [from, to] {
            if index >= len {
                return Err(BuilderError::IndexOutOfRange { index, len });
            }
        }
        let field = self.config.fields.remove(from);
        self.config.fields.insert(to, field);
        Ok(())
    }

    /// Sets or clears the conditional rule of one field.
    pub fn set_condition(
        &mut self,
        field_id: FieldId,
        rule: Option<ConditionalLogic>,
    ) -> Result<(), BuilderError> {
        let index = self
            .config
            .position(field_id)
            .ok_or(BuilderError::FieldNotFound(field_id))?;
        if let Some(rule) = &rule {
            self.ensure_precedes(field_id, rule.depends_on, index)?;
        }
        self.config.fields[index].conditional_logic = rule;
        Ok(())
    }

    /// Fields a rule on `field_id` may depend on: those placed before it.
    ///
    /// For a field not yet in the form every existing field is eligible.
    pub fn dependency_candidates(&self, field_id: FieldId) -> &[Field] {
        let end = self
            .config
            .position(field_id)
            .unwrap_or(self.config.fields.len());
        &self.config.fields[..end]
    }

    pub fn progress(&self) -> u8 {
        progress_for(self.config.fields.len())
    }

    pub fn level(&self) -> usize {
        level_for(self.config.fields.len())
    }

    pub fn reward(&self) -> &'static str {
        reward_for(self.level())
    }

    fn ensure_precedes(
        &self,
        field_id: FieldId,
        depends_on: FieldId,
        index: usize,
    ) -> Result<(), BuilderError> {
        match self.config.position(depends_on) {
            Some(target) if target < index => Ok(()),
            _ => Err(BuilderError::InvalidDependency {
                field_id,
                depends_on,
            }),
        }
    }
}

/// Completion percentage: 10% per field, capped at 100.
pub fn progress_for(field_count: usize) -> u8 {
    (field_count.min(PROGRESS_TARGET_FIELDS) * 100 / PROGRESS_TARGET_FIELDS) as u8
}

/// One level per `FIELDS_PER_LEVEL` fields, starting at 1.
pub fn level_for(field_count: usize) -> usize {
    field_count / FIELDS_PER_LEVEL + 1
}

/// Reward title for a level; levels past the table keep the last title.
pub fn reward_for(level: usize) -> &'static str {
    REWARDS[level.saturating_sub(1).min(REWARDS.len() - 1)]
}
