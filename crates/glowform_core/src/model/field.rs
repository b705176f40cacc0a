//! Field domain model.
//!
//! # Responsibility
//! - Define the canonical shape of one form question.
//! - Validate type-specific required sub-fields before persistence.
//! - Evaluate conditional visibility against collected answers.
//!
//! # Invariants
//! - `id` is stable and never reused for another field in the same form.
//! - Changing `kind` through `set_kind` drops sub-fields the new type ignores.
//! - A conditional rule pointing at a missing field never evaluates true.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one field within a form.
pub type FieldId = Uuid;

/// Likert point counts accepted by validation.
pub const LIKERT_SCALES: [u8; 3] = [3, 5, 7];

/// Scale applied when a field switches to `FieldType::Likert`.
pub const DEFAULT_LIKERT_SCALE: u8 = 5;

/// Closed set of question types.
///
/// Wire tags match the builder client (`text`, `checkbox`, ...). Long
/// spellings are accepted on input. Anything else decodes as `Unknown`,
/// which never validates and renders nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Single-line free text.
    #[serde(alias = "short-text", alias = "short_text")]
    Text,
    /// Numeric input.
    Number,
    /// Multiple choice, any number of options selectable.
    #[serde(alias = "checkbox-multi", alias = "checkbox_multi")]
    Checkbox,
    /// Single choice rendered as radio buttons.
    #[serde(alias = "radio-single", alias = "radio_single")]
    Radio,
    /// Single choice rendered as a dropdown.
    Dropdown,
    /// N-point agreement scale.
    #[serde(alias = "likert-scale", alias = "likert_scale")]
    Likert,
    /// Row x column grid of single choices.
    Matrix,
    /// Unrecognized tag from external input.
    #[serde(other)]
    Unknown,
}

impl FieldType {
    /// All types a user can pick in the builder.
    pub const ALL: [FieldType; 7] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Checkbox,
        FieldType::Radio,
        FieldType::Dropdown,
        FieldType::Likert,
        FieldType::Matrix,
    ];

    /// Returns the stable wire tag used by JSON and CSV output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Dropdown => "dropdown",
            Self::Likert => "likert",
            Self::Matrix => "matrix",
            Self::Unknown => "unknown",
        }
    }

    /// Parses a wire tag or its long alias.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "short-text" | "short_text" => Some(Self::Text),
            "number" => Some(Self::Number),
            "checkbox" | "checkbox-multi" | "checkbox_multi" => Some(Self::Checkbox),
            "radio" | "radio-single" | "radio_single" => Some(Self::Radio),
            "dropdown" => Some(Self::Dropdown),
            "likert" | "likert-scale" | "likert_scale" => Some(Self::Likert),
            "matrix" => Some(Self::Matrix),
            _ => None,
        }
    }

    /// Whether this type carries an `options` list.
    pub fn is_choice(self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio | Self::Dropdown)
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display rule: show the owning field only when another answer matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalLogic {
    /// Field whose answer is inspected. Must precede the owning field.
    pub depends_on: FieldId,
    /// Answer value that makes the owning field visible.
    pub show_if: String,
}

/// Field validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValidationError {
    /// Label is empty or whitespace only.
    EmptyLabel,
    /// Type tag is not part of the closed set.
    UnknownType,
    /// Choice type without at least one non-blank option.
    MissingOptions(FieldType),
    /// Likert type without a scale.
    MissingLikertScale,
    /// Likert scale outside `LIKERT_SCALES`.
    InvalidLikertScale(u8),
    /// Matrix type without at least one non-blank row.
    MissingMatrixRows,
    /// Matrix type without at least one non-blank column.
    MissingMatrixColumns,
    /// Field references itself in its conditional rule.
    SelfReference(FieldId),
}

impl Display for FieldValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLabel => write!(f, "field label must not be empty"),
            Self::UnknownType => write!(f, "field type is not supported"),
            Self::MissingOptions(kind) => {
                write!(f, "`{kind}` field requires at least one option")
            }
            Self::MissingLikertScale => write!(f, "likert field requires a scale"),
            Self::InvalidLikertScale(points) => {
                write!(f, "likert scale must be 3, 5 or 7 points, got {points}")
            }
            Self::MissingMatrixRows => write!(f, "matrix field requires at least one row"),
            Self::MissingMatrixColumns => {
                write!(f, "matrix field requires at least one column")
            }
            Self::SelfReference(id) => {
                write!(f, "field {id} cannot depend on itself")
            }
        }
    }
}

impl Error for FieldValidationError {}

/// One question definition within a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Nil on input means "not assigned yet".
    #[serde(default = "Uuid::nil")]
    pub id: FieldId,
    /// Serialized as `type` to match the builder client.
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    /// Meaningful only for choice types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Meaningful only when `kind == FieldType::Likert`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likert_scale: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_rows: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_logic: Option<ConditionalLogic>,
}

impl Field {
    /// Creates a field with a generated stable ID and type defaults.
    pub fn new(kind: FieldType, label: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), kind, label)
    }

    /// Creates a field with a caller-provided ID.
    ///
    /// Pass `Uuid::nil()` to let the builder assign one on add.
    pub fn with_id(id: FieldId, kind: FieldType, label: impl Into<String>) -> Self {
        let mut field = Self {
            id,
            kind: FieldType::Text,
            label: label.into(),
            required: false,
            options: None,
            likert_scale: None,
            matrix_rows: None,
            matrix_columns: None,
            conditional_logic: None,
        };
        field.set_kind(kind);
        field
    }

    /// Builder-style helper for choice fields.
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Builder-style helper for matrix fields.
    pub fn with_matrix<R, C, S>(mut self, rows: R, columns: C) -> Self
    where
        R: IntoIterator<Item = S>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matrix_rows = Some(rows.into_iter().map(Into::into).collect());
        self.matrix_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Switches the question type and clears sub-fields the new type ignores.
    ///
    /// Entering a choice type starts with an empty option list; entering
    /// likert starts at `DEFAULT_LIKERT_SCALE` unless a scale is already set.
    pub fn set_kind(&mut self, kind: FieldType) {
        self.kind = kind;
        self.normalize();

        if kind.is_choice() {
            self.options.get_or_insert_with(Vec::new);
        }
        if kind == FieldType::Likert {
            self.likert_scale.get_or_insert(DEFAULT_LIKERT_SCALE);
        }
        if kind == FieldType::Matrix {
            self.matrix_rows.get_or_insert_with(Vec::new);
            self.matrix_columns.get_or_insert_with(Vec::new);
        }
    }

    /// Drops sub-fields the current type ignores. Never inserts defaults.
    pub fn normalize(&mut self) {
        if !self.kind.is_choice() {
            self.options = None;
        }
        if self.kind != FieldType::Likert {
            self.likert_scale = None;
        }
        if self.kind != FieldType::Matrix {
            self.matrix_rows = None;
            self.matrix_columns = None;
        }
    }

    /// Checks that the field can be saved.
    pub fn validate(&self) -> Result<(), FieldValidationError> {
        if self.label.trim().is_empty() {
            return Err(FieldValidationError::EmptyLabel);
        }

        match self.kind {
            FieldType::Unknown => return Err(FieldValidationError::UnknownType),
            kind if kind.is_choice() => {
                if !has_non_blank(self.options.as_deref()) {
                    return Err(FieldValidationError::MissingOptions(kind));
                }
            }
            FieldType::Likert => match self.likert_scale {
                None => return Err(FieldValidationError::MissingLikertScale),
                Some(points) if !LIKERT_SCALES.contains(&points) => {
                    return Err(FieldValidationError::InvalidLikertScale(points));
                }
                Some(_) => {}
            },
            FieldType::Matrix => {
                if !has_non_blank(self.matrix_rows.as_deref()) {
                    return Err(FieldValidationError::MissingMatrixRows);
                }
                if !has_non_blank(self.matrix_columns.as_deref()) {
                    return Err(FieldValidationError::MissingMatrixColumns);
                }
            }
            _ => {}
        }

        if let Some(rule) = &self.conditional_logic {
            if rule.depends_on == self.id && !self.id.is_nil() {
                return Err(FieldValidationError::SelfReference(self.id));
            }
        }

        Ok(())
    }

    /// Evaluates the conditional rule against collected answers.
    ///
    /// `known_fields` is the id set of the enclosing form; rules pointing
    /// outside it are inert and hide the field.
    pub fn is_visible(&self, answers: &HashMap<FieldId, Value>, known_fields: &[FieldId]) -> bool {
        let Some(rule) = &self.conditional_logic else {
            return true;
        };
        if !known_fields.contains(&rule.depends_on) {
            return false;
        }
        answers
            .get(&rule.depends_on)
            .is_some_and(|answer| answer_matches(answer, rule.show_if.as_str()))
    }
}

fn has_non_blank(values: Option<&[String]>) -> bool {
    values.is_some_and(|items| items.iter().any(|item| !item.trim().is_empty()))
}

fn answer_matches(answer: &Value, expected: &str) -> bool {
    match answer {
        Value::String(text) => text == expected,
        Value::Array(items) => items.iter().any(|item| answer_matches(item, expected)),
        Value::Null | Value::Object(_) => false,
        other => other.to_string() == expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_accepts_wire_tags_and_long_aliases() {
        assert_eq!(FieldType::parse("radio"), Some(FieldType::Radio));
        assert_eq!(FieldType::parse("Likert-Scale"), Some(FieldType::Likert));
        assert_eq!(FieldType::parse("toggle"), None);
    }

    #[test]
    fn unknown_tag_deserializes_as_unknown() {
        let field: Field =
            serde_json::from_value(json!({"type": "toggle", "label": "Q"})).unwrap();
        assert_eq!(field.kind, FieldType::Unknown);
        assert!(field.id.is_nil());
        assert_eq!(field.validate(), Err(FieldValidationError::UnknownType));
    }

    #[test]
    fn normalize_drops_foreign_sub_fields_without_defaults() {
        let mut field: Field = serde_json::from_value(json!({
            "type": "text",
            "label": "Q",
            "options": ["a", "b"],
            "likertScale": 7,
            "matrixRows": ["r"],
            "matrixColumns": ["c"]
        }))
        .unwrap();
        field.normalize();
        assert_eq!(field.options, None);
        assert_eq!(field.likert_scale, None);
        assert_eq!(field.matrix_rows, None);
        assert_eq!(field.matrix_columns, None);

        let mut likert: Field =
            serde_json::from_value(json!({"type": "likert", "label": "Q", "options": ["x"]}))
                .unwrap();
        likert.normalize();
        assert_eq!(likert.options, None);
        assert_eq!(likert.likert_scale, None);
    }

    #[test]
    fn answer_matching_handles_scalars_and_arrays() {
        assert!(answer_matches(&json!("yes"), "yes"));
        assert!(answer_matches(&json!(4), "4"));
        assert!(answer_matches(&json!(true), "true"));
        assert!(answer_matches(&json!(["a", "b"]), "b"));
        assert!(!answer_matches(&json!(null), "null"));
    }
}
