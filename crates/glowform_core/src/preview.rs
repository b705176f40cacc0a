//! Read-only preview of a form.
//!
//! # Responsibility
//! - Mirror a `FormConfig` as a tree of display widgets.
//! - Render that tree as plain text for terminals.
//!
//! # Invariants
//! - Rendering is pure: no validation, no answer collection.
//! - Unknown field types produce no widget.

use crate::model::field::{Field, FieldId, FieldType, DEFAULT_LIKERT_SCALE};
use crate::model::form::FormConfig;
use serde::Serialize;
use std::fmt::Write as _;

pub const DROPDOWN_PLACEHOLDER: &str = "Select an option";
pub const EMPTY_PREVIEW_MESSAGE: &str = "Add questions to see your form preview here!";

/// Input representation for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    TextInput,
    NumberInput,
    CheckboxGroup { options: Vec<String> },
    RadioGroup { options: Vec<String> },
    Dropdown { placeholder: String, options: Vec<String> },
    Scale { points: u8 },
    Grid { rows: Vec<String>, columns: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewItem {
    pub field_id: FieldId,
    pub label: String,
    pub required: bool,
    /// `None` for unknown field types.
    pub widget: Option<Widget>,
}

/// Preview tree for a whole form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FormPreview {
    /// The form has no questions yet.
    Empty,
    Form {
        title: String,
        description: String,
        items: Vec<PreviewItem>,
    },
}

/// Builds the preview tree for a form.
pub fn render(config: &FormConfig) -> FormPreview {
    if config.fields.is_empty() {
        return FormPreview::Empty;
    }
    FormPreview::Form {
        title: config.title.clone(),
        description: config.description.clone(),
        items: config.fields.iter().map(render_item).collect(),
    }
}

pub fn render_item(field: &Field) -> PreviewItem {
    PreviewItem {
        field_id: field.id,
        label: field.label.clone(),
        required: field.required,
        widget: render_widget(field),
    }
}

/// Dispatches on the field type tag.
pub fn render_widget(field: &Field) -> Option<Widget> {
    let options = || field.options.clone().unwrap_or_default();
    let widget = match field.kind {
        FieldType::Text => Widget::TextInput,
        FieldType::Number => Widget::NumberInput,
        FieldType::Checkbox => Widget::CheckboxGroup { options: options() },
        FieldType::Radio => Widget::RadioGroup { options: options() },
        FieldType::Dropdown => Widget::Dropdown {
            placeholder: DROPDOWN_PLACEHOLDER.to_string(),
            options: options(),
        },
        FieldType::Likert => Widget::Scale {
            points: field.likert_scale.unwrap_or(DEFAULT_LIKERT_SCALE),
        },
        FieldType::Matrix => Widget::Grid {
            rows: field.matrix_rows.clone().unwrap_or_default(),
            columns: field.matrix_columns.clone().unwrap_or_default(),
        },
        FieldType::Unknown => return None,
    };
    Some(widget)
}

impl FormPreview {
    /// Plain-text rendering, one block per field.
    pub fn to_text(&self) -> String {
        let (title, description, items) = match self {
            Self::Empty => return format!("{EMPTY_PREVIEW_MESSAGE}\n"),
            Self::Form {
                title,
                description,
                items,
            } => (title, description, items),
        };

        let mut out = String::new();
        let _ = writeln!(out, "# {title}");
        if !description.is_empty() {
            let _ = writeln!(out, "{description}");
        }
        for item in items {
            let marker = if item.required { " *" } else { "" };
            let _ = writeln!(out, "\n{}{marker}", item.label);
            if let Some(widget) = &item.widget {
                write_widget(&mut out, widget);
            }
        }
        out
    }
}

fn write_widget(out: &mut String, widget: &Widget) {
    match widget {
        Widget::TextInput => {
            let _ = writeln!(out, "  [____________]");
        }
        Widget::NumberInput => {
            let _ = writeln!(out, "  [ 0 ]");
        }
        Widget::CheckboxGroup { options } => {
            for option in options {
                let _ = writeln!(out, "  [ ] {option}");
            }
        }
        Widget::RadioGroup { options } => {
            for option in options {
                let _ = writeln!(out, "  ( ) {option}");
            }
        }
        Widget::Dropdown {
            placeholder,
            options,
        } => {
            let _ = writeln!(out, "  [{placeholder} v] {}", options.join(" | "));
        }
        Widget::Scale { points } => {
            let scale = (1..=*points)
                .map(|point| format!("({point})"))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(out, "  {scale}");
        }
        Widget::Grid { rows, columns } => {
            let _ = writeln!(out, "  | {} |", columns.join(" | "));
            for row in rows {
                let cells = vec!["( )"; columns.len()].join(" | ");
                let _ = writeln!(out, "  {row}: {cells}");
            }
        }
    }
}
