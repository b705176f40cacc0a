//! CSV export of form definitions.
//!
//! # Invariants
//! - Output has exactly one header row plus one row per field.
//! - Column order is fixed per layout.
//! - Values containing `,`, `"`, CR or LF are quoted with `"` doubled.

use crate::model::field::Field;
use crate::model::form::FormConfig;

const OPTION_SEPARATOR: &str = ";";

const BASIC_HEADER: [&str; 4] = ["Question", "Type", "Required", "Options"];
const EXTENDED_HEADER: [&str; 6] = [
    "Question ID",
    "Question Type",
    "Question Text",
    "Options",
    "Required",
    "Conditional Logic",
];

/// Column layout for CSV export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CsvLayout {
    /// `Question,Type,Required,Options`.
    #[default]
    Basic,
    /// Adds the field id and a conditional-logic description.
    Extended,
}

impl CsvLayout {
    pub fn header(self) -> &'static [&'static str] {
        match self {
            Self::Basic => &BASIC_HEADER,
            Self::Extended => &EXTENDED_HEADER,
        }
    }
}

/// Renders the form as CSV text. Rows are separated by `\n`.
pub fn export_csv(config: &FormConfig, layout: CsvLayout) -> String {
    let mut lines = Vec::with_capacity(config.fields.len() + 1);
    lines.push(join_row(layout.header().iter().map(|cell| cell.to_string())));
    for field in &config.fields {
        lines.push(join_row(field_row(field, layout)));
    }
    lines.join("\n")
}

fn field_row(field: &Field, layout: CsvLayout) -> Vec<String> {
    let required = if field.required { "Yes" } else { "No" }.to_string();
    let options = field
        .options
        .as_ref()
        .map(|options| options.join(OPTION_SEPARATOR))
        .unwrap_or_default();

    match layout {
        CsvLayout::Basic => vec![
            field.label.clone(),
            field.kind.as_str().to_string(),
            required,
            options,
        ],
        CsvLayout::Extended => vec![
            field.id.to_string(),
            field.kind.as_str().to_string(),
            field.label.clone(),
            options,
            required,
            field
                .conditional_logic
                .as_ref()
                .map(|rule| format!("Depends on {}, Show if {}", rule.depends_on, rule.show_if))
                .unwrap_or_default(),
        ],
    }
}

fn join_row(cells: impl IntoIterator<Item = String>) -> String {
    cells
        .into_iter()
        .map(|cell| escape_cell(&cell))
        .collect::<Vec<_>>()
        .join(",")
}

fn escape_cell(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
