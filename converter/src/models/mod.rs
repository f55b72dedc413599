//! Tabular models fed into the conversion adapter.
//!
//! - [`Table`] - one source table: optional URL/identifier, columns, rows
//! - [`Column`] - column name (used in predicates) and display label (used for handler lookup)
//! - [`Row`] - raw values in column order, with the optional source row number
//!
//! Raw values are kept as `serde_json::Value` so that CSV files and JSON list
//! exports share a single representation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Column
// =============================================================================

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Machine name; synthesized predicates end with `#<name>`.
    pub name: String,
    /// Display label; custom handlers are keyed by it.
    pub label: String,
}

impl Column {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }

    /// Column whose name is derived from a CSV header.
    ///
    /// The header becomes the label; the name is the header percent-encoded
    /// so it can be appended to an IRI.
    pub fn from_header(header: &str) -> Self {
        Self {
            name: encode_name(header),
            label: header.to_string(),
        }
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set (UTF-8 bytes).
pub fn encode_name(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

// =============================================================================
// Row
// =============================================================================

/// A table row: one raw value per column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    /// Physical position in the source file (the header is line 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_number: Option<u64>,
    /// Raw values aligned with [`Table::columns`]; missing trailing values are absent.
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            source_number: None,
            values,
        }
    }

    pub fn with_source_number(mut self, number: u64) -> Self {
        self.source_number = Some(number);
        self
    }

    /// Raw value of the column at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}

// =============================================================================
// Table
// =============================================================================

/// A parsed source table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Table URL, the base for synthesized predicates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Table node IRI in standard mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn column_index(&self, name_or_label: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name_or_label || c.label == name_or_label)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows as JSON objects keyed by column label, for previews.
    pub fn records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let object = self
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(i, column)| {
                        (column.label.clone(), row.get(i).cloned().unwrap_or(Value::Null))
                    })
                    .collect();
                Value::Object(object)
            })
            .collect()
    }
}
