//! Table and cell annotations from the CSVW metadata model.
//!
//! Only the annotations the engine consumes are modelled. They are built
//! fresh for every table/cell and dropped after the engine call returns.

use serde::{Deserialize, Serialize};

/// Annotations of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableAnnotation {
    /// URL of the tabular data file backing the table.
    ///
    /// Used to synthesize predicates (`<url>#<name>`) and row source
    /// fragments (`<url>#row=<n>`).
    pub url: Option<String>,
}

impl TableAnnotation {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Annotations of a single cell, taken from its column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellAnnotation {
    /// Subject IRI; cells of one row sharing it describe the same entity.
    pub about_url: Option<String>,
    /// Predicate IRI; overrides predicate synthesis.
    pub property_url: Option<String>,
    /// Stable column identifier.
    pub name: String,
}

impl CellAnnotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            about_url: None,
            property_url: None,
            name: name.into(),
        }
    }

    pub fn with_about_url(mut self, about_url: impl Into<String>) -> Self {
        self.about_url = Some(about_url.into());
        self
    }

    pub fn with_property_url(mut self, property_url: impl Into<String>) -> Self {
        self.property_url = Some(property_url.into());
        self
    }
}
