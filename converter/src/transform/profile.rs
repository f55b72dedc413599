//! Conversion profile definition
//!
//! The profile is the user-facing configuration of a conversion: output
//! mode, table URL and identifiers, error policy, and per-column overrides
//! (subject / predicate templates, suppression, custom handlers).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;

use super::template;
use crate::csvw::Mode;
use crate::error::{ProfileError, ProfileResult};
use crate::handlers::{HandlerRegistry, HandlerSpec};
use crate::models::Column;
use crate::rdf::vocab::xsd;

/// What to do when a single cell cannot be converted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop the conversion at the first failing cell
    #[default]
    Abort,
    /// Log the failure, record it in the report and continue
    Skip,
}

/// A complete conversion profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionProfile {
    /// Version of the profile format
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Output mode (minimal when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,

    /// Table URL, base of synthesized predicates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_url: Option<String>,

    /// Table node IRI (standard mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,

    /// Table group node IRI (standard mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    /// Cell failure policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<ErrorPolicy>,

    /// Column overrides: key = column label or name
    #[serde(default)]
    pub columns: BTreeMap<String, ColumnOverride>,
}

/// Per-column settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnOverride {
    /// Subject URI template, e.g. `http://example.org/person/{id}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_url: Option<String>,

    /// Predicate URI template; replaces `<table-url>#<name>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_url: Option<String>,

    /// Do not emit anything for this column
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub suppress_output: bool,

    /// Custom value handler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<HandlerSpec>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl ConversionProfile {
    /// Create an empty profile
    pub fn new() -> Self {
        Self {
            version: default_version(),
            description: String::new(),
            mode: None,
            table_url: None,
            table_id: None,
            group_id: None,
            on_error: None,
            columns: BTreeMap::new(),
        }
    }

    /// Parse a profile from JSON string and check its templates
    pub fn from_json(json: &str) -> ProfileResult<Self> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load a profile file
    pub fn load(path: impl AsRef<Path>) -> ProfileResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> ProfileResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add or replace a column override
    pub fn with_column(mut self, key: impl Into<String>, column: ColumnOverride) -> Self {
        self.columns.insert(key.into(), column);
        self
    }

    /// Reject malformed URI templates
    pub fn validate(&self) -> ProfileResult<()> {
        for (key, column) in &self.columns {
            for t in [&column.about_url, &column.property_url].into_iter().flatten() {
                if !template::is_valid(t) {
                    return Err(ProfileError::InvalidTemplate {
                        column: key.clone(),
                        template: t.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Override for a column, looked up by label first, then by name
    pub fn column(&self, column: &Column) -> Option<&ColumnOverride> {
        self.columns
            .get(&column.label)
            .or_else(|| self.columns.get(&column.name))
    }

    /// Handlers for the given columns, keyed by column label
    pub fn handler_registry(&self, columns: &[Column]) -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        for column in columns {
            if let Some(handler) = self.column(column).and_then(|c| c.handler.clone()) {
                registry.register_spec(column.label.clone(), handler);
            }
        }
        registry
    }

    /// Profile keys that match no column (by label or name)
    pub fn unknown_columns(&self, columns: &[Column]) -> Vec<String> {
        self.columns
            .keys()
            .filter(|key| !columns.iter().any(|c| &c.label == *key || &c.name == *key))
            .cloned()
            .collect()
    }
}

impl Default for ConversionProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnOverride {
    pub fn with_about_url(mut self, template: impl Into<String>) -> Self {
        self.about_url = Some(template.into());
        self
    }

    pub fn with_property_url(mut self, template: impl Into<String>) -> Self {
        self.property_url = Some(template.into());
        self
    }

    pub fn with_handler(mut self, handler: HandlerSpec) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn suppressed() -> Self {
        Self {
            suppress_output: true,
            ..Self::default()
        }
    }
}

/// Generate an example profile for documentation
pub fn example_profile() -> ConversionProfile {
    let mut status = HashMap::new();
    status.insert("Schváleno".to_string(), "approved".to_string());
    status.insert("Zamítnuto".to_string(), "rejected".to_string());

    ConversionProfile {
        version: default_version(),
        description: "Example profile for a published dataset list".to_string(),
        mode: Some(Mode::Minimal),
        table_url: Some("https://data.example.org/lists/datasets".to_string()),
        table_id: None,
        group_id: None,
        on_error: Some(ErrorPolicy::Skip),
        columns: BTreeMap::new(),
    }
    .with_column(
        "ID",
        ColumnOverride::default().with_handler(HandlerSpec::Number),
    )
    .with_column(
        "Title",
        ColumnOverride::default()
            .with_about_url("https://data.example.org/dataset/{ID}")
            .with_property_url("http://purl.org/dc/terms/title"),
    )
    .with_column(
        "Keywords",
        ColumnOverride::default()
            .with_about_url("https://data.example.org/dataset/{ID}")
            .with_property_url("http://www.w3.org/ns/dcat#keyword")
            .with_handler(HandlerSpec::Split {
                separator: ";".to_string(),
            }),
    )
    .with_column(
        "Issued",
        ColumnOverride::default().with_handler(HandlerSpec::Typed {
            datatype: xsd::DATE.to_string(),
        }),
    )
    .with_column(
        "Status",
        ColumnOverride::default().with_handler(HandlerSpec::Map {
            mapping: status,
            case_insensitive: true,
            default_unmapped: None,
        }),
    )
    .with_column("Modified By", ColumnOverride::suppressed())
}
