//! Declarative cell handlers
//!
//! Handlers that can be written in a conversion profile, for columns whose
//! native encoding the generic value rules cannot interpret.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::csvw::value::{normalize_generic, scalar_to_term};
use crate::csvw::CellValue;
use crate::error::{ValueError, ValueResult};
use crate::rdf::Term;

/// All available declarative handlers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HandlerSpec {
    /// Drop the value: the cell produces no triple
    Ignore,

    /// Split a string into a list of string literals
    Split {
        #[serde(default = "default_split_separator")]
        separator: String,
    },

    /// Convert to an `xsd:boolean`
    Boolean {
        #[serde(default = "default_true_values", rename = "trueValues")]
        true_values: Vec<String>,
    },

    /// Parse a string as `xsd:integer` or `xsd:double`
    Number,

    /// Keep the lexical form and tag it with the given datatype IRI
    Typed {
        datatype: String,
    },

    /// Take one key out of an object (or out of each object of an array)
    Field {
        key: String,
    },

    /// Map values using a lookup table
    Map {
        mapping: HashMap<String, String>,
        #[serde(default, rename = "caseInsensitive")]
        case_insensitive: bool,
        /// Value to use when no mapping matches (none = no triple)
        #[serde(default, rename = "defaultUnmapped")]
        default_unmapped: Option<String>,
    },
}

fn default_split_separator() -> String {
    ",".to_string()
}

fn default_true_values() -> Vec<String> {
    vec![
        "true".to_string(),
        "1".to_string(),
        "yes".to_string(),
        "y".to_string(),
        "ano".to_string(),
    ]
}

impl HandlerSpec {
    /// Apply this handler to a raw value
    pub fn apply(&self, value: &Value) -> ValueResult<CellValue> {
        match self {
            HandlerSpec::Ignore => Ok(CellValue::Empty),
            HandlerSpec::Split { separator } => self.apply_split(value, separator),
            HandlerSpec::Boolean { true_values } => self.apply_boolean(value, true_values),
            HandlerSpec::Number => self.apply_number(value),
            HandlerSpec::Typed { datatype } => self.apply_typed(value, datatype),
            HandlerSpec::Field { key } => self.apply_field(value, key),
            HandlerSpec::Map {
                mapping,
                case_insensitive,
                default_unmapped,
            } => self.apply_map(value, mapping, *case_insensitive, default_unmapped.as_deref()),
        }
    }

    fn as_string(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Run `f` on a scalar, or on each element of an array.
    fn per_scalar<F>(value: &Value, mut f: F) -> ValueResult<CellValue>
    where
        F: FnMut(&Value) -> ValueResult<Option<Term>>,
    {
        match value {
            Value::Null => Ok(CellValue::Empty),
            Value::Array(items) => {
                let mut terms = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Array(_) | Value::Object(_) => {
                            return Err(ValueError::unsupported("structured array element"))
                        }
                        scalar => terms.extend(f(scalar)?),
                    }
                }
                Ok(CellValue::List(terms))
            }
            Value::Object(_) => Err(ValueError::unsupported("object")),
            scalar => Ok(f(scalar)?.into()),
        }
    }

    fn apply_split(&self, value: &Value, separator: &str) -> ValueResult<CellValue> {
        match value {
            Value::String(s) => Ok(CellValue::list(
                s.split(separator)
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(Term::string),
            )),
            other => normalize_generic(Some(other)),
        }
    }

    fn apply_boolean(&self, value: &Value, true_values: &[String]) -> ValueResult<CellValue> {
        Self::per_scalar(value, |scalar| match scalar {
            Value::Bool(b) => Ok(Some(Term::boolean(*b))),
            _ => Ok(Self::as_string(scalar)
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .map(|s| Term::boolean(true_values.iter().any(|tv| tv.to_lowercase() == s)))),
        })
    }

    fn apply_number(&self, value: &Value) -> ValueResult<CellValue> {
        Self::per_scalar(value, |scalar| match scalar {
            Value::Number(_) => scalar_to_term(scalar),
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                if let Ok(i) = s.parse::<i64>() {
                    return Ok(Some(Term::integer(i)));
                }
                match s.parse::<f64>() {
                    Ok(d) if d.is_finite() => Ok(Some(Term::double(d))),
                    _ => Err(ValueError::invalid(format!("'{}' is not a number", s))),
                }
            }
            other => Err(ValueError::invalid(format!("{} is not a number", other))),
        })
    }

    fn apply_typed(&self, value: &Value, datatype: &str) -> ValueResult<CellValue> {
        Self::per_scalar(value, |scalar| {
            Ok(Self::as_string(scalar).map(|lexical| Term::typed(lexical, datatype)))
        })
    }

    fn apply_field(&self, value: &Value, key: &str) -> ValueResult<CellValue> {
        match value {
            Value::Object(map) => normalize_generic(map.get(key)),
            Value::Array(items) => {
                let mut terms = Vec::with_capacity(items.len());
                for item in items {
                    let extracted = match item {
                        Value::Object(map) => map.get(key).unwrap_or(&Value::Null),
                        other => other,
                    };
                    terms.extend(scalar_to_term(extracted)?);
                }
                Ok(CellValue::List(terms))
            }
            other => normalize_generic(Some(other)),
        }
    }

    fn apply_map(
        &self,
        value: &Value,
        mapping: &HashMap<String, String>,
        case_insensitive: bool,
        default_unmapped: Option<&str>,
    ) -> ValueResult<CellValue> {
        Self::per_scalar(value, |scalar| {
            let Some(s) = Self::as_string(scalar) else {
                return Ok(None);
            };

            let found = if case_insensitive {
                let key = s.to_lowercase();
                mapping
                    .iter()
                    .find(|(k, _)| k.to_lowercase() == key)
                    .map(|(_, v)| v.as_str())
            } else {
                mapping.get(&s).map(String::as_str)
            };

            Ok(found.or(default_unmapped).map(Term::string))
        })
    }
}

/// Get a description of all available handlers
pub fn handlers_description() -> String {
    r#"Available cell handlers:

| Handler | Description | Parameters |
|---------|-------------|------------|
| ignore | Drop the value, no triple | - |
| split | Split a string into a list of strings | separator: split string (default ",") |
| boolean | Convert to xsd:boolean | trueValues: list of truthy strings |
| number | Parse as xsd:integer / xsd:double | - |
| typed | Tag the lexical form with a datatype | datatype: datatype IRI |
| field | Extract a key from an object or array of objects | key: object key |
| map | Map values using a lookup table | mapping: {source: target}, caseInsensitive: bool, defaultUnmapped: string |

Handlers are keyed by column label in the profile:
{
  "columns": {
    "Keywords": {"handler": {"type": "split", "separator": ";"}},
    "Author": {"handler": {"type": "field", "key": "LookupValue"}},
    "Published": {"handler": {"type": "typed", "datatype": "http://www.w3.org/2001/XMLSchema#date"}}
  }
}"#
    .to_string()
}
