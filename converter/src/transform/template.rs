//! URI templates for `aboutUrl` / `propertyUrl` column overrides.
//!
//! A small subset of RFC 6570 level 1: `{name}` is replaced by the
//! percent-encoded value of the column `name` (by name or label) in the
//! current row, `{_row}` by the row number. Everything else is literal.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::models::encode_name;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]*)\}").expect("placeholder pattern is valid"));

/// Variable name standing for the row number.
pub const ROW_VARIABLE: &str = "_row";

/// True when every brace opens a non-empty `{name}` placeholder.
pub fn is_valid(template: &str) -> bool {
    let names_ok = PLACEHOLDER
        .captures_iter(template)
        .all(|c| !c[1].trim().is_empty());
    let rest = PLACEHOLDER.replace_all(template, "");
    names_ok && !rest.contains('{') && !rest.contains('}')
}

/// Placeholder names in order of appearance.
pub fn variables(template: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|c| c[1].trim().to_string())
        .collect()
}

/// True when the template has no placeholder.
pub fn is_literal(template: &str) -> bool {
    !PLACEHOLDER.is_match(template)
}

/// Expand placeholders; `lookup` returns the raw (unencoded) value or `None`,
/// which expands to the empty string.
pub fn expand<F>(template: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            lookup(caps[1].trim())
                .map(|value| encode_name(&value))
                .unwrap_or_default()
        })
        .into_owned()
}
