//! Cell values and their normalization from raw source values.
//!
//! Sources hand over JSON-shaped raw values (`serde_json::Value`). They are
//! normalized eagerly into a [`CellValue`], so the engine only ever sees
//! one of three canonical shapes and never inspects source types.
//!
//! | raw value                         | result                   |
//! |-----------------------------------|--------------------------|
//! | absent, `null`                    | `Empty`                  |
//! | integral number                   | `Single(xsd:integer)`    |
//! | other number                      | `Single(xsd:double)`     |
//! | boolean                           | `Single(xsd:boolean)`    |
//! | string                            | `Single(xsd:string)`     |
//! | array of scalars / nulls          | `List` (nulls skipped)   |
//! | object, array with object / array | `UnsupportedShape`       |
//!
//! A custom handler registered for the column label replaces all of the
//! above.

use serde_json::{Number, Value};

use crate::error::{ValueError, ValueResult};
use crate::handlers::HandlerRegistry;
use crate::rdf::vocab::xsd;
use crate::rdf::Term;

/// A cell's contribution to the RDF output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellValue {
    /// No triple.
    #[default]
    Empty,
    /// Exactly one triple.
    Single(Term),
    /// One triple per element; order carries no meaning in the output.
    List(Vec<Term>),
}

impl CellValue {
    pub fn list(terms: impl IntoIterator<Item = Term>) -> Self {
        CellValue::List(terms.into_iter().collect())
    }

    /// The object terms this value contributes, in source order.
    pub fn terms(&self) -> &[Term] {
        match self {
            CellValue::Empty => &[],
            CellValue::Single(term) => std::slice::from_ref(term),
            CellValue::List(terms) => terms,
        }
    }

    /// Number of triples the value produces.
    pub fn len(&self) -> usize {
        self.terms().len()
    }

    /// True when the value produces no triple (`Empty` or an empty `List`).
    pub fn is_empty(&self) -> bool {
        self.terms().is_empty()
    }
}

impl From<Term> for CellValue {
    fn from(term: Term) -> Self {
        CellValue::Single(term)
    }
}

impl From<Option<Term>> for CellValue {
    fn from(term: Option<Term>) -> Self {
        term.map_or(CellValue::Empty, CellValue::Single)
    }
}

/// Normalize a raw value for the column with the given display label.
pub fn normalize(
    raw: Option<&Value>,
    column_label: &str,
    handlers: &HandlerRegistry,
) -> ValueResult<CellValue> {
    if let Some(handler) = handlers.get(column_label) {
        return handler.handle(raw.unwrap_or(&Value::Null));
    }
    normalize_generic(raw)
}

/// Generic normalization rules, without custom handlers.
pub fn normalize_generic(raw: Option<&Value>) -> ValueResult<CellValue> {
    match raw {
        None | Some(Value::Null) => Ok(CellValue::Empty),
        Some(Value::Array(items)) => {
            let mut terms = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Null => continue,
                    Value::Array(_) => return Err(ValueError::unsupported("nested array")),
                    Value::Object(_) => return Err(ValueError::unsupported("object in array")),
                    scalar => terms.extend(scalar_to_term(scalar)?),
                }
            }
            Ok(CellValue::List(terms))
        }
        Some(Value::Object(_)) => Err(ValueError::unsupported("object")),
        Some(scalar) => Ok(scalar_to_term(scalar)?.into()),
    }
}

/// Convert a JSON scalar into a literal term; `null` gives `None`.
pub fn scalar_to_term(value: &Value) -> ValueResult<Option<Term>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(Term::boolean(*b))),
        Value::Number(n) => Ok(Some(number_to_term(n))),
        Value::String(s) => Ok(Some(Term::string(s))),
        Value::Array(_) => Err(ValueError::unsupported("array")),
        Value::Object(_) => Err(ValueError::unsupported("object")),
    }
}

fn number_to_term(n: &Number) -> Term {
    if let Some(i) = n.as_i64() {
        Term::integer(i)
    } else {
        // Source lexeme, kept exact by arbitrary_precision
        let lexeme = n.to_string();
        if !lexeme.contains(&['.', 'e', 'E'][..]) {
            Term::typed(lexeme, xsd::INTEGER)
        } else {
            match n.as_f64() {
                Some(d) if d.is_finite() => Term::double(d),
                _ => Term::typed(lexeme, xsd::DOUBLE),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::HandlerSpec;
    use serde_json::json;

    #[test]
    fn test_absent_and_null_are_empty() {
        assert_eq!(normalize_generic(None).unwrap(), CellValue::Empty);
        assert_eq!(normalize_generic(Some(&Value::Null)).unwrap(), CellValue::Empty);
    }

    #[test]
    fn test_scalars() {
        assert_eq!(
            normalize_generic(Some(&json!(42))).unwrap(),
            CellValue::Single(Term::integer(42))
        );
        assert_eq!(
            normalize_generic(Some(&json!(2.5))).unwrap(),
            CellValue::Single(Term::double(2.5))
        );
        assert_eq!(
            normalize_generic(Some(&json!(true))).unwrap(),
            CellValue::Single(Term::boolean(true))
        );
        assert_eq!(
            normalize_generic(Some(&json!("Praha"))).unwrap(),
            CellValue::Single(Term::string("Praha"))
        );
    }

    #[test]
    fn test_large_unsigned_stays_integer() {
        let value = normalize_generic(Some(&json!(u64::MAX))).unwrap();
        assert_eq!(
            value,
            CellValue::Single(Term::typed("18446744073709551615", xsd::INTEGER))
        );
    }

    #[test]
    fn test_integer_beyond_u64_keeps_lexeme() {
        let raw: Value = serde_json::from_str("123456789012345678901234567890").unwrap();
        assert_eq!(
            normalize_generic(Some(&raw)).unwrap(),
            CellValue::Single(Term::typed("123456789012345678901234567890", xsd::INTEGER))
        );

        let raw: Value = serde_json::from_str("-98765432109876543210").unwrap();
        assert_eq!(
            normalize_generic(Some(&raw)).unwrap(),
            CellValue::Single(Term::typed("-98765432109876543210", xsd::INTEGER))
        );
    }

    #[test]
    fn test_fractional_and_exponent_are_double() {
        let raw: Value = serde_json::from_str("2.5").unwrap();
        assert_eq!(
            normalize_generic(Some(&raw)).unwrap(),
            CellValue::Single(Term::double(2.5))
        );

        let raw: Value = serde_json::from_str("1e3").unwrap();
        assert_eq!(
            normalize_generic(Some(&raw)).unwrap(),
            CellValue::Single(Term::double(1000.0))
        );
    }

    #[test]
    fn test_list_skips_nulls_and_keeps_order() {
        let value = normalize_generic(Some(&json!(["a", null, "b", 3]))).unwrap();
        assert_eq!(
            value,
            CellValue::List(vec![Term::string("a"), Term::string("b"), Term::integer(3)])
        );
    }

    #[test]
    fn test_empty_list_is_legal() {
        let value = normalize_generic(Some(&json!([]))).unwrap();
        assert_eq!(value, CellValue::List(vec![]));
        assert!(value.is_empty());
        assert!(CellValue::Empty.is_empty());
    }

    #[test]
    fn test_structured_values_are_rejected() {
        let err = normalize_generic(Some(&json!({"LookupId": 1}))).unwrap_err();
        assert!(matches!(err, ValueError::UnsupportedShape { .. }));

        let err = normalize_generic(Some(&json!(["a", {"x": 1}]))).unwrap_err();
        assert!(matches!(err, ValueError::UnsupportedShape { .. }));

        let err = normalize_generic(Some(&json!([["nested"]]))).unwrap_err();
        assert!(matches!(err, ValueError::UnsupportedShape { .. }));
    }

    #[test]
    fn test_handler_takes_precedence() {
        let mut handlers = HandlerRegistry::new();
        handlers.register("Author", |_: &Value| Ok(CellValue::Single(Term::string("fixed"))));

        // Objects are fine when a handler covers the column
        let value = normalize(Some(&json!({"LookupValue": "x"})), "Author", &handlers).unwrap();
        assert_eq!(value, CellValue::Single(Term::string("fixed")));

        // Other columns still use the generic rules
        let err = normalize(Some(&json!({"x": 1})), "Other", &handlers).unwrap_err();
        assert!(matches!(err, ValueError::UnsupportedShape { .. }));
    }

    #[test]
    fn test_handler_sees_null_for_absent_value() {
        let mut handlers = HandlerRegistry::new();
        handlers.register_spec("Tags", HandlerSpec::Split { separator: ";".into() });
        assert_eq!(normalize(None, "Tags", &handlers).unwrap(), CellValue::Empty);
    }

    #[test]
    fn test_terms_view() {
        let single = CellValue::from(Term::integer(1));
        assert_eq!(single.len(), 1);
        assert_eq!(CellValue::from(None::<Term>), CellValue::Empty);
        assert_eq!(CellValue::list(vec![Term::string("a")]).terms().len(), 1);
    }
}
