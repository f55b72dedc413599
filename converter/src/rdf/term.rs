//! RDF term types: IRI, blank node, and literal
//!
//! - [`Resource`] is what may appear in subject position (IRI or blank node)
//! - [`Term`] is what may appear in object position (adds literals)
//! - [`Literal`] always carries a datatype; plain strings are `xsd:string`
//!
//! The `Display` impls render N-Triples syntax.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::ntriples::{write_iri, write_quoted};
use super::vocab::xsd;

/// Blank node identifier
///
/// The label is stored without the `_:` prefix and has no meaning outside
/// the conversion run that generated it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlankId(Arc<str>);

impl BlankId {
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    /// Label without the `_:` prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// A node that can be the subject of a triple.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Iri(Arc<str>),
    BlankNode(BlankId),
}

impl Resource {
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Resource::Iri(Arc::from(iri.as_ref()))
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Resource::Iri(iri) => Some(iri),
            Resource::BlankNode(_) => None,
        }
    }

    pub fn as_blank(&self) -> Option<&BlankId> {
        match self {
            Resource::BlankNode(id) => Some(id),
            Resource::Iri(_) => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Resource::BlankNode(_))
    }
}

impl From<BlankId> for Resource {
    fn from(id: BlankId) -> Self {
        Resource::BlankNode(id)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Iri(iri) => write_iri(f, iri),
            Resource::BlankNode(id) => fmt::Display::fmt(id, f),
        }
    }
}

/// A literal value with its datatype.
///
/// The common XSD types get native variants; anything else produced by a
/// custom handler is kept as lexical form plus datatype IRI.
#[derive(Clone, Debug)]
pub enum Literal {
    /// `xsd:string`
    String(Arc<str>),
    /// `xsd:integer` within the `i64` range
    Integer(i64),
    /// `xsd:double`
    Double(f64),
    /// `xsd:boolean`
    Boolean(bool),
    /// Any other datatype, or an `xsd:integer` too large for `i64`
    Typed {
        lexical: Arc<str>,
        datatype: Arc<str>,
    },
}

impl Literal {
    pub fn string(value: impl AsRef<str>) -> Self {
        Literal::String(Arc::from(value.as_ref()))
    }

    pub fn typed(lexical: impl AsRef<str>, datatype: impl AsRef<str>) -> Self {
        Literal::Typed {
            lexical: Arc::from(lexical.as_ref()),
            datatype: Arc::from(datatype.as_ref()),
        }
    }

    /// Lexical form as it appears between the quotes in N-Triples.
    pub fn lexical(&self) -> String {
        match self {
            Literal::String(s) => s.to_string(),
            Literal::Integer(i) => i.to_string(),
            Literal::Double(d) => {
                if d.is_nan() {
                    "NaN".to_string()
                } else if d.is_infinite() {
                    if d.is_sign_positive() {
                        "INF".to_string()
                    } else {
                        "-INF".to_string()
                    }
                } else {
                    // Canonical xsd:double uses exponent notation
                    format!("{:E}", d)
                }
            }
            Literal::Boolean(b) => b.to_string(),
            Literal::Typed { lexical, .. } => lexical.to_string(),
        }
    }

    /// Datatype IRI.
    pub fn datatype(&self) -> &str {
        match self {
            Literal::String(_) => xsd::STRING,
            Literal::Integer(_) => xsd::INTEGER,
            Literal::Double(_) => xsd::DOUBLE,
            Literal::Boolean(_) => xsd::BOOLEAN,
            Literal::Typed { datatype, .. } => datatype,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Literal::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// Literals are equal when their N-Triples forms are: `Integer(42)` equals
/// `Typed { "42", xsd:integer }`.
impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        self.datatype() == other.datatype() && self.lexical() == other.lexical()
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.datatype().hash(state);
        self.lexical().hash(state);
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_quoted(f, &self.lexical())?;
        let datatype = self.datatype();
        if datatype != xsd::STRING {
            f.write_str("^^")?;
            write_iri(f, datatype)?;
        }
        Ok(())
    }
}

/// An RDF term in object position.
///
/// # Invariants
///
/// - `Term::Iri` always holds an absolute IRI, never a prefixed name.
/// - Terms are immutable; cloning is cheap (`Arc` payloads).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    Iri(Arc<str>),
    BlankNode(BlankId),
    Literal(Literal),
}

impl Term {
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Term::Iri(Arc::from(iri.as_ref()))
    }

    pub fn string(value: impl AsRef<str>) -> Self {
        Term::Literal(Literal::string(value))
    }

    pub fn integer(value: i64) -> Self {
        Term::Literal(Literal::Integer(value))
    }

    pub fn double(value: f64) -> Self {
        Term::Literal(Literal::Double(value))
    }

    pub fn boolean(value: bool) -> Self {
        Term::Literal(Literal::Boolean(value))
    }

    pub fn typed(lexical: impl AsRef<str>, datatype: impl AsRef<str>) -> Self {
        Term::Literal(Literal::typed(lexical, datatype))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_blank(&self) -> Option<&BlankId> {
        match self {
            Term::BlankNode(id) => Some(id),
            _ => None,
        }
    }
}

impl From<Resource> for Term {
    fn from(resource: Resource) -> Self {
        match resource {
            Resource::Iri(iri) => Term::Iri(iri),
            Resource::BlankNode(id) => Term::BlankNode(id),
        }
    }
}

impl From<&Resource> for Term {
    fn from(resource: &Resource) -> Self {
        resource.clone().into()
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write_iri(f, iri),
            Term::BlankNode(id) => fmt::Display::fmt(id, f),
            Term::Literal(lit) => fmt::Display::fmt(lit, f),
        }
    }
}

/// A single RDF statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: Resource,
    pub predicate: Arc<str>,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Resource, predicate: impl AsRef<str>, object: Term) -> Self {
        Self {
            subject,
            predicate: Arc::from(predicate.as_ref()),
            object,
        }
    }
}

/// Renders the triple as one N-Triples line, without the trailing newline.
impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.subject)?;
        write_iri(f, &self.predicate)?;
        write!(f, " {} .", self.object)
    }
}
