//! TermSink trait: the output capability the conversion engine writes to
//!
//! The engine never builds a graph itself. It asserts statements one at a
//! time and the sink decides what to do with them:
//!
//! - [`StatementCollector`]: keeps every triple in memory, in emission order
//! - [`crate::rdf::NTriplesWriter`]: streams triples to any `io::Write`

use std::collections::HashSet;

use super::term::{Resource, Term, Triple};
use super::vocab::rdf;
use crate::error::SinkResult;

/// Event-driven interface for receiving triples.
///
/// Only [`TermSink::assert_triple`] is required; the other two operations
/// default to it.
///
/// # Example
///
/// ```
/// use csvw2rdf::{Resource, StatementCollector, Term, TermSink};
///
/// let mut sink = StatementCollector::new();
/// let alice = Resource::iri("http://example.org/alice");
///
/// sink.assert_type(&alice, "http://xmlns.com/foaf/0.1/Person").unwrap();
/// sink.assert_triple(&alice, "http://xmlns.com/foaf/0.1/name", &Term::string("Alice"))
///     .unwrap();
///
/// assert_eq!(sink.len(), 2);
/// ```
pub trait TermSink {
    /// Assert `subject rdf:type type_iri`.
    fn assert_type(&mut self, subject: &Resource, type_iri: &str) -> SinkResult<()> {
        self.assert_triple(subject, rdf::TYPE, &Term::iri(type_iri))
    }

    /// Assert a triple whose object is the resource named by `target`.
    fn assert_link(&mut self, subject: &Resource, predicate: &str, target: &str) -> SinkResult<()> {
        self.assert_triple(subject, predicate, &Term::iri(target))
    }

    /// Assert a triple with an arbitrary object term.
    fn assert_triple(&mut self, subject: &Resource, predicate: &str, object: &Term) -> SinkResult<()>;
}

impl<S: TermSink + ?Sized> TermSink for &mut S {
    fn assert_type(&mut self, subject: &Resource, type_iri: &str) -> SinkResult<()> {
        (**self).assert_type(subject, type_iri)
    }

    fn assert_link(&mut self, subject: &Resource, predicate: &str, target: &str) -> SinkResult<()> {
        (**self).assert_link(subject, predicate, target)
    }

    fn assert_triple(&mut self, subject: &Resource, predicate: &str, object: &Term) -> SinkResult<()> {
        (**self).assert_triple(subject, predicate, object)
    }
}

/// A sink that accumulates triples in memory.
///
/// Duplicates are kept; call [`StatementCollector::distinct`] to drop them.
#[derive(Debug, Default, Clone)]
pub struct StatementCollector {
    triples: Vec<Triple>,
}

impl StatementCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the buffer, e.g. `(columns + 3) * rows` for a standard-mode table.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triples: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn into_triples(self) -> Vec<Triple> {
        self.triples
    }

    /// Remove repeated statements, keeping the first occurrence of each.
    ///
    /// Returns how many triples were removed.
    pub fn distinct(&mut self) -> usize {
        let before = self.triples.len();
        let mut seen = HashSet::with_capacity(before);
        self.triples.retain(|t| seen.insert(t.clone()));
        before - self.triples.len()
    }

    /// Replay the collected triples into another sink.
    pub fn replay<S: TermSink>(&self, sink: &mut S) -> SinkResult<()> {
        for triple in &self.triples {
            sink.assert_triple(&triple.subject, &triple.predicate, &triple.object)?;
        }
        Ok(())
    }
}

impl TermSink for StatementCollector {
    fn assert_triple(&mut self, subject: &Resource, predicate: &str, object: &Term) -> SinkResult<()> {
        self.triples
            .push(Triple::new(subject.clone(), predicate, object.clone()));
        Ok(())
    }
}
