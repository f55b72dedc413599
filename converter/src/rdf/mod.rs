//! RDF building blocks: terms, vocabulary, sinks, and N-Triples output.
//!
//! - `term`: [`Term`], [`Resource`], [`Literal`], [`Triple`]
//! - `vocab`: CSVW, RDF and XSD IRIs
//! - `sink`: the [`TermSink`] output capability and [`StatementCollector`]
//! - `ntriples`: [`NTriplesWriter`]

pub mod ntriples;
pub mod sink;
pub mod term;
pub mod vocab;

pub use ntriples::NTriplesWriter;
pub use sink::{StatementCollector, TermSink};
pub use term::{BlankId, Literal, Resource, Term, Triple};
