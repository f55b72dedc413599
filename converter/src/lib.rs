//! # csvw2rdf - CSV on the Web to RDF conversion
//!
//! csvw2rdf turns tabular data (CSV files, JSON list exports) into RDF
//! statements following the W3C CSVW `csv2rdf` mapping, in minimal or
//! standard mode.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV / JSON │────▶│   Parser    │────▶│   Adapter   │────▶│   Engine    │──▶ TermSink
//! │   source    │     │  (auto-enc) │     │  (profile)  │     │  (csv2rdf)  │   (N-Triples)
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use csvw2rdf::{convert_bytes, ConvertOptions, SourceFormat};
//!
//! let options = ConvertOptions {
//!     base_url: Some("http://example.org/people".to_string()),
//!     ..ConvertOptions::default()
//! };
//! let result = convert_bytes(b"name,age\nAlice,30\n", SourceFormat::Csv, &options, None).unwrap();
//! assert_eq!(result.statements.len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`rdf`] - RDF terms, term sinks, N-Triples output
//! - [`csvw`] - Annotations, cell values and the conversion engine
//! - [`handlers`] - Per-column custom value handlers
//! - [`models`] - Tabular models (Table, Column, Row)
//! - [`parser`] - CSV and JSON parsing with auto-detection
//! - [`transform`] - Profile, adapter and pipeline

// Core modules
pub mod error;
pub mod rdf;

// Conversion
pub mod csvw;
pub mod handlers;

// Tabular sources
pub mod models;
pub mod parser;

// Orchestration
pub mod transform;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConversionError, PipelineError, ProfileError, SinkError, SourceError, ValueError,
};

// =============================================================================
// Re-exports - RDF
// =============================================================================

pub use rdf::{BlankId, Literal, NTriplesWriter, Resource, StatementCollector, Term, TermSink, Triple};

// =============================================================================
// Re-exports - Conversion engine
// =============================================================================

pub use csvw::{
    normalize, BlankNodeGenerator, CellAnnotation, CellValue, CsvwToRdf, Mode, TableAnnotation,
};

pub use handlers::{handlers_description, CellHandler, HandlerRegistry, HandlerSpec};

// =============================================================================
// Re-exports - Tabular sources
// =============================================================================

pub use models::{Column, Row, Table};

pub use parser::{parse_file, ParseResult, SourceFormat};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::{
    convert_bytes, convert_file, convert_table, example_profile, ColumnOverride,
    ConversionProfile, ConversionReport, ConvertOptions, ErrorPolicy, PipelineResult,
    SkippedCell, SourceInfo, TableAdapter,
};
