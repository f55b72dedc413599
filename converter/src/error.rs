//! Error types for the csvw2rdf conversion pipeline.
//!
//! Errors are layered the same way the pipeline is:
//!
//! - [`ValueError`] - a raw cell value could not be normalized
//! - [`SinkError`] - the term sink failed to record a triple
//! - [`ConversionError`] - the engine or adapter rejected a call
//! - [`SourceError`] - reading a tabular source (CSV, JSON list export)
//! - [`ProfileError`] - loading a conversion profile
//! - [`PipelineError`] - top-level orchestration
//!
//! Every lower layer converts into the layer above via `From`,
//! so `?` works across error boundaries.

use thiserror::Error;

// =============================================================================
// Value Normalization Errors
// =============================================================================

/// Errors while turning a raw source value into a [`crate::CellValue`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// The value has a structure the generic mapping has no rule for.
    #[error("Unsupported value shape: {shape}")]
    UnsupportedShape { shape: String },

    /// A custom handler could not interpret the value.
    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}

impl ValueError {
    pub fn unsupported(shape: impl Into<String>) -> Self {
        Self::UnsupportedShape { shape: shape.into() }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidValue { message: message.into() }
    }
}

// =============================================================================
// Sink Errors
// =============================================================================

/// Failures reported by a [`crate::TermSink`].
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing the triple failed.
    #[error("Failed to write triple: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Conversion Errors
// =============================================================================

/// Errors raised by the conversion engine and the tabular adapter.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Cell value normalization failed.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// Neither a property URL nor a table URL is available for a cell.
    #[error("No predicate for column '{column}': set a property URL or the table URL")]
    MissingPredicateSource { column: String },

    /// A row arrived before any table.
    #[error("Row received before any table was started")]
    NoActiveTable,

    /// A cell arrived before any row of the current table.
    #[error("Cell received before any row was started")]
    NoActiveRow,

    /// The sink failed; never skipped.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// A cell-level failure with its position in the table.
    #[error("Row {row}, column '{column}': {source}")]
    Cell {
        row: u64,
        column: String,
        #[source]
        source: Box<ConversionError>,
    },
}

impl ConversionError {
    /// Attach the row and column a cell-level error happened at.
    pub fn at_cell(self, row: u64, column: impl Into<String>) -> Self {
        Self::Cell {
            row,
            column: column.into(),
            source: Box::new(self),
        }
    }

    /// True for errors that only concern a single cell.
    ///
    /// Sink failures and call-order violations are never cell-local.
    pub fn is_cell_local(&self) -> bool {
        match self {
            Self::Value(_) | Self::MissingPredicateSource { .. } => true,
            Self::Cell { source, .. } => source.is_cell_local(),
            Self::Sink(_) | Self::NoActiveTable | Self::NoActiveRow => false,
        }
    }
}

// =============================================================================
// Tabular Source Errors
// =============================================================================

/// Errors while reading a tabular source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the file content.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Malformed record.
    #[error("Line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Error from the CSV reader.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Error from the JSON reader.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Empty file.
    #[error("Source file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// JSON document does not describe a table.
    #[error("Invalid table: {0}")]
    InvalidTable(String),
}

// =============================================================================
// Profile Errors
// =============================================================================

/// Errors while loading a conversion profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Failed to read the profile file.
    #[error("Failed to read profile: {0}")]
    Io(#[from] std::io::Error),

    /// Profile is not valid JSON for the profile format.
    #[error("Invalid profile JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A URI template in a column override is malformed.
    #[error("Invalid URI template for column '{column}': {template}")]
    InvalidTemplate { column: String, template: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::convert_file`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Tabular source error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Conversion error.
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Profile error.
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Output error.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    /// The source has no rows.
    #[error("No rows to convert")]
    EmptyInput,
}

impl From<SinkError> for PipelineError {
    fn from(err: SinkError) -> Self {
        PipelineError::Conversion(ConversionError::Sink(err))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for value normalization.
pub type ValueResult<T> = Result<T, ValueError>;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Result type for engine and adapter operations.
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Result type for tabular sources.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for profile loading.
pub type ProfileResult<T> = Result<T, ProfileError>;
