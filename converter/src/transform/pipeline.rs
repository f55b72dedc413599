//! High-level pipeline API for tabular source to RDF conversion.
//!
//! This module combines all steps: source parsing, profile resolution,
//! conversion through the engine, duplicate removal and N-Triples output.
//!
//! # Example
//!
//! ```rust,ignore
//! use csvw2rdf::transform::{convert_file, ConvertOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ConvertOptions {
//!         base_url: Some("http://example.org/people".to_string()),
//!         ..ConvertOptions::default()
//!     };
//!     let result = convert_file(Path::new("people.csv"), &options, None)?;
//!
//!     println!("{} triples", result.statements.len());
//!     result.write_ntriples(std::io::stdout().lock())?;
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use super::adapter::{ConversionReport, TableAdapter};
use super::profile::{ConversionProfile, ErrorPolicy};
use crate::csvw::{BlankNodeGenerator, CsvwToRdf, Mode};
use crate::error::{PipelineError, SinkResult};
use crate::handlers::HandlerRegistry;
use crate::models::Table;
use crate::parser::{
    format_delimiter, parse_csv_bytes, parse_file, parse_json_bytes, ParseResult, SourceFormat,
};
use crate::rdf::{NTriplesWriter, StatementCollector};

/// Options for the conversion pipeline
///
/// Every `Some` value overrides the corresponding profile setting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Output mode
    #[serde(default)]
    pub mode: Option<Mode>,

    /// Table URL used to synthesize predicates and row URLs
    #[serde(default)]
    pub base_url: Option<String>,

    /// Table node IRI (standard mode)
    #[serde(default)]
    pub table_id: Option<String>,

    /// Table group node IRI (standard mode)
    #[serde(default)]
    pub group_id: Option<String>,

    /// Cell failure policy
    #[serde(default)]
    pub on_error: Option<ErrorPolicy>,

    /// Remove duplicate statements before output
    #[serde(default = "default_distinct")]
    pub distinct: bool,

    /// CSV delimiter; detected when absent
    #[serde(default)]
    pub delimiter: Option<char>,

    /// Use sequential blank node labels with this prefix instead of random ones
    #[serde(default)]
    pub blank_prefix: Option<String>,
}

fn default_distinct() -> bool {
    true
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            mode: None,
            base_url: None,
            table_id: None,
            group_id: None,
            on_error: None,
            distinct: default_distinct(),
            delimiter: None,
            blank_prefix: None,
        }
    }
}

/// Result of a complete conversion pipeline
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Converted statements, in emission order
    pub statements: StatementCollector,

    /// Conversion counters and skipped cells
    pub report: ConversionReport,

    /// Duplicate statements removed
    pub duplicates_removed: usize,

    /// Mode actually used
    pub mode: Mode,

    /// Source metadata
    pub source_info: SourceInfo,
}

/// Source file information
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub format: SourceFormat,
    pub encoding: String,
    pub delimiter: Option<char>,
    pub columns: Vec<String>,
    pub row_count: usize,
}

impl SourceInfo {
    fn from_parse(parse_result: &ParseResult) -> Self {
        Self {
            format: parse_result.format,
            encoding: parse_result.encoding.clone(),
            delimiter: parse_result.delimiter,
            columns: parse_result.headers(),
            row_count: parse_result.table.row_count(),
        }
    }
}

impl PipelineResult {
    /// Write the statements as N-Triples; returns the number of lines written.
    pub fn write_ntriples<W: Write>(&self, writer: W) -> SinkResult<usize> {
        let mut sink = NTriplesWriter::new(writer);
        self.statements.replay(&mut sink)?;
        let written = sink.written();
        sink.finish()?;
        Ok(written)
    }

    /// Write the statements as N-Triples into a file.
    pub fn write_ntriples_file(&self, path: &Path) -> Result<usize, PipelineError> {
        let file = File::create(path)?;
        Ok(self.write_ntriples(BufWriter::new(file))?)
    }
}

/// Convert a source file to RDF.
///
/// This is the main entry point for the pipeline. It:
/// 1. Parses the source (`.json` list export, otherwise CSV)
/// 2. Merges the options into the profile
/// 3. Converts the table through the engine
/// 4. Removes duplicate statements (unless disabled)
pub fn convert_file(
    path: &Path,
    options: &ConvertOptions,
    profile: Option<&ConversionProfile>,
) -> Result<PipelineResult, PipelineError> {
    info!(path = %path.display(), "reading source");
    let parse_result = parse_file(path, options.delimiter)?;
    convert_parsed(parse_result, options, profile, HandlerRegistry::new())
}

/// Convert source bytes to RDF.
///
/// Same as [`convert_file`] but with an explicit format instead of a path.
pub fn convert_bytes(
    bytes: &[u8],
    format: SourceFormat,
    options: &ConvertOptions,
    profile: Option<&ConversionProfile>,
) -> Result<PipelineResult, PipelineError> {
    let parse_result = match format {
        SourceFormat::Csv => parse_csv_bytes(bytes, options.delimiter)?,
        SourceFormat::Json => parse_json_bytes(bytes)?,
    };
    convert_parsed(parse_result, options, profile, HandlerRegistry::new())
}

/// Convert an already-built table, with programmatic handlers.
///
/// Useful for callers that load tables themselves and need closures as
/// custom handlers.
pub fn convert_table(
    table: Table,
    options: &ConvertOptions,
    profile: Option<&ConversionProfile>,
    handlers: HandlerRegistry,
) -> Result<PipelineResult, PipelineError> {
    let parse_result = ParseResult {
        table,
        format: SourceFormat::Json,
        encoding: "utf-8".to_string(),
        delimiter: None,
    };
    convert_parsed(parse_result, options, profile, handlers)
}

/// Merge options into a copy of the profile
pub fn effective_profile(
    profile: Option<&ConversionProfile>,
    options: &ConvertOptions,
) -> ConversionProfile {
    let mut effective = profile.cloned().unwrap_or_default();
    if let Some(mode) = options.mode {
        effective.mode = Some(mode);
    }
    if let Some(url) = &options.base_url {
        effective.table_url = Some(url.clone());
    }
    if let Some(id) = &options.table_id {
        effective.table_id = Some(id.clone());
    }
    if let Some(id) = &options.group_id {
        effective.group_id = Some(id.clone());
    }
    if let Some(policy) = options.on_error {
        effective.on_error = Some(policy);
    }
    effective
}

/// Internal: convert a parsed source
fn convert_parsed(
    parse_result: ParseResult,
    options: &ConvertOptions,
    profile: Option<&ConversionProfile>,
    handlers: HandlerRegistry,
) -> Result<PipelineResult, PipelineError> {
    let source_info = SourceInfo::from_parse(&parse_result);
    info!(
        format = %source_info.format,
        encoding = %source_info.encoding,
        delimiter = source_info.delimiter.map(format_delimiter).unwrap_or("-"),
        columns = source_info.columns.len(),
        rows = source_info.row_count,
        "source parsed"
    );

    if parse_result.table.rows.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let profile = effective_profile(profile, options);
    let mode = profile.mode.unwrap_or_default();

    let blanks = match &options.blank_prefix {
        Some(prefix) => BlankNodeGenerator::sequential(prefix.clone()),
        None => BlankNodeGenerator::new(),
    };
    let capacity = (parse_result.table.columns.len() + 3) * parse_result.table.rows.len();
    let mut engine = CsvwToRdf::new(StatementCollector::with_capacity(capacity), mode)
        .with_blank_nodes(blanks);

    let report = TableAdapter::new(&profile)
        .with_handlers(handlers)
        .convert_group(&mut engine, std::slice::from_ref(&parse_result.table))?;
    info!(%mode, summary = %report.summary(), "conversion finished");

    let mut statements = engine.into_sink();
    let duplicates_removed = if options.distinct {
        statements.distinct()
    } else {
        0
    };
    if duplicates_removed > 0 {
        info!(removed = duplicates_removed, "duplicate statements removed");
    }

    Ok(PipelineResult {
        statements,
        report,
        duplicates_removed,
        mode,
        source_info,
    })
}
