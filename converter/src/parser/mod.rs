//! Tabular source readers with encoding and delimiter auto-detection.
//!
//! Two source formats become a [`Table`]:
//!
//! - CSV files: header row required, values kept as strings, empty fields as `null`
//! - JSON list exports: `{"url", "id", "columns": [...], "rows": [...]}` or a
//!   bare array of row objects
//!
//! No RDF-specific logic here.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{SourceError, SourceResult};
use crate::models::{Column, Row, Table};

/// Source file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Json,
}

impl SourceFormat {
    /// `.json` files are list exports, everything else is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SourceFormat::Json,
            _ => SourceFormat::Csv,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Csv => f.write_str("csv"),
            SourceFormat::Json => f.write_str("json"),
        }
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed table
    pub table: Table,
    /// Source format
    pub format: SourceFormat,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter (CSV only)
    pub delimiter: Option<char>,
}

impl ParseResult {
    /// Column labels in order
    pub fn headers(&self) -> Vec<String> {
        self.table.columns.iter().map(|c| c.label.clone()).collect()
    }
}

// =============================================================================
// Detection
// =============================================================================

/// Detect the encoding of raw bytes using chardet
///
/// Valid UTF-8 is always reported as such; chardet is only consulted for
/// other content.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> SourceResult<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(e) => {
                warn!(error = %e, "content is not valid UTF-8, replacing invalid sequences");
                String::from_utf8_lossy(bytes).into_owned()
            }
        },
        // WHATWG maps the Latin-1 labels onto windows-1252
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => {
                let (text, _, had_errors) = enc.decode(bytes);
                if had_errors {
                    return Err(SourceError::Encoding(format!(
                        "content is not valid {}",
                        enc.name()
                    )));
                }
                text.into_owned()
            }
            None => {
                warn!(encoding = other, "unknown encoding, falling back to lossy UTF-8");
                String::from_utf8_lossy(bytes).into_owned()
            }
        },
    };

    Ok(decoded)
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ';';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

// =============================================================================
// CSV
// =============================================================================

/// Parse CSV text with an explicit delimiter.
///
/// Each data record becomes a [`Row`] whose source number is the record's
/// line in the file. Extra fields are ignored, missing ones are absent.
///
/// # Example
/// ```
/// use csvw2rdf::parser::parse_csv_str;
///
/// let table = parse_csv_str("name;age\nAlice;30\nBob;", ';').unwrap();
///
/// assert_eq!(table.rows.len(), 2);
/// assert_eq!(table.rows[0].values[1], "30");
/// assert!(table.rows[1].values[1].is_null());
/// assert_eq!(table.rows[1].source_number, Some(3));
/// ```
pub fn parse_csv_str(content: &str, delimiter: char) -> SourceResult<Table> {
    if content.trim().is_empty() {
        return Err(SourceError::EmptyFile);
    }
    if !delimiter.is_ascii() {
        return Err(SourceError::Parse {
            line: 1,
            message: format!("delimiter '{}' is not an ASCII character", delimiter),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(SourceError::NoHeaders);
    }

    let columns: Vec<Column> = headers.iter().map(Column::from_header).collect();
    let mut table = Table::new(columns);

    for result in reader.records() {
        let record = result?;

        if record.iter().all(str::is_empty) {
            continue;
        }

        let values = (0..headers.len())
            .map(|i| match record.get(i) {
                Some(field) if !field.is_empty() => Value::String(field.to_string()),
                _ => Value::Null,
            })
            .collect();

        let mut row = Row::new(values);
        if let Some(position) = record.position() {
            row = row.with_source_number(position.line());
        }
        table.push_row(row);
    }

    Ok(table)
}

/// Parse CSV bytes, detecting encoding and (unless given) the delimiter.
pub fn parse_csv_bytes(bytes: &[u8], delimiter: Option<char>) -> SourceResult<ParseResult> {
    if bytes.is_empty() {
        return Err(SourceError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    debug!(%encoding, delimiter = %format_delimiter(delimiter), "decoded CSV source");

    let table = parse_csv_str(&content, delimiter)?;

    Ok(ParseResult {
        table,
        format: SourceFormat::Csv,
        encoding,
        delimiter: Some(delimiter),
    })
}

// =============================================================================
// JSON list export
// =============================================================================

#[derive(Debug, Deserialize)]
struct ListDocument {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    id: Option<String>,
    columns: Vec<ListColumn>,
    #[serde(default)]
    rows: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct ListColumn {
    name: String,
    #[serde(default)]
    label: Option<String>,
}

/// Parse a JSON list export.
///
/// Accepts a document with explicit columns, or a bare array of row objects
/// whose columns are the keys in first-seen order.
pub fn parse_json_str(content: &str) -> SourceResult<Table> {
    if content.trim().is_empty() {
        return Err(SourceError::EmptyFile);
    }

    let document: Value = serde_json::from_str(content)?;
    match document {
        Value::Array(items) => table_from_rows(items),
        Value::Object(ref object) if object.contains_key("columns") => {
            let list: ListDocument = serde_json::from_value(document)?;
            Ok(table_from_document(list))
        }
        Value::Object(_) => Err(SourceError::InvalidTable(
            "object without a 'columns' array".to_string(),
        )),
        other => Err(SourceError::InvalidTable(format!(
            "expected an object or an array, got {}",
            json_kind(&other)
        ))),
    }
}

fn table_from_document(list: ListDocument) -> Table {
    let columns: Vec<Column> = list
        .columns
        .into_iter()
        .map(|c| {
            let label = c.label.unwrap_or_else(|| c.name.clone());
            Column::new(c.name, label)
        })
        .collect();

    let rows = list
        .rows
        .into_iter()
        .map(|mut object| {
            Row::new(
                columns
                    .iter()
                    .map(|c| object.remove(&c.name).unwrap_or(Value::Null))
                    .collect(),
            )
        })
        .collect();

    Table {
        url: list.url,
        id: list.id,
        columns,
        rows,
    }
}

fn table_from_rows(items: Vec<Value>) -> SourceResult<Table> {
    let mut objects = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(object) => objects.push(object),
            other => {
                return Err(SourceError::InvalidTable(format!(
                    "row {} is {}, expected an object",
                    index + 1,
                    json_kind(&other)
                )))
            }
        }
    }

    let mut keys: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
    }

    let mut table = Table::new(keys.iter().map(|k| Column::from_header(k)).collect());
    for mut object in objects {
        let values = keys
            .iter()
            .map(|k| object.remove(k).unwrap_or(Value::Null))
            .collect();
        table.push_row(Row::new(values));
    }
    Ok(table)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse JSON bytes (UTF-8).
pub fn parse_json_bytes(bytes: &[u8]) -> SourceResult<ParseResult> {
    let content = decode_content(bytes, "utf-8")?;
    let table = parse_json_str(&content)?;
    Ok(ParseResult {
        table,
        format: SourceFormat::Json,
        encoding: "utf-8".to_string(),
        delimiter: None,
    })
}

// =============================================================================
// Files
// =============================================================================

/// Parse a source file, picking the format from its extension.
///
/// `delimiter` only applies to CSV and overrides detection.
///
/// # Example
/// ```ignore
/// let result = parse_file("/path/to/file.csv", None)?;
/// println!("Encoding: {}, Delimiter: {:?}", result.encoding, result.delimiter);
/// println!("Rows: {}", result.table.rows.len());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> SourceResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let format = SourceFormat::from_path(path);
    debug!(path = %path.display(), %format, bytes = bytes.len(), "reading source");

    match format {
        SourceFormat::Json => parse_json_bytes(&bytes),
        SourceFormat::Csv => parse_csv_bytes(&bytes, delimiter),
    }
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "\\t",
        '|' => "|",
        _ => "?",
    }
}
