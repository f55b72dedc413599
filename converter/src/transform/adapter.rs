//! Tabular adapter
//!
//! Walks a [`Table`] and drives the conversion engine: one `on_table`, then
//! per row one `on_row` and one `on_cell` per column. Column overrides from
//! the profile decide subjects, predicates, suppression and handlers.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::profile::{ColumnOverride, ConversionProfile, ErrorPolicy};
use super::template::{self, ROW_VARIABLE};
use crate::csvw::{normalize, CellAnnotation, CellValue, CsvwToRdf, TableAnnotation};
use crate::error::{ConversionError, ConversionResult};
use crate::handlers::HandlerRegistry;
use crate::models::{Column, Row, Table};
use crate::rdf::TermSink;

/// Result of converting one or more tables
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionReport {
    /// Tables converted
    pub tables: usize,
    /// Rows converted
    pub rows: usize,
    /// Cells that produced at least one value triple
    pub cells_converted: usize,
    /// Cells without a value (null, empty list, ignored)
    pub empty_cells: usize,
    /// Cells skipped under [`ErrorPolicy::Skip`]
    pub skipped: Vec<SkippedCell>,
}

/// A cell that failed and was skipped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCell {
    pub row: u64,
    pub column: String,
    pub reason: String,
}

impl ConversionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no cell was skipped
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Add another report's counters to this one
    pub fn merge(&mut self, other: ConversionReport) {
        self.tables += other.tables;
        self.rows += other.rows;
        self.cells_converted += other.cells_converted;
        self.empty_cells += other.empty_cells;
        self.skipped.extend(other.skipped);
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        format!(
            "Converted: {} tables, {} rows, {} cells ({} empty, {} skipped)",
            self.tables,
            self.rows,
            self.cells_converted,
            self.empty_cells,
            self.skipped.len()
        )
    }
}

/// Feeds tables into a [`CsvwToRdf`] engine.
pub struct TableAdapter<'p> {
    profile: &'p ConversionProfile,
    handlers: HandlerRegistry,
    policy: ErrorPolicy,
}

impl<'p> TableAdapter<'p> {
    pub fn new(profile: &'p ConversionProfile) -> Self {
        Self {
            profile,
            handlers: HandlerRegistry::new(),
            policy: profile.on_error.unwrap_or_default(),
        }
    }

    /// Programmatic handlers; they win over profile handlers for the same label.
    pub fn with_handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Convert a group of tables: `on_table_group` followed by every table.
    pub fn convert_group<S: TermSink>(
        &self,
        engine: &mut CsvwToRdf<S>,
        tables: &[Table],
    ) -> ConversionResult<ConversionReport> {
        engine.on_table_group(self.profile.group_id.as_deref())?;

        let mut report = ConversionReport::new();
        for table in tables {
            report.merge(self.convert_table(engine, table)?);
        }
        Ok(report)
    }

    /// Convert a single table.
    ///
    /// The profile's table URL and identifier take precedence over the ones
    /// carried by the table.
    pub fn convert_table<S: TermSink>(
        &self,
        engine: &mut CsvwToRdf<S>,
        table: &Table,
    ) -> ConversionResult<ConversionReport> {
        let url = self.profile.table_url.clone().or_else(|| table.url.clone());
        let id = self.profile.table_id.as_deref().or(table.id.as_deref());

        for key in self.profile.unknown_columns(&table.columns) {
            warn!(column = %key, "profile column matches no table column");
        }

        debug!(
            url = ?url,
            columns = table.columns.len(),
            rows = table.rows.len(),
            "converting table"
        );

        engine.on_table(id, TableAnnotation { url })?;

        let profile_handlers = self.profile.handler_registry(&table.columns);
        let overrides: Vec<Option<&ColumnOverride>> =
            table.columns.iter().map(|c| self.profile.column(c)).collect();

        let mut report = ConversionReport {
            tables: 1,
            ..ConversionReport::default()
        };

        for row in &table.rows {
            engine.on_row(row.source_number)?;
            let row_number = row.source_number.unwrap_or_else(|| engine.row_number());

            for (index, column) in table.columns.iter().enumerate() {
                let over = overrides[index];
                if over.is_some_and(|o| o.suppress_output) {
                    continue;
                }

                let annotation = self.annotation(table, row, engine.row_number(), column, over);
                let handlers = if self.handlers.contains(&column.label) {
                    &self.handlers
                } else {
                    &profile_handlers
                };

                let result = normalize(row.get(index), &column.label, handlers)
                    .map_err(ConversionError::from)
                    .and_then(|value| {
                        engine.on_cell(&annotation, &value)?;
                        Ok(value)
                    });

                match result {
                    Ok(CellValue::Empty) => report.empty_cells += 1,
                    Ok(value) if value.is_empty() => report.empty_cells += 1,
                    Ok(_) => report.cells_converted += 1,
                    Err(err) => {
                        let err = err.at_cell(row_number, column.label.clone());
                        if self.policy == ErrorPolicy::Skip && err.is_cell_local() {
                            warn!(row = row_number, column = %column.label, error = %err, "skipping cell");
                            report.skipped.push(SkippedCell {
                                row: row_number,
                                column: column.label.clone(),
                                reason: cause(&err),
                            });
                        } else {
                            return Err(err);
                        }
                    }
                }
            }
            report.rows += 1;
        }

        debug!(summary = %report.summary(), "table converted");
        Ok(report)
    }

    fn annotation(
        &self,
        table: &Table,
        row: &Row,
        row_number: u64,
        column: &Column,
        over: Option<&ColumnOverride>,
    ) -> CellAnnotation {
        let expand = |t: &String| {
            template::expand(t, |variable| {
                if variable == ROW_VARIABLE {
                    return Some(row_number.to_string());
                }
                table
                    .column_index(variable)
                    .and_then(|i| row.get(i))
                    .and_then(template_value)
            })
        };

        CellAnnotation {
            about_url: over.and_then(|o| o.about_url.as_ref()).map(expand),
            property_url: over.and_then(|o| o.property_url.as_ref()).map(expand),
            name: column.name.clone(),
        }
    }
}

/// String form of a raw value inside a URI template.
fn template_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Innermost message of a cell error.
fn cause(err: &ConversionError) -> String {
    match err {
        ConversionError::Cell { source, .. } => cause(source),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csvw::{BlankNodeGenerator, Mode};
    use crate::error::{SinkResult, ValueError};
    use crate::handlers::HandlerSpec;
    use crate::rdf::vocab::csvw;
    use crate::rdf::{Resource, StatementCollector, Term};
    use serde_json::json;

    fn engine(mode: Mode) -> CsvwToRdf<StatementCollector> {
        CsvwToRdf::new(StatementCollector::new(), mode)
            .with_blank_nodes(BlankNodeGenerator::sequential("t"))
    }

    fn people() -> Table {
        let mut table = Table::new(vec![
            Column::from_header("id"),
            Column::from_header("name"),
            Column::from_header("tags"),
        ])
        .with_url("http://ex/people");
        table.push_row(Row::new(vec![json!("1"), json!("Alice"), json!(["a", "b"])]).with_source_number(2));
        table.push_row(Row::new(vec![json!("2"), Value::Null, json!([])]).with_source_number(3));
        table
    }

    #[test]
    fn test_generic_conversion() {
        let profile = ConversionProfile::new();
        let mut engine = engine(Mode::Minimal);

        let report = TableAdapter::new(&profile)
            .convert_table(&mut engine, &people())
            .unwrap();

        assert_eq!(report.rows, 2);
        assert_eq!(report.cells_converted, 4);
        assert_eq!(report.empty_cells, 2);
        assert!(report.is_complete());

        let triples = engine.into_sink().into_triples();
        // 1 + 1 + 2 for the first row, 1 for the second
        assert_eq!(triples.len(), 5);
        assert_eq!(&*triples[1].predicate, "http://ex/people#name");
        assert_eq!(triples[1].object, Term::string("Alice"));
    }

    #[test]
    fn test_overrides() {
        let profile = ConversionProfile::new()
            .with_column(
                "name",
                ColumnOverride::default()
                    .with_about_url("http://ex/person/{id}")
                    .with_property_url("http://xmlns.com/foaf/0.1/name"),
            )
            .with_column("tags", ColumnOverride::suppressed())
            .with_column("id", ColumnOverride::default().with_handler(HandlerSpec::Number));
        let mut engine = engine(Mode::Minimal);

        TableAdapter::new(&profile)
            .convert_table(&mut engine, &people())
            .unwrap();

        let triples = engine.into_sink().into_triples();
        assert_eq!(triples.len(), 3);
        assert_eq!(triples[0].object, Term::integer(1));
        assert_eq!(triples[1].subject, Resource::iri("http://ex/person/1"));
        assert_eq!(&*triples[1].predicate, "http://xmlns.com/foaf/0.1/name");
        assert!(triples.iter().all(|t| !t.predicate.ends_with("#tags")));
    }

    #[test]
    fn test_row_variable_in_template() {
        let profile = ConversionProfile::new().with_column(
            "id",
            ColumnOverride::default().with_about_url("http://ex/row/{_row}"),
        );
        let mut engine = engine(Mode::Minimal);

        TableAdapter::new(&profile)
            .convert_table(&mut engine, &people())
            .unwrap();

        let subjects: Vec<_> = engine
            .sink()
            .iter()
            .filter(|t| t.predicate.ends_with("#id"))
            .map(|t| t.subject.clone())
            .collect();
        assert_eq!(
            subjects,
            vec![Resource::iri("http://ex/row/1"), Resource::iri("http://ex/row/2")]
        );
    }

    #[test]
    fn test_unsupported_shape_aborts_by_default() {
        let mut table = Table::new(vec![Column::from_header("a"), Column::from_header("b")])
            .with_url("http://ex/t");
        table.push_row(Row::new(vec![json!("x"), json!([{"nested": 1}])]).with_source_number(2));

        let profile = ConversionProfile::new();
        let mut engine = engine(Mode::Minimal);
        let err = TableAdapter::new(&profile)
            .convert_table(&mut engine, &table)
            .unwrap_err();

        match err {
            ConversionError::Cell { row, column, source } => {
                assert_eq!(row, 2);
                assert_eq!(column, "b");
                assert!(matches!(
                    *source,
                    ConversionError::Value(ValueError::UnsupportedShape { .. })
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
        // The earlier cell of the row stays emitted, the failing one emits nothing
        assert_eq!(engine.sink().len(), 1);
    }

    #[test]
    fn test_skip_policy_records_and_continues() {
        let mut table = Table::new(vec![Column::from_header("a")]);
        table.push_row(Row::new(vec![json!({"x": 1})]));
        table.push_row(Row::new(vec![json!("ok")]));

        // No table URL: every cell misses its predicate, except with a property URL
        let profile = ConversionProfile::new();
        let mut engine = engine(Mode::Minimal);
        let report = TableAdapter::new(&profile)
            .with_policy(ErrorPolicy::Skip)
            .convert_table(&mut engine, &table)
            .unwrap();

        assert_eq!(report.rows, 2);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].row, 1);
        assert!(report.skipped[0].reason.contains("object"));
        assert!(report.skipped[1].reason.contains("No predicate"));
        assert!(engine.sink().is_empty());
    }

    #[test]
    fn test_programmatic_handler_wins() {
        let profile = ConversionProfile::new()
            .with_column("name", ColumnOverride::default().with_handler(HandlerSpec::Ignore));
        let mut handlers = HandlerRegistry::new();
        handlers.register("name", |raw: &Value| {
            Ok(raw.as_str().map(|s| Term::string(s.to_uppercase())).into())
        });

        let mut engine = engine(Mode::Minimal);
        TableAdapter::new(&profile)
            .with_handlers(handlers)
            .convert_table(&mut engine, &people())
            .unwrap();

        assert!(engine
            .sink()
            .iter()
            .any(|t| t.object == Term::string("ALICE")));
    }

    #[test]
    fn test_group_in_standard_mode() {
        let mut profile = ConversionProfile::new();
        profile.group_id = Some("http://ex/group".to_string());
        profile.table_id = Some("http://ex/table".to_string());
        let mut engine = engine(Mode::Standard);

        let report = TableAdapter::new(&profile)
            .convert_group(&mut engine, &[people()])
            .unwrap();
        assert_eq!(report.tables, 1);

        let triples = engine.into_sink().into_triples();
        assert_eq!(triples[0].subject, Resource::iri("http://ex/group"));
        let row_urls: Vec<_> = triples
            .iter()
            .filter(|t| &*t.predicate == csvw::HAS_URL)
            .filter_map(|t| t.object.as_iri())
            .collect();
        assert_eq!(
            row_urls,
            vec!["http://ex/people", "http://ex/people#row=2", "http://ex/people#row=3"]
        );
    }

    #[test]
    fn test_report_merge() {
        let mut report = ConversionReport {
            tables: 1,
            rows: 2,
            ..ConversionReport::default()
        };
        report.merge(ConversionReport {
            tables: 1,
            rows: 3,
            cells_converted: 4,
            ..ConversionReport::default()
        });
        assert_eq!(report.tables, 2);
        assert_eq!(report.rows, 5);
        assert!(report.summary().contains("2 tables, 5 rows, 4 cells"));
    }

    struct FailingSink;

    impl TermSink for FailingSink {
        fn assert_triple(&mut self, _: &Resource, _: &str, _: &Term) -> SinkResult<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
    }

    #[test]
    fn test_sink_failure_aborts_even_when_skipping() {
        let profile = ConversionProfile::new();
        let mut engine = CsvwToRdf::new(FailingSink, Mode::Minimal)
            .with_blank_nodes(BlankNodeGenerator::sequential("t"));

        let err = TableAdapter::new(&profile)
            .with_policy(ErrorPolicy::Skip)
            .convert_table(&mut engine, &people())
            .unwrap_err();

        match err {
            ConversionError::Cell { row, column, source } => {
                assert_eq!(row, 2);
                assert_eq!(column, "id");
                assert!(matches!(*source, ConversionError::Sink(_)));
            }
            other => panic!("expected a cell error, got {other:?}"),
        }
    }
}
