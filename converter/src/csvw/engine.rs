//! CSVW to RDF conversion engine
//!
//! Implements the table group / table / row / cell walk of the
//! [csv2rdf](https://www.w3.org/TR/2015/REC-csv2rdf-20151217/) algorithm,
//! restricted to the core annotations:
//!
//! ```text
//! Start --on_table_group--> TableGroupReady --on_table--> TableReady
//! TableReady --on_row--> RowReady --on_cell(*)--> RowReady
//! RowReady --on_row--> RowReady
//! RowReady --on_table--> TableReady
//! ```
//!
//! The engine is a single forward pass. It keeps a cursor (current group,
//! table, row, default subject, row counter) and writes every statement
//! straight into its [`TermSink`]; nothing is buffered.
//!
//! Notes, non-core annotations, row titles, value URLs and ordered lists
//! (csv2rdf steps 3, 4.5, 4.6.6, 4.6.7, 4.6.8.4, 4.6.8.5) are not supported.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::annotation::{CellAnnotation, TableAnnotation};
use super::blank::BlankNodeGenerator;
use super::value::CellValue;
use crate::error::{ConversionError, ConversionResult};
use crate::rdf::vocab::csvw;
use crate::rdf::{Resource, Term, TermSink};

/// Output verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Value triples only.
    #[default]
    Minimal,
    /// Value triples plus table group / table / row structure.
    Standard,
}

impl Mode {
    pub fn is_standard(self) -> bool {
        self == Mode::Standard
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Minimal => f.write_str("minimal"),
            Mode::Standard => f.write_str("standard"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minimal" => Ok(Mode::Minimal),
            "standard" => Ok(Mode::Standard),
            other => Err(format!(
                "unknown mode '{}', expected 'minimal' or 'standard'",
                other
            )),
        }
    }
}

/// The conversion state machine.
///
/// One instance serves one conversion run; it is not meant to be shared
/// between threads or reused for an unrelated table group.
///
/// # Example
///
/// ```
/// use csvw2rdf::{CellAnnotation, CellValue, CsvwToRdf, StatementCollector, TableAnnotation, Term};
///
/// let mut engine = CsvwToRdf::minimal_mode(StatementCollector::new());
/// engine.on_table(None, TableAnnotation::new("http://ex/t")).unwrap();
/// engine.on_row(None).unwrap();
/// engine
///     .on_cell(&CellAnnotation::new("age"), &CellValue::Single(Term::integer(42)))
///     .unwrap();
///
/// let triples = engine.into_sink().into_triples();
/// assert_eq!(triples.len(), 1);
/// assert_eq!(&*triples[0].predicate, "http://ex/t#age");
/// ```
#[derive(Debug)]
pub struct CsvwToRdf<S: TermSink> {
    sink: S,
    mode: Mode,
    blanks: BlankNodeGenerator,
    table_group: Option<Resource>,
    table: Option<Resource>,
    /// `None` until the first `on_table`.
    table_annotation: Option<TableAnnotation>,
    row_number: u64,
    row: Option<Resource>,
    /// `None` until the first `on_row` of the current table.
    default_subject: Option<Resource>,
}

impl<S: TermSink> CsvwToRdf<S> {
    pub fn new(sink: S, mode: Mode) -> Self {
        Self {
            sink,
            mode,
            blanks: BlankNodeGenerator::new(),
            table_group: None,
            table: None,
            table_annotation: None,
            row_number: 0,
            row: None,
            default_subject: None,
        }
    }

    pub fn standard_mode(sink: S) -> Self {
        Self::new(sink, Mode::Standard)
    }

    pub fn minimal_mode(sink: S) -> Self {
        Self::new(sink, Mode::Minimal)
    }

    /// Replace the blank node generator, e.g. with a sequential one in tests.
    pub fn with_blank_nodes(mut self, blanks: BlankNodeGenerator) -> Self {
        self.blanks = blanks;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of the current row within the current table (1-based, 0 before the first row).
    pub fn row_number(&self) -> u64 {
        self.row_number
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Start the group of tables.
    ///
    /// Standard mode: node G (IRI or fresh blank node) typed `csvw:TableGroup`.
    /// Minimal mode: no-op.
    pub fn on_table_group(&mut self, identifier: Option<&str>) -> ConversionResult<()> {
        if self.mode.is_standard() {
            let group = self.node(identifier);
            self.sink.assert_type(&group, csvw::TABLE_GROUP)?;
            self.table_group = Some(group);
        }
        Ok(())
    }

    /// Start a table; resets the row counter.
    pub fn on_table(
        &mut self,
        identifier: Option<&str>,
        annotation: TableAnnotation,
    ) -> ConversionResult<()> {
        if self.mode.is_standard() {
            if self.table_group.is_none() {
                debug!("no table group started, using an implicit one");
                self.on_table_group(None)?;
            }

            let table = self.node(identifier);
            if let Some(group) = &self.table_group {
                self.sink
                    .assert_triple(group, csvw::HAS_TABLE, &Term::from(&table))?;
            }
            self.sink.assert_type(&table, csvw::TABLE)?;
            if let Some(url) = &annotation.url {
                self.sink.assert_link(&table, csvw::HAS_URL, url)?;
            }
            self.table = Some(table);
        }

        debug!(url = ?annotation.url, mode = %self.mode, "table started");
        self.row_number = 0;
        self.row = None;
        self.default_subject = None;
        self.table_annotation = Some(annotation);
        Ok(())
    }

    /// Start the next row of the current table.
    ///
    /// `source_row_number` is the row's position in the source file; when it
    /// and the table URL are known, standard mode links the row to
    /// `<table-url>#row=<n>` (RFC 7111).
    pub fn on_row(&mut self, source_row_number: Option<u64>) -> ConversionResult<()> {
        let table_url = self
            .table_annotation
            .as_ref()
            .ok_or(ConversionError::NoActiveTable)?
            .url
            .clone();

        self.row_number += 1;

        if self.mode.is_standard() {
            let row = Resource::from(self.blanks.fresh());
            if let Some(table) = &self.table {
                self.sink.assert_triple(table, csvw::HAS_ROW, &Term::from(&row))?;
            }
            self.sink.assert_type(&row, csvw::ROW)?;
            self.sink.assert_triple(
                &row,
                csvw::HAS_ROW_NUMBER,
                &Term::integer(self.row_number as i64),
            )?;
            if let (Some(source), Some(url)) = (source_row_number, table_url) {
                let fragment = format!("{}#row={}", url, source);
                self.sink.assert_link(&row, csvw::HAS_URL, &fragment)?;
            }
            self.row = Some(row);
        }

        self.default_subject = Some(Resource::from(self.blanks.fresh()));
        Ok(())
    }

    /// Emit the triples of one cell of the current row.
    ///
    /// Nothing is emitted when the predicate cannot be resolved.
    pub fn on_cell(
        &mut self,
        annotation: &CellAnnotation,
        value: &CellValue,
    ) -> ConversionResult<()> {
        let default_subject = self
            .default_subject
            .as_ref()
            .ok_or(ConversionError::NoActiveRow)?;

        let subject = match &annotation.about_url {
            Some(about_url) => Resource::iri(about_url),
            None => default_subject.clone(),
        };

        let table_annotation = self
            .table_annotation
            .as_ref()
            .ok_or(ConversionError::NoActiveTable)?;
        let predicate = resolve_predicate(annotation, table_annotation)?;

        if self.mode.is_standard() {
            if let Some(row) = &self.row {
                self.sink
                    .assert_triple(row, csvw::DESCRIBES, &Term::from(&subject))?;
            }
        }

        for term in value.terms() {
            self.sink.assert_triple(&subject, &predicate, term)?;
        }
        Ok(())
    }

    fn node(&mut self, identifier: Option<&str>) -> Resource {
        match identifier {
            Some(iri) => Resource::iri(iri),
            None => Resource::from(self.blanks.fresh()),
        }
    }
}

/// `property_url` verbatim, else `<table-url>#<name>`.
fn resolve_predicate<'a>(
    annotation: &'a CellAnnotation,
    table: &TableAnnotation,
) -> ConversionResult<Cow<'a, str>> {
    if let Some(property_url) = &annotation.property_url {
        return Ok(Cow::Borrowed(property_url));
    }
    match &table.url {
        Some(url) => Ok(Cow::Owned(format!("{}#{}", url, annotation.name))),
        None => Err(ConversionError::MissingPredicateSource {
            column: annotation.name.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::vocab::{rdf, xsd};
    use crate::error::SinkResult;
    use crate::rdf::{StatementCollector, Triple};
    use std::collections::{HashMap, HashSet};

    const URL: &str = "http://ex/t";

    fn engine(mode: Mode) -> CsvwToRdf<StatementCollector> {
        CsvwToRdf::new(StatementCollector::new(), mode)
            .with_blank_nodes(BlankNodeGenerator::sequential("b"))
    }

    fn with_predicate<'a>(triples: &'a [Triple], predicate: &str) -> Vec<&'a Triple> {
        triples
            .iter()
            .filter(|t| &*t.predicate == predicate)
            .collect()
    }

    /// Two tables, rows of two cells each, through the whole state machine.
    fn run_sample(mode: Mode) -> Vec<Triple> {
        let mut engine = engine(mode);
        engine.on_table_group(Some("http://ex/group")).unwrap();
        for (url, rows) in [(URL, 3u64), ("http://ex/u", 2)] {
            engine.on_table(None, TableAnnotation::new(url)).unwrap();
            for n in 1..=rows {
                engine.on_row(Some(n + 1)).unwrap();
                engine
                    .on_cell(&CellAnnotation::new("id"), &CellValue::Single(Term::integer(n as i64)))
                    .unwrap();
                engine
                    .on_cell(
                        &CellAnnotation::new("tags"),
                        &CellValue::List(vec![Term::string("a"), Term::string("b")]),
                    )
                    .unwrap();
            }
        }
        engine.into_sink().into_triples()
    }

    #[test]
    fn test_single_integer_cell() {
        let mut engine = engine(Mode::Minimal);
        engine.on_table(None, TableAnnotation::new(URL)).unwrap();
        engine.on_row(None).unwrap();
        engine
            .on_cell(&CellAnnotation::new("age"), &CellValue::Single(Term::integer(42)))
            .unwrap();

        let triples = engine.into_sink().into_triples();
        assert_eq!(triples.len(), 1);
        assert_eq!(&*triples[0].predicate, "http://ex/t#age");
        assert_eq!(triples[0].object, Term::integer(42));
        assert_eq!(triples[0].object.as_literal().unwrap().datatype(), xsd::INTEGER);
        assert!(triples[0].subject.is_blank());
    }

    #[test]
    fn test_list_cell_emits_one_triple_per_element() {
        let mut engine = engine(Mode::Minimal);
        engine.on_table(None, TableAnnotation::new(URL)).unwrap();
        engine.on_row(None).unwrap();
        engine
            .on_cell(
                &CellAnnotation::new("tags"),
                &CellValue::List(vec![Term::string("a"), Term::string("b")]),
            )
            .unwrap();

        let triples = engine.into_sink().into_triples();
        assert_eq!(triples.len(), 2);
        assert_eq!(triples[0].subject, triples[1].subject);
        assert_eq!(triples[0].predicate, triples[1].predicate);
        let objects: HashSet<_> = triples.iter().map(|t| t.object.clone()).collect();
        assert_eq!(
            objects,
            HashSet::from([Term::string("a"), Term::string("b")])
        );
    }

    #[test]
    fn test_empty_and_empty_list_emit_nothing() {
        for mode in [Mode::Minimal, Mode::Standard] {
            let mut engine = engine(mode);
            engine.on_table(None, TableAnnotation::new(URL)).unwrap();
            engine.on_row(None).unwrap();
            let before = engine.sink().len();

            engine
                .on_cell(&CellAnnotation::new("x"), &CellValue::Empty)
                .unwrap();
            engine
                .on_cell(&CellAnnotation::new("y"), &CellValue::List(vec![]))
                .unwrap();

            let value_triples = engine
                .sink()
                .iter()
                .skip(before)
                .filter(|t| &*t.predicate != csvw::DESCRIBES)
                .count();
            assert_eq!(value_triples, 0);
        }
    }

    #[test]
    fn test_property_url_overrides_synthesis() {
        let mut engine = engine(Mode::Minimal);
        engine.on_table(None, TableAnnotation::empty()).unwrap();
        engine.on_row(None).unwrap();
        engine
            .on_cell(
                &CellAnnotation::new("name").with_property_url("http://xmlns.com/foaf/0.1/name"),
                &CellValue::Single(Term::string("Alice")),
            )
            .unwrap();

        let triples = engine.into_sink().into_triples();
        assert_eq!(&*triples[0].predicate, "http://xmlns.com/foaf/0.1/name");
    }

    #[test]
    fn test_missing_predicate_source_emits_nothing() {
        let mut engine = engine(Mode::Standard);
        engine.on_table(None, TableAnnotation::empty()).unwrap();
        engine.on_row(None).unwrap();
        let before = engine.sink().len();

        let err = engine
            .on_cell(&CellAnnotation::new("age"), &CellValue::Single(Term::integer(1)))
            .unwrap_err();

        assert!(matches!(
            err,
            ConversionError::MissingPredicateSource { ref column } if column == "age"
        ));
        assert_eq!(engine.sink().len(), before);
    }

    #[test]
    fn test_subjects_within_and_across_rows() {
        let mut engine = engine(Mode::Minimal);
        engine.on_table(None, TableAnnotation::new(URL)).unwrap();

        let mut default_subjects = Vec::new();
        for _ in 0..2 {
            engine.on_row(None).unwrap();
            let start = engine.sink().len();
            for name in ["a", "b"] {
                engine
                    .on_cell(&CellAnnotation::new(name), &CellValue::Single(Term::integer(1)))
                    .unwrap();
            }
            for name in ["c", "d"] {
                engine
                    .on_cell(
                        &CellAnnotation::new(name).with_about_url("http://ex/thing/X"),
                        &CellValue::Single(Term::integer(1)),
                    )
                    .unwrap();
            }

            let row: Vec<_> = engine.sink().iter().skip(start).collect();
            assert_eq!(row[0].subject, row[1].subject);
            assert!(row[0].subject.is_blank());
            assert_eq!(row[2].subject, Resource::iri("http://ex/thing/X"));
            assert_eq!(row[2].subject, row[3].subject);
            default_subjects.push(row[0].subject.clone());
        }

        assert_ne!(default_subjects[0], default_subjects[1]);
    }

    #[test]
    fn test_standard_mode_structure() {
        let triples = run_sample(Mode::Standard);

        let group = Resource::iri("http://ex/group");
        let types: Vec<_> = with_predicate(&triples, rdf::TYPE);
        assert!(types
            .iter()
            .any(|t| t.subject == group && t.object.as_iri() == Some(csvw::TABLE_GROUP)));
        assert_eq!(
            types
                .iter()
                .filter(|t| t.object.as_iri() == Some(csvw::TABLE))
                .count(),
            2
        );
        assert_eq!(
            types
                .iter()
                .filter(|t| t.object.as_iri() == Some(csvw::ROW))
                .count(),
            5
        );

        let has_table = with_predicate(&triples, csvw::HAS_TABLE);
        assert_eq!(has_table.len(), 2);
        assert!(has_table.iter().all(|t| t.subject == group));

        let urls: Vec<_> = with_predicate(&triples, csvw::HAS_URL)
            .iter()
            .filter_map(|t| t.object.as_iri().map(str::to_string))
            .collect();
        assert!(urls.contains(&URL.to_string()));
        assert!(urls.contains(&"http://ex/t#row=2".to_string()));
        assert!(urls.contains(&"http://ex/u#row=3".to_string()));
    }

    #[test]
    fn test_row_numbers_restart_per_table() {
        let triples = run_sample(Mode::Standard);

        // Map row node -> table node, then collect row numbers per table
        let row_table: HashMap<Term, Resource> = with_predicate(&triples, csvw::HAS_ROW)
            .iter()
            .map(|t| (t.object.clone(), t.subject.clone()))
            .collect();

        let mut per_table: HashMap<Resource, Vec<i64>> = HashMap::new();
        for t in with_predicate(&triples, csvw::HAS_ROW_NUMBER) {
            let table = row_table[&Term::from(&t.subject)].clone();
            per_table
                .entry(table)
                .or_default()
                .push(t.object.as_literal().unwrap().as_integer().unwrap());
        }

        let mut sequences: Vec<_> = per_table.into_values().collect();
        sequences.sort_by_key(|s| s.len());
        assert_eq!(sequences, vec![vec![1, 2], vec![1, 2, 3]]);
    }

    #[test]
    fn test_describes_links_row_to_subject() {
        let triples = run_sample(Mode::Standard);
        let describes = with_predicate(&triples, csvw::DESCRIBES);
        // One per cell
        assert_eq!(describes.len(), 10);

        let value_subjects: HashSet<Term> = with_predicate(&triples, "http://ex/t#id")
            .iter()
            .map(|t| Term::from(&t.subject))
            .collect();
        for subject in value_subjects {
            assert!(describes.iter().any(|t| t.object == subject));
        }
    }

    #[test]
    fn test_minimal_mode_has_no_structure() {
        let triples = run_sample(Mode::Minimal);
        for predicate in [
            rdf::TYPE,
            csvw::HAS_TABLE,
            csvw::HAS_ROW,
            csvw::HAS_ROW_NUMBER,
            csvw::HAS_URL,
            csvw::DESCRIBES,
        ] {
            assert!(with_predicate(&triples, predicate).is_empty(), "{predicate}");
        }
        // (1 id + 2 tags) per row, 5 rows
        assert_eq!(triples.len(), 15);
    }

    #[test]
    fn test_standard_value_triples_superset_of_minimal() {
        let minimal = run_sample(Mode::Minimal);
        let standard = run_sample(Mode::Standard);

        let shape = |t: &Triple| (t.predicate.to_string(), t.object.clone());
        let standard_values: Vec<_> = standard
            .iter()
            .filter(|t| !t.predicate.starts_with(csvw::NS) && &*t.predicate != rdf::TYPE)
            .map(shape)
            .collect();
        let minimal_values: Vec<_> = minimal.iter().map(shape).collect();
        assert_eq!(standard_values, minimal_values);
    }

    #[test]
    fn test_reruns_are_isomorphic() {
        let first = run_sample(Mode::Standard);
        let second = run_sample(Mode::Standard);

        let ground = |triples: &[Triple]| -> HashSet<Triple> {
            triples
                .iter()
                .filter(|t| !t.subject.is_blank() && t.object.as_blank().is_none())
                .cloned()
                .collect()
        };
        assert_eq!(ground(&first), ground(&second));
        assert_eq!(first.len(), second.len());

        // Emission order is deterministic, so positional relabelling must map
        // blank nodes one-to-one.
        let mut mapping: HashMap<String, String> = HashMap::new();
        for (a, b) in first.iter().zip(second.iter()) {
            if let (Some(x), Some(y)) = (a.subject.as_blank(), b.subject.as_blank()) {
                let existing = mapping
                    .entry(x.as_str().to_string())
                    .or_insert_with(|| y.as_str().to_string());
                assert_eq!(existing, y.as_str());
            }
        }
    }

    #[test]
    fn test_implicit_table_group_in_standard_mode() {
        let mut engine = engine(Mode::Standard);
        engine
            .on_table(Some("http://ex/table"), TableAnnotation::empty())
            .unwrap();

        let triples = engine.into_sink().into_triples();
        assert_eq!(
            triples[0].object.as_iri(),
            Some(csvw::TABLE_GROUP),
            "implicit group is typed first"
        );
        let has_table = with_predicate(&triples, csvw::HAS_TABLE);
        assert_eq!(has_table[0].object, Term::iri("http://ex/table"));
        // No url triple without a table URL
        assert!(with_predicate(&triples, csvw::HAS_URL).is_empty());
    }

    #[test]
    fn test_row_source_url_needs_table_url() {
        let mut engine = engine(Mode::Standard);
        engine.on_table_group(None).unwrap();
        engine.on_table(None, TableAnnotation::empty()).unwrap();
        engine.on_row(Some(7)).unwrap();

        let triples = engine.into_sink().into_triples();
        assert!(with_predicate(&triples, csvw::HAS_URL).is_empty());
        assert_eq!(with_predicate(&triples, csvw::HAS_ROW_NUMBER).len(), 1);
    }

    #[test]
    fn test_minimal_table_group_is_noop() {
        let mut engine = engine(Mode::Minimal);
        engine.on_table_group(Some("http://ex/group")).unwrap();
        engine.on_table(None, TableAnnotation::new(URL)).unwrap();
        assert!(engine.sink().is_empty());
    }

    #[test]
    fn test_calls_out_of_order() {
        let mut engine = engine(Mode::Minimal);
        assert!(matches!(
            engine.on_row(None),
            Err(ConversionError::NoActiveTable)
        ));
        assert!(matches!(
            engine.on_cell(&CellAnnotation::new("a"), &CellValue::Empty),
            Err(ConversionError::NoActiveRow)
        ));

        engine.on_table(None, TableAnnotation::new(URL)).unwrap();
        assert!(matches!(
            engine.on_cell(&CellAnnotation::new("a"), &CellValue::Empty),
            Err(ConversionError::NoActiveRow)
        ));
    }

    #[test]
    fn test_sequential_blank_labels() {
        let mut engine = engine(Mode::Standard);
        engine.on_table_group(None).unwrap();
        engine.on_table(None, TableAnnotation::new(URL)).unwrap();
        engine.on_row(None).unwrap();

        // group, table, row, default subject
        let triples = engine.into_sink().into_triples();
        assert_eq!(triples[0].subject.as_blank().unwrap().as_str(), "b1");
        let row = with_predicate(&triples, csvw::HAS_ROW)[0];
        assert_eq!(row.subject.as_blank().unwrap().as_str(), "b2");
        assert_eq!(row.object.as_blank().unwrap().as_str(), "b3");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("standard".parse::<Mode>().unwrap(), Mode::Standard);
        assert_eq!(" Minimal ".parse::<Mode>().unwrap(), Mode::Minimal);
        assert!("full".parse::<Mode>().is_err());
        assert_eq!(Mode::Standard.to_string(), "standard");
        assert_eq!(Mode::default(), Mode::Minimal);
    }

    struct FailingSink;

    impl TermSink for FailingSink {
        fn assert_triple(&mut self, _: &Resource, _: &str, _: &Term) -> SinkResult<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
    }

    #[test]
    fn test_sink_failure_is_surfaced() {
        let mut engine = CsvwToRdf::new(FailingSink, Mode::Minimal)
            .with_blank_nodes(BlankNodeGenerator::sequential("b"));
        engine.on_table(None, TableAnnotation::new(URL)).unwrap();
        engine.on_row(Some(2)).unwrap();

        let err = engine
            .on_cell(&CellAnnotation::new("age"), &CellValue::Single(Term::integer(42)))
            .unwrap_err();
        assert!(matches!(err, ConversionError::Sink(_)));
        assert!(err.to_string().contains("disk full"));
        assert!(!err.is_cell_local());
    }
}
