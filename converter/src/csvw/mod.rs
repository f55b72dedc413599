//! CSV on the Web to RDF mapping.
//!
//! - `annotation`: table and cell annotations
//! - `value`: [`CellValue`] and raw value normalization
//! - `blank`: blank node generation
//! - `engine`: the [`CsvwToRdf`] state machine

pub mod annotation;
pub mod blank;
pub mod engine;
pub mod value;

pub use annotation::{CellAnnotation, TableAnnotation};
pub use blank::BlankNodeGenerator;
pub use engine::{CsvwToRdf, Mode};
pub use value::{normalize, normalize_generic, CellValue};
