//! Transformation module.
//!
//! This module handles tabular source to RDF conversion:
//! - Profile: column overrides, mode and error policy
//! - Template: URI templates for subjects and predicates
//! - Adapter: table walk driving the conversion engine
//! - Pipeline: main conversion pipeline

pub mod adapter;
pub mod pipeline;
pub mod profile;
pub mod template;

pub use adapter::{ConversionReport, SkippedCell, TableAdapter};
pub use pipeline::*;
pub use profile::{example_profile, ColumnOverride, ConversionProfile, ErrorPolicy};
