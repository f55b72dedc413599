//! Per-column custom handlers
//!
//! A handler turns a raw value straight into a [`CellValue`], bypassing the
//! generic normalization rules. Handlers are looked up by column display
//! label. Anything implementing [`CellHandler`] can be registered: plain
//! closures, or the declarative [`HandlerSpec`] read from a profile.

mod declarative;

pub use declarative::{handlers_description, HandlerSpec};

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::csvw::CellValue;
use crate::error::ValueResult;

/// Converts one raw value of a column into a cell value.
pub trait CellHandler: Send + Sync {
    fn handle(&self, raw: &Value) -> ValueResult<CellValue>;
}

impl<F> CellHandler for F
where
    F: Fn(&Value) -> ValueResult<CellValue> + Send + Sync,
{
    fn handle(&self, raw: &Value) -> ValueResult<CellValue> {
        self(raw)
    }
}

impl CellHandler for HandlerSpec {
    fn handle(&self, raw: &Value) -> ValueResult<CellValue> {
        self.apply(raw)
    }
}

/// Column label -> handler.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn CellHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure for a column label, replacing any previous handler.
    pub fn register<F>(&mut self, label: impl Into<String>, handler: F)
    where
        F: Fn(&Value) -> ValueResult<CellValue> + Send + Sync + 'static,
    {
        self.handlers.insert(label.into(), Box::new(handler));
    }

    /// Register any strategy object.
    pub fn register_handler(&mut self, label: impl Into<String>, handler: Box<dyn CellHandler>) {
        self.handlers.insert(label.into(), handler);
    }

    /// Register a declarative handler.
    pub fn register_spec(&mut self, label: impl Into<String>, spec: HandlerSpec) {
        self.handlers.insert(label.into(), Box::new(spec));
    }

    pub fn get(&self, label: &str) -> Option<&dyn CellHandler> {
        self.handlers.get(label).map(|h| h.as_ref())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.handlers.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut labels: Vec<&String> = self.handlers.keys().collect();
        labels.sort();
        f.debug_struct("HandlerRegistry")
            .field("labels", &labels)
            .finish()
    }
}
