//! Blank node generation.

use crate::rdf::BlankId;

/// Process-local monotonic blank node generator.
///
/// Every engine owns one. Labels are `<prefix><n>` with `n` starting at 1,
/// so a sequential generator gives predictable labels in tests, while
/// [`BlankNodeGenerator::new`] picks a random run prefix so the output of
/// separate runs can be merged without label clashes.
#[derive(Debug, Clone)]
pub struct BlankNodeGenerator {
    prefix: String,
    counter: u64,
}

impl BlankNodeGenerator {
    /// Generator with a random per-run prefix.
    pub fn new() -> Self {
        let run = uuid::Uuid::new_v4().simple().to_string();
        Self::sequential(format!("b{}x", &run[..8]))
    }

    /// Generator producing `prefix1`, `prefix2`, ...
    pub fn sequential(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
        }
    }

    /// Mint a blank node never returned before by this generator.
    pub fn fresh(&mut self) -> BlankId {
        self.counter += 1;
        BlankId::new(format!("{}{}", self.prefix, self.counter))
    }

    /// Number of blank nodes minted so far.
    pub fn issued(&self) -> u64 {
        self.counter
    }
}

impl Default for BlankNodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
