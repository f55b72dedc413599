//! N-Triples serialization
//!
//! Line-based output as defined by W3C RDF 1.1 N-Triples. Literal strings
//! use the `ECHAR` escapes plus `\uXXXX` for other control characters;
//! characters not allowed in an `IRIREF` are written as `\uXXXX`.

use std::fmt;
use std::io::Write;

use super::sink::TermSink;
use super::term::{Resource, Term};
use crate::error::SinkResult;

/// Write `<iri>` with disallowed characters escaped.
pub fn write_iri<W: fmt::Write>(w: &mut W, iri: &str) -> fmt::Result {
    w.write_char('<')?;
    for ch in iri.chars() {
        match ch {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' => {
                write!(w, "\\u{:04X}", ch as u32)?;
            }
            c if c <= ' ' => write!(w, "\\u{:04X}", c as u32)?,
            c => w.write_char(c)?,
        }
    }
    w.write_char('>')
}

/// Write a quoted, escaped literal lexical form.
pub fn write_quoted<W: fmt::Write>(w: &mut W, value: &str) -> fmt::Result {
    w.write_char('"')?;
    for ch in value.chars() {
        match ch {
            '"' => w.write_str("\\\"")?,
            '\\' => w.write_str("\\\\")?,
            '\n' => w.write_str("\\n")?,
            '\r' => w.write_str("\\r")?,
            '\t' => w.write_str("\\t")?,
            c if c.is_control() => write!(w, "\\u{:04X}", c as u32)?,
            c => w.write_char(c)?,
        }
    }
    w.write_char('"')
}

/// A sink that writes every asserted triple as one N-Triples line.
///
/// Wrap files in a `BufWriter`; the writer itself does no buffering.
pub struct NTriplesWriter<W: Write> {
    writer: W,
    written: usize,
    line: String,
}

impl<W: Write> NTriplesWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            written: 0,
            line: String::with_capacity(256),
        }
    }

    /// Number of triples written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> SinkResult<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> TermSink for NTriplesWriter<W> {
    fn assert_triple(&mut self, subject: &Resource, predicate: &str, object: &Term) -> SinkResult<()> {
        use std::fmt::Write as _;

        self.line.clear();
        // Writing into a String cannot fail
        let _ = write!(self.line, "{} ", subject);
        let _ = write_iri(&mut self.line, predicate);
        let _ = writeln!(self.line, " {} .", object);

        self.writer.write_all(self.line.as_bytes())?;
        self.written += 1;
        Ok(())
    }
}
