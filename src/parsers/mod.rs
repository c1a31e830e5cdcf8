//! Parsers: decode an opened source into a lazy sequence of raw rows.
//!
//! Parsers do not number rows or interpret headers; the stream does that above them. A parser
//! reports a row it cannot decode as an `Err(StreamError::Source)` item and keeps going where the
//! format allows it, so `force_parse` can turn the failure into an empty row. Failures that end
//! the source (I/O errors, a malformed document) are returned from [`Parser::open`] or yielded as
//! the last item.
//!
//! Dropping the returned iterator closes the underlying resource.

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod inline;
pub mod json;
pub mod parquet;

use std::io::BufRead;

use crate::error::{StreamError, StreamResult};
use crate::loaders::LoadMode;
use crate::stream::OptionMap;
use crate::types::{InlineRow, Value};

pub use self::csv::CsvParser;
#[cfg(feature = "excel")]
pub use self::excel::ExcelParser;
pub use self::inline::InlineParser;
pub use self::json::{JsonParser, NdjsonParser};
pub use self::parquet::ParquetParser;

/// A decoded row before numbering.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRow {
    /// Positional values.
    Values(Vec<Value>),
    /// Key/value pairs in source order (JSON objects, inline maps, Parquet records).
    Keyed(Vec<(String, Value)>),
}

/// Lazy raw-row sequence produced by a parser.
pub type RawRows = Box<dyn Iterator<Item = StreamResult<RawRow>>>;

/// What a parser receives from the stream.
pub enum ParserInput {
    /// Bytes from a loader, already prepared for the parser's [`LoadMode`].
    Reader(Box<dyn BufRead>),
    /// Rows from an in-memory source, generator, or iterator.
    Rows(Box<dyn Iterator<Item = InlineRow>>),
}

/// Row decoding for one format.
///
/// There is no explicit close: the [`RawRows`] returned by [`Parser::open`] owns the input, and
/// dropping it releases the underlying file, response or handle. The stream drops it on `close`,
/// on `reset`, and when the stream itself is dropped.
pub trait Parser {
    /// Option names this parser accepts.
    fn options(&self) -> &[&'static str] {
        &[]
    }

    /// Whether the loader should decode text or pass raw bytes.
    fn mode(&self) -> LoadMode {
        LoadMode::Text
    }

    /// Start decoding `input`.
    fn open(&self, input: ParserInput, options: &OptionMap) -> StreamResult<RawRows>;
}

/// Convert an in-memory row into a raw row; `Invalid` becomes a row-level source error.
pub(crate) fn raw_from_inline(row: InlineRow, position: usize) -> StreamResult<RawRow> {
    match row {
        InlineRow::Values(values) => Ok(RawRow::Values(values)),
        InlineRow::Keyed(pairs) => Ok(RawRow::Keyed(pairs)),
        InlineRow::Invalid(v) => Err(StreamError::source_error(format!(
            "row {position} must be a list or a map of values, got '{v}'"
        ))),
    }
}

/// Reject a row-based input for a parser that needs bytes.
pub(crate) fn expect_reader(input: ParserInput, format: &str) -> StreamResult<Box<dyn BufRead>> {
    match input {
        ParserInput::Reader(r) => Ok(r),
        ParserInput::Rows(_) => Err(StreamError::format_error(format!(
            "format '{format}' cannot read an in-memory row source"
        ))),
    }
}

/// Read a single-character option (`delimiter`, `quote_char`, ...).
pub(crate) fn char_option(options: &OptionMap, name: &str) -> StreamResult<Option<u8>> {
    let Some(v) = options.get(name) else {
        return Ok(None);
    };
    match v.as_str() {
        Some(s) if s.len() == 1 && s.is_ascii() => Ok(Some(s.as_bytes()[0])),
        _ => Err(StreamError::options_error(format!(
            "option '{name}' must be a single ASCII character, got {v}"
        ))),
    }
}

/// Read a boolean option.
pub(crate) fn bool_option(options: &OptionMap, name: &str) -> StreamResult<Option<bool>> {
    match options.get(name) {
        None => Ok(None),
        Some(v) => v.as_bool().map(Some).ok_or_else(|| {
            StreamError::options_error(format!("option '{name}' must be true or false, got {v}"))
        }),
    }
}
