//! JSON and NDJSON parsers.
//!
//! Supported inputs:
//! - A JSON array of rows: `[["a", 1], ["b", 2]]` or `[{"a": 1}, {"a": 2}]`
//! - The same array nested inside a document, selected with the `property` option (dot path,
//!   e.g. `data.rows`)
//! - Newline-delimited JSON (NDJSON): one row per line
//!
//! Arrays become positional rows, objects become keyed rows. Any other item is a row-level
//! source error.

use std::io::BufRead;

use crate::error::{StreamError, StreamResult};
use crate::stream::OptionMap;
use crate::types::InlineRow;

use super::{expect_reader, raw_from_inline, Parser, ParserInput, RawRow, RawRows};

/// Parser for a single JSON document holding an array of rows.
///
/// Options: `property`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonParser;

impl Parser for JsonParser {
    fn options(&self) -> &[&'static str] {
        &["property"]
    }

    fn open(&self, input: ParserInput, options: &OptionMap) -> StreamResult<RawRows> {
        let reader = expect_reader(input, "json")?;
        let document: serde_json::Value = serde_json::from_reader(reader)?;

        let property = match options.get("property") {
            None => None,
            Some(v) => Some(v.as_str().ok_or_else(|| {
                StreamError::options_error(format!("option 'property' must be a string, got {v}"))
            })?),
        };

        let target = match property {
            Some(path) => take_by_dot_path(document, path).ok_or_else(|| {
                StreamError::source_error(format!("json property '{path}' not found"))
            })?,
            None => document,
        };

        let items = match target {
            serde_json::Value::Array(items) => items,
            _ => {
                return Err(StreamError::source_error(
                    "json must be an array of rows (use the 'property' option to select one)",
                ));
            }
        };

        Ok(Box::new(
            items
                .into_iter()
                .enumerate()
                .map(|(idx0, item)| raw_from_inline(InlineRow::from(item), idx0 + 1)),
        ))
    }
}

/// Parser for newline-delimited JSON. Blank lines are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct NdjsonParser;

impl Parser for NdjsonParser {
    fn open(&self, input: ParserInput, _options: &OptionMap) -> StreamResult<RawRows> {
        let reader = expect_reader(input, "ndjson")?;
        Ok(Box::new(
            reader
                .lines()
                .enumerate()
                .filter(|(_, line)| !matches!(line, Ok(l) if l.trim().is_empty()))
                .map(|(idx0, line)| -> StreamResult<RawRow> {
                    let line = line.map_err(|e| StreamError::io_error("ndjson", e))?;
                    let value: serde_json::Value = serde_json::from_str(line.trim()).map_err(|e| {
                        StreamError::source_error(format!("invalid ndjson at line {}: {e}", idx0 + 1))
                    })?;
                    raw_from_inline(InlineRow::from(value), idx0 + 1)
                }),
        ))
    }
}

fn take_by_dot_path(root: serde_json::Value, path: &str) -> Option<serde_json::Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            serde_json::Value::Object(mut map) => map.remove(segment)?,
            serde_json::Value::Array(mut items) => {
                let idx: usize = segment.parse().ok()?;
                if idx >= items.len() {
                    return None;
                }
                items.swap_remove(idx)
            }
            _ => return None,
        };
    }
    Some(current)
}
