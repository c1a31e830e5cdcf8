//! Parser for in-memory row sources (arrays, generator callables, iterators).

use crate::error::{StreamError, StreamResult};
use crate::stream::OptionMap;

use super::{raw_from_inline, Parser, ParserInput, RawRows};

/// Passes in-memory rows through, rejecting elements that are not rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineParser;

impl Parser for InlineParser {
    fn open(&self, input: ParserInput, _options: &OptionMap) -> StreamResult<RawRows> {
        match input {
            ParserInput::Rows(rows) => Ok(Box::new(
                rows.enumerate()
                    .map(|(idx0, row)| raw_from_inline(row, idx0 + 1)),
            )),
            ParserInput::Reader(_) => Err(StreamError::format_error(
                "format 'inline' requires an in-memory row source",
            )),
        }
    }
}
