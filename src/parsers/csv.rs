//! CSV/TSV parser.

use std::io::BufRead;

use crate::error::{StreamError, StreamResult};
use crate::stream::OptionMap;
use crate::types::Value;

use super::{bool_option, char_option, expect_reader, Parser, ParserInput, RawRow, RawRows};

const SNIFF_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];
const SNIFF_LINES: usize = 5;

/// Delimited text parser backed by the `csv` crate.
///
/// Rules:
///
/// - Every record becomes a positional row of [`Value::Utf8`] cells; no typing is attempted.
/// - Records may have different lengths.
/// - When no `delimiter` option is given, the delimiter is sniffed from the first lines.
///
/// Options: `delimiter`, `quote_char`, `escape_char`, `double_quote`, `skip_initial_space`.
#[derive(Debug, Clone, Copy)]
pub struct CsvParser {
    default_delimiter: Option<u8>,
}

impl CsvParser {
    /// Comma-separated values, with delimiter sniffing.
    pub fn new() -> Self {
        Self {
            default_delimiter: None,
        }
    }

    /// Tab-separated values.
    pub fn tsv() -> Self {
        Self {
            default_delimiter: Some(b'\t'),
        }
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for CsvParser {
    fn options(&self) -> &[&'static str] {
        &[
            "delimiter",
            "quote_char",
            "escape_char",
            "double_quote",
            "skip_initial_space",
        ]
    }

    fn open(&self, input: ParserInput, options: &OptionMap) -> StreamResult<RawRows> {
        let mut reader = expect_reader(input, "csv")?;

        let delimiter = match char_option(options, "delimiter")?.or(self.default_delimiter) {
            Some(d) => d,
            None => {
                let head = reader
                    .fill_buf()
                    .map_err(|e| StreamError::io_error("csv", e))?;
                sniff_delimiter(head)
            }
        };

        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter);
        if let Some(q) = char_option(options, "quote_char")? {
            builder.quote(q);
        }
        if let Some(e) = char_option(options, "escape_char")? {
            builder.escape(Some(e));
        }
        if let Some(d) = bool_option(options, "double_quote")? {
            builder.double_quote(d);
        }
        let skip_initial_space = bool_option(options, "skip_initial_space")?.unwrap_or(false);

        let rdr = builder.from_reader(reader);
        Ok(Box::new(rdr.into_records().map(move |result| -> StreamResult<RawRow> {
            let record = result?;
            Ok(RawRow::Values(
                record
                    .iter()
                    .map(|cell| {
                        let cell = if skip_initial_space {
                            cell.trim_start_matches(' ')
                        } else {
                            cell
                        };
                        Value::from(cell)
                    })
                    .collect(),
            ))
        })))
    }
}

/// Pick the candidate that appears the same non-zero number of times on each of the first
/// complete lines. Falls back to `,`.
fn sniff_delimiter(head: &[u8]) -> u8 {
    let text = String::from_utf8_lossy(head);
    let mut lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    // The last line of a partial buffer may be cut short.
    if !text.ends_with('\n') && lines.len() > 1 {
        lines.pop();
    }
    lines.truncate(SNIFF_LINES);
    if lines.is_empty() {
        return b',';
    }

    SNIFF_CANDIDATES
        .iter()
        .copied()
        .find(|&c| {
            let first = count_outside_quotes(lines[0], c);
            first > 0 && lines.iter().all(|l| count_outside_quotes(l, c) == first)
        })
        .unwrap_or(b',')
}

fn count_outside_quotes(line: &str, delimiter: u8) -> usize {
    let mut quoted = false;
    let mut count = 0;
    for b in line.bytes() {
        if b == b'"' {
            quoted = !quoted;
        } else if b == delimiter && !quoted {
            count += 1;
        }
    }
    count
}
