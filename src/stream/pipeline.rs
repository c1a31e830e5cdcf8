//! Row numbering, skipping, header extraction, and sampling.
//!
//! The stages below the processor chain still carry `Result`s so that decode failures reach the
//! caller. Processors only see plain [`ExtendedRow`] streams: the first error is parked in an
//! [`ErrorSlot`] and the row stream ends, after which the stream reports the parked error.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use crate::error::{ErrorKind, StreamError, StreamResult};
use crate::parsers::{RawRow, RawRows};
use crate::processing::{ProcessorChain, RowStream};
use crate::types::{ExtendedRow, Headers, Value};

use super::options::{HeaderMode, SkipRule, StreamOptions};

/// Holds the first error raised underneath the processor chain.
pub(crate) type ErrorSlot = Rc<RefCell<Option<StreamError>>>;

/// A raw row with its physical number.
#[derive(Debug, Clone, PartialEq)]
struct NumberedRow {
    number: usize,
    cells: RawRow,
}

type Numbered = Box<dyn Iterator<Item = StreamResult<NumberedRow>>>;
type Extended = Box<dyn Iterator<Item = StreamResult<ExtendedRow>>>;

/// Everything `open` computes for one session.
pub(crate) struct Pipeline {
    pub headers: Option<Headers>,
    pub sample: Vec<Vec<Value>>,
    pub live: RowStream,
    pub slot: ErrorSlot,
}

/// Compose the stages over `raw`, extract headers, and fill the sample buffer.
pub(crate) fn build(raw: RawRows, options: &StreamOptions) -> StreamResult<Pipeline> {
    check_header_row(&options.headers, options.sample_size)?;

    let consumed = Rc::new(Cell::new(0));
    let mut numbered = number_rows(raw, options, Rc::clone(&consumed));
    let (headers, pending) = extract_headers(&mut numbered, &options.headers)?;

    let attach_headers = headers.clone();
    let mut rest: Extended = Box::new(
        numbered.map(move |row| row.map(|row| attach(row, &attach_headers))),
    );

    // The sample window spans the first `sample_size` physical rows, header and skipped rows
    // included. A keyed header row is data and always lands in the window it was read from.
    let mut buffer = Vec::with_capacity(options.sample_size.min(1024));
    if let Some(row) = pending {
        let row = attach(row, &headers);
        if options.sample_size > 0 {
            buffer.push(row);
        } else {
            rest = Box::new(std::iter::once(Ok(row)).chain(rest));
        }
    }
    // Skipping can jump past the window; such a row is emitted but not sampled.
    let mut overflow = None;
    while consumed.get() < options.sample_size {
        match rest.next() {
            Some(row) => {
                let row = row?;
                if row.row_number > options.sample_size {
                    overflow = Some(row);
                    break;
                }
                buffer.push(row);
            }
            None => break,
        }
    }

    let chain = ProcessorChain::new(options.post_parse.clone());
    let sample = if options.sample_post_parse {
        chain
            .apply(Box::new(buffer.clone().into_iter()))
            .map(|row| row.row)
            .collect()
    } else {
        buffer.iter().map(|row| row.row.clone()).collect()
    };

    let slot = ErrorSlot::default();
    let trapped = Trap {
        rows: rest,
        slot: Rc::clone(&slot),
        done: false,
    };
    let live = chain.apply(Box::new(buffer.into_iter().chain(overflow).chain(trapped)));

    Ok(Pipeline {
        headers,
        sample,
        live,
        slot,
    })
}

fn check_header_row(mode: &HeaderMode, sample_size: usize) -> StreamResult<()> {
    match *mode {
        HeaderMode::Row(0) => Err(StreamError::options_error(
            "header row numbers start at 1",
        )),
        HeaderMode::Row(n) if n > sample_size.max(1) => {
            Err(StreamError::options_error(format!(
                "header row {n} is beyond the sample size {sample_size}"
            )))
        }
        _ => Ok(()),
    }
}

/// Number every raw row, apply `force_parse`/`force_strings`, and drop skipped rows.
///
/// `consumed` tracks how many raw rows have been pulled from the parser.
fn number_rows(raw: RawRows, options: &StreamOptions, consumed: Rc<Cell<usize>>) -> Numbered {
    let force_parse = options.force_parse;
    let force_strings = options.force_strings;
    let skipper = Skipper::new(&options.skip_rows);

    Box::new(raw.enumerate().filter_map(move |(idx0, item)| {
        let number = idx0 + 1;
        consumed.set(number);
        let cells = match item {
            Ok(cells) => cells,
            Err(e) if force_parse && e.kind() == ErrorKind::Source => RawRow::Values(Vec::new()),
            Err(e) => return Some(Err(e)),
        };
        let cells = if force_strings {
            stringify(cells)
        } else {
            cells
        };
        if skipper.skips(number, &cells) {
            None
        } else {
            Some(Ok(NumberedRow { number, cells }))
        }
    }))
}

fn stringify(cells: RawRow) -> RawRow {
    match cells {
        RawRow::Values(values) => RawRow::Values(values.into_iter().map(Value::into_text).collect()),
        RawRow::Keyed(pairs) => {
            RawRow::Keyed(pairs.into_iter().map(|(k, v)| (k, v.into_text())).collect())
        }
    }
}

struct Skipper {
    numbers: HashSet<usize>,
    prefixes: Vec<String>,
}

impl Skipper {
    fn new(rules: &[SkipRule]) -> Self {
        let mut numbers = HashSet::new();
        let mut prefixes = Vec::new();
        for rule in rules {
            match rule {
                SkipRule::Row(n) => {
                    numbers.insert(*n);
                }
                SkipRule::Prefix(p) => prefixes.push(p.clone()),
            }
        }
        Self { numbers, prefixes }
    }

    /// An empty prefix matches rows whose first cell is missing or empty text.
    fn skips(&self, number: usize, cells: &RawRow) -> bool {
        if self.numbers.contains(&number) {
            return true;
        }
        if self.prefixes.is_empty() {
            return false;
        }
        let first = match cells {
            RawRow::Values(values) => values.first(),
            RawRow::Keyed(pairs) => pairs.first().map(|(_, v)| v),
        };
        self.prefixes.iter().any(|prefix| match first {
            Some(Value::Utf8(text)) if prefix.is_empty() => text.is_empty(),
            Some(Value::Utf8(text)) => text.starts_with(prefix.as_str()),
            None | Some(Value::Null) => prefix.is_empty(),
            Some(_) => false,
        })
    }
}

/// Determine headers. Returns a row that was inspected but must still be emitted as data.
fn extract_headers(
    rows: &mut Numbered,
    mode: &HeaderMode,
) -> StreamResult<(Option<Headers>, Option<NumberedRow>)> {
    let header_row = match mode {
        HeaderMode::Absent => return Ok((None, None)),
        HeaderMode::Explicit(names) => return Ok((Some(names.iter().cloned().collect()), None)),
        HeaderMode::Row(n) => *n,
    };

    for row in rows.by_ref() {
        let row = row?;
        if row.number < header_row {
            continue;
        }
        return Ok(match row.cells {
            RawRow::Values(values) => (Some(values.iter().map(Value::to_string).collect()), None),
            RawRow::Keyed(ref pairs) => {
                let headers = pairs.iter().map(|(k, _)| k.clone()).collect();
                (Some(headers), Some(row))
            }
        });
    }
    Ok((None, None))
}

/// Turn a numbered row into an extended row; keyed rows are aligned to `headers`.
fn attach(row: NumberedRow, headers: &Option<Headers>) -> ExtendedRow {
    let values = match (row.cells, headers) {
        (RawRow::Values(values), _) => values,
        (RawRow::Keyed(pairs), Some(headers)) => headers
            .iter()
            .map(|name| {
                pairs
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, v)| v.clone())
                    .unwrap_or(Value::Null)
            })
            .collect(),
        (RawRow::Keyed(pairs), None) => pairs.into_iter().map(|(_, v)| v).collect(),
    };
    ExtendedRow::new(row.number, headers.clone(), values)
}

/// Ends the row stream at the first error and parks the error in `slot`.
struct Trap {
    rows: Extended,
    slot: ErrorSlot,
    done: bool,
}

impl Iterator for Trap {
    type Item = ExtendedRow;

    fn next(&mut self) -> Option<ExtendedRow> {
        if self.done {
            return None;
        }
        match self.rows.next() {
            Some(Ok(row)) => Some(row),
            Some(Err(e)) => {
                self.done = true;
                *self.slot.borrow_mut() = Some(e);
                None
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}
