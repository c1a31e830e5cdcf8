//! The [`Stream`]: one call surface for every source.
//!
//! A stream resolves its source to a scheme and a format, loads and parses it lazily, and exposes
//! the rows with header detection, skipping, sampling and post-parse processors applied.
//!
//! ```no_run
//! use tabular_stream::stream::{HeaderMode, Stream, StreamOptions};
//!
//! # fn main() -> Result<(), tabular_stream::StreamError> {
//! let opts = StreamOptions {
//!     headers: HeaderMode::Row(1),
//!     ..Default::default()
//! };
//! let mut stream = Stream::new("data/table.csv", opts);
//! stream.open()?;
//! println!("headers={:?}", stream.headers()?);
//! for row in stream.iter_keyed()? {
//!     println!("{:?}", row?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Lifecycle
//!
//! `new` (unopened) → `open` → reads → optional `reset` → `close`. Reads before `open` fail with
//! [`StreamError::NotOpen`]; anything after `close` fails with [`StreamError::Closed`]. Dropping
//! a stream closes it.

pub mod observability;
pub mod options;
mod pipeline;
mod resolver;
pub mod source;

use std::fmt;

use crate::error::{StreamError, StreamResult};
use crate::loaders::{prepare, LoadRequest};
use crate::parsers::ParserInput;
use crate::processing::RowStream;
use crate::types::{ExtendedRow, Headers, KeyedRow, Value};

pub use observability::{
    CompositeObserver, FileObserver, StdErrObserver, StreamContext, StreamObserver,
    StreamSeverity, StreamStats,
};
pub use options::{HeaderMode, OptionMap, SaveOptions, SkipRule, StreamOptions, DEFAULT_SAMPLE_SIZE};
pub use source::{InlineRows, Source};

use pipeline::ErrorSlot;

/// A format-agnostic tabular reader.
pub struct Stream {
    source: Source,
    options: StreamOptions,
    state: State,
}

enum State {
    Unopened,
    Open(Box<Session>),
    Closed,
}

/// Per-open state, rebuilt by `reset`.
struct Session {
    scheme: Option<String>,
    format: String,
    rewindable: bool,
    headers: Option<Headers>,
    sample: Vec<Vec<Value>>,
    live: RowStream,
    slot: ErrorSlot,
    emitted: usize,
}

impl Stream {
    /// Create an unopened stream. Nothing is resolved or loaded until [`Stream::open`].
    pub fn new(source: impl Into<Source>, options: StreamOptions) -> Self {
        Self {
            source: source.into(),
            options,
            state: State::Unopened,
        }
    }

    /// Resolve, load and parse the source, then compute headers and the sample.
    ///
    /// Calling `open` on an opened stream starts over, like [`Stream::reset`]; a single-use
    /// source refuses and keeps its current session.
    pub fn open(&mut self) -> StreamResult<()> {
        let result = match self.state {
            State::Closed => return Err(StreamError::Closed),
            State::Unopened => self.start(),
            State::Open(_) => self.restart(),
        };
        self.settle(result)
    }

    /// Whether `close` has been called.
    pub fn closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    /// The resolved scheme; `None` for in-memory row sources or before `open`.
    pub fn scheme(&self) -> Option<&str> {
        match &self.state {
            State::Open(session) => session.scheme.as_deref(),
            _ => None,
        }
    }

    /// The resolved format, once opened.
    pub fn format(&self) -> Option<&str> {
        match &self.state {
            State::Open(session) => Some(session.format.as_str()),
            _ => None,
        }
    }

    /// Headers of the current session, if any were determined.
    pub fn headers(&self) -> StreamResult<Option<&[String]>> {
        Ok(self.session()?.headers.as_deref())
    }

    /// The rows buffered at open, after processors unless `sample_post_parse` is off.
    ///
    /// Unaffected by reads.
    pub fn sample(&self) -> StreamResult<&[Vec<Value>]> {
        Ok(self.session()?.sample.as_slice())
    }

    /// Read up to `limit` rows (all remaining rows for `None`) as plain values.
    pub fn read(&mut self, limit: Option<usize>) -> StreamResult<Vec<Vec<Value>>> {
        self.iter()?.take(limit.unwrap_or(usize::MAX)).collect()
    }

    /// Read up to `limit` rows as header -> value maps.
    pub fn read_keyed(&mut self, limit: Option<usize>) -> StreamResult<Vec<KeyedRow>> {
        self.iter_keyed()?
            .take(limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// Read up to `limit` rows with their numbers and headers.
    pub fn read_extended(&mut self, limit: Option<usize>) -> StreamResult<Vec<ExtendedRow>> {
        self.iter_extended()?
            .take(limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// Lazily iterate the remaining rows as plain values.
    pub fn iter(&mut self) -> StreamResult<impl Iterator<Item = StreamResult<Vec<Value>>> + '_> {
        Ok(self.iter_extended()?.map(|row| row.map(|row| row.row)))
    }

    /// Lazily iterate the remaining rows as header -> value maps.
    ///
    /// Yields [`StreamError::MissingHeaders`] (and stops) at the first row without headers.
    pub fn iter_keyed(&mut self) -> StreamResult<impl Iterator<Item = StreamResult<KeyedRow>> + '_> {
        let mut failed = false;
        Ok(self.iter_extended()?.map_while(move |row| {
            if failed {
                return None;
            }
            let keyed = row.and_then(|row| row.keyed().ok_or(StreamError::MissingHeaders));
            failed = keyed.is_err();
            Some(keyed)
        }))
    }

    /// Lazily iterate the remaining rows with their numbers and headers.
    ///
    /// The iterator ends after yielding the first error.
    pub fn iter_extended(
        &mut self,
    ) -> StreamResult<impl Iterator<Item = StreamResult<ExtendedRow>> + '_> {
        self.session()?;
        let mut failed = false;
        Ok(std::iter::from_fn(move || {
            if failed {
                return None;
            }
            let next = self.next_row().transpose();
            failed = matches!(next, Some(Err(_)));
            next
        }))
    }

    /// Rewind to the first row, recomputing headers and the sample.
    ///
    /// Fails with [`StreamError::Reset`] for single-use iterators and reader handles.
    pub fn reset(&mut self) -> StreamResult<()> {
        self.session()?;
        let result = self.restart();
        self.settle(result)
    }

    /// Write the remaining rows to `target` and return how many were written.
    ///
    /// The writer is chosen by `options.format`, else by the target's extension.
    /// Headers come from the first remaining row, so processors that assign headers are
    /// honoured; the session headers are used when no rows remain.
    pub fn save(&mut self, target: &str, options: SaveOptions) -> StreamResult<usize> {
        let session_headers = self.session()?.headers.clone();
        let result = resolver::resolve_writer(target, &options, &self.options.custom_writers)
            .and_then(|writer| {
                let first = self.pull()?;
                let headers = first
                    .as_ref()
                    .and_then(|row| row.headers.clone())
                    .or(session_headers);
                let mut rows = first
                    .map(Ok)
                    .into_iter()
                    .chain(std::iter::from_fn(|| self.pull().transpose()))
                    .map(|row| row.map(|r| r.row));
                writer.write(&mut rows, target, headers.as_deref(), &options.options)
            });
        if let Err(e) = &result {
            self.report_failure(e);
        }
        result
    }

    /// Release the source. Safe to call more than once; later operations fail with
    /// [`StreamError::Closed`].
    pub fn close(&mut self) {
        if let State::Open(session) = std::mem::replace(&mut self.state, State::Closed) {
            if let Some(observer) = &self.options.observer {
                observer.on_close(
                    &self.context(Some(&*session)),
                    StreamStats {
                        rows: session.emitted,
                    },
                );
            }
        }
    }

    fn session(&self) -> StreamResult<&Session> {
        match &self.state {
            State::Open(session) => Ok(session),
            State::Unopened => Err(StreamError::NotOpen),
            State::Closed => Err(StreamError::Closed),
        }
    }

    /// Rebuild the open session, unless its source cannot be replayed.
    fn restart(&mut self) -> StreamResult<Box<Session>> {
        if !self.session()?.rewindable {
            return Err(StreamError::Reset {
                message: format!("source {} cannot be read twice", self.source.describe()),
            });
        }
        self.start()
    }

    /// Build a fresh session; the previous one (if any) is dropped first so its source is released.
    fn start(&mut self) -> StreamResult<Box<Session>> {
        if let State::Open(_) = self.state {
            self.state = State::Unopened;
        }

        let resolved = resolver::resolve(&self.source, &self.options)?;
        let request = LoadRequest {
            mode: resolved.parser.mode(),
            encoding: self.options.encoding.as_deref(),
            allow_html: self.options.allow_html,
            options: &self.options.options,
        };

        let (input, rewindable) = match &mut self.source {
            Source::Locator(locator) => {
                let loader = resolved.loader.as_ref().ok_or_else(|| StreamError::Scheme {
                    scheme: resolved.scheme.clone().unwrap_or_default(),
                })?;
                let bytes = loader.load(locator, &request)?;
                (
                    ParserInput::Reader(prepare(bytes, &request)?),
                    loader.rewindable(),
                )
            }
            Source::Reader(handle) => {
                let bytes = handle.take().ok_or_else(|| StreamError::Reset {
                    message: "reader source has already been consumed".to_string(),
                })?;
                (ParserInput::Reader(prepare(bytes, &request)?), false)
            }
            Source::Inline(rows) => {
                let rows = rows.clone();
                let replay = (0..rows.len()).map(move |idx| rows[idx].clone());
                (ParserInput::Rows(Box::new(replay)), true)
            }
            Source::Generator(make) => (ParserInput::Rows((**make)()), true),
            Source::Iter(rows) => {
                let rows = rows.take().ok_or_else(|| StreamError::Reset {
                    message: "iterator source has already been consumed".to_string(),
                })?;
                (ParserInput::Rows(rows), false)
            }
        };

        let raw = resolved.parser.open(input, &self.options.options)?;
        let pipeline = pipeline::build(raw, &self.options)?;

        Ok(Box::new(Session {
            scheme: resolved.scheme,
            format: resolved.format,
            rewindable,
            headers: pipeline.headers,
            sample: pipeline.sample,
            live: pipeline.live,
            slot: pipeline.slot,
            emitted: 0,
        }))
    }

    /// Install a freshly built session or report why it could not be built.
    fn settle(&mut self, result: StreamResult<Box<Session>>) -> StreamResult<()> {
        match result {
            Ok(session) => {
                self.state = State::Open(session);
                if let (Some(observer), State::Open(session)) = (&self.options.observer, &self.state) {
                    observer.on_open(&self.context(Some(&**session)));
                }
                Ok(())
            }
            Err(e) => {
                self.report_failure(&e);
                Err(e)
            }
        }
    }

    fn next_row(&mut self) -> StreamResult<Option<ExtendedRow>> {
        let result = self.pull();
        if let Err(e) = &result {
            self.report_failure(e);
        }
        result
    }

    /// Next row from the live pipeline, surfacing any error parked underneath the processors.
    fn pull(&mut self) -> StreamResult<Option<ExtendedRow>> {
        let session = match &mut self.state {
            State::Open(session) => session,
            State::Unopened => return Err(StreamError::NotOpen),
            State::Closed => return Err(StreamError::Closed),
        };
        if let Some(row) = session.live.next() {
            session.emitted += 1;
            return Ok(Some(row));
        }
        let parked = session.slot.borrow_mut().take();
        match parked {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }

    fn report_failure(&self, error: &StreamError) {
        let Some(observer) = &self.options.observer else {
            return;
        };
        let session = match &self.state {
            State::Open(session) => Some(&**session),
            _ => None,
        };
        let ctx = self.context(session);
        let severity = StreamSeverity::of(error);
        observer.on_failure(&ctx, severity, error);
        if severity >= self.options.alert_at_or_above {
            observer.on_alert(&ctx, severity, error);
        }
    }

    fn context(&self, session: Option<&Session>) -> StreamContext {
        StreamContext {
            source: self.source.describe(),
            scheme: session.and_then(|s| s.scheme.clone()),
            format: session.map(|s| s.format.clone()),
        }
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            State::Unopened => "unopened",
            State::Open(_) => "open",
            State::Closed => "closed",
        };
        f.debug_struct("Stream")
            .field("source", &self.source)
            .field("state", &state)
            .field("scheme", &self.scheme())
            .field("format", &self.format())
            .finish()
    }
}
