//! `tabular-stream` reads tabular data from any supported source through one lazy,
//! row-by-row interface: [`stream::Stream`].
//!
//! The stream resolves *where* bytes come from (the scheme) and *how* to decode them into rows
//! (the format), then applies the same row semantics to every source: 1-based physical row
//! numbers, optional header extraction, row skipping, a sample buffer computed at open, and a
//! chain of post-parse processors.
//!
//! ## What you can read
//!
//! **Schemes (inferred from a `scheme://` prefix, default `file`):**
//!
//! - `file`: local paths
//! - `http` / `https`: remote resources (blocking client)
//! - `text`: the locator itself is the content
//! - in-memory rows, generator callables, single-use iterators, and reader handles via
//!   [`stream::Source`]
//!
//! **Formats (inferred from the extension, or forced with [`stream::StreamOptions::format`]):**
//!
//! - **CSV/TSV**: `.csv`, `.tsv` (delimiter sniffed unless given)
//! - **JSON**: `.json` (array of arrays or array of objects, optionally under a `property`)
//! - **NDJSON**: `.ndjson`, `.jsonl`
//! - **Parquet**: `.parquet`, `.pq`
//! - **Spreadsheets** (requires the Cargo feature `excel`): `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`
//!
//! Rows can be written back out as CSV or JSON with [`stream::Stream::save`].
//!
//! ## Quick example
//!
//! ```rust
//! use tabular_stream::stream::{HeaderMode, Stream, StreamOptions};
//! use tabular_stream::types::Value;
//!
//! # fn main() -> Result<(), tabular_stream::StreamError> {
//! let opts = StreamOptions {
//!     scheme: Some("text".to_string()),
//!     format: Some("csv".to_string()),
//!     headers: HeaderMode::Row(1),
//!     ..Default::default()
//! };
//! let mut stream = Stream::new("id,name\n1,english\n2,中国人\n", opts);
//! stream.open()?;
//!
//! assert_eq!(stream.headers()?.unwrap(), ["id", "name"]);
//! let rows = stream.read_extended(None)?;
//! assert_eq!(rows[0].row_number, 2);
//! assert_eq!(rows[1].row, vec![Value::from("2"), Value::from("中国人")]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Observability
//!
//! Attach a [`stream::StreamObserver`] (for example [`stream::StdErrObserver`] or
//! [`stream::FileObserver`]) through [`stream::StreamOptions::observer`] to log opens, closes and
//! failures. Unreachable sources are reported as `Critical`, which is the default alert threshold.
//!
//! ## Modules
//!
//! - [`stream`]: the stream, its options, sources, and observers
//! - [`loaders`]: byte acquisition by scheme
//! - [`parsers`]: row decoding by format
//! - [`writers`]: row serialization by format
//! - [`processing`]: post-parse processors
//! - [`types`]: values and extended rows
//! - [`error`]: the shared error type

pub mod error;
pub mod loaders;
pub mod parsers;
pub mod processing;
pub mod stream;
pub mod types;
pub mod writers;

pub use error::{StreamError, StreamResult};
