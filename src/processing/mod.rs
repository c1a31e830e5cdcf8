//! Post-parse processors.
//!
//! A processor is a lazy transformation from a stream of [`ExtendedRow`]s to another stream of
//! extended rows. The stream composes the configured processors left to right: the output of
//! stage *i* is the input of stage *i + 1*. Nothing is collected eagerly, so processors work on
//! sources of any length.
//!
//! Processors are re-instantiated every time a pipeline is built (at `open`, for the sample, and
//! on `reset`), so any per-pass state belongs inside the returned iterator, not in the processor.
//!
//! Stock processors:
//!
//! - [`filter_rows()`], [`skip_blank_rows()`], [`skip_commented_rows()`]: drop rows
//! - [`map_rows()`]: rewrite row values
//! - [`headers_from_row()`]: promote a data row to headers mid-stream
//!
//! ## Example: drop comments, then promote row 1 to headers
//!
//! ```rust
//! use tabular_stream::processing::{headers_from_row, skip_commented_rows};
//! use tabular_stream::stream::{Source, Stream, StreamOptions};
//! use tabular_stream::types::InlineRow;
//!
//! # fn main() -> Result<(), tabular_stream::StreamError> {
//! let source = Source::inline(vec![
//!     InlineRow::from(vec!["id", "name"]),
//!     InlineRow::from(vec!["# draft", ""]),
//!     InlineRow::from(vec!["1", "english"]),
//! ]);
//! let opts = StreamOptions {
//!     post_parse: vec![skip_commented_rows("#"), headers_from_row(1)],
//!     ..Default::default()
//! };
//!
//! let mut stream = Stream::new(source, opts);
//! stream.open()?;
//! let rows = stream.read_extended(None)?;
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].row_number, 3);
//! assert_eq!(rows[0].header_names().unwrap(), ["id", "name"]);
//! # Ok(())
//! # }
//! ```

pub mod filter;
pub mod headers;
pub mod map;

use std::fmt;
use std::sync::Arc;

use crate::types::ExtendedRow;

pub use filter::{filter_rows, skip_blank_rows, skip_commented_rows};
pub use headers::headers_from_row;
pub use map::map_rows;

/// A lazy stream of extended rows.
pub type RowStream = Box<dyn Iterator<Item = ExtendedRow>>;

/// A post-parse transformation stage.
///
/// Any `Fn(RowStream) -> RowStream` closure is a processor.
pub trait Processor {
    /// Wrap `rows` in this stage.
    fn process(&self, rows: RowStream) -> RowStream;
}

impl<F> Processor for F
where
    F: Fn(RowStream) -> RowStream,
{
    fn process(&self, rows: RowStream) -> RowStream {
        self(rows)
    }
}

/// Wrap a closure as a shareable processor for [`crate::stream::StreamOptions::post_parse`].
pub fn processor<F>(f: F) -> Arc<dyn Processor>
where
    F: Fn(RowStream) -> RowStream + 'static,
{
    Arc::new(f)
}

/// Ordered list of processors, composed left to right.
#[derive(Clone, Default)]
pub struct ProcessorChain {
    stages: Vec<Arc<dyn Processor>>,
}

impl ProcessorChain {
    /// Create a chain from stages in application order.
    pub fn new(stages: Vec<Arc<dyn Processor>>) -> Self {
        Self { stages }
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` when the chain has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Compose every stage over `rows`.
    pub fn apply(&self, rows: RowStream) -> RowStream {
        self.stages
            .iter()
            .fold(rows, |upstream, stage| stage.process(upstream))
    }
}

impl fmt::Debug for ProcessorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorChain")
            .field("stages", &self.stages.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn rows(values: &[&str]) -> RowStream {
        let rows: Vec<ExtendedRow> = values
            .iter()
            .enumerate()
            .map(|(i, v)| ExtendedRow::new(i + 1, None, vec![Value::from(*v)]))
            .collect();
        Box::new(rows.into_iter())
    }

    fn upper() -> Arc<dyn Processor> {
        map_rows(|row| {
            row.iter()
                .map(|v| match v {
                    Value::Utf8(s) => Value::Utf8(s.to_uppercase()),
                    other => other.clone(),
                })
                .collect()
        })
    }

    #[test]
    fn empty_chain_is_identity() {
        let chain = ProcessorChain::default();
        assert!(chain.is_empty());
        let out: Vec<_> = chain.apply(rows(&["a", "b"])).collect();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].row, vec![Value::from("b")]);
    }

    #[test]
    fn composition_matches_applying_stages_one_after_another() {
        let drop_b = filter_rows(|row| row.row != vec![Value::from("b")]);
        let chained = ProcessorChain::new(vec![drop_b.clone(), upper()]);
        let composed: Vec<_> = chained.apply(rows(&["a", "b", "c"])).collect();

        let first: Vec<_> = drop_b.process(rows(&["a", "b", "c"])).collect();
        let second: Vec<_> = upper().process(Box::new(first.into_iter())).collect();

        assert_eq!(composed, second);
        assert_eq!(composed.iter().map(|r| r.row_number).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn closures_are_processors() {
        let take_one = processor(|rows: RowStream| -> RowStream { Box::new(rows.take(1)) });
        let chain = ProcessorChain::new(vec![take_one]);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.apply(rows(&["a", "b"])).count(), 1);
    }
}
