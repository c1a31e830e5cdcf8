//! What a stream reads from.

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use crate::types::InlineRow;

/// Boxed row iterator produced by generator sources.
pub type InlineRows = Box<dyn Iterator<Item = InlineRow>>;

/// A stream source.
///
/// Locators go through scheme/format resolution and a [`crate::loaders::Loader`]. Row sources
/// (`Inline`, `Generator`, `Iter`) skip loading and default to the `inline` format. A `Reader`
/// is an already-open byte handle and needs an explicit format.
pub enum Source {
    /// Path, URL, or `scheme://` locator.
    Locator(String),
    /// In-memory rows; replayable.
    Inline(Arc<[InlineRow]>),
    /// A callable that produces a fresh row iterator on every open; replayable.
    Generator(Arc<dyn Fn() -> InlineRows>),
    /// A single-use row iterator.
    Iter(Option<InlineRows>),
    /// A single-use byte handle.
    Reader(Option<Box<dyn Read>>),
}

impl Source {
    /// In-memory rows.
    pub fn inline(rows: Vec<InlineRow>) -> Self {
        Source::Inline(rows.into())
    }

    /// Rows produced by calling `f` on every open and reset.
    pub fn generator<F, I>(f: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: Iterator<Item = InlineRow> + 'static,
    {
        Source::Generator(Arc::new(move || Box::new(f()) as InlineRows))
    }

    /// Rows from an iterator that can be consumed once.
    pub fn iter<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = InlineRow>,
        I::IntoIter: 'static,
    {
        Source::Iter(Some(Box::new(rows.into_iter())))
    }

    /// Bytes from an open handle that can be consumed once.
    pub fn reader(reader: impl Read + 'static) -> Self {
        Source::Reader(Some(Box::new(reader)))
    }

    /// Short description for observers and error messages.
    pub fn describe(&self) -> String {
        match self {
            Source::Locator(locator) => truncate(locator),
            Source::Inline(rows) => format!("<inline: {} rows>", rows.len()),
            Source::Generator(_) => "<generator>".to_string(),
            Source::Iter(_) => "<iterator>".to_string(),
            Source::Reader(_) => "<reader>".to_string(),
        }
    }
}

fn truncate(locator: &str) -> String {
    const MAX: usize = 80;
    match locator.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &locator[..idx]),
        None => locator.to_string(),
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Source").field(&self.describe()).finish()
    }
}

impl From<&str> for Source {
    fn from(locator: &str) -> Self {
        Source::Locator(locator.to_string())
    }
}

impl From<String> for Source {
    fn from(locator: String) -> Self {
        Source::Locator(locator)
    }
}

impl From<&std::path::Path> for Source {
    fn from(path: &std::path::Path) -> Self {
        Source::Locator(path.to_string_lossy().into_owned())
    }
}

impl From<Vec<InlineRow>> for Source {
    fn from(rows: Vec<InlineRow>) -> Self {
        Source::inline(rows)
    }
}
