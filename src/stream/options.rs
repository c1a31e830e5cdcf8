//! Stream configuration.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::loaders::Loader;
use crate::parsers::Parser;
use crate::processing::Processor;
use crate::writers::Writer;

use super::observability::{StreamObserver, StreamSeverity};

/// Passthrough options for Loaders, Parsers, and Writers, validated against each
/// implementation's declared option names.
pub type OptionMap = BTreeMap<String, serde_json::Value>;

/// Default number of rows buffered at open.
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// How the stream determines headers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// No header interpretation; every row is data and carries no headers.
    #[default]
    Absent,
    /// Use the values of this 1-based physical row as headers. Rows before it are dropped.
    ///
    /// For keyed sources (JSON objects, Parquet) the keys become headers and no row is consumed.
    Row(usize),
    /// Use these names as headers; no row is consumed.
    Explicit(Vec<String>),
}

impl HeaderMode {
    /// Convenience constructor for [`HeaderMode::Explicit`].
    pub fn explicit<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self::Explicit(names.into_iter().map(Into::into).collect())
    }
}

/// A row-skipping rule, evaluated against every physical row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipRule {
    /// Skip the row with this 1-based physical number.
    Row(usize),
    /// Skip rows whose first cell is text starting with this prefix (case-sensitive).
    Prefix(String),
}

impl From<usize> for SkipRule {
    fn from(n: usize) -> Self {
        SkipRule::Row(n)
    }
}

impl From<&str> for SkipRule {
    fn from(s: &str) -> Self {
        SkipRule::Prefix(s.to_string())
    }
}

impl From<String> for SkipRule {
    fn from(s: String) -> Self {
        SkipRule::Prefix(s)
    }
}

/// Options controlling a [`super::Stream`].
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct StreamOptions {
    /// Header handling (default: none).
    pub headers: HeaderMode,
    /// Force a scheme instead of inferring it from the locator.
    pub scheme: Option<String>,
    /// Force a format instead of inferring it from the locator's extension.
    pub format: Option<String>,
    /// Character encoding label for text formats (default UTF-8).
    pub encoding: Option<String>,
    /// Accept content that sniffs as HTML.
    pub allow_html: bool,
    /// Physical rows read ahead at open (0 disables buffering). The header row and skipped rows
    /// count toward it, so `sample` holds the data rows among the first `sample_size` rows.
    pub sample_size: usize,
    /// Pass the buffered sample through `post_parse` before exposing it as `sample`.
    pub sample_post_parse: bool,
    /// Render every non-null value as text.
    pub force_strings: bool,
    /// Replace rows that fail to parse with empty rows instead of failing.
    pub force_parse: bool,
    /// Rows to drop before headers and sample are derived.
    pub skip_rows: Vec<SkipRule>,
    /// Processors applied, in order, after built-in stages.
    pub post_parse: Vec<Arc<dyn Processor>>,
    /// Extra loaders by scheme; they take precedence over built-ins.
    pub custom_loaders: HashMap<String, Arc<dyn Loader>>,
    /// Extra parsers by format; they take precedence over built-ins.
    pub custom_parsers: HashMap<String, Arc<dyn Parser>>,
    /// Extra writers by format; they take precedence over built-ins.
    pub custom_writers: HashMap<String, Arc<dyn Writer>>,
    /// Loader/Parser passthrough options.
    pub options: OptionMap,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn StreamObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: StreamSeverity,
}

impl fmt::Debug for StreamOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamOptions")
            .field("headers", &self.headers)
            .field("scheme", &self.scheme)
            .field("format", &self.format)
            .field("encoding", &self.encoding)
            .field("allow_html", &self.allow_html)
            .field("sample_size", &self.sample_size)
            .field("sample_post_parse", &self.sample_post_parse)
            .field("force_strings", &self.force_strings)
            .field("force_parse", &self.force_parse)
            .field("skip_rows", &self.skip_rows)
            .field("post_parse_len", &self.post_parse.len())
            .field("custom_loaders", &self.custom_loaders.keys().collect::<Vec<_>>())
            .field("custom_parsers", &self.custom_parsers.keys().collect::<Vec<_>>())
            .field("custom_writers", &self.custom_writers.keys().collect::<Vec<_>>())
            .field("options", &self.options)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            headers: HeaderMode::Absent,
            scheme: None,
            format: None,
            encoding: None,
            allow_html: false,
            sample_size: DEFAULT_SAMPLE_SIZE,
            sample_post_parse: true,
            force_strings: false,
            force_parse: false,
            skip_rows: Vec::new(),
            post_parse: Vec::new(),
            custom_loaders: HashMap::new(),
            custom_parsers: HashMap::new(),
            custom_writers: HashMap::new(),
            options: OptionMap::new(),
            observer: None,
            alert_at_or_above: StreamSeverity::Critical,
        }
    }
}

/// Options for [`super::Stream::save`].
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Force a writer format instead of inferring it from the target's extension.
    pub format: Option<String>,
    /// Writer passthrough options.
    pub options: OptionMap,
}
