use thiserror::Error;

/// Convenience result type for stream operations.
pub type StreamResult<T> = Result<T, StreamError>;

/// Error type returned by every [`crate::stream::Stream`] operation.
///
/// This is a single error enum shared by resolution, loading, parsing, and writing, so callers
/// can match on the failure class without knowing which Loader/Parser/Writer was selected.
#[derive(Debug, Error)]
pub enum StreamError {
    /// No Loader is registered for the resolved or declared scheme.
    #[error("scheme error: scheme '{scheme}' is not supported")]
    Scheme { scheme: String },

    /// No Parser/Writer for the format, or sniffed content is incompatible with it.
    #[error("format error: {message}")]
    Format { message: String },

    /// An option not declared by the selected Loader/Parser/Writer, or an invalid option value.
    #[error("options error: {message}")]
    Options { message: String },

    /// Local resource unreachable (missing file, permission denied, read failure).
    #[error("io error: {locator}: {source}")]
    Io {
        locator: String,
        #[source]
        source: std::io::Error,
    },

    /// Remote resource unreachable or answered with a failure status.
    #[error("http error: {url}: {message}")]
    Http { url: String, message: String },

    /// Bytes are reachable but cannot be decoded as the declared format.
    #[error("source error: {message}")]
    Source { message: String },

    /// `reset` requested on a source that cannot be replayed.
    #[error("reset error: {message}")]
    Reset { message: String },

    /// A keyed view was requested but the stream has no headers.
    #[error("keyed rows require headers, but the stream has none")]
    MissingHeaders,

    /// Operation attempted before `open`.
    #[error("stream is not opened")]
    NotOpen,

    /// Operation attempted after `close`.
    #[error("stream is closed")]
    Closed,
}

impl StreamError {
    pub(crate) fn format_error(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    pub(crate) fn options_error(message: impl Into<String>) -> Self {
        Self::Options {
            message: message.into(),
        }
    }

    pub(crate) fn source_error(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    pub(crate) fn io_error(locator: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            locator: locator.into(),
            source,
        }
    }

    /// Coarse classification used by observers and for `force_parse` decisions.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Scheme { .. } => ErrorKind::Scheme,
            Self::Format { .. } => ErrorKind::Format,
            Self::Options { .. } => ErrorKind::Options,
            Self::Io { .. } => ErrorKind::Io,
            Self::Http { .. } => ErrorKind::Http,
            Self::Source { .. } => ErrorKind::Source,
            Self::Reset { .. } => ErrorKind::Reset,
            Self::MissingHeaders | Self::NotOpen | Self::Closed => ErrorKind::State,
        }
    }
}

/// Failure class of a [`StreamError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Scheme,
    Format,
    Options,
    Io,
    Http,
    Source,
    Reset,
    /// Lifecycle misuse (not opened, closed, no headers for a keyed view).
    State,
}

impl From<csv::Error> for StreamError {
    fn from(err: csv::Error) -> Self {
        if !err.is_io_error() {
            return StreamError::source_error(format!("csv: {err}"));
        }
        match err.into_kind() {
            csv::ErrorKind::Io(e) => StreamError::io_error("csv", e),
            other => StreamError::source_error(format!("csv: {other:?}")),
        }
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        StreamError::source_error(format!("json: {err}"))
    }
}

impl From<parquet::errors::ParquetError> for StreamError {
    fn from(err: parquet::errors::ParquetError) -> Self {
        StreamError::source_error(format!("parquet: {err}"))
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        StreamError::Http {
            url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "excel")]
impl From<calamine::Error> for StreamError {
    fn from(err: calamine::Error) -> Self {
        StreamError::source_error(format!("excel: {err}"))
    }
}
