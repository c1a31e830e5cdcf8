use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{ErrorKind, StreamError};

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StreamSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (the source could not be reached at all).
    Critical,
}

impl StreamSeverity {
    /// Severity assigned to a failure: unreachable sources are critical, everything else is an error.
    pub fn of(error: &StreamError) -> Self {
        match error.kind() {
            ErrorKind::Io | ErrorKind::Http => StreamSeverity::Critical,
            _ => StreamSeverity::Error,
        }
    }
}

/// Which stream an event belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamContext {
    /// Human-readable description of the source (locator, `<inline>`, `<reader>`, ...).
    pub source: String,
    /// Resolved scheme, once known.
    pub scheme: Option<String>,
    /// Resolved format, once known.
    pub format: Option<String>,
}

/// Counters reported when a stream closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamStats {
    /// Data rows handed to the caller since the last open or reset.
    pub rows: usize,
}

/// Observer interface for stream lifecycle events.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait StreamObserver: Send + Sync {
    /// Called after a successful `open` (and after every `reset`).
    fn on_open(&self, _ctx: &StreamContext) {}

    /// Called when an opened stream is closed.
    fn on_close(&self, _ctx: &StreamContext, _stats: StreamStats) {}

    /// Called when a stream operation fails.
    fn on_failure(&self, _ctx: &StreamContext, _severity: StreamSeverity, _error: &StreamError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &StreamContext, severity: StreamSeverity, error: &StreamError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Fans callbacks out to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn StreamObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn StreamObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl StreamObserver for CompositeObserver {
    fn on_open(&self, ctx: &StreamContext) {
        for o in &self.observers {
            o.on_open(ctx);
        }
    }

    fn on_close(&self, ctx: &StreamContext, stats: StreamStats) {
        for o in &self.observers {
            o.on_close(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &StreamContext, severity: StreamSeverity, error: &StreamError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &StreamContext, severity: StreamSeverity, error: &StreamError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs stream events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl StreamObserver for StdErrObserver {
    fn on_open(&self, ctx: &StreamContext) {
        eprintln!("[stream][open] {}", describe(ctx));
    }

    fn on_close(&self, ctx: &StreamContext, stats: StreamStats) {
        eprintln!("[stream][close] {} rows={}", describe(ctx), stats.rows);
    }

    fn on_failure(&self, ctx: &StreamContext, severity: StreamSeverity, error: &StreamError) {
        eprintln!("[stream][{severity:?}] {} err={error}", describe(ctx));
    }

    fn on_alert(&self, ctx: &StreamContext, severity: StreamSeverity, error: &StreamError) {
        eprintln!("[ALERT][stream][{severity:?}] {} err={error}", describe(ctx));
    }
}

/// Appends stream events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl StreamObserver for FileObserver {
    fn on_open(&self, ctx: &StreamContext) {
        self.append_line(&format!("{} open {}", unix_ts(), describe(ctx)));
    }

    fn on_close(&self, ctx: &StreamContext, stats: StreamStats) {
        self.append_line(&format!(
            "{} close {} rows={}",
            unix_ts(),
            describe(ctx),
            stats.rows
        ));
    }

    fn on_failure(&self, ctx: &StreamContext, severity: StreamSeverity, error: &StreamError) {
        self.append_line(&format!(
            "{} fail severity={severity:?} {} err={error}",
            unix_ts(),
            describe(ctx)
        ));
    }

    fn on_alert(&self, ctx: &StreamContext, severity: StreamSeverity, error: &StreamError) {
        self.append_line(&format!(
            "{} ALERT severity={severity:?} {} err={error}",
            unix_ts(),
            describe(ctx)
        ));
    }
}

fn describe(ctx: &StreamContext) -> String {
    format!(
        "source={} scheme={} format={}",
        ctx.source,
        ctx.scheme.as_deref().unwrap_or("-"),
        ctx.format.as_deref().unwrap_or("-")
    )
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
