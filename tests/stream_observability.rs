use std::sync::{Arc, Mutex};

use tabular_stream::StreamError;
use tabular_stream::stream::{
    FileObserver, HeaderMode, Stream, StreamContext, StreamObserver, StreamOptions,
    StreamSeverity, StreamStats,
};

#[derive(Default)]
struct RecordingObserver {
    opens: Mutex<Vec<StreamContext>>,
    closes: Mutex<Vec<StreamStats>>,
    failures: Mutex<Vec<StreamSeverity>>,
    alerts: Mutex<Vec<StreamSeverity>>,
}

impl StreamObserver for RecordingObserver {
    fn on_open(&self, ctx: &StreamContext) {
        self.opens.lock().unwrap().push(ctx.clone());
    }

    fn on_close(&self, _ctx: &StreamContext, stats: StreamStats) {
        self.closes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &StreamContext, severity: StreamSeverity, _error: &StreamError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &StreamContext, severity: StreamSeverity, _error: &StreamError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn observed(obs: &Arc<RecordingObserver>, alert_at_or_above: StreamSeverity) -> StreamOptions {
    StreamOptions {
        observer: Some(obs.clone()),
        alert_at_or_above,
        ..Default::default()
    }
}

#[test]
fn missing_file_is_critical_and_alerts() {
    let obs = Arc::new(RecordingObserver::default());
    let mut stream = Stream::new(
        "tests/fixtures/does_not_exist.csv",
        observed(&obs, StreamSeverity::Critical),
    );
    let _ = stream.open().unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![StreamSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![StreamSeverity::Critical]);
    assert!(obs.opens.lock().unwrap().is_empty());
}

#[test]
fn format_error_is_below_the_default_alert_threshold() {
    let obs = Arc::new(RecordingObserver::default());
    let mut opts = observed(&obs, StreamSeverity::Critical);
    opts.format = Some("bad_format".to_string());
    let mut stream = Stream::new("tests/fixtures/table.csv", opts);
    let _ = stream.open().unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![StreamSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn lower_threshold_alerts_on_errors() {
    let obs = Arc::new(RecordingObserver::default());
    let mut opts = observed(&obs, StreamSeverity::Error);
    opts.format = Some("bad_format".to_string());
    let mut stream = Stream::new("tests/fixtures/table.csv", opts);
    let _ = stream.open().unwrap_err();

    assert_eq!(*obs.alerts.lock().unwrap(), vec![StreamSeverity::Error]);
}

#[test]
fn open_and_close_are_reported_with_row_counts() {
    let obs = Arc::new(RecordingObserver::default());
    let mut opts = observed(&obs, StreamSeverity::Critical);
    opts.headers = HeaderMode::Row(1);
    {
        let mut stream = Stream::new("tests/fixtures/table.csv", opts);
        stream.open().unwrap();
        stream.read(None).unwrap();
        // Dropping the stream closes it.
    }

    let opens = obs.opens.lock().unwrap();
    assert_eq!(opens.len(), 1);
    assert_eq!(opens[0].source, "tests/fixtures/table.csv");
    assert_eq!(opens[0].scheme.as_deref(), Some("file"));
    assert_eq!(opens[0].format.as_deref(), Some("csv"));
    assert_eq!(*obs.closes.lock().unwrap(), vec![StreamStats { rows: 2 }]);
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn reset_reports_a_new_open() {
    let obs = Arc::new(RecordingObserver::default());
    let mut stream = Stream::new(
        "tests/fixtures/table.csv",
        observed(&obs, StreamSeverity::Critical),
    );
    stream.open().unwrap();
    stream.reset().unwrap();
    stream.close();

    assert_eq!(obs.opens.lock().unwrap().len(), 2);
    assert_eq!(obs.closes.lock().unwrap().len(), 1);
}

#[test]
fn file_observer_logs_failures() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("stream.log");
    let opts = StreamOptions {
        observer: Some(Arc::new(FileObserver::new(&log))),
        ..Default::default()
    };
    let mut stream = Stream::new("tests/fixtures/does_not_exist.csv", opts);
    let _ = stream.open().unwrap_err();

    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.contains("fail severity=Critical"));
    assert!(text.contains("ALERT severity=Critical"));
    assert!(text.contains("does_not_exist.csv"));
}
