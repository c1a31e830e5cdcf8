use tabular_stream::error::ErrorKind;
use tabular_stream::stream::{HeaderMode, Stream, StreamOptions};

const REMOTE_CSV: &str =
    "https://raw.githubusercontent.com/frictionlessdata/tabulator-py/master/data/table.csv";

#[test]
#[ignore]
fn remote_csv_over_https() {
    // Needs network access; run with: `cargo test -- --ignored`
    let opts = StreamOptions {
        headers: HeaderMode::Row(1),
        ..Default::default()
    };
    let mut stream = Stream::new(REMOTE_CSV, opts);
    stream.open().unwrap();
    assert_eq!(stream.scheme(), Some("https"));
    assert_eq!(stream.headers().unwrap().unwrap(), ["id", "name"]);
    assert_eq!(stream.read(None).unwrap().len(), 2);

    stream.reset().unwrap();
    assert_eq!(stream.read(None).unwrap().len(), 2);
}

#[test]
fn unreachable_host_is_http_error() {
    let mut options = tabular_stream::stream::OptionMap::new();
    options.insert("timeout".to_string(), serde_json::json!(2));
    let opts = StreamOptions {
        options,
        ..Default::default()
    };
    let mut stream = Stream::new("http://127.0.0.1:9/table.csv", opts);
    let err = stream.open().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Http);
}
