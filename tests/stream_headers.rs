use tabular_stream::processing::headers_from_row;
use tabular_stream::stream::{HeaderMode, SkipRule, Source, Stream, StreamOptions};
use tabular_stream::types::{InlineRow, Value};

fn text(values: &[&str]) -> Vec<Value> {
    values.iter().map(|v| Value::from(*v)).collect()
}

fn with_headers(n: usize) -> StreamOptions {
    StreamOptions {
        headers: HeaderMode::Row(n),
        ..Default::default()
    }
}

#[test]
fn header_row_is_consumed_from_csv() {
    let mut stream = Stream::new("tests/fixtures/table.csv", with_headers(1));
    stream.open().unwrap();

    assert_eq!(stream.headers().unwrap().unwrap(), ["id", "name"]);
    let rows = stream.read_extended(None).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].row_number, 2);
    assert_eq!(rows[0].header_names().unwrap(), ["id", "name"]);
    assert_eq!(rows[0].row, text(&["1", "english"]));
    assert_eq!(rows[1].row_number, 3);
    assert_eq!(rows[1].row, text(&["2", "中国人"]));
}

#[test]
fn rows_before_the_header_row_are_dropped() {
    let source = Source::inline(vec![
        InlineRow::from(Vec::<Value>::new()),
        InlineRow::from(vec!["id", "name"]),
        InlineRow::from(vec!["1", "english"]),
        InlineRow::from(vec!["2", "中国人"]),
    ]);
    let mut stream = Stream::new(source, with_headers(2));
    stream.open().unwrap();

    assert_eq!(stream.headers().unwrap().unwrap(), ["id", "name"]);
    let numbers: Vec<_> = stream
        .read_extended(None)
        .unwrap()
        .iter()
        .map(|r| r.row_number)
        .collect();
    assert_eq!(numbers, vec![3, 4]);
}

#[test]
fn explicit_headers_consume_nothing() {
    let opts = StreamOptions {
        headers: HeaderMode::explicit(["key", "label"]),
        ..Default::default()
    };
    let mut stream = Stream::new("tests/fixtures/table.csv", opts);
    stream.open().unwrap();

    let rows = stream.read_keyed(None).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get("key"), Some(&Value::from("id")));
    assert_eq!(rows[2].get("label"), Some(&Value::from("中国人")));
}

#[test]
fn keyed_json_rows_derive_headers_from_keys() {
    let mut stream = Stream::new("tests/fixtures/table-keyed.json", with_headers(1));
    stream.open().unwrap();

    assert_eq!(stream.headers().unwrap().unwrap(), ["id", "name"]);
    let rows = stream.read_extended(None).unwrap();
    assert_eq!(rows[0].row_number, 1);
    assert_eq!(rows[0].row, vec![Value::Int64(1), Value::from("english")]);
    assert_eq!(rows[1].row, vec![Value::Int64(2), Value::from("中国人")]);
}

#[test]
fn keyed_inline_rows_align_to_first_row_and_fill_missing_keys() {
    let source = Source::inline(vec![
        InlineRow::keyed(vec![("id", Value::from(1)), ("name", Value::from("english"))]),
        InlineRow::keyed(vec![("name", Value::from("中国人"))]),
    ]);
    let mut stream = Stream::new(source, with_headers(1));
    stream.open().unwrap();

    let rows = stream.read_keyed(None).unwrap();
    assert_eq!(rows[0].get("id"), Some(&Value::Int64(1)));
    assert_eq!(rows[1].get("id"), Some(&Value::Null));
    assert_eq!(rows[1].get("name"), Some(&Value::from("中国人")));
}

#[test]
fn keyed_rows_without_header_mode_keep_natural_order() {
    let mut stream = Stream::new("tests/fixtures/table-keyed.json", StreamOptions::default());
    stream.open().unwrap();

    assert_eq!(stream.headers().unwrap(), None);
    assert_eq!(
        stream.read(None).unwrap(),
        vec![
            vec![Value::Int64(1), Value::from("english")],
            vec![Value::Int64(2), Value::from("中国人")],
        ]
    );
}

#[test]
fn skip_rows_by_prefix_and_number() {
    let opts = StreamOptions {
        skip_rows: vec![SkipRule::from("#"), SkipRule::Row(4)],
        ..Default::default()
    };
    let mut stream = Stream::new("tests/fixtures/skip-rows.csv", opts);
    stream.open().unwrap();
    assert_eq!(
        stream.read(None).unwrap(),
        vec![text(&["id", "name"]), text(&["1", "english"])]
    );
}

#[test]
fn header_row_is_the_first_surviving_row_at_or_after_its_number() {
    let opts = StreamOptions {
        headers: HeaderMode::Row(2),
        skip_rows: vec![SkipRule::from("#"), SkipRule::Row(1)],
        ..Default::default()
    };
    let mut stream = Stream::new("tests/fixtures/skip-rows.csv", opts);
    stream.open().unwrap();

    assert_eq!(stream.headers().unwrap().unwrap(), ["1", "english"]);
    let rows = stream.read_extended(None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].row_number, 4);
    assert_eq!(rows[0].row, text(&["2", "中国人"]));
}

#[test]
fn headers_can_be_assigned_by_a_processor() {
    let opts = StreamOptions {
        post_parse: vec![headers_from_row(1)],
        ..Default::default()
    };
    let mut stream = Stream::new("tests/fixtures/table.csv", opts);
    stream.open().unwrap();

    assert_eq!(stream.headers().unwrap(), None);
    let rows = stream.read_keyed(None).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("name"), Some(&Value::from("english")));
}

#[test]
fn sample_window_includes_the_header_row() {
    let opts = StreamOptions {
        headers: HeaderMode::Row(1),
        sample_size: 3,
        ..Default::default()
    };
    let mut stream = Stream::new("tests/fixtures/long.csv", opts);
    stream.open().unwrap();

    let expected = vec![text(&["1", "a"]), text(&["2", "b"])];
    assert_eq!(stream.sample().unwrap(), expected.as_slice());

    assert_eq!(stream.read(None).unwrap().len(), 6);
    assert_eq!(stream.sample().unwrap(), expected.as_slice());
}

#[test]
fn zero_sample_size_disables_buffering() {
    let opts = StreamOptions {
        headers: HeaderMode::Row(1),
        sample_size: 0,
        ..Default::default()
    };
    let mut stream = Stream::new("tests/fixtures/long.csv", opts);
    stream.open().unwrap();

    assert!(stream.sample().unwrap().is_empty());
    assert_eq!(stream.headers().unwrap().unwrap(), ["id", "name"]);
    assert_eq!(stream.read(None).unwrap().len(), 6);
}

#[test]
fn header_row_beyond_the_sample_is_an_options_error() {
    let opts = StreamOptions {
        headers: HeaderMode::Row(4),
        sample_size: 2,
        ..Default::default()
    };
    let mut stream = Stream::new("tests/fixtures/long.csv", opts);
    let err = stream.open().unwrap_err();
    assert!(matches!(err, tabular_stream::StreamError::Options { .. }));
}
