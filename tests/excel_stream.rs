#![cfg(feature = "excel_test_writer")]

use std::path::Path;

use tabular_stream::stream::{HeaderMode, OptionMap, Stream, StreamOptions};
use tabular_stream::types::Value;

fn write_people_xlsx(path: &Path) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();

    let ws1 = wb.add_worksheet();
    ws1.set_name("People").unwrap();
    ws1.write_string(0, 0, "id").unwrap();
    ws1.write_string(0, 1, "name").unwrap();
    ws1.write_string(0, 2, "active").unwrap();
    ws1.write_number(1, 0, 1).unwrap();
    ws1.write_string(1, 1, "Ada").unwrap();
    ws1.write_boolean(1, 2, true).unwrap();
    ws1.write_number(2, 0, 2).unwrap();
    ws1.write_string(2, 1, "Grace").unwrap();
    ws1.write_boolean(2, 2, false).unwrap();

    // Data starts on the third row; the first two are blank.
    let ws2 = wb.add_worksheet();
    ws2.set_name("Offset").unwrap();
    ws2.write_string(2, 0, "id").unwrap();
    ws2.write_number(3, 0, 3).unwrap();

    wb.save(path).unwrap();
}

fn options(headers: HeaderMode, sheet: Option<serde_json::Value>) -> StreamOptions {
    let mut options = OptionMap::new();
    if let Some(sheet) = sheet {
        options.insert("sheet".to_string(), sheet);
    }
    StreamOptions {
        headers,
        force_strings: true,
        options,
        ..Default::default()
    }
}

#[test]
fn first_sheet_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.xlsx");
    write_people_xlsx(&path);

    let mut stream = Stream::new(path.as_path(), options(HeaderMode::Row(1), None));
    stream.open().unwrap();
    assert_eq!(stream.headers().unwrap().unwrap(), ["id", "name", "active"]);

    let rows = stream.read_extended(None).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].row_number, 2);
    assert_eq!(
        rows[0].row,
        vec![Value::from("1"), Value::from("Ada"), Value::from("true")]
    );
}

#[test]
fn sheet_by_name_keeps_physical_row_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.xlsx");
    write_people_xlsx(&path);

    let opts = options(HeaderMode::Row(3), Some(serde_json::json!("Offset")));
    let mut stream = Stream::new(path.as_path(), opts);
    stream.open().unwrap();
    assert_eq!(stream.headers().unwrap().unwrap(), ["id"]);

    let rows = stream.read_extended(None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].row_number, 4);
    assert_eq!(rows[0].row, vec![Value::from("3")]);
}

#[test]
fn sheet_by_index_and_missing_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.xlsx");
    write_people_xlsx(&path);

    let mut stream = Stream::new(
        path.as_path(),
        options(HeaderMode::Absent, Some(serde_json::json!(2))),
    );
    stream.open().unwrap();
    assert_eq!(stream.read(None).unwrap().len(), 4);

    let mut stream = Stream::new(
        path.as_path(),
        options(HeaderMode::Absent, Some(serde_json::json!("Nope"))),
    );
    let err = stream.open().unwrap_err();
    assert!(err.to_string().contains("Nope"));
}
