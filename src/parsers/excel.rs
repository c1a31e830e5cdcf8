#![cfg(feature = "excel")]

use std::io::{Cursor, Read};

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::error::{StreamError, StreamResult};
use crate::loaders::LoadMode;
use crate::stream::OptionMap;
use crate::types::Value;

use super::{expect_reader, Parser, ParserInput, RawRow, RawRows};

/// Spreadsheet parser (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`).
///
/// Behavior:
/// - Reads the sheet named (or 1-based indexed) by the `sheet` option; otherwise the first sheet
/// - Row numbers follow sheet rows: leading blank rows and columns are kept as empty cells
/// - Cells keep their native types (numbers, booleans, text); blank cells are [`Value::Null`]
#[derive(Debug, Default, Clone, Copy)]
pub struct ExcelParser;

impl Parser for ExcelParser {
    fn options(&self) -> &[&'static str] {
        &["sheet"]
    }

    fn mode(&self) -> LoadMode {
        LoadMode::Binary
    }

    fn open(&self, input: ParserInput, options: &OptionMap) -> StreamResult<RawRows> {
        let mut reader = expect_reader(input, "excel")?;
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|e| StreamError::io_error("excel", e))?;

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(buf))?;
        let sheets = workbook.sheet_names().to_vec();
        let sheet = select_sheet(&sheets, options)?;
        let range = workbook.worksheet_range(&sheet)?;

        let (first_row, first_col) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<RawRow> = (0..first_row).map(|_| RawRow::Values(Vec::new())).collect();
        for row in range.rows() {
            let mut values: Vec<Value> = (0..first_col).map(|_| Value::Null).collect();
            values.extend(row.iter().map(convert_cell));
            rows.push(RawRow::Values(values));
        }

        Ok(Box::new(rows.into_iter().map(Ok)))
    }
}

fn select_sheet(sheets: &[String], options: &OptionMap) -> StreamResult<String> {
    if sheets.is_empty() {
        return Err(StreamError::source_error("workbook has no sheets"));
    }
    match options.get("sheet") {
        None => Ok(sheets[0].clone()),
        Some(serde_json::Value::String(name)) => sheets
            .iter()
            .find(|s| *s == name)
            .cloned()
            .ok_or_else(|| StreamError::source_error(format!("sheet '{name}' not found. sheets={sheets:?}"))),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .and_then(|i| usize::try_from(i).ok())
            .filter(|&i| i >= 1 && i <= sheets.len())
            .map(|i| sheets[i - 1].clone())
            .ok_or_else(|| StreamError::source_error(format!("sheet index {n} out of range (1..={})", sheets.len()))),
        Some(other) => Err(StreamError::options_error(format!(
            "option 'sheet' must be a sheet name or a 1-based index, got {other}"
        ))),
    }
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::String(s) => Value::Utf8(s.clone()),
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Utf8(s.clone()),
        other => Value::Utf8(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["People".to_string(), "Other".to_string()]
    }

    #[test]
    fn selects_first_sheet_by_default() {
        assert_eq!(select_sheet(&names(), &OptionMap::new()).unwrap(), "People");
    }

    #[test]
    fn selects_by_name_and_index() {
        let mut opts = OptionMap::new();
        opts.insert("sheet".to_string(), serde_json::json!("Other"));
        assert_eq!(select_sheet(&names(), &opts).unwrap(), "Other");

        opts.insert("sheet".to_string(), serde_json::json!(2));
        assert_eq!(select_sheet(&names(), &opts).unwrap(), "Other");

        opts.insert("sheet".to_string(), serde_json::json!(3));
        assert!(select_sheet(&names(), &opts).is_err());
    }

    #[test]
    fn blank_cells_are_null() {
        assert_eq!(convert_cell(&Data::Empty), Value::Null);
        assert_eq!(convert_cell(&Data::Int(3)), Value::Int64(3));
    }
}
