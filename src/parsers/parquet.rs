//! Parquet parser.

use std::io::{BufRead, Read};

use ::parquet::file::serialized_reader::SerializedFileReader;
use ::parquet::record::reader::RowIter;
use ::parquet::record::Field;

use crate::error::{StreamError, StreamResult};
use crate::loaders::LoadMode;
use crate::stream::OptionMap;
use crate::types::Value;

use super::{expect_reader, Parser, ParserInput, RawRow, RawRows};

/// Reads Parquet files through the record API.
///
/// Notes:
/// - Every record is a keyed row; keys are the top-level column names in schema order
/// - Nested groups, lists, and maps are rendered as text
/// - The file is buffered in memory, since Parquet footers are read first
#[derive(Debug, Default, Clone, Copy)]
pub struct ParquetParser;

impl Parser for ParquetParser {
    fn mode(&self) -> LoadMode {
        LoadMode::Binary
    }

    fn open(&self, input: ParserInput, _options: &OptionMap) -> StreamResult<RawRows> {
        let mut reader: Box<dyn BufRead> = expect_reader(input, "parquet")?;
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|e| StreamError::io_error("parquet", e))?;

        let file = SerializedFileReader::new(bytes::Bytes::from(buf))?;
        let rows = RowIter::from_file_into(Box::new(file));
        Ok(Box::new(rows.map(|row| -> StreamResult<RawRow> {
            let row = row?;
            Ok(RawRow::Keyed(
                row.get_column_iter()
                    .map(|(name, field)| (name.clone(), convert_parquet_field(field)))
                    .collect(),
            ))
        })))
    }
}

fn convert_parquet_field(f: &Field) -> Value {
    match f {
        Field::Null => Value::Null,
        Field::Bool(b) => Value::Bool(*b),
        Field::Byte(v) => Value::Int64(i64::from(*v)),
        Field::Short(v) => Value::Int64(i64::from(*v)),
        Field::Int(v) => Value::Int64(i64::from(*v)),
        Field::Long(v) => Value::Int64(*v),
        Field::UByte(v) => Value::Int64(i64::from(*v)),
        Field::UShort(v) => Value::Int64(i64::from(*v)),
        Field::UInt(v) => Value::Int64(i64::from(*v)),
        Field::ULong(v) => i64::try_from(*v)
            .map(Value::Int64)
            .unwrap_or_else(|_| Value::Utf8(v.to_string())),
        Field::Float(v) => Value::Float64(f64::from(*v)),
        Field::Double(v) => Value::Float64(*v),
        Field::Str(s) => Value::Utf8(s.clone()),
        other => Value::Utf8(other.to_string()),
    }
}
