//! CSV writer.


use crate::error::{StreamError, StreamResult};
use crate::parsers::char_option;
use crate::stream::OptionMap;

use super::{create_target, WriteRows, Writer};

/// Writes delimited text, with a header line when headers are known.
///
/// Options:
///
/// - `delimiter`: single ASCII character (default `,`)
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvWriter;

impl Writer for CsvWriter {
    fn options(&self) -> &[&'static str] {
        &["delimiter"]
    }

    fn write(
        &self,
        rows: WriteRows<'_>,
        target: &str,
        headers: Option<&[String]>,
        options: &OptionMap,
    ) -> StreamResult<usize> {
        let delimiter = char_option(options, "delimiter")?.unwrap_or(b',');
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_writer(create_target(target)?);

        if let Some(headers) = headers {
            writer.write_record(headers)?;
        }
        let mut count = 0usize;
        for row in rows {
            let row = row?;
            writer.write_record(row.iter().map(|v| v.to_string()))?;
            count += 1;
        }
        writer
            .flush()
            .map_err(|e| StreamError::io_error(target, e))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn writes_header_then_rows() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.csv");
        let mut rows = vec![
            Ok(vec![Value::from("1"), Value::from("english")]),
            Ok(vec![Value::Int64(2), Value::Null]),
        ]
        .into_iter();
        let headers = vec!["id".to_string(), "name".to_string()];

        let n = CsvWriter
            .write(&mut rows, target.to_str().unwrap(), Some(headers.as_slice()), &OptionMap::new())
            .unwrap();

        assert_eq!(n, 2);
        assert_eq!(
            std::fs::read_to_string(&target).unwrap(),
            "id,name\n1,english\n2,\n"
        );
    }

    #[test]
    fn honours_delimiter_option() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.csv");
        let mut rows = vec![Ok(vec![Value::from("a"), Value::from("b")])].into_iter();
        let mut opts = OptionMap::new();
        opts.insert("delimiter".to_string(), serde_json::json!(";"));

        CsvWriter
            .write(&mut rows, target.to_str().unwrap(), None, &opts)
            .unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "a;b\n");
    }
}
