//! JSON writer.

use std::io::Write;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{StreamError, StreamResult};
use crate::parsers::bool_option;
use crate::stream::OptionMap;
use crate::types::Value;

use super::{create_target, WriteRows, Writer};

/// Writes a JSON array.
///
/// By default the array holds the header list (when known) followed by one array per row.
/// With option `keyed: true` it holds one object per row, keys in header order.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonWriter;

impl Writer for JsonWriter {
    fn options(&self) -> &[&'static str] {
        &["keyed"]
    }

    fn write(
        &self,
        rows: WriteRows<'_>,
        target: &str,
        headers: Option<&[String]>,
        options: &OptionMap,
    ) -> StreamResult<usize> {
        let keyed = bool_option(options, "keyed")?.unwrap_or(false);
        if keyed && headers.is_none() {
            return Err(StreamError::MissingHeaders);
        }

        let mut out = create_target(target)?;
        let io = |e: std::io::Error| StreamError::io_error(target, e);

        out.write_all(b"[").map_err(io)?;
        let mut first = true;
        let mut separator = |out: &mut dyn Write| -> std::io::Result<()> {
            if !std::mem::take(&mut first) {
                out.write_all(b",")?;
            }
            out.write_all(b"\n")
        };

        if let (false, Some(headers)) = (keyed, headers) {
            separator(&mut out).map_err(io)?;
            serde_json::to_writer(&mut out, headers)?;
        }

        let mut count = 0usize;
        for row in rows {
            let row = row?;
            separator(&mut out).map_err(io)?;
            match headers.filter(|_| keyed) {
                Some(headers) => serde_json::to_writer(
                    &mut out,
                    &KeyedObject {
                        headers,
                        values: &row,
                    },
                )?,
                None => serde_json::to_writer(&mut out, &row)?,
            }
            count += 1;
        }
        out.write_all(b"\n]\n").map_err(io)?;
        out.flush().map_err(io)?;
        Ok(count)
    }
}

/// One row as a JSON object whose keys follow header order.
struct KeyedObject<'a> {
    headers: &'a [String],
    values: &'a [Value],
}

impl Serialize for KeyedObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (idx, name) in self.headers.iter().enumerate() {
            map.serialize_entry(name, self.values.get(idx).unwrap_or(&Value::Null))?;
        }
        map.end()
    }
}
