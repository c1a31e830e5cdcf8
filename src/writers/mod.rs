//! Writers: serialize a row sequence to a target.
//!
//! [`crate::stream::Stream::save`] resolves a writer by format (explicit, else the target's
//! extension), validates the passthrough options against [`Writer::options`], then hands the
//! remaining rows over.

pub mod csv;
pub mod json;

use std::fs::File;
use std::io::BufWriter;

use crate::error::{StreamError, StreamResult};
use crate::loaders::strip_scheme;
use crate::stream::OptionMap;
use crate::types::Value;

pub use self::csv::CsvWriter;
pub use self::json::JsonWriter;

/// Rows handed to a writer. An `Err` item aborts the write.
pub type WriteRows<'a> = &'a mut dyn Iterator<Item = StreamResult<Vec<Value>>>;

/// Serialization for one target format.
pub trait Writer {
    /// Option names this writer accepts.
    fn options(&self) -> &[&'static str] {
        &[]
    }

    /// Write every row to `target` and return the number of data rows written.
    fn write(
        &self,
        rows: WriteRows<'_>,
        target: &str,
        headers: Option<&[String]>,
        options: &OptionMap,
    ) -> StreamResult<usize>;
}

/// Create (or truncate) the local file behind `target`.
pub(crate) fn create_target(target: &str) -> StreamResult<BufWriter<File>> {
    let path = strip_scheme(target, "file");
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| StreamError::io_error(path, e))
}
