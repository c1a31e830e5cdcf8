//! Assign headers from the data itself.

use std::sync::Arc;

use crate::types::{Headers, Value};

use super::{Processor, RowStream};

/// Promote the row with physical number `row_number` to headers for every following row.
///
/// Rows before it are passed through untouched. Use with built-in header extraction disabled
/// ([`crate::stream::HeaderMode::Absent`]) so the header row is not consumed twice.
pub fn headers_from_row(row_number: usize) -> Arc<dyn Processor> {
    Arc::new(move |rows: RowStream| -> RowStream {
        let mut current: Option<Headers> = None;
        Box::new(rows.filter_map(move |mut row| {
            if row.row_number == row_number {
                current = Some(row.row.iter().map(Value::to_string).collect());
                return None;
            }
            if current.is_some() {
                row.headers = current.clone();
            }
            Some(row)
        }))
    })
}
