//! Row-rewriting processors.

use std::sync::Arc;

use crate::types::Value;

use super::{Processor, RowStream};

/// Replace every row's values with `mapper(values)`.
///
/// Row numbers and headers pass through unchanged. Unlike a fixed-schema dataset, the mapped row
/// may change arity.
pub fn map_rows<F>(mapper: F) -> Arc<dyn Processor>
where
    F: Fn(&[Value]) -> Vec<Value> + 'static,
{
    let mapper = Arc::new(mapper);
    Arc::new(move |rows: RowStream| -> RowStream {
        let mapper = Arc::clone(&mapper);
        Box::new(rows.map(move |mut row| {
            row.row = mapper(row.row.as_slice());
            row
        }))
    })
}
