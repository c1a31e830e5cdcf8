//! Row-dropping processors.

use std::sync::Arc;

use crate::types::{ExtendedRow, Value};

use super::{Processor, RowStream};

/// Keep only rows for which `predicate` returns `true`.
///
/// Kept rows retain their original row numbers.
pub fn filter_rows<F>(predicate: F) -> Arc<dyn Processor>
where
    F: Fn(&ExtendedRow) -> bool + 'static,
{
    let predicate = Arc::new(predicate);
    Arc::new(move |rows: RowStream| -> RowStream {
        let predicate = Arc::clone(&predicate);
        Box::new(rows.filter(move |row| predicate(row)))
    })
}

/// Drop rows that are empty or contain only nulls and empty strings.
pub fn skip_blank_rows() -> Arc<dyn Processor> {
    filter_rows(|row| !row.row.iter().all(is_blank))
}

/// Drop rows whose first cell is text starting with `prefix`.
pub fn skip_commented_rows(prefix: impl Into<String>) -> Arc<dyn Processor> {
    let prefix = prefix.into();
    filter_rows(move |row| {
        !matches!(row.row.first(), Some(Value::Utf8(s)) if s.starts_with(prefix.as_str()))
    })
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Utf8(s) => s.is_empty(),
        _ => false,
    }
}
