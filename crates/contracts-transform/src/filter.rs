//! Row filtering on resolved values.

use polars::prelude::{BooleanChunked, NewChunkedArray};
use tracing::debug;

use contracts_ingest::{column_strings, is_present};

use crate::data_utils::require_column;
use crate::error::Result;
use crate::frame::TableFrame;

/// Keeps the rows whose `column` holds a non-blank value, in order.
pub fn retain_resolved(frame: &TableFrame, column: &str) -> Result<TableFrame> {
    let keep: Vec<bool> = column_strings(require_column(frame, column)?)
        .iter()
        .map(|value| is_present(value.as_deref()))
        .collect();
    let mask = BooleanChunked::from_slice("resolved".into(), &keep);
    let data = frame.data.filter(&mask)?;

    debug!(
        table = %frame.name,
        column,
        kept = data.height(),
        removed = frame.record_count() - data.height(),
        "rows filtered"
    );
    Ok(frame.with_data(data))
}
