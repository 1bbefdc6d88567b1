//! Column removal before publication.

use polars::prelude::{Column, DataFrame};
use tracing::debug;

use crate::error::Result;
use crate::frame::TableFrame;

/// Drops every column named in `denylist`. Names not present are ignored.
pub fn prune_columns<S: AsRef<str>>(frame: &TableFrame, denylist: &[S]) -> Result<TableFrame> {
    let denied = |name: &str| denylist.iter().any(|d| d.as_ref() == name);
    let (kept, removed): (Vec<&Column>, Vec<&Column>) = frame
        .data
        .get_columns()
        .iter()
        .partition(|column| !denied(column.name().as_str()));

    if removed.is_empty() {
        return Ok(frame.clone());
    }
    debug!(
        table = %frame.name,
        removed = ?removed.iter().map(|c| c.name().as_str()).collect::<Vec<_>>(),
        "columns pruned"
    );
    let columns: Vec<Column> = kept.into_iter().cloned().collect();
    Ok(frame.with_data(DataFrame::new(columns)?))
}
