//! DataFrame construction helpers shared by the transforms.

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};

use crate::error::{Result, TransformError};
use crate::frame::TableFrame;

/// Builds a string column from optional values.
pub fn string_column(name: &str, values: Vec<Option<String>>) -> Column {
    Series::new(name.into(), values).into_column()
}

/// Builds a string-typed DataFrame from `(name, values)` pairs.
pub fn string_frame(columns: Vec<(&str, Vec<Option<&str>>)>) -> Result<DataFrame> {
    let columns: Vec<Column> = columns
        .into_iter()
        .map(|(name, values)| {
            string_column(
                name,
                values.into_iter().map(|v| v.map(str::to_string)).collect(),
            )
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Returns the named column or a schema mismatch naming the table.
pub fn require_column<'a>(frame: &'a TableFrame, column: &str) -> Result<&'a Column> {
    frame.data.column(column).map_err(|_| {
        TransformError::schema(
            frame.name.as_str(),
            format!("expected column '{column}' is absent"),
        )
    })
}
