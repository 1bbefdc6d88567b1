//! Header remapping: renaming raw sheet columns to their canonical names.

use std::collections::BTreeMap;

use polars::prelude::{Column, DataFrame};
use tracing::debug;

use contracts_model::EntityMapping;

use crate::error::{Result, TransformError};
use crate::frame::TableFrame;

/// Options for [`remap_headers`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RemapOptions {
    /// Drop columns that end up without a name instead of failing.
    pub drop_undefined: bool,
}

impl RemapOptions {
    /// Select mappings drop every column they do not name.
    pub fn for_mapping(mapping: &EntityMapping) -> Self {
        Self {
            drop_undefined: !mapping.keep_unmapped,
        }
    }
}

/// Renames the columns of `frame` according to `mapping`.
///
/// Columns the mapping does not mention keep their name when the mapping
/// keeps unmapped columns, and otherwise have no resulting name. A column
/// without a resulting name (including one whose header was blank) is dropped
/// when `options.drop_undefined` is set and is an error otherwise.
///
/// Row count and row order are unchanged. For select mappings every source
/// column the mapping names must be present.
pub fn remap_headers(
    frame: &TableFrame,
    mapping: &EntityMapping,
    options: RemapOptions,
) -> Result<TableFrame> {
    let table = frame.name.as_str();
    if frame.column_count() == 0 {
        return Err(TransformError::schema(table, "table has no columns"));
    }
    if !mapping.keep_unmapped {
        for source in mapping.source_columns() {
            if !frame.has_column(source) {
                return Err(TransformError::schema(
                    table,
                    format!("mapped column '{source}' is absent"),
                ));
            }
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(frame.column_count());
    let mut claimed: BTreeMap<String, String> = BTreeMap::new();
    let mut dropped = 0usize;

    for column in frame.data.get_columns() {
        let original = column.name().as_str();
        let target = match mapping.target_for(original) {
            Some(target) => Some(target),
            None if mapping.keep_unmapped => Some(original),
            None => None,
        }
        .filter(|name| !name.trim().is_empty());

        let Some(target) = target else {
            if options.drop_undefined {
                dropped += 1;
                continue;
            }
            return Err(TransformError::schema(
                table,
                format!("column '{original}' has no resulting name"),
            ));
        };

        if let Some(previous) = claimed.insert(target.to_string(), original.to_string()) {
            return Err(TransformError::schema(
                table,
                format!("columns '{previous}' and '{original}' both become '{target}'"),
            ));
        }

        if target == original {
            columns.push(column.clone());
        } else {
            columns.push(column.clone().with_name(target.into()));
        }
    }

    debug!(table, kept = columns.len(), dropped, "headers remapped");
    Ok(frame.with_data(DataFrame::new(columns)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_utils::string_frame;
    use contracts_model::{ColumnRename, EntityKind};

    #[test]
    fn renaming_keeps_values_in_place() {
        let data = string_frame(vec![
            ("id", vec![Some("1"), Some("2")]),
            ("title", vec![Some("Roads"), None]),
        ])
        .unwrap();
        let frame = TableFrame::for_entity(EntityKind::Tender, data);
        let mapping =
            EntityMapping::new(EntityKind::Tender, vec![ColumnRename::new("id", "tender_id")]);

        let out = remap_headers(&frame, &mapping, RemapOptions::default()).unwrap();
        assert_eq!(out.column_names(), vec!["tender_id", "title"]);
        assert_eq!(out.record_count(), 2);
    }
}
