//! Left joins on the release link.
//!
//! Joins here are row-index gathers over string columns. Every base row
//! survives; a base row with several matching auxiliary rows fans out into one
//! row per match, in auxiliary row order.

use std::collections::{BTreeSet, HashMap, HashSet};

use polars::prelude::{Column, DataFrame};
use tracing::debug;

use contracts_ingest::column_strings;

use crate::data_utils::string_column;
use crate::error::{Result, TransformError};
use crate::frame::TableFrame;

/// Row counts from one join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub base_rows: usize,
    pub output_rows: usize,
    /// Base rows with at least one match.
    pub matched: usize,
    /// Base rows that matched nothing and carry nulls on the auxiliary side.
    pub unmatched: usize,
}

/// Left-joins `aux` onto `base` on `key`.
///
/// The key column appears once, taken from `base`. Non-key columns present on
/// both sides are renamed with each table's [`TableFrame::join_suffix`]. Null
/// or blank keys never match. The result keeps the identity of `base`.
pub fn left_join(
    base: &TableFrame,
    aux: &TableFrame,
    key: &str,
) -> Result<(TableFrame, JoinStats)> {
    let base_keys = join_keys(base, key)?;
    let aux_keys = join_keys(aux, key)?;

    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (row, value) in aux_keys.iter().enumerate() {
        if let Some(value) = normalized_key(value) {
            index.entry(value).or_default().push(row);
        }
    }

    let mut base_rows: Vec<usize> = Vec::with_capacity(base_keys.len());
    let mut aux_rows: Vec<Option<usize>> = Vec::with_capacity(base_keys.len());
    let mut stats = JoinStats {
        base_rows: base_keys.len(),
        ..JoinStats::default()
    };
    for (row, value) in base_keys.iter().enumerate() {
        match normalized_key(value).and_then(|v| index.get(v)) {
            Some(matches) => {
                stats.matched += 1;
                for &aux_row in matches {
                    base_rows.push(row);
                    aux_rows.push(Some(aux_row));
                }
            }
            None => {
                stats.unmatched += 1;
                base_rows.push(row);
                aux_rows.push(None);
            }
        }
    }
    stats.output_rows = base_rows.len();

    let (base_names, aux_names) = output_names(base, aux, key)?;

    let mut columns: Vec<Column> = Vec::with_capacity(base_names.len() + aux_names.len());
    for (column, name) in base.data.get_columns().iter().zip(&base_names) {
        let values = column_strings(column);
        let gathered = base_rows.iter().map(|&r| values[r].clone()).collect();
        columns.push(string_column(name, gathered));
    }
    for (column, name) in aux
        .data
        .get_columns()
        .iter()
        .filter(|c| c.name().as_str() != key)
        .zip(&aux_names)
    {
        let values = column_strings(column);
        let gathered = aux_rows
            .iter()
            .map(|r| r.and_then(|r| values[r].clone()))
            .collect();
        columns.push(string_column(name, gathered));
    }

    debug!(
        base = %base.name,
        aux = %aux.name,
        key,
        base_rows = stats.base_rows,
        output_rows = stats.output_rows,
        matched = stats.matched,
        unmatched = stats.unmatched,
        "left join"
    );
    Ok((base.with_data(DataFrame::new(columns)?), stats))
}

/// Left-joins each of `steps` onto `base` in order.
pub fn join_all(
    base: &TableFrame,
    steps: &[&TableFrame],
    key: &str,
) -> Result<(TableFrame, Vec<JoinStats>)> {
    let mut joined = base.clone();
    let mut stats = Vec::with_capacity(steps.len());
    for aux in steps {
        let (next, step) = left_join(&joined, aux, key)?;
        joined = next;
        stats.push(step);
    }
    Ok((joined, stats))
}

fn join_keys(frame: &TableFrame, key: &str) -> Result<Vec<Option<String>>> {
    let column = frame
        .data
        .column(key)
        .map_err(|_| TransformError::MissingJoinKey {
            key: key.to_string(),
            table: frame.name.clone(),
        })?;
    Ok(column_strings(column))
}

fn normalized_key(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Output column names for both sides, aux names excluding the key.
fn output_names(
    base: &TableFrame,
    aux: &TableFrame,
    key: &str,
) -> Result<(Vec<String>, Vec<String>)> {
    let base_cols = base.column_names();
    let aux_cols: Vec<String> = aux
        .column_names()
        .into_iter()
        .filter(|name| name != key)
        .collect();

    let base_set: HashSet<&str> = base_cols.iter().map(String::as_str).collect();
    let collisions: BTreeSet<&str> = aux_cols
        .iter()
        .map(String::as_str)
        .filter(|name| *name != key && base_set.contains(name))
        .collect();

    let base_suffix = base.join_suffix();
    let aux_suffix = aux.join_suffix();
    let rename = |name: &str, suffix: &str| {
        if collisions.contains(name) {
            format!("{name}{suffix}")
        } else {
            name.to_string()
        }
    };
    let base_names: Vec<String> = base_cols.iter().map(|n| rename(n, &base_suffix)).collect();
    let aux_names: Vec<String> = aux_cols.iter().map(|n| rename(n, &aux_suffix)).collect();

    let mut seen: HashSet<&str> = HashSet::new();
    for name in base_names.iter().chain(&aux_names) {
        if !seen.insert(name.as_str()) {
            return Err(TransformError::schema(
                format!("{} + {}", base.name, aux.name),
                format!("joined column '{name}' would appear twice"),
            ));
        }
    }
    if !collisions.is_empty() {
        debug!(
            base = %base.name,
            aux = %aux.name,
            columns = ?collisions,
            "suffixed colliding columns"
        );
    }
    Ok((base_names, aux_names))
}
