//! Polars value helpers.
//!
//! Pipeline tables are string-typed, but frames built by hand or by other
//! readers may carry numeric columns, so every accessor goes through
//! [`any_to_string`] rather than assuming a `str` column.

use polars::prelude::{AnyValue, Column, DataFrame, DataType};

/// Converts a Polars AnyValue to a String representation.
/// Returns empty string for Null, formats floats without trailing zeros.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Converts an AnyValue to `None` for Null, otherwise its string form.
pub fn any_to_optional_string(value: AnyValue<'_>) -> Option<String> {
    match value {
        AnyValue::Null => None,
        other => Some(any_to_string(other)),
    }
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        return format!("{}", v as i64);
    }
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Materializes a column as optional strings, one per row.
pub fn column_strings(col: &Column) -> Vec<Option<String>> {
    if let Ok(chunked) = col.str() {
        return chunked.iter().map(|value| value.map(str::to_string)).collect();
    }
    let str_col = col
        .cast(&DataType::String)
        .map(Column::take_materialized_series)
        .unwrap_or_else(|_| col.as_materialized_series().clone());
    match str_col.str() {
        Ok(chunked) => chunked.iter().map(|value| value.map(str::to_string)).collect(),
        Err(_) => (0..col.len())
            .map(|idx| col.get(idx).ok().and_then(any_to_optional_string))
            .collect(),
    }
}

/// Returns the value of `column` at `idx`, or `None` for nulls and
/// out-of-range lookups.
pub fn cell_string(df: &DataFrame, column: &str, idx: usize) -> Option<String> {
    df.column(column)
        .ok()
        .and_then(|col| col.get(idx).ok())
        .and_then(any_to_optional_string)
}

/// True when a cell holds something other than whitespace.
pub fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    use super::*;

    #[test]
    fn formats_floats_without_trailing_zeros() {
        assert_eq!(format_numeric(12.0), "12");
        assert_eq!(format_numeric(12.50), "12.5");
        assert_eq!(format_numeric(-0.25), "-0.25");
    }

    #[test]
    fn column_strings_keeps_nulls() {
        let col = Series::new("A".into(), vec![Some("x"), None, Some("")]).into_column();
        assert_eq!(
            column_strings(&col),
            vec![Some("x".to_string()), None, Some(String::new())]
        );
    }

    #[test]
    fn column_strings_casts_numbers() {
        let col = Series::new("N".into(), vec![Some(1i64), None]).into_column();
        assert_eq!(column_strings(&col), vec![Some("1".to_string()), None]);
    }

    #[test]
    fn presence_ignores_whitespace() {
        assert!(is_present(Some("E01")));
        assert!(!is_present(Some("  ")));
        assert!(!is_present(None));
    }
}
