//! CSV writing for interim tables and the published output.

use std::fs;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use polars::prelude::DataFrame;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::polars_utils::column_strings;

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| IngestError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Writes a header row followed by data rows. Short rows are padded with
/// empty fields so every record has the header's width.
pub fn write_csv_rows<I, R>(path: &Path, headers: &[String], rows: I) -> Result<usize>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[String]>,
{
    ensure_parent_dir(path)?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| IngestError::csv_write(path, e))?;
    writer
        .write_record(headers)
        .map_err(|e| IngestError::csv_write(path, e))?;
    let width = headers.len();
    let mut count = 0usize;
    for row in rows {
        let row = row.as_ref();
        let record = (0..width).map(|idx| row.get(idx).map(String::as_str).unwrap_or(""));
        writer
            .write_record(record)
            .map_err(|e| IngestError::csv_write(path, e))?;
        count += 1;
    }
    writer.flush().map_err(|e| IngestError::write(path, e))?;
    Ok(count)
}

/// Writes a DataFrame as CSV, nulls as empty fields.
pub fn write_csv_frame(df: &DataFrame, path: &Path) -> Result<()> {
    let headers: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let columns: Vec<Vec<Option<String>>> = df.get_columns().iter().map(column_strings).collect();
    let rows = (0..df.height()).map(|idx| {
        columns
            .iter()
            .map(|values| values[idx].clone().unwrap_or_default())
            .collect::<Vec<String>>()
    });
    let written = write_csv_rows(path, &headers, rows)?;
    debug!(path = %path.display(), rows = written, columns = headers.len(), "wrote csv");
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Writes a DataFrame next to `path` and renames it into place, so readers
/// either see the previous file or the complete new one.
pub fn publish_csv_frame(df: &DataFrame, path: &Path) -> Result<()> {
    let staging = staging_path(path);
    if let Err(error) = write_csv_frame(df, &staging) {
        let _ = fs::remove_file(&staging);
        return Err(error);
    }
    fs::rename(&staging, path).map_err(|source| {
        let _ = fs::remove_file(&staging);
        IngestError::write(path, source)
    })
}

#[cfg(test)]
mod tests {
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("name".into(), vec![Some("Example, Council"), None]).into_column(),
            Series::new("code".into(), vec![Some("E01"), Some("E02")]).into_column(),
        ])
        .unwrap()
    }

    #[test]
    fn writes_nulls_as_empty_and_quotes_delimiters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        write_csv_frame(&frame(), &path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "name,code\n\"Example, Council\",E01\n,E02\n");
    }

    #[test]
    fn publish_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("published.csv");
        fs::write(&path, "old\n").unwrap();
        publish_csv_frame(&frame(), &path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("name,code\n"));
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn pads_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        let headers = vec!["a".to_string(), "b".to_string()];
        let rows = vec![vec!["1".to_string()]];
        let count = write_csv_rows(&path, &headers, rows).unwrap();
        assert_eq!(count, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n1,\n");
    }
}
