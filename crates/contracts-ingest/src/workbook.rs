//! Splitting the source workbook into one CSV per sheet.

use std::path::{Path, PathBuf};

use calamine::{Data, DataType, Reader, open_workbook_auto};
use tracing::{debug, info, info_span};

use crate::csv_io::write_csv_rows;
use crate::error::{IngestError, Result};
use crate::polars_utils::format_numeric;

/// One sheet written to disk.
#[derive(Debug, Clone)]
pub struct RawSheet {
    pub name: String,
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

/// Renders a workbook cell the way it should appear in CSV.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_numeric(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            .unwrap_or_else(|| cell.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#{e:?}"),
    }
}

/// Writes every sheet of `workbook` except `ignored` to `<out_dir>/<sheet>.csv`.
///
/// The first row of a sheet is its header; wholly empty rows are skipped.
pub fn split_workbook(
    workbook: &Path,
    out_dir: &Path,
    ignored: impl Fn(&str) -> bool,
) -> Result<Vec<RawSheet>> {
    let span = info_span!("split_workbook", path = %workbook.display());
    let _guard = span.enter();

    let mut sheets = open_workbook_auto(workbook).map_err(|e| IngestError::Workbook {
        path: workbook.to_path_buf(),
        message: e.to_string(),
    })?;
    let names: Vec<String> = sheets.sheet_names().to_vec();

    let mut written = Vec::new();
    for name in names {
        if ignored(&name) {
            debug!(sheet = %name, "skipping ignored sheet");
            continue;
        }
        let range = sheets
            .worksheet_range(&name)
            .map_err(|e| IngestError::Workbook {
                path: workbook.to_path_buf(),
                message: format!("sheet '{name}': {e}"),
            })?;

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect::<Vec<String>>())
            .filter(|row| row.iter().any(|value| !value.trim().is_empty()));
        let Some(headers) = rows.next() else {
            debug!(sheet = %name, "skipping empty sheet");
            continue;
        };

        let path = out_dir.join(format!("{name}.csv"));
        let row_count = write_csv_rows(&path, &headers, rows)?;
        info!(sheet = %name, rows = row_count, columns = headers.len(), "sheet written");
        written.push(RawSheet {
            name,
            path,
            rows: row_count,
            columns: headers.len(),
        });
    }

    if written.is_empty() {
        return Err(IngestError::EmptyWorkbook {
            path: workbook.to_path_buf(),
        });
    }
    Ok(written)
}
