//! Error types for workbook fetch and CSV ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching, splitting, reading or writing tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Fetch Errors ===
    /// The request could not be sent or the body could not be read.
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("fetch of {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    // === File System Errors ===
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to create a directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write or move a file.
    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Workbook Errors ===
    /// Workbook could not be opened or a sheet could not be read.
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// A sheet the pipeline needs is not in the workbook.
    #[error("workbook {path} has no '{sheet}' sheet")]
    MissingSheet { path: PathBuf, sheet: String },

    /// Workbook has no sheets left after ignoring the configured ones.
    #[error("workbook contains no data sheets: {path}")]
    EmptyWorkbook { path: PathBuf },

    // === CSV Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Failed to serialize a table to CSV.
    #[error("failed to write CSV {path}: {message}")]
    CsvWrite { path: PathBuf, message: String },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

impl IngestError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv_write(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::CsvWrite {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::HttpStatus {
            url: "https://example.org/data.xlsx".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "fetch of https://example.org/data.xlsx returned HTTP 404"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("test".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}
