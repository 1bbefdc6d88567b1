//! Error types for table transforms.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the frame transforms. All of them abort a run.
#[derive(Debug, Error)]
pub enum TransformError {
    /// An expected column is absent or the resulting schema is ill-formed.
    #[error("schema mismatch in {table}: {message}")]
    SchemaMismatch { table: String, message: String },

    /// A join was requested on a column one side does not have.
    #[error("join key '{key}' missing from {table}")]
    MissingJoinKey { key: String, table: String },

    /// The authority registry file could not be read.
    #[error("failed to load authority registry {path}: {message}")]
    Registry { path: PathBuf, message: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl TransformError {
    pub(crate) fn schema(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            table: table.into(),
            message: message.into(),
        }
    }
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
