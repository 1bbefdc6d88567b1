use std::path::PathBuf;

use chrono::{DateTime, Local};

use contracts_ingest::{FetchedWorkbook, RawSheet};
use contracts_model::EntityKind;
use contracts_transform::{EnrichmentReport, JoinStats};

/// Outcome of one pipeline stage, for the run summary.
#[derive(Debug, Clone)]
pub struct StageSummary {
    pub stage: &'static str,
    pub rows: Option<usize>,
    pub columns: Option<usize>,
    pub duration_ms: u128,
    pub detail: String,
}

impl StageSummary {
    pub fn new(stage: &'static str, duration_ms: u128) -> Self {
        Self {
            stage,
            rows: None,
            columns: None,
            duration_ms,
            detail: String::new(),
        }
    }

    #[must_use]
    pub fn with_shape(mut self, rows: usize, columns: usize) -> Self {
        self.rows = Some(rows);
        self.columns = Some(columns);
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }
}

/// Everything a successful build produced.
#[derive(Debug)]
pub struct BuildResult {
    pub started_at: DateTime<Local>,
    pub output_path: PathBuf,
    /// Absent when the run reused an existing raw directory.
    pub fetched: Option<FetchedWorkbook>,
    pub sheets: Vec<RawSheet>,
    pub stages: Vec<StageSummary>,
    pub enrichment: EnrichmentReport,
    pub joins: Vec<(EntityKind, JoinStats)>,
    pub published_rows: usize,
    pub published_columns: usize,
}
