//! Run configuration for the contracts pipeline.
//!
//! All storage locations, the source URL, the column mappings and the
//! publication denylist live in one [`PipelineConfig`] that the orchestrator
//! receives explicitly. Defaults reproduce the published Contracts Finder
//! layout; a TOML file can override any part of it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::entity::EntityKind;
use crate::error::{ConfigError, Result};
use crate::mapping::MappingRegistry;

/// Workbook published by the OCDS data registry for UK Contracts Finder.
pub const DEFAULT_SOURCE_URL: &str = "https://fra1.digitaloceanspaces.com/ocdsdata/united_kingdom_contracts_finder_records/ocdsdata_united_kingdom_contracts_finder_records.xlsx";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "contracts.toml";

/// Column added by authority enrichment.
pub const AUTHORITY_CODE_COLUMN: &str = "local-authority-code";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the downloaded workbook and the per-sheet CSVs.
    pub raw_dir: PathBuf,
    /// Directory for renamed, enriched and merged tables.
    pub interim_dir: PathBuf,
    /// Published CSV, replaced wholesale on every successful run.
    pub output_path: PathBuf,
    /// File name of the downloaded workbook inside `raw_dir`.
    pub workbook_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            interim_dir: PathBuf::from("data/interim"),
            output_path: PathBuf::from("data/packages/contracts/contracts.csv"),
            workbook_file: "contracts.xlsx".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn workbook_path(&self) -> PathBuf {
        self.raw_dir.join(&self.workbook_file)
    }

    pub fn raw_table_path(&self, entity: EntityKind) -> PathBuf {
        self.raw_dir.join(entity.csv_file_name())
    }

    pub fn interim_table_path(&self, entity: EntityKind) -> PathBuf {
        self.interim_dir.join(entity.csv_file_name())
    }

    pub fn merged_path(&self) -> PathBuf {
        self.interim_dir.join("merged.csv")
    }
}

/// Reference registry location and which authority columns to attach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub path: PathBuf,
    /// Buyer column holding the free-text organisation name.
    pub name_column: String,
    /// Attach the GSS code of the matched authority.
    pub include_gss: bool,
    /// Attach region and county of the matched authority.
    pub include_region_and_county: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/reference/local_authorities.csv"),
            name_column: "council".to_string(),
            include_gss: true,
            include_region_and_county: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Columns removed from the merged table before publication.
    pub drop_columns: Vec<String>,
    /// Workbook sheets that are never split out.
    pub ignored_sheets: Vec<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            drop_columns: vec![
                "x_awardValue_amount".to_string(),
                "x_awardValue_currency".to_string(),
                "supplyChain".to_string(),
            ],
            ignored_sheets: vec!["Field Information".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub source_url: String,
    pub storage: StorageConfig,
    pub registry: RegistryConfig,
    pub publish: PublishConfig,
    pub mappings: MappingRegistry,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            storage: StorageConfig::default(),
            registry: RegistryConfig::default(),
            publish: PublishConfig::default(),
            mappings: MappingRegistry::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a TOML config. Relative paths are resolved against
    /// the directory containing the file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise `contracts.toml` from the working
    /// directory if it exists, otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Place every relative storage location under `root`.
    pub fn rebase(&mut self, root: &Path) {
        for path in [
            &mut self.storage.raw_dir,
            &mut self.storage.interim_dir,
            &mut self.storage.output_path,
            &mut self.registry.path,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "source_url is empty".to_string(),
            });
        }
        if self.storage.workbook_file.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "storage.workbook_file is empty".to_string(),
            });
        }
        if self.registry.name_column.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "registry.name_column is empty".to_string(),
            });
        }
        self.mappings.validate()
    }

    pub fn is_ignored_sheet(&self, sheet: &str) -> bool {
        self.publish
            .ignored_sheets
            .iter()
            .any(|ignored| ignored.trim().eq_ignore_ascii_case(sheet.trim()))
    }
}
