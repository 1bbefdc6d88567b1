//! Shared types for the procurement contracts pipeline.

pub mod config;
pub mod entity;
pub mod error;
pub mod mapping;

pub use config::{
    AUTHORITY_CODE_COLUMN, DEFAULT_CONFIG_FILE, DEFAULT_SOURCE_URL, PipelineConfig,
    PublishConfig, RegistryConfig, StorageConfig,
};
pub use entity::{ENTITY_LINK, EntityKind, RELEASE_LINK};
pub use error::{ConfigError, Result};
pub use mapping::{ColumnRename, EntityMapping, MappingRegistry, default_mappings};
