use std::path::PathBuf;

use polars::prelude::DataFrame;

use contracts_model::EntityKind;

/// A table moving through the pipeline, with the identity used in error
/// messages and join suffixes.
#[derive(Debug, Clone)]
pub struct TableFrame {
    /// Table name for logs and errors (`tender_items`, `merged`, ...).
    pub name: String,
    /// The entity this table was read from. Joined tables keep the base entity.
    pub entity: Option<EntityKind>,
    pub data: DataFrame,
    /// File the table was read from, when it came from disk.
    pub source: Option<PathBuf>,
}

impl TableFrame {
    /// Create a frame for one entity sheet.
    pub fn for_entity(entity: EntityKind, data: DataFrame) -> Self {
        Self {
            name: entity.sheet_name().to_string(),
            entity: Some(entity),
            data,
            source: None,
        }
    }

    /// Create a frame that does not correspond to a single entity.
    pub fn named(name: impl Into<String>, data: DataFrame) -> Self {
        Self {
            name: name.into(),
            entity: None,
            data,
            source: None,
        }
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Same identity, new data.
    pub fn with_data(&self, data: DataFrame) -> Self {
        Self {
            name: self.name.clone(),
            entity: self.entity,
            data,
            source: self.source.clone(),
        }
    }

    pub fn record_count(&self) -> usize {
        self.data.height()
    }

    pub fn column_count(&self) -> usize {
        self.data.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.data.column(name).is_ok()
    }

    /// Suffix for colliding columns of this table after a join.
    pub fn join_suffix(&self) -> String {
        self.entity
            .map(EntityKind::join_suffix)
            .unwrap_or_else(|| format!("_{}", self.name))
    }
}
