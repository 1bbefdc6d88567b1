//! Per-entity column mappings.
//!
//! Every entity sheet carries generic column names (`id`, `title`, `status`,
//! `_link`) that would collide once the sheets are joined. A [`MappingRegistry`]
//! holds one ordered rename list per [`EntityKind`] and is validated once at
//! startup so that a bad mapping never reaches the data.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::entity::{ENTITY_LINK, EntityKind, RELEASE_LINK};
use crate::error::{ConfigError, Result};

/// A single `from -> to` column rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRename {
    pub from: String,
    pub to: String,
}

impl ColumnRename {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Ordered column renames for one entity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMapping {
    pub entity: EntityKind,
    /// When false the mapping acts as a select: unmapped columns are dropped
    /// and every `from` column must be present.
    #[serde(default = "default_keep_unmapped")]
    pub keep_unmapped: bool,
    pub renames: Vec<ColumnRename>,
}

fn default_keep_unmapped() -> bool {
    true
}

impl EntityMapping {
    pub fn new(entity: EntityKind, renames: Vec<ColumnRename>) -> Self {
        Self {
            entity,
            keep_unmapped: true,
            renames,
        }
    }

    /// Turn the mapping into a select of exactly the renamed columns.
    pub fn selecting(mut self) -> Self {
        self.keep_unmapped = false;
        self
    }

    /// Target name for a source column, if the mapping renames it.
    ///
    /// Both sides of a rename are trimmed; `column` is matched verbatim.
    pub fn target_for(&self, column: &str) -> Option<&str> {
        self.renames
            .iter()
            .find(|rename| rename.from.trim() == column)
            .map(|rename| rename.to.trim())
    }

    pub fn source_columns(&self) -> impl Iterator<Item = &str> {
        self.renames.iter().map(|rename| rename.from.trim())
    }

    /// Check internal consistency of the rename list.
    pub fn validate(&self) -> Result<()> {
        let entity = self.entity.sheet_name();
        let mut sources = BTreeSet::new();
        let mut targets: BTreeMap<&str, &str> = BTreeMap::new();
        for rename in &self.renames {
            let from = rename.from.trim();
            if from.is_empty() {
                return Err(ConfigError::invalid_mapping(entity, "empty source column"));
            }
            if !sources.insert(from) {
                return Err(ConfigError::invalid_mapping(
                    entity,
                    format!("source column '{from}' mapped more than once"),
                ));
            }
            let to = rename.to.trim();
            if to.is_empty() {
                continue;
            }
            if let Some(previous) = targets.insert(to, from) {
                return Err(ConfigError::invalid_mapping(
                    entity,
                    format!("columns '{previous}' and '{from}' both map to '{to}'"),
                ));
            }
        }
        match self.target_for(ENTITY_LINK) {
            Some(target) if target.starts_with("_link_") && target != RELEASE_LINK => Ok(()),
            Some(target) => Err(ConfigError::invalid_mapping(
                entity,
                format!("'{ENTITY_LINK}' must map to an entity-qualified name, got '{target}'"),
            )),
            None => Err(ConfigError::invalid_mapping(
                entity,
                format!("missing rename for '{ENTITY_LINK}'"),
            )),
        }
    }
}

/// Column mappings for every entity, keyed by [`EntityKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingRegistry {
    mappings: Vec<EntityMapping>,
}

impl MappingRegistry {
    /// Build a registry, rejecting duplicate entities and invalid mappings.
    pub fn new(mappings: Vec<EntityMapping>) -> Result<Self> {
        let registry = Self { mappings };
        registry.validate()?;
        Ok(registry)
    }

    pub fn get(&self, entity: EntityKind) -> Option<&EntityMapping> {
        self.mappings.iter().find(|mapping| mapping.entity == entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityMapping> {
        self.mappings.iter()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for mapping in &self.mappings {
            if !seen.insert(mapping.entity) {
                return Err(ConfigError::invalid_mapping(
                    mapping.entity.sheet_name(),
                    "entity mapped more than once",
                ));
            }
            mapping.validate()?;
        }
        for entity in EntityKind::ALL {
            if !seen.contains(&entity) {
                return Err(ConfigError::invalid_mapping(
                    entity.sheet_name(),
                    "no mapping configured",
                ));
            }
        }
        Ok(())
    }
}

impl Default for MappingRegistry {
    fn default() -> Self {
        Self {
            mappings: default_mappings(),
        }
    }
}

fn renames(pairs: &[(&str, &str)]) -> Vec<ColumnRename> {
    pairs
        .iter()
        .map(|(from, to)| ColumnRename::new(*from, *to))
        .collect()
}

/// The column layout of the Contracts Finder OCDS workbook.
pub fn default_mappings() -> Vec<EntityMapping> {
    vec![
        EntityMapping::new(
            EntityKind::Tender,
            renames(&[
                ("_link", "_link_tender"),
                ("id", "id_tender"),
                ("value_amount", "tender_amount"),
                ("value_currency", "tender_currency"),
                ("minValue_amount", "tender_minimum_amount"),
                ("minValue_currency", "tender_minimum_currency"),
                ("title", "tender_title"),
                ("description", "tender_description"),
                ("status", "tender_status"),
                ("datePublished", "tender_datePublished"),
            ]),
        ),
        EntityMapping::new(
            EntityKind::Awards,
            renames(&[
                ("_link", "_link_award"),
                ("id", "id_award"),
                ("description", "award_description"),
                ("date", "award_decision_date"),
                ("title", "award_title"),
                ("status", "award_status"),
                ("value_amount", "award_amount"),
                ("value_currency", "award_currency"),
                ("datePublished", "award_datePublished"),
            ]),
        ),
        EntityMapping::new(
            EntityKind::TenderItems,
            renames(&[
                ("_link", "_link_item"),
                ("id", "id_item"),
                ("description", "item_description"),
            ]),
        ),
        EntityMapping::new(
            EntityKind::Suppliers,
            renames(&[
                ("_link", "_link_supplier"),
                ("id", "supplier_id"),
                ("name", "supplier_name"),
                ("identifier_scheme", "supplier_identifier_scheme"),
                ("identifier_id", "supplier_identifier_id"),
            ]),
        ),
        EntityMapping::new(
            EntityKind::Buyer,
            renames(&[
                ("_link", "_link_council"),
                ("_link_release", "_link_release"),
                ("name", "council"),
            ]),
        )
        .selecting(),
    ]
}
