//! Local authority enrichment.
//!
//! Resolves the free-text buyer organisation name of each row against the
//! authority registry and attaches the authority code (plus optional GSS code,
//! region and county). Rows that do not resolve get nulls and are removed later
//! by the filter stage.

mod normalize;
mod registry;

use std::collections::BTreeMap;

use polars::prelude::{Column, DataFrame};
use tracing::{info, warn};

use contracts_ingest::column_strings;
use contracts_model::{AUTHORITY_CODE_COLUMN, RegistryConfig};

pub use normalize::{fold_name, normalize_authority_name};
pub use registry::{AuthorityLookup, AuthorityRecord, AuthorityRegistry};

use crate::data_utils::{require_column, string_column};
use crate::error::{Result, TransformError};
use crate::frame::TableFrame;

pub const GSS_CODE_COLUMN: &str = "gss-code";
pub const REGION_COLUMN: &str = "region";
pub const COUNTY_COLUMN: &str = "county";

/// Which buyer column to read and which registry columns to attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichOptions {
    pub name_column: String,
    pub include_gss: bool,
    pub include_region_and_county: bool,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self::from(&RegistryConfig::default())
    }
}

impl From<&RegistryConfig> for EnrichOptions {
    fn from(config: &RegistryConfig) -> Self {
        Self {
            name_column: config.name_column.clone(),
            include_gss: config.include_gss,
            include_region_and_county: config.include_region_and_county,
        }
    }
}

impl EnrichOptions {
    /// Columns appended by enrichment, in output order.
    pub fn added_columns(&self) -> Vec<&'static str> {
        let mut columns = vec![AUTHORITY_CODE_COLUMN];
        if self.include_gss {
            columns.push(GSS_CODE_COLUMN);
        }
        if self.include_region_and_county {
            columns.push(REGION_COLUMN);
            columns.push(COUNTY_COLUMN);
        }
        columns
    }
}

/// A buyer name that resolved to one of several authorities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousLookup {
    /// Buyer name as written in the first row that hit the ambiguity.
    pub name: String,
    pub normalized: String,
    pub chosen_code: String,
    pub candidate_codes: Vec<String>,
    /// Rows carrying this normalized name.
    pub rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub rows: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub ambiguous: Vec<AmbiguousLookup>,
}

#[derive(Debug, Clone)]
pub struct Enriched {
    pub frame: TableFrame,
    pub report: EnrichmentReport,
}

/// Attaches authority columns to `frame` by resolving `options.name_column`.
///
/// Row count and order are preserved. Ambiguous names resolve to the first
/// registered authority and are logged once each.
pub fn enrich_authorities(
    frame: &TableFrame,
    registry: &AuthorityRegistry,
    options: &EnrichOptions,
) -> Result<Enriched> {
    let names = column_strings(require_column(frame, &options.name_column)?);
    for added in options.added_columns() {
        if frame.has_column(added) {
            return Err(TransformError::schema(
                frame.name.as_str(),
                format!("column '{added}' already exists"),
            ));
        }
    }

    let mut codes = Vec::with_capacity(names.len());
    let mut gss = Vec::with_capacity(names.len());
    let mut regions = Vec::with_capacity(names.len());
    let mut counties = Vec::with_capacity(names.len());
    let mut report = EnrichmentReport {
        rows: names.len(),
        ..EnrichmentReport::default()
    };
    let mut ambiguous: BTreeMap<String, AmbiguousLookup> = BTreeMap::new();

    for name in &names {
        let lookup = name
            .as_deref()
            .map_or(AuthorityLookup::Unmatched, |n| registry.lookup(n));

        if let AuthorityLookup::Ambiguous { chosen, candidates } = &lookup {
            let raw = name.as_deref().unwrap_or_default();
            ambiguous
                .entry(normalize_authority_name(raw))
                .and_modify(|entry| entry.rows += 1)
                .or_insert_with_key(|normalized| AmbiguousLookup {
                    name: raw.to_string(),
                    normalized: normalized.clone(),
                    chosen_code: chosen.code.clone(),
                    candidate_codes: candidates.iter().map(|c| c.to_string()).collect(),
                    rows: 1,
                });
        }

        let record = lookup.record();
        if record.is_some() {
            report.matched += 1;
        } else {
            report.unmatched += 1;
        }
        codes.push(record.map(|r| r.code.clone()));
        gss.push(record.and_then(|r| r.gss_code.clone()));
        regions.push(record.and_then(|r| r.region.clone()));
        counties.push(record.and_then(|r| r.county.clone()));
    }

    for lookup in ambiguous.values() {
        warn!(
            table = %frame.name,
            name = %lookup.name,
            chosen = %lookup.chosen_code,
            candidates = ?lookup.candidate_codes,
            rows = lookup.rows,
            "authority lookup is ambiguous, using first registry entry"
        );
    }
    report.ambiguous = ambiguous.into_values().collect();

    let mut columns: Vec<Column> = frame.data.get_columns().to_vec();
    columns.push(string_column(AUTHORITY_CODE_COLUMN, codes));
    if options.include_gss {
        columns.push(string_column(GSS_CODE_COLUMN, gss));
    }
    if options.include_region_and_county {
        columns.push(string_column(REGION_COLUMN, regions));
        columns.push(string_column(COUNTY_COLUMN, counties));
    }

    info!(
        table = %frame.name,
        rows = report.rows,
        matched = report.matched,
        unmatched = report.unmatched,
        ambiguous = report.ambiguous.len(),
        "authorities resolved"
    );
    Ok(Enriched {
        frame: frame.with_data(DataFrame::new(columns)?),
        report,
    })
}
