//! Contracts pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Fetch**: Download the source workbook
//! 2. **Split**: Write every sheet to `<raw_dir>/<sheet>.csv`
//! 3. **Load**: Read the entity CSVs back as string frames
//! 4. **Remap**: Rename headers, select the buyer columns
//! 5. **Enrich**: Resolve buyer names to local authority codes
//! 6. **Join**: Left-join buyer, tender, awards and suppliers onto tender items
//! 7. **Filter**: Keep rows with a resolved authority
//! 8. **Prune**: Drop denylisted columns
//! 9. **Publish**: Replace the output CSV in one rename
//!
//! Interim tables are written as each stage completes. Any error aborts the
//! run before publication, leaving the previous output in place.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{debug, info, info_span};

use contracts_ingest::{
    FetchedWorkbook, IngestError, RawSheet, fetch_workbook, publish_csv_frame, read_csv_frame,
    split_workbook, write_csv_frame,
};
use contracts_model::{AUTHORITY_CODE_COLUMN, EntityKind, PipelineConfig, RELEASE_LINK};
use contracts_transform::{
    AuthorityRegistry, EnrichOptions, Enriched, JoinStats, RemapOptions, TableFrame,
    enrich_authorities, join_all, prune_columns, remap_headers, retain_resolved,
};

use crate::types::{BuildResult, StageSummary};

/// Entity tables keyed by kind.
pub type EntityTables = BTreeMap<EntityKind, TableFrame>;

// ============================================================================
// Stage 1-2: Fetch and split
// ============================================================================

/// Download the workbook into the raw directory.
pub fn fetch(config: &PipelineConfig) -> Result<FetchedWorkbook> {
    let destination = config.storage.workbook_path();
    fetch_workbook(&config.source_url, &destination)
        .with_context(|| format!("fetch {}", config.source_url))
}

/// Split the downloaded workbook into per-sheet CSVs.
///
/// Entity CSVs from an earlier run are removed first, and every entity must
/// come out of this workbook.
pub fn split(config: &PipelineConfig, fetched: &FetchedWorkbook) -> Result<Vec<RawSheet>> {
    clear_raw_tables(config)?;
    let sheets = split_workbook(&fetched.path, &config.storage.raw_dir, |sheet| {
        config.is_ignored_sheet(sheet)
    })
    .with_context(|| format!("split {}", fetched.path.display()))?;

    for entity in EntityKind::ALL {
        let found = sheets
            .iter()
            .any(|sheet| EntityKind::from_sheet_name(&sheet.name) == Some(entity));
        if !found {
            return Err(IngestError::MissingSheet {
                path: fetched.path.clone(),
                sheet: entity.sheet_name().to_string(),
            }
            .into());
        }
    }
    Ok(sheets)
}

fn clear_raw_tables(config: &PipelineConfig) -> Result<()> {
    for entity in EntityKind::ALL {
        let path = config.storage.raw_table_path(entity);
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed previous raw table"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err).with_context(|| format!("remove {}", path.display()));
            }
        }
    }
    Ok(())
}

// ============================================================================
// Stage 3-4: Load and remap
// ============================================================================

/// Read every entity CSV from the raw directory.
pub fn load_raw(config: &PipelineConfig) -> Result<EntityTables> {
    let mut tables = EntityTables::new();
    for entity in EntityKind::ALL {
        let path = config.storage.raw_table_path(entity);
        let data = read_csv_frame(&path).with_context(|| format!("load raw {entity} table"))?;
        tables.insert(entity, TableFrame::for_entity(entity, data).with_source(path));
    }
    Ok(tables)
}

/// Apply the configured column mapping to every entity table and write the
/// renamed tables to the interim directory.
pub fn remap(config: &PipelineConfig, raw: &EntityTables) -> Result<EntityTables> {
    let mut remapped = EntityTables::new();
    for (entity, frame) in raw {
        let renamed = match config.mappings.get(*entity) {
            Some(mapping) => remap_headers(frame, mapping, RemapOptions::for_mapping(mapping))
                .with_context(|| format!("remap {entity} headers"))?,
            None => frame.clone(),
        };
        write_interim(config, *entity, &renamed)?;
        remapped.insert(*entity, renamed);
    }
    Ok(remapped)
}

// ============================================================================
// Stage 5-6: Enrich and join
// ============================================================================

/// Resolve buyer names and overwrite the interim buyer table with the result.
pub fn enrich(
    config: &PipelineConfig,
    registry: &AuthorityRegistry,
    buyer: &TableFrame,
) -> Result<Enriched> {
    let options = EnrichOptions::from(&config.registry);
    let enriched =
        enrich_authorities(buyer, registry, &options).context("enrich buyer authorities")?;
    write_interim(config, EntityKind::Buyer, &enriched.frame)?;
    Ok(enriched)
}

/// Join the auxiliary tables onto tender items and write `merged.csv`.
pub fn join(
    config: &PipelineConfig,
    tables: &EntityTables,
) -> Result<(TableFrame, Vec<(EntityKind, JoinStats)>)> {
    let base = table(tables, EntityKind::TenderItems)?;
    let steps = EntityKind::JOIN_ORDER
        .into_iter()
        .map(|entity| table(tables, entity))
        .collect::<Result<Vec<_>>>()?;
    let (merged, stats) = join_all(base, &steps, RELEASE_LINK).context("join entity tables")?;

    let merged = TableFrame::named("merged", merged.data);
    let path = config.storage.merged_path();
    write_csv_frame(&merged.data, &path)
        .with_context(|| format!("write {}", path.display()))?;
    let stats = EntityKind::JOIN_ORDER.into_iter().zip(stats).collect();
    Ok((merged, stats))
}

// ============================================================================
// Stage 7-9: Filter, prune, publish
// ============================================================================

/// Keep only rows with a resolved authority code.
pub fn filter(merged: &TableFrame) -> Result<TableFrame> {
    retain_resolved(merged, AUTHORITY_CODE_COLUMN).context("filter unresolved rows")
}

/// Drop the denylisted columns.
pub fn prune(config: &PipelineConfig, retained: &TableFrame) -> Result<TableFrame> {
    prune_columns(retained, &config.publish.drop_columns).context("prune denylisted columns")
}

pub fn publish(config: &PipelineConfig, frame: &TableFrame) -> Result<()> {
    let path = &config.storage.output_path;
    publish_csv_frame(&frame.data, path).with_context(|| format!("publish {}", path.display()))
}

// ============================================================================
// Offline entry
// ============================================================================

/// Run every stage after the split, reading the raw CSVs already on disk.
pub fn process_raw_tables(
    config: &PipelineConfig,
    registry: &AuthorityRegistry,
) -> Result<BuildResult> {
    let started_at = Local::now();
    let mut stages = Vec::new();

    let load_start = Instant::now();
    let raw = info_span!("load", raw_dir = %config.storage.raw_dir.display())
        .in_scope(|| load_raw(config))?;
    let raw_rows: usize = raw.values().map(TableFrame::record_count).sum();
    info!(
        tables = raw.len(),
        rows = raw_rows,
        duration_ms = load_start.elapsed().as_millis(),
        "load complete"
    );
    stages.push(
        StageSummary::new("load", load_start.elapsed().as_millis())
            .with_detail(format!("{} tables, {raw_rows} rows", raw.len())),
    );

    let remap_start = Instant::now();
    let mut tables = info_span!("remap").in_scope(|| remap(config, &raw))?;
    info!(
        tables = tables.len(),
        duration_ms = remap_start.elapsed().as_millis(),
        "remap complete"
    );
    stages.push(
        StageSummary::new("remap", remap_start.elapsed().as_millis())
            .with_detail(format!("interim tables in {}", config.storage.interim_dir.display())),
    );

    let enrich_start = Instant::now();
    let buyer = table(&tables, EntityKind::Buyer)?.clone();
    let Enriched { frame, report } =
        info_span!("enrich").in_scope(|| enrich(config, registry, &buyer))?;
    info!(
        matched = report.matched,
        unmatched = report.unmatched,
        ambiguous = report.ambiguous.len(),
        duration_ms = enrich_start.elapsed().as_millis(),
        "enrich complete"
    );
    stages.push(
        StageSummary::new("enrich", enrich_start.elapsed().as_millis())
            .with_shape(frame.record_count(), frame.column_count())
            .with_detail(format!("{} of {} buyers resolved", report.matched, report.rows)),
    );
    tables.insert(EntityKind::Buyer, frame);

    let join_start = Instant::now();
    let (merged, joins) = info_span!("join").in_scope(|| join(config, &tables))?;
    info!(
        rows = merged.record_count(),
        columns = merged.column_count(),
        duration_ms = join_start.elapsed().as_millis(),
        "join complete"
    );
    stages.push(
        StageSummary::new("join", join_start.elapsed().as_millis())
            .with_shape(merged.record_count(), merged.column_count())
            .with_detail(config.storage.merged_path().display().to_string()),
    );

    let filter_start = Instant::now();
    let retained = info_span!("filter").in_scope(|| filter(&merged))?;
    let removed = merged.record_count() - retained.record_count();
    info!(
        kept = retained.record_count(),
        removed,
        duration_ms = filter_start.elapsed().as_millis(),
        "filter complete"
    );
    stages.push(
        StageSummary::new("filter", filter_start.elapsed().as_millis())
            .with_shape(retained.record_count(), retained.column_count())
            .with_detail(format!("{removed} rows without {AUTHORITY_CODE_COLUMN}")),
    );

    let prune_start = Instant::now();
    let pruned = info_span!("prune").in_scope(|| prune(config, &retained))?;
    let dropped = retained.column_count() - pruned.column_count();
    info!(
        columns = pruned.column_count(),
        dropped,
        duration_ms = prune_start.elapsed().as_millis(),
        "prune complete"
    );
    stages.push(
        StageSummary::new("prune", prune_start.elapsed().as_millis())
            .with_shape(pruned.record_count(), pruned.column_count())
            .with_detail(format!("{dropped} columns dropped")),
    );

    let publish_start = Instant::now();
    info_span!("publish", path = %config.storage.output_path.display())
        .in_scope(|| publish(config, &pruned))?;
    info!(
        rows = pruned.record_count(),
        columns = pruned.column_count(),
        duration_ms = publish_start.elapsed().as_millis(),
        "publish complete"
    );
    stages.push(
        StageSummary::new("publish", publish_start.elapsed().as_millis())
            .with_shape(pruned.record_count(), pruned.column_count())
            .with_detail(config.storage.output_path.display().to_string()),
    );

    Ok(BuildResult {
        started_at,
        output_path: config.storage.output_path.clone(),
        fetched: None,
        sheets: Vec::new(),
        stages,
        enrichment: report,
        joins,
        published_rows: pruned.record_count(),
        published_columns: pruned.column_count(),
    })
}

fn table(tables: &EntityTables, entity: EntityKind) -> Result<&TableFrame> {
    tables
        .get(&entity)
        .with_context(|| format!("{entity} table not loaded"))
}

fn write_interim(config: &PipelineConfig, entity: EntityKind, frame: &TableFrame) -> Result<()> {
    let path = config.storage.interim_table_path(entity);
    write_csv_frame(&frame.data, &path).with_context(|| format!("write {}", path.display()))
}
