use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;
use comfy_table::Table;
use tracing::{info, info_span};

use contracts_cli::pipeline::{fetch, process_raw_tables, split};
use contracts_cli::types::{BuildResult, StageSummary};
use contracts_model::{EntityKind, PipelineConfig};
use contracts_transform::AuthorityRegistry;

use crate::cli::{BuildArgs, MappingsArgs};
use crate::summary::apply_table_style;

pub fn run_mappings(args: &MappingsArgs) -> Result<()> {
    let config =
        PipelineConfig::load_or_default(args.config.as_deref()).context("load configuration")?;
    let mut table = Table::new();
    table.set_header(vec!["Entity", "Mode", "Source column", "Canonical column"]);
    apply_table_style(&mut table);
    for entity in EntityKind::ALL {
        let Some(mapping) = config.mappings.get(entity) else {
            continue;
        };
        let mode = if mapping.keep_unmapped {
            "rename"
        } else {
            "select"
        };
        for rename in &mapping.renames {
            table.add_row(vec![
                entity.sheet_name(),
                mode,
                rename.from.as_str(),
                rename.to.as_str(),
            ]);
        }
    }
    println!("{table}");
    Ok(())
}

pub fn run_build(args: &BuildArgs) -> Result<BuildResult> {
    let started_at = Local::now();
    let config =
        PipelineConfig::load_or_default(args.config.as_deref()).context("load configuration")?;
    let build_span = info_span!("build", output = %config.storage.output_path.display());
    let _build_guard = build_span.enter();

    let registry = AuthorityRegistry::load_csv(&config.registry.path).with_context(|| {
        format!(
            "load authority registry {}: expected a local authority CSV with \
             `local-authority-code` and `official-name` columns (for example the \
             mySociety uk_local_authorities.csv); set [registry] path in contracts.toml",
            config.registry.path.display()
        )
    })?;
    info!(authorities = registry.len(), "authority registry loaded");

    let mut leading_stages = Vec::new();
    let (fetched, sheets) = if args.skip_fetch {
        info!(raw_dir = %config.storage.raw_dir.display(), "reusing raw tables");
        (None, Vec::new())
    } else {
        let fetch_start = Instant::now();
        let fetched = info_span!("fetch", url = %config.source_url).in_scope(|| fetch(&config))?;
        info!(
            bytes = fetched.bytes,
            sha256 = %fetched.sha256,
            duration_ms = fetch_start.elapsed().as_millis(),
            "fetch complete"
        );
        leading_stages.push(
            StageSummary::new("fetch", fetch_start.elapsed().as_millis())
                .with_detail(format!("{} bytes, sha256 {}", fetched.bytes, fetched.sha256)),
        );

        let split_start = Instant::now();
        let sheets = info_span!("split").in_scope(|| split(&config, &fetched))?;
        info!(
            sheets = sheets.len(),
            duration_ms = split_start.elapsed().as_millis(),
            "split complete"
        );
        leading_stages.push(
            StageSummary::new("split", split_start.elapsed().as_millis()).with_detail(
                sheets
                    .iter()
                    .map(|sheet| sheet.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        );
        (Some(fetched), sheets)
    };

    let mut result = process_raw_tables(&config, &registry)?;
    leading_stages.append(&mut result.stages);
    result.stages = leading_stages;
    result.started_at = started_at;
    result.fetched = fetched;
    result.sheets = sheets;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_registry_says_what_file_is_expected() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("contracts.toml");
        std::fs::write(&config, "[registry]\npath = \"missing.csv\"\n").unwrap();
        let args = BuildArgs {
            config: Some(config),
            skip_fetch: true,
        };

        let message = format!("{:#}", run_build(&args).unwrap_err());
        assert!(message.contains("missing.csv"), "{message}");
        assert!(message.contains("`local-authority-code`"), "{message}");
        assert!(message.contains("[registry] path"), "{message}");
    }
}
