//! Integration tests for the offline pipeline.

use std::fs;
use std::path::Path;

use contracts_cli::pipeline::{process_raw_tables, split};
use contracts_ingest::{FetchedWorkbook, IngestError};
use contracts_model::{EntityKind, PipelineConfig};
use contracts_transform::{AuthorityRegistry, TransformError};
use rust_xlsxwriter::Workbook;

const TENDER_ITEMS: &str = "\
_link,_link_release,id,description
i1,r1,1,\"Asphalt, hot mix\"
i2,r2,1,Laptops
";

const BUYER: &str = "\
_link,_link_release,name,address_locality
b1,r1,Example Council,Exampleton
b2,r2,Unknown Org,Nowhere
";

const TENDER: &str = "\
_link,_link_release,id,title,status
t1,r1,T-1,Road resurfacing,complete
t2,r2,T-2,IT refresh,active
";

const AWARDS: &str = "\
_link,_link_release,id,value_amount,x_awardValue_amount,x_awardValue_currency
a1,r1,A-1,1500,1500,GBP
";

const SUPPLIERS: &str = "\
_link,_link_release,id,name
s1,r1,S-1,Acme Ltd
s2,r1,S-2,Bolt Ltd
";

const STALE_SUPPLIERS: &str = "\
_link,_link_release,id,name
s0,r1,S-OLD,Stale Supplier Ltd
";

type SheetRows<'a> = &'a [&'a [&'a str]];

const ITEM_ROWS: SheetRows<'static> = &[
    &["_link", "_link_release", "id", "description"],
    &["i1", "r1", "1", "Asphalt"],
];
const BUYER_ROWS: SheetRows<'static> = &[
    &["_link", "_link_release", "name"],
    &["b1", "r1", "Example Council"],
];
const TENDER_ROWS: SheetRows<'static> = &[
    &["_link", "_link_release", "id", "title", "status"],
    &["t1", "r1", "T-1", "Road resurfacing", "complete"],
];
const AWARD_ROWS: SheetRows<'static> = &[
    &["_link", "_link_release", "id", "value_amount"],
    &["a1", "r1", "A-1", "1500"],
];
const SUPPLIER_ROWS: SheetRows<'static> = &[
    &["_link", "_link_release", "id", "name"],
    &["s1", "r1", "S-1", "Acme Ltd"],
];
const NOTES_ROWS: SheetRows<'static> = &[&["field"], &["_link_release"]];

const REGISTRY: &str = "\
local-authority-code,official-name,gss-code
E01000001,Example Council,E06000001
";

const CONFIG: &str = r#"
[storage]
raw_dir = "raw"
interim_dir = "interim"
output_path = "out/contracts.csv"

[registry]
path = "authorities.csv"
"#;

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Lays out a project directory and returns its loaded configuration.
fn project(root: &Path, suppliers: &str) -> PipelineConfig {
    write(&root.join("contracts.toml"), CONFIG);
    write(&root.join("authorities.csv"), REGISTRY);
    let raw = root.join("raw");
    write(&raw.join("tender_items.csv"), TENDER_ITEMS);
    write(&raw.join("buyer.csv"), BUYER);
    write(&raw.join("tender.csv"), TENDER);
    write(&raw.join("awards.csv"), AWARDS);
    write(&raw.join("suppliers.csv"), suppliers);
    PipelineConfig::load(&root.join("contracts.toml")).unwrap()
}

fn registry(config: &PipelineConfig) -> AuthorityRegistry {
    AuthorityRegistry::load_csv(&config.registry.path).unwrap()
}

/// Saves a workbook with `sheets` at the configured workbook path.
fn write_workbook(config: &PipelineConfig, sheets: &[(&str, SheetRows<'_>)]) -> FetchedWorkbook {
    let path = config.storage.workbook_path();
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name).unwrap();
        for (row, values) in rows.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                sheet.write_string(row as u32, col as u16, *value).unwrap();
            }
        }
    }
    workbook.save(&path).unwrap();
    FetchedWorkbook {
        path,
        bytes: 0,
        sha256: String::new(),
    }
}

#[test]
fn publishes_resolved_council_rows() {
    let dir = tempfile::tempdir().unwrap();
    let config = project(dir.path(), SUPPLIERS);

    let result = process_raw_tables(&config, &registry(&config)).unwrap();
    assert_eq!(result.output_path, dir.path().join("out/contracts.csv"));
    assert_eq!(result.published_rows, 2);
    assert_eq!(result.enrichment.matched, 1);
    assert_eq!(result.enrichment.unmatched, 1);
    assert_eq!(
        result.stages.iter().map(|s| s.stage).collect::<Vec<_>>(),
        vec!["load", "remap", "enrich", "join", "filter", "prune", "publish"]
    );

    let published = fs::read_to_string(&result.output_path).unwrap();
    insta::assert_snapshot!(published.trim_end(), @r#"
    _link_item,_link_release,id_item,item_description,_link_council,council,local-authority-code,gss-code,_link_tender,id_tender,tender_title,tender_status,_link_award,id_award,award_amount,_link_supplier,supplier_id,supplier_name
    i1,r1,1,"Asphalt, hot mix",b1,Example Council,E01000001,E06000001,t1,T-1,Road resurfacing,complete,a1,A-1,1500,s1,S-1,Acme Ltd
    i1,r1,1,"Asphalt, hot mix",b1,Example Council,E01000001,E06000001,t1,T-1,Road resurfacing,complete,a1,A-1,1500,s2,S-2,Bolt Ltd
    "#);
}

#[test]
fn interim_tables_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let config = project(dir.path(), SUPPLIERS);
    process_raw_tables(&config, &registry(&config)).unwrap();

    for entity in EntityKind::ALL {
        assert!(config.storage.interim_table_path(entity).is_file(), "{entity}");
    }
    let buyer = fs::read_to_string(config.storage.interim_table_path(EntityKind::Buyer)).unwrap();
    assert_eq!(
        buyer.lines().next(),
        Some("_link_council,_link_release,council,local-authority-code,gss-code")
    );
    assert!(buyer.contains("b2,r2,Unknown Org,,"));

    let merged = fs::read_to_string(config.storage.merged_path()).unwrap();
    assert_eq!(merged.lines().count(), 4);
    assert!(merged.contains("x_awardValue_amount"));
}

#[test]
fn failed_run_leaves_previous_output_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let config = project(dir.path(), "_link,id,name\ns1,S-1,Acme Ltd\n");
    write(&config.storage.output_path, "previous\n");

    let err = process_raw_tables(&config, &registry(&config)).unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<TransformError>(),
            Some(TransformError::MissingJoinKey { table, .. }) if table == "suppliers"
        ),
        "{err:#}"
    );
    assert_eq!(
        fs::read_to_string(&config.storage.output_path).unwrap(),
        "previous\n"
    );
    assert!(!config.storage.merged_path().exists());
}

#[test]
fn missing_raw_table_names_the_entity() {
    let dir = tempfile::tempdir().unwrap();
    let config = project(dir.path(), SUPPLIERS);
    fs::remove_file(config.storage.raw_table_path(EntityKind::Awards)).unwrap();

    let err = process_raw_tables(&config, &registry(&config)).unwrap_err();
    assert!(format!("{err:#}").contains("load raw awards table"), "{err:#}");
    assert!(!config.storage.output_path.exists());
}

#[test]
fn split_replaces_raw_tables_from_an_earlier_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = project(dir.path(), STALE_SUPPLIERS);
    let fetched = write_workbook(
        &config,
        &[
            ("Field Information", NOTES_ROWS),
            ("tender_items", ITEM_ROWS),
            ("buyer", BUYER_ROWS),
            ("tender", TENDER_ROWS),
            ("awards", AWARD_ROWS),
            ("suppliers", SUPPLIER_ROWS),
        ],
    );

    let sheets = split(&config, &fetched).unwrap();
    assert_eq!(sheets.len(), 5);
    let result = process_raw_tables(&config, &registry(&config)).unwrap();
    assert_eq!(result.published_rows, 1);

    let published = fs::read_to_string(&result.output_path).unwrap();
    assert!(published.contains("Acme Ltd"), "{published}");
    assert!(!published.contains("Stale Supplier Ltd"), "{published}");
}

#[test]
fn workbook_without_an_entity_sheet_fails_the_split() {
    let dir = tempfile::tempdir().unwrap();
    let config = project(dir.path(), STALE_SUPPLIERS);
    let fetched = write_workbook(
        &config,
        &[
            ("Field Information", NOTES_ROWS),
            ("tender_items", ITEM_ROWS),
            ("buyer", BUYER_ROWS),
            ("tender", TENDER_ROWS),
            ("awards", AWARD_ROWS),
        ],
    );

    let err = split(&config, &fetched).unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<IngestError>(),
            Some(IngestError::MissingSheet { sheet, .. }) if sheet == "suppliers"
        ),
        "{err:#}"
    );
    assert!(!config.storage.raw_table_path(EntityKind::Suppliers).exists());

    let err = process_raw_tables(&config, &registry(&config)).unwrap_err();
    assert!(format!("{err:#}").contains("load raw suppliers table"), "{err:#}");
    assert!(!config.storage.output_path.exists());
}
