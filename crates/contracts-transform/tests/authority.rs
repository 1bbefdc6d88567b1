//! Tests for authority registry loading and enrichment.

use std::fs;

use contracts_ingest::column_strings;
use contracts_model::{AUTHORITY_CODE_COLUMN, EntityKind};
use contracts_transform::data_utils::string_frame;
use contracts_transform::{
    AuthorityRecord, AuthorityRegistry, EnrichOptions, TableFrame, TransformError,
    enrich_authorities,
};

const REGISTRY_CSV: &str = "\
local-authority-code,official-name,nice-name,alt-names,region,county,gss-code
E01000001,Example Council,Example,Example Borough;Exampleton Council,North,Exampleshire,E06000001
HCK,London Borough of Hackney,Hackney,,London,,E09000012
NEW1,Newport City Council,Newport,,Wales,,W06000022
NEW2,Newport Council,,,South West,Shropshire,
,Orphan Row,,,,,
";

fn registry() -> AuthorityRegistry {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("authorities.csv");
    fs::write(&path, REGISTRY_CSV).unwrap();
    AuthorityRegistry::load_csv(&path).unwrap()
}

fn buyers(names: Vec<Option<&str>>) -> TableFrame {
    let links: Vec<Option<&str>> = (0..names.len()).map(|_| Some("r")).collect();
    TableFrame::for_entity(
        EntityKind::Buyer,
        string_frame(vec![("_link_release", links), ("council", names)]).unwrap(),
    )
}

fn strings(frame: &TableFrame, column: &str) -> Vec<Option<String>> {
    column_strings(frame.data.column(column).unwrap())
}

#[test]
fn loads_registry_and_skips_rows_without_code() {
    let registry = registry();
    assert_eq!(registry.len(), 4);
    let example = registry.resolve("Exampleton Council").unwrap();
    assert_eq!(example.code, "E01000001");
    assert_eq!(example.gss_code.as_deref(), Some("E06000001"));
    assert_eq!(example.alt_names, vec!["Example Borough", "Exampleton Council"]);
}

#[test]
fn missing_required_header_is_a_schema_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("authorities.csv");
    fs::write(&path, "local-authority-code,nice-name\nE1,Example\n").unwrap();

    let err = AuthorityRegistry::load_csv(&path).unwrap_err();
    assert!(
        matches!(&err, TransformError::SchemaMismatch { message, .. } if message.contains("official-name")),
        "{err}"
    );
}

#[test]
fn unreadable_registry_is_reported_with_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.csv");
    let err = AuthorityRegistry::load_csv(&path).unwrap_err();
    assert!(matches!(err, TransformError::Registry { path: p, .. } if p == path));
}

#[test]
fn enrichment_attaches_code_and_gss() {
    let frame = buyers(vec![
        Some("EXAMPLE COUNCIL"),
        Some("Unknown Org"),
        None,
        Some("Hackney Council"),
    ]);

    let enriched = enrich_authorities(&frame, &registry(), &EnrichOptions::default()).unwrap();
    let out = &enriched.frame;
    assert_eq!(
        out.column_names(),
        vec!["_link_release", "council", AUTHORITY_CODE_COLUMN, "gss-code"]
    );
    assert_eq!(
        strings(out, AUTHORITY_CODE_COLUMN),
        vec![Some("E01000001".into()), None, None, Some("HCK".into())]
    );
    assert_eq!(
        strings(out, "gss-code"),
        vec![Some("E06000001".into()), None, None, Some("E09000012".into())]
    );
    assert_eq!(enriched.report.matched, 2);
    assert_eq!(enriched.report.unmatched, 2);
    assert!(enriched.report.ambiguous.is_empty());
}

#[test]
fn extended_enrichment_adds_region_and_county() {
    let frame = buyers(vec![Some("Example")]);
    let options = EnrichOptions {
        include_gss: false,
        include_region_and_county: true,
        ..EnrichOptions::default()
    };

    let out = enrich_authorities(&frame, &registry(), &options).unwrap().frame;
    assert_eq!(
        out.column_names(),
        vec!["_link_release", "council", AUTHORITY_CODE_COLUMN, "region", "county"]
    );
    assert_eq!(strings(&out, "county"), vec![Some("Exampleshire".into())]);
}

#[test]
fn ambiguous_names_take_the_first_entry_and_are_reported_once() {
    let frame = buyers(vec![Some("Newport Council"), Some("NEWPORT")]);

    let enriched = enrich_authorities(&frame, &registry(), &EnrichOptions::default()).unwrap();
    assert_eq!(
        strings(&enriched.frame, AUTHORITY_CODE_COLUMN),
        vec![Some("NEW1".into()), Some("NEW1".into())]
    );
    let ambiguous = &enriched.report.ambiguous;
    assert_eq!(ambiguous.len(), 1);
    assert_eq!(ambiguous[0].normalized, "newport");
    assert_eq!(ambiguous[0].chosen_code, "NEW1");
    assert_eq!(ambiguous[0].candidate_codes, vec!["NEW1", "NEW2"]);
    assert_eq!(ambiguous[0].rows, 2);
}

#[test]
fn missing_name_column_is_a_schema_mismatch() {
    let frame = TableFrame::for_entity(
        EntityKind::Buyer,
        string_frame(vec![("_link_release", vec![Some("r1")])]).unwrap(),
    );
    let err = enrich_authorities(&frame, &registry(), &EnrichOptions::default()).unwrap_err();
    assert!(
        matches!(&err, TransformError::SchemaMismatch { table, message }
            if table == "buyer" && message.contains("council")),
        "{err}"
    );
}

#[test]
fn existing_code_column_is_not_overwritten() {
    let frame = TableFrame::for_entity(
        EntityKind::Buyer,
        string_frame(vec![
            ("council", vec![Some("Example")]),
            (AUTHORITY_CODE_COLUMN, vec![Some("X")]),
        ])
        .unwrap(),
    );
    let registry = AuthorityRegistry::new(vec![AuthorityRecord::new("E1", "Example")]);
    let err = enrich_authorities(&frame, &registry, &EnrichOptions::default()).unwrap_err();
    assert!(matches!(err, TransformError::SchemaMismatch { .. }));
}
