use std::fs;

use contracts_ingest::{IngestError, cell_string, publish_csv_frame, read_csv_frame};

#[test]
fn round_trips_quoted_fields_through_publish() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("buyer.csv");
    fs::write(
        &source,
        "_link,_link_release,name\nB1,R1,\"Example Council, Housing\"\nB2,R2,\n",
    )
    .expect("write csv");

    let df = read_csv_frame(&source).expect("read csv");
    assert_eq!(df.height(), 2);
    assert_eq!(
        cell_string(&df, "name", 0).as_deref(),
        Some("Example Council, Housing")
    );
    assert_eq!(cell_string(&df, "name", 1), None);

    let published = dir.path().join("out").join("published.csv");
    fs::create_dir_all(published.parent().unwrap()).expect("create out dir");
    publish_csv_frame(&df, &published).expect("publish");
    let contents = fs::read_to_string(&published).expect("read published");
    assert_eq!(
        contents,
        "_link,_link_release,name\nB1,R1,\"Example Council, Housing\"\nB2,R2,\n"
    );
}

#[test]
fn header_only_csv_reads_as_empty_frame() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("suppliers.csv");
    fs::write(&path, "_link,_link_release,name\n").expect("write csv");

    let df = read_csv_frame(&path).expect("read csv");
    assert_eq!(df.height(), 0);
    assert_eq!(df.width(), 3);
}

#[test]
fn missing_csv_is_reported_with_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("awards.csv");
    let err = read_csv_frame(&path).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
    assert!(err.to_string().contains("awards.csv"));
}
