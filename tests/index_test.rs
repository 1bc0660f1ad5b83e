use std::fs;
use std::io::Cursor;

use genelinks::index::*;
use tempfile::TempDir;

const REFERENCE: &str = "\
Gene.stable.ID,Transcript.stable.ID,Protein.stable.ID,Gene.name
ENSG00000000003,ENST00000373020,ENSP00000362111,TSPAN6
ENSG00000000005,ENST00000373031,ENSP00000362122,TNMD
ENSG00000000419,ENST00000371588,,DPM1
";

#[test]
fn builds_from_csv_by_column_name() {
    let index = IdentifierIndex::from_csv_reader(
        Cursor::new(REFERENCE),
        "reference.csv",
        &IndexColumns::default(),
    )
    .unwrap();

    assert_eq!(index.len(), 2);
    assert_eq!(index.get("ENSP00000362111"), Some("ENSG00000000003"));
    assert_eq!(index.get("ENSP00000362122"), Some("ENSG00000000005"));
    assert!(index.get("ENSP00000000000").is_none());
    assert_eq!(index.skipped_rows(), 1, "row without protein id is skipped");
}

#[test]
fn duplicate_keys_last_wins() {
    let data = "Protein.stable.ID,Gene.stable.ID\nP1,G1\nP2,G2\nP1,G9\n";
    let index =
        IdentifierIndex::from_csv_reader(Cursor::new(data), "dup.csv", &IndexColumns::default())
            .unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index.get("P1"), Some("G9"));
    assert_eq!(index.duplicates(), 1);
}

#[test]
fn missing_column_is_malformed() {
    let data = "Protein.stable.ID,Gene.name\nP1,TSPAN6\n";
    let err =
        IdentifierIndex::from_csv_reader(Cursor::new(data), "bad.csv", &IndexColumns::default())
            .unwrap_err();
    assert!(err.is_malformed());
    assert!(err.to_string().contains("Gene.stable.ID"));
}

#[test]
fn custom_columns() {
    let data = "protein,gene\nP1,G1\n";
    let columns = IndexColumns {
        protein: "protein".to_string(),
        gene: "gene".to_string(),
    };
    let index = IdentifierIndex::from_csv_reader(Cursor::new(data), "custom.csv", &columns).unwrap();
    assert_eq!(index.get("P1"), Some("G1"));
}

#[test]
fn from_pairs_trims_and_skips_empty() {
    let index = IdentifierIndex::from_pairs([(" P1 ", "G1"), ("P2", ""), ("", "G3")]);
    assert_eq!(index.len(), 1);
    assert!(index.contains("P1"));
    assert_eq!(index.skipped_rows(), 2);
}

#[test]
fn lookup_is_deterministic() {
    let index = IdentifierIndex::from_pairs([("P1", "G1"), ("P2", "G2")]);
    for _ in 0..3 {
        assert_eq!(index.get("P1"), Some("G1"));
        assert_eq!(index.get("P3"), None);
    }
}

#[test]
fn load_dispatches_on_extension() {
    let dir = TempDir::new().unwrap();

    let csv_path = dir.path().join("universal.csv");
    fs::write(&csv_path, REFERENCE).unwrap();
    let from_csv = IdentifierIndex::load(&csv_path, &IndexColumns::default()).unwrap();
    assert_eq!(from_csv.len(), 2);

    let json_path = dir.path().join("universal.json");
    fs::write(
        &json_path,
        r#"[
            {"row": [{"name": "Protein.stable.ID", "value": "ENSP00000362111"},
                     {"name": "Gene.stable.ID", "value": "ENSG00000000003"}]}
        ]"#,
    )
    .unwrap();
    let from_json = IdentifierIndex::load(&json_path, &IndexColumns::default()).unwrap();
    assert_eq!(from_json.get("ENSP00000362111"), Some("ENSG00000000003"));
}

#[test]
fn load_missing_file_is_file_error() {
    let dir = TempDir::new().unwrap();
    let err = IdentifierIndex::load(&dir.path().join("missing.csv"), &IndexColumns::default())
        .unwrap_err();
    assert!(matches!(err, genelinks::errors::PipelineError::File { .. }));
}
