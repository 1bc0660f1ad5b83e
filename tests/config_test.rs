use std::fs;
use std::path::Path;

use genelinks::config::*;
use genelinks::errors::PipelineError;
use tempfile::TempDir;

#[test]
fn test_default_config_matches_reference_columns() {
    let config = PipelineConfig::default();
    assert_eq!(config.protein_column, "Protein.stable.ID");
    assert_eq!(config.gene_column, "Gene.stable.ID");
    assert_eq!(config.namespace_separator, '.');
    assert!(config.field_separator.is_none());
    assert!(!config.skip_malformed);
}

#[test]
fn test_missing_config_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let loaded = load_config(&dir.path().join(CONFIG_FILENAME)).unwrap();
    assert_eq!(loaded, PipelineConfig::default());
}

#[test]
fn test_save_and_load_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("genelinks.json");
    let config = PipelineConfig {
        skip_malformed: true,
        threads: 4,
        field_separator: Some('\t'),
        ..PipelineConfig::default()
    };
    save_config(&path, &config).unwrap();
    assert!(!path.with_extension("tmp").exists());
    assert_eq!(load_config(&path).unwrap(), config);
}

#[test]
fn test_save_and_load_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("genelinks.toml");
    let config = PipelineConfig {
        output_file: "edges.csv".to_string(),
        ..PipelineConfig::default()
    };
    save_config(&path, &config).unwrap();
    assert_eq!(load_config(&path).unwrap(), config);
}

#[test]
fn test_partial_config_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("genelinks.json");
    fs::write(&path, r#"{ "gene_column": "gene_id" }"#).unwrap();
    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded.gene_column, "gene_id");
    assert_eq!(loaded.protein_column, DEFAULT_PROTEIN_COLUMN);
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("genelinks.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(load_config(&path).is_err());

    fs::write(&path, r#"{ "field_separator": ".", "namespace_separator": "." }"#).unwrap();
    assert!(load_config(&path).is_err());
}

#[test]
fn test_unparsable_config_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let json = dir.path().join("genelinks.json");
    fs::write(&json, "{ not json").unwrap();
    let err = load_config(&json).unwrap_err();
    assert!(matches!(err, PipelineError::Config { .. }), "got {err:?}");

    let toml = dir.path().join("genelinks.toml");
    fs::write(&toml, "threads = [").unwrap();
    let err = load_config(&toml).unwrap_err();
    assert!(matches!(err, PipelineError::Config { .. }), "got {err:?}");
    assert!(err.to_string().contains("genelinks.toml"));
}

#[test]
fn test_ensure_csv_extension() {
    assert_eq!(ensure_csv_extension(Path::new("out")), Path::new("out.csv"));
    assert_eq!(ensure_csv_extension(Path::new("out.csv")), Path::new("out.csv"));
    assert_eq!(ensure_csv_extension(Path::new("out.CSV")), Path::new("out.CSV"));
    assert_eq!(
        ensure_csv_extension(Path::new("dir/edges.txt")),
        Path::new("dir/edges.txt.csv")
    );
}
