use formtree_config::{ConfigError, EngineConfig};
use std::fs;
use tempfile::TempDir;

#[test]
fn load_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().expect("temp dir");

    let config =
        EngineConfig::load(dir.path().join("formtree.toml")).expect("missing file should not fail");

    assert_eq!(config, EngineConfig::default());
}

#[test]
fn load_reads_keys_table() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("formtree.toml");
    fs::write(
        &path,
        "[keys]\nclient_id = \"uid\"\n\n[conflict]\nobsolete_code = \"STALE\"\n",
    )
    .expect("scratch config should be writable");

    let config = EngineConfig::load(&path).expect("config should load");

    assert_eq!(config.keys.client_id, "uid");
    assert_eq!(config.keys.modified_at, "modified_at");
    assert_eq!(config.conflict.obsolete_code, "STALE");
}

#[test]
fn load_reports_parse_failures() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("formtree.toml");
    fs::write(&path, "[messages\nrequired = 1\n").expect("scratch config should be writable");

    let err = EngineConfig::load(&path).expect_err("broken toml should fail");

    assert!(matches!(err, ConfigError::Parse(_)));
}
