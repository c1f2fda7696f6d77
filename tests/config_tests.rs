use lectern::{Config, ConfigError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_missing_config_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::load(temp_dir.path()).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.page_size().unwrap().get(), 29);
    assert!(config.translation.enabled);
}

#[test]
fn test_partial_config_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("config.json"),
        r#"{ "page_size": 78, "translation": { "target_lang": "de" } }"#,
    )
    .unwrap();

    let config = Config::load(temp_dir.path()).unwrap();
    assert_eq!(config.page_size, 78);
    assert_eq!(config.translation.target_lang, "de");
    assert_eq!(config.translation.source_lang, "en");
    assert_eq!(config.translation.timeout_secs, 10);
}

#[test]
fn test_zero_page_size_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("config.json"), r#"{ "page_size": 0 }"#).unwrap();

    assert!(matches!(
        Config::load(temp_dir.path()),
        Err(ConfigError::InvalidPageSize(0))
    ));
}

#[test]
fn test_malformed_config_is_a_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("config.json"), "{ not json").unwrap();
    assert!(matches!(
        Config::load(temp_dir.path()),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_save_then_load() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("lectern");
    let mut config = Config::default();
    config.page_size = 100;
    config.database_path = Some("/tmp/books.db".into());
    config.save(&dir).unwrap();

    let loaded = Config::load(&dir).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(
        loaded.resolve_database_path(Path::new("/data")),
        Path::new("/tmp/books.db")
    );
    assert_eq!(
        Config::default().resolve_database_path(Path::new("/data")),
        Path::new("/data/library.db")
    );
}
