//! Tests for configuration loading and path resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate PTDF_DATA_DIR or PTDF_DATABASE are marked with
//! #[serial] so they run sequentially, not in parallel.

use ptdf_common::config::{resolve_data_dir, resolve_database, LoaderConfig, DATABASE_ENV, DATA_DIR_ENV};
use ptdf_common::Error;
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
#[serial]
fn test_env_var_overrides_toml() {
    env::set_var(DATA_DIR_ENV, "/from/env");

    let config = LoaderConfig {
        data_dir: Some(PathBuf::from("/from/toml")),
        ..LoaderConfig::default()
    };
    let resolved = resolve_data_dir(None, &config).unwrap();
    assert_eq!(resolved, PathBuf::from("/from/env"));

    env::remove_var(DATA_DIR_ENV);
}

#[test]
#[serial]
fn test_toml_used_when_no_cli_or_env() {
    env::remove_var(DATA_DIR_ENV);

    let config = LoaderConfig {
        data_dir: Some(PathBuf::from("/from/toml")),
        ..LoaderConfig::default()
    };
    let resolved = resolve_data_dir(None, &config).unwrap();
    assert_eq!(resolved, PathBuf::from("/from/toml"));
}

#[test]
#[serial]
fn test_missing_data_dir_is_config_error() {
    env::remove_var(DATA_DIR_ENV);

    let result = resolve_data_dir(None, &LoaderConfig::default());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_empty_env_var_is_ignored() {
    env::set_var(DATABASE_ENV, "   ");

    let config = LoaderConfig {
        database: Some(PathBuf::from("/from/toml/ptdf.db")),
        ..LoaderConfig::default()
    };
    assert_eq!(resolve_database(None, &config), PathBuf::from("/from/toml/ptdf.db"));

    env::remove_var(DATABASE_ENV);
}

#[test]
#[serial]
fn test_database_falls_back_to_os_default() {
    env::remove_var(DATABASE_ENV);

    let resolved = resolve_database(None, &LoaderConfig::default());
    assert!(resolved.ends_with("ptdf.db"));
}

#[test]
fn test_load_explicit_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "data_dir = \"/srv/ptdf\"\nfact_flush_every = 1000\nmax_split_depth = 3\n",
    )
    .unwrap();

    let config = LoaderConfig::load(Some(&path)).unwrap();
    assert_eq!(config.data_dir.as_deref(), Some(Path::new("/srv/ptdf")));
    assert_eq!(config.fact_flush_every, 1000);
    assert_eq!(config.max_split_depth, 3);
    assert_eq!(config.title_flush_every, 18_000);
}

#[test]
fn test_load_missing_explicit_file_fails() {
    let dir = TempDir::new().unwrap();
    let result = LoaderConfig::load(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_invalid_toml_is_rejected() {
    let result = LoaderConfig::from_toml_str("title_flush_every = \"lots\"");
    assert!(matches!(result, Err(Error::Config(_))));
}
