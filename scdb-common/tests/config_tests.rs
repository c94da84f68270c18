//! Configuration resolution and graceful degradation
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate SCDB_ROOT_FOLDER are marked with #[serial].

use scdb_common::config::{
    load_toml_config, read_toml_config, write_toml_config, CompiledDefaults, LoggingConfig,
    RootFolderInitializer, RootFolderResolver, TomlConfig, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.log_level, "info");
    assert_eq!(defaults.admin_page_size, 20);
    assert!(defaults.api_base_url.starts_with("http"));

    let path_str = defaults.root_folder.to_string_lossy();
    assert!(path_str.contains("scdb"), "default root should be an scdb folder");
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root_folder = RootFolderResolver::new().resolve();
    let defaults = CompiledDefaults::for_current_platform();
    assert_eq!(root_folder, defaults.root_folder);
}

#[test]
#[serial]
fn test_cli_arg_beats_env_and_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..TomlConfig::default()
    };

    let root_folder = RootFolderResolver::new()
        .with_cli_arg(Some(PathBuf::from("/from/cli")))
        .with_toml(&toml)
        .resolve();
    env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(root_folder, PathBuf::from("/from/cli"));
}

#[test]
#[serial]
fn test_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..TomlConfig::default()
    };

    let root_folder = RootFolderResolver::new().with_toml(&toml).resolve();
    env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(root_folder, PathBuf::from("/from/env"));
}

#[test]
#[serial]
fn test_blank_env_falls_through_to_toml() {
    env::set_var(ROOT_FOLDER_ENV, "   ");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..TomlConfig::default()
    };

    let root_folder = RootFolderResolver::new().with_toml(&toml).resolve();
    env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(root_folder, PathBuf::from("/from/toml"));
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = load_toml_config(&dir.path().join("absent.toml"));
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_malformed_config_file_degrades_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is = = not toml").unwrap();

    assert!(read_toml_config(&path).is_err());
    assert_eq!(load_toml_config(&path), TomlConfig::default());
}

#[test]
fn test_write_then_read_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = TomlConfig {
        root_folder: Some(dir.path().join("data")),
        api_base_url: Some("https://sc.example.org".to_string()),
        request_timeout_secs: Some(5),
        admin_page_size: Some(50),
        logging: LoggingConfig {
            level: "debug".to_string(),
            file: None,
        },
    };

    write_toml_config(&config, &path).unwrap();
    assert!(!path.with_file_name("config.toml.tmp").exists());
    assert_eq!(read_toml_config(&path).unwrap(), config);
}

#[test]
fn test_initializer_creates_directory() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("a").join("b");

    let init = RootFolderInitializer::new(root.clone());
    init.ensure_directory_exists().unwrap();
    assert!(root.is_dir());
    // Idempotent
    init.ensure_directory_exists().unwrap();
    assert_eq!(init.database_path(), root.join("scdb.db"));
}
