//! Configuration loading and root folder resolution
//!
//! Bootstrap settings come from a small TOML file. Every value resolves in
//! priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or malformed TOML file is never fatal: a warning is logged and the
//! compiled defaults apply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "SCDB_ROOT_FOLDER";

/// Environment variable overriding the catalog backend URL
pub const API_URL_ENV: &str = "SCDB_API_URL";

/// Backend URL used when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// SQLite file holding the durable session cache, relative to the root folder
pub const DATABASE_FILE: &str = "scdb.db";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the local database (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<PathBuf>,

    /// Catalog backend base URL, e.g. `https://sc.example.org`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Per-request HTTP timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Page size for the admin paper list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_page_size: Option<u32>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Compiled-in defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub config_file: Option<PathBuf>,
    pub log_level: String,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub admin_page_size: u32,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            config_file: default_config_path(),
            log_level: default_log_level(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            admin_page_size: 20,
        }
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/scdb
        dirs::data_local_dir()
            .map(|d| d.join("scdb"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/scdb"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/scdb
        dirs::data_dir()
            .map(|d| d.join("scdb"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/scdb"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\scdb
        dirs::data_local_dir()
            .map(|d| d.join("scdb"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\scdb"))
    } else {
        PathBuf::from("./scdb_data")
    }
}

/// Default location of the TOML config file (`<config dir>/scdb/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("scdb").join("config.toml"))
}

/// Read and parse a TOML config file, failing on any error
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Load TOML config with graceful degradation
///
/// Missing file → debug log + defaults. Unreadable or malformed file → warning
/// + defaults.
pub fn load_toml_config(path: &Path) -> TomlConfig {
    if !path.exists() {
        debug!(path = %path.display(), "No config file, using compiled defaults");
        return TomlConfig::default();
    }

    match read_toml_config(path) {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Ignoring config file, using compiled defaults");
            TomlConfig::default()
        }
    }
}

/// Write TOML config atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| Error::Config(format!("Invalid config path: {}", path.display())))?;
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, content)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(())
}

/// Root folder resolution (CLI → ENV → TOML → compiled default)
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml(mut self, config: &TomlConfig) -> Self {
        self.toml_root = config.root_folder.clone();
        self
    }

    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if let Some(path) = &self.toml_root {
            return path.clone();
        }

        // Priority 4: OS-dependent compiled default
        default_root_folder()
    }
}

/// Creates the root folder and locates files inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            debug!(path = %self.root_folder.display(), "Created root folder");
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_defaults() {
        let logging = LoggingConfig::default();
        assert_eq!(logging.level, "info");
        assert!(logging.file.is_none());
    }

    #[test]
    fn test_partial_toml_uses_field_defaults() {
        let config: TomlConfig = toml::from_str("api_base_url = \"http://sc.example\"\n").unwrap();
        assert_eq!(config.api_base_url.as_deref(), Some("http://sc.example"));
        assert_eq!(config.logging.level, "info");
        assert!(config.root_folder.is_none());
        assert!(config.admin_page_size.is_none());
    }

    #[test]
    fn test_logging_section_parses() {
        let config: TomlConfig =
            toml::from_str("[logging]\nlevel = \"debug\"\nfile = \"/tmp/scdb.log\"\n").unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/scdb.log")));
    }

    #[test]
    fn test_database_path_inside_root() {
        let init = RootFolderInitializer::new(PathBuf::from("/data/scdb"));
        assert_eq!(init.database_path(), PathBuf::from("/data/scdb/scdb.db"));
    }
}
