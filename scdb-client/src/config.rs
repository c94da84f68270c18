//! Client configuration resolution
//!
//! Bootstrap values follow the same priority as the root folder:
//! CLI argument → `SCDB_API_URL` → TOML file → compiled default.

use scdb_common::config::{CompiledDefaults, TomlConfig, API_URL_ENV};
use std::time::Duration;
use tracing::{info, warn};

/// Effective client settings after resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL without trailing slash
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub admin_page_size: u32,
}

impl ClientConfig {
    pub fn resolve(cli_api_url: Option<&str>, toml: &TomlConfig) -> Self {
        let defaults = CompiledDefaults::for_current_platform();

        Self {
            api_base_url: resolve_api_url(cli_api_url, toml),
            request_timeout: Duration::from_secs(
                toml.request_timeout_secs
                    .filter(|secs| *secs > 0)
                    .unwrap_or(defaults.request_timeout_secs),
            ),
            admin_page_size: toml
                .admin_page_size
                .filter(|size| *size > 0)
                .unwrap_or(defaults.admin_page_size),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        let defaults = CompiledDefaults::for_current_platform();
        Self {
            api_base_url: defaults.api_base_url,
            request_timeout: Duration::from_secs(defaults.request_timeout_secs),
            admin_page_size: defaults.admin_page_size,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Resolve the backend URL (CLI → ENV → TOML → default)
///
/// Logs a warning when more than one source is set, naming the winner.
pub fn resolve_api_url(cli_arg: Option<&str>, toml: &TomlConfig) -> String {
    let env_value = std::env::var(API_URL_ENV).ok();

    let sources = [
        ("command line", non_blank(cli_arg)),
        ("environment", non_blank(env_value.as_deref())),
        ("config file", non_blank(toml.api_base_url.as_deref())),
    ];

    let set: Vec<&str> = sources
        .iter()
        .filter(|(_, value)| value.is_some())
        .map(|(name, _)| *name)
        .collect();

    let chosen = sources.iter().find_map(|(name, value)| value.map(|v| (*name, v)));

    let url = match chosen {
        Some((source, url)) => {
            if set.len() > 1 {
                warn!(
                    source = source,
                    also_set = ?&set[1..],
                    "API URL set in multiple places, using highest priority"
                );
            } else {
                info!(source = source, url = url, "API URL resolved");
            }
            url.to_string()
        }
        None => CompiledDefaults::for_current_platform().api_base_url,
    };

    url.trim_end_matches('/').to_string()
}
