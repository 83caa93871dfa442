//! TOML application configuration.
//!
//! Everything here is ambient wiring: where the catalog document lives and
//! how the HTTP fetcher behaves. Source descriptors themselves are not
//! configuration; they live in the catalog (see [`crate::catalog`]).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Well-known per-user location of the catalog document, e.g.
/// `~/.local/share/tabquery/catalog.json` on Linux.
fn default_catalog_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "tabquery")
        .map(|dirs| dirs.data_dir().join("catalog.json"))
        .unwrap_or_else(|| PathBuf::from("catalog.json"))
}

fn default_timeout_secs() -> u64 {
    10
}

/// Load configuration from `path`, or fall back to defaults when no config
/// file was given.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.fetch.timeout_secs == 0 {
        anyhow::bail!("fetch.timeout_secs must be > 0");
    }

    Ok(config)
}
