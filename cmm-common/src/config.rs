//! Configuration loading and data folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable overriding the data folder
pub const DATA_FOLDER_ENV: &str = "CMM_DATA_FOLDER";

/// TOML configuration file schema
///
/// All fields are optional; missing fields fall back to compiled defaults so
/// an absent or partial config file never prevents startup.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Data folder holding the input snapshot and the cache namespaces
    pub data_folder: Option<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Acceptance threshold for free-text submission matching
    pub match_threshold: Option<u32>,

    /// Bitrate of the canonical encoded form (ffmpeg `-ab` value, e.g. "256k")
    pub encode_bitrate: Option<String>,

    /// HTTP fetch timeout in seconds
    pub fetch_timeout_secs: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter ("error", "warn", "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Load configuration from an explicit TOML file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load configuration from the first platform config location that
    /// exists, falling back to defaults when none does.
    ///
    /// An unreadable config file is a warning, not a fatal error.
    pub fn load_default_locations() -> Self {
        for path in default_config_paths() {
            if path.exists() {
                match Self::load(&path) {
                    Ok(config) => return config,
                    Err(e) => warn!(path = %path.display(), error = %e, "Ignoring unreadable config file"),
                }
            }
        }
        Self::default()
    }
}

/// Candidate config file locations in priority order
fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("cmm").join("config.toml"));
    }
    if cfg!(target_os = "linux") {
        paths.push(PathBuf::from("/etc/cmm/config.toml"));
    }
    paths
}

/// Resolve the data folder, priority order:
/// 1. Command-line argument (highest priority)
/// 2. `CMM_DATA_FOLDER` environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    let env_value = std::env::var(DATA_FOLDER_ENV).ok();

    let mut sources = Vec::new();
    if cli_arg.is_some() {
        sources.push("command line");
    }
    if env_value.is_some() {
        sources.push("environment");
    }
    if config.data_folder.is_some() {
        sources.push("config file");
    }
    if sources.len() > 1 {
        warn!(
            "Data folder set in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }
    if let Some(path) = env_value {
        return PathBuf::from(path);
    }
    if let Some(path) = &config.data_folder {
        return PathBuf::from(path);
    }
    default_data_folder()
}

/// Get OS-dependent default data folder path
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("cmm"))
        .unwrap_or_else(|| PathBuf::from("./cmm_data"))
}
