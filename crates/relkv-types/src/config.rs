//! Configuration loading for relkv.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/relkv/config.{toml,json,yaml}.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::RelkvError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to RocksDB storage directory
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Sample keys shown per prefix by the summary command
    #[serde(default = "default_summary_sample_size")]
    pub summary_sample_size: usize,
}

fn default_db_path() -> String {
    ProjectDirs::from("", "", "relkv")
        .map(|p| p.data_local_dir().join("db"))
        .unwrap_or_else(|| PathBuf::from("./relkv_data"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_summary_sample_size() -> usize {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
            summary_sample_size: default_summary_sample_size(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/relkv/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (RELKV_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, RelkvError> {
        let config_dir = ProjectDirs::from("", "", "relkv")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("db_path", default_db_path())
            .map_err(|e| RelkvError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| RelkvError::Config(e.to_string()))?
            .set_default("summary_sample_size", default_summary_sample_size() as i64)
            .map_err(|e| RelkvError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // RELKV_DB_PATH, RELKV_LOG_LEVEL, ...
        builder = builder.add_source(Environment::with_prefix("RELKV").try_parsing(true));

        let config = builder
            .build()
            .map_err(|e| RelkvError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| RelkvError::Config(e.to_string()))
    }

    /// Expand ~ in db_path to the user's home directory
    pub fn expanded_db_path(&self) -> PathBuf {
        if let Some(rest) = self.db_path.strip_prefix("~/") {
            if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
                return home.join(rest);
            }
        }
        PathBuf::from(&self.db_path)
    }
}
