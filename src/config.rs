// SPDX-License-Identifier: PMPL-1.0-or-later
//! Configuration handling for auditbot

use crate::aggregate::{AggregateOptions, BlockingGranularity};
use crate::catalog::Catalog;
use crate::error::{AuditError, Result};
use crate::report::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where referential documents come from
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Aggregation settings
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Scan report conversion settings
    #[serde(default)]
    pub normalize: NormalizeConfig,

    /// Report output settings
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// The builtin catalog, or the one loaded from `catalog.dir`
    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog.dir {
            Some(dir) => Catalog::load_dir(dir),
            None => Ok(Catalog::builtin().clone()),
        }
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions { blocking: self.aggregation.blocking }
    }
}

/// Referential catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding `rgaa.json`, `raweb.json` and `raam.json`.
    /// The embedded documents are used when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Aggregation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Count blocking issues per row or per criterion
    #[serde(default)]
    pub blocking: BlockingGranularity,
}

/// Scan normalization configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Fail the whole report on the first malformed criterion key
    #[serde(default)]
    pub strict: bool,
}

/// Report configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, compact, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|e| e == "toml").unwrap_or(false)
}

/// Load configuration from a path
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!("Config file not found at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;

    let config: Config = if is_toml(path) {
        toml::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    debug!(?config, "Loaded configuration");
    Ok(config)
}

/// Get the default config path
pub fn default_config_path() -> PathBuf {
    PathBuf::from(".auditbot/config.yml")
}

/// Write default configuration to a file
pub fn write_default_config(path: &Path) -> Result<()> {
    let config = Config::default();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = if is_toml(path) {
        toml::to_string_pretty(&config).map_err(|e| AuditError::Config(e.to_string()))?
    } else {
        serde_yaml::to_string(&config)?
    };

    std::fs::write(path, content)?;
    Ok(())
}
