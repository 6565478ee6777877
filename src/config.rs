use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_LOG_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_REVIEW_FILE, DEFAULT_STATIONS_FILE,
    DEFAULT_SUMMARY_FILE, ENV_DATA_DIR, ENV_OUTPUT_DIR,
};
use crate::domain::ChargingNetwork;
use crate::error::{ReconcileError, Result};
use crate::pipeline::processing::conflation::{NetworkConflictPolicy, PassOptions};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
    pub reconcile: ReconcileConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub data_dir: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub stations_file: String,
    pub review_file: String,
    pub summary_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            stations_file: DEFAULT_STATIONS_FILE.to_string(),
            review_file: DEFAULT_REVIEW_FILE.to_string(),
            summary_file: DEFAULT_SUMMARY_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

/// Where a loaded [`Config`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// The file was missing; defaults are in effect.
    Defaults(PathBuf),
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!(path = %path.display(), "Loaded config"),
            ConfigSource::Defaults(path) => {
                warn!(path = %path.display(), "Config file not found, using defaults")
            }
        }
    }
}

/// Matching behaviour. Distance thresholds are fixed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    pub network_conflict: NetworkConflictPolicy,
    /// Networks whose nearby same-network listings collapse into one site.
    pub consolidated_networks: Vec<ChargingNetwork>,
    /// Merge NREL non-networked listings into networks NREL does not carry.
    pub unsupported_network_rescue: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        let options = PassOptions::default();
        Self {
            network_conflict: NetworkConflictPolicy::default(),
            consolidated_networks: options.consolidated_networks,
            unsupported_network_rescue: options.unsupported_network_rescue,
        }
    }
}

impl Config {
    /// Load from a TOML file. A missing file yields the defaults; a file
    /// that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_source(path).map(|(config, _)| config)
    }

    /// Like [`Config::load`], also reporting where the values came from so
    /// the caller can log it once logging is initialized.
    pub fn load_with_source(path: &Path) -> Result<(Self, ConfigSource)> {
        if !path.exists() {
            return Ok((Self::default(), ConfigSource::Defaults(path.to_path_buf())));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ReconcileError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        Ok((config, ConfigSource::File(path.to_path_buf())))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply `EV_RECONCILE_DATA_DIR` / `EV_RECONCILE_OUTPUT_DIR`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(ENV_DATA_DIR).ok().map(PathBuf::from),
            std::env::var(ENV_OUTPUT_DIR).ok().map(PathBuf::from),
        )
    }

    /// Replace the data and output directories when given. Empty paths are ignored.
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, output_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir.filter(|d| !d.as_os_str().is_empty()) {
            self.input.data_dir = dir;
        }
        if let Some(dir) = output_dir.filter(|d| !d.as_os_str().is_empty()) {
            self.output.dir = dir;
        }
        self
    }

    pub fn pass_options(&self) -> PassOptions {
        PassOptions {
            consolidated_networks: self.reconcile.consolidated_networks.clone(),
            unsupported_network_rescue: self.reconcile.unsupported_network_rescue,
        }
    }

    pub fn stations_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.stations_file)
    }

    pub fn review_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.review_file)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.summary_file)
    }
}
