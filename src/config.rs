// YAML configuration for the CLI

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "dailyreport";

/// User settings, all optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory of the report store
    pub store_path: Option<PathBuf>,
    /// Where `export` writes documents when `--out` is not given
    pub export_dir: Option<PathBuf>,
    /// Defaults for `record` when the names are not passed
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Config {
    /// `<config_dir>/dailyreport/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.yaml"))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. The default path is optional and a
    /// missing file yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(eyre!("Config file not found: {}", path.display()));
        }
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(path = ?path, "Loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Store directory: configured, else `<data_local_dir>/dailyreport`, else `./.dailyreport`
    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .or_else(|| dirs::data_local_dir().map(|d| d.join(APP_DIR)))
            .unwrap_or_else(|| PathBuf::from(".dailyreport"))
    }

    /// Export directory: configured, else the current directory
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
