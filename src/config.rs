//! Runtime configuration
//!
//! Resolved in three layers: `~/.nippo/config.json`, then `NIPPO_*`
//! environment variables, then command-line flags.

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{NippoError, Result};

/// Default listen address for `nippo serve`
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

const CONFIG_FILENAME: &str = "config.json";

pub const ENV_DATA_DIR: &str = "NIPPO_DATA_DIR";
pub const ENV_STORE_URL: &str = "NIPPO_STORE_URL";
pub const ENV_BIND: &str = "NIPPO_BIND";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding `reports/**/*.jsonl` and `projects.json`
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Base URL of the daily-report service; takes precedence over `data_dir`
    #[serde(default)]
    pub store_url: Option<String>,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub tenant: Option<String>,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            store_url: None,
            bind: default_bind(),
            tenant: None,
        }
    }
}

impl Config {
    /// `~/.nippo`
    pub fn home_dir() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| NippoError::Config("Cannot determine home directory".into()))?;
        Ok(base_dirs.home_dir().join(".nippo"))
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join(CONFIG_FILENAME))
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| NippoError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| NippoError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load from `path`, or from `~/.nippo/config.json` when none is given,
    /// then apply environment overrides
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load(p)?,
            None => Self::load(&Self::default_path()?)?,
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override fields from environment-style lookups; empty values are ignored
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(dir) = get(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(url) = get(ENV_STORE_URL) {
            self.store_url = Some(url);
        }
        if let Some(bind) = get(ENV_BIND) {
            self.bind = bind;
        }
    }

    /// Data directory, defaulting to `~/.nippo/data`
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::home_dir()?.join("data")),
        }
    }
}
