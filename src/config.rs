//! Configuration for the task-rollup binary.
//!
//! Values resolve in tiers, lowest to highest: built-in defaults, the YAML
//! config file, environment variables, CLI flags (applied by the caller).
//!
//! ## Environment Variables
//! - `TASK_ROLLUP_CONFIG_PATH` - Explicit config file (overrides discovery)
//! - `TASK_ROLLUP_DB_PATH` - Database path

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// User config dir: `~/.task-rollup`.
fn user_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".task-rollup"))
}

fn default_db_path() -> PathBuf {
    user_dir()
        .map(|dir| dir.join("tasks.db"))
        .unwrap_or_else(|| PathBuf::from("tasks.db"))
}

impl Config {
    /// Load configuration from the discovered file, then apply env overrides.
    ///
    /// A missing config file is not an error; defaults apply.
    pub fn load() -> Result<Self> {
        let path = std::env::var("TASK_ROLLUP_CONFIG_PATH")
            .ok()
            .map(PathBuf::from)
            .or_else(|| user_dir().map(|dir| dir.join("config.yaml")));

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        if let Ok(db_path) = std::env::var("TASK_ROLLUP_DB_PATH") {
            config.db_path = PathBuf::from(db_path);
        }

        Ok(config)
    }

    /// Parse a specific YAML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}
