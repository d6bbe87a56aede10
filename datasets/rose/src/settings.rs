//! Settings loading for the RoSE loader
//!
//! Settings are loaded from:
//! 1. Environment variables ROSE_DATA_DIR / ROSE_CORPUS_DIR (highest priority)
//! 2. The file named by ROSE_CONFIG_PATH
//! 3. ~/.rose/rose.toml
//! 4. Default values under the user cache directory

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the extracted archive and the source corpora live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoseSettings {
    /// Directory the `rose_data` archive was extracted into
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Root of the JSON-lines corpus exports
    #[serde(default = "default_corpus_dir")]
    pub corpus_dir: PathBuf,
}

fn cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rose")
}

fn default_data_dir() -> PathBuf {
    cache_root().join("data")
}

fn default_corpus_dir() -> PathBuf {
    cache_root().join("corpora")
}

impl Default for RoseSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            corpus_dir: default_corpus_dir(),
        }
    }
}

impl RoseSettings {
    /// Load settings from the config file (if any) and the environment
    pub fn load() -> Result<Self> {
        let settings = match Self::find_config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(_) | None => {
                tracing::info!("No settings file found, using defaults");
                Self::default()
            }
        };

        Ok(settings.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Read settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::info!("Loading settings from: {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {:?}", path))
    }

    /// Apply ROSE_DATA_DIR / ROSE_CORPUS_DIR overrides from a variable lookup
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup("ROSE_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("ROSE_CORPUS_DIR") {
            self.corpus_dir = PathBuf::from(dir);
        }
        self
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("ROSE_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|home| home.join(".rose").join("rose.toml"))
    }
}
