use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use habitkeep_core::DEFAULT_SLOT_CAPACITY;

const APP_NAME: &str = "habitkeep";
const CONFIG_FILE: &str = "config.json";
const DATA_FILE: &str = "habits.json";

/// Environment variable overriding the habit document location.
pub const DATA_ENV: &str = "HABITKEEP_DATA";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Location of the habit document. Defaults to the platform data dir.
    pub data_file: Option<PathBuf>,
    /// How many habits can be active at once.
    pub slot_capacity: usize,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            slot_capacity: DEFAULT_SLOT_CAPACITY,
            log_filter: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the user's config directory.
    /// Returns default config if file doesn't exist or fails to parse.
    pub fn load() -> Self {
        match get_config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;

        let config: Self = serde_json::from_str(&content).context("Failed to parse config file")?;

        if config.slot_capacity == 0 {
            anyhow::bail!("slot_capacity must be at least 1");
        }

        Ok(config)
    }

    /// Save the current configuration to the user's config directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Picks the habit document: explicit flag, then `HABITKEEP_DATA`, then
    /// the configured path, then the platform data directory.
    pub fn resolve_data_file(&self, flag: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = flag {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = std::env::var_os(DATA_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = &self.data_file {
            return Ok(path.clone());
        }
        default_data_file()
    }
}

pub fn default_data_file() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join(DATA_FILE))
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
