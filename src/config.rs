use crate::models::ActionKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub inactivity_timeout_secs: u64,
    pub action: ActionKind,
    pub check_interval_secs: u64,
    pub process_interval_secs: u64,
    pub process_name: Option<String>,
    /// Duration of each synthetic mouse movement
    pub motion_ms: u64,
    pub work_start: String,
    pub work_end: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inactivity_timeout_secs: 300,
            action: ActionKind::Move,
            check_interval_secs: 10,
            process_interval_secs: 60,
            process_name: None,
            motion_ms: 100,
            work_start: "09:00".to_string(),
            work_end: "18:00".to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.inactivity_timeout_secs == 0 {
            anyhow::bail!("inactivity_timeout_secs must be positive");
        }
        if self.check_interval_secs == 0 {
            anyhow::bail!("check_interval_secs must be positive");
        }
        if self.process_interval_secs == 0 {
            anyhow::bail!("process_interval_secs must be positive");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let mut path =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
    path.push(".tmetric-helper");
    path.push("config.json");
    Ok(path)
}

/// Loads the user config, falling back to defaults when no file exists.
/// The file is never created or written.
pub fn load_config() -> Result<Config> {
    match config_path() {
        Ok(path) => load_from(&path),
        Err(err) => {
            tracing::debug!(error = %err, "No home directory, using default config");
            Ok(Config::default())
        }
    }
}

pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: Config = serde_json::from_str(&data)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    config.validate()?;
    tracing::debug!(path = %path.display(), "Loaded config");
    Ok(config)
}
