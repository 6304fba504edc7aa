use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::session::corpus::LengthMode;
use crate::store::json_store::default_data_dir;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub default_mode: LengthMode,
    /// Where session data lives. Falls back to the platform data dir.
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_theme() -> String {
    "paper".to_string()
}
fn default_tick_ms() -> u64 {
    250
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            default_mode: LengthMode::default(),
            data_dir: None,
            tick_ms: default_tick_ms(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shine")
            .join("config.toml")
    }

    pub fn data_path(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_data_dir(),
        }
    }

    /// Reset unknown themes and keep the tick rate in a usable range.
    /// Call after deserialization.
    pub fn validate(&mut self, valid_themes: &[&str]) {
        if !valid_themes.contains(&self.theme.as_str()) {
            self.theme = default_theme();
        }
        self.tick_ms = self.tick_ms.clamp(50, 1000);
    }
}
