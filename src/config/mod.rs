//! Engine configuration.
//!
//! Runtime options live in a TOML file, separate from the authored game
//! data (which is JSON). Sections:
//!
//! - `[game]` - banner text, help-on-start, and the game data file to load
//! - `[storage]` - whether and where saves are written
//! - `[logging]` - log level for the `play` session
//!
//! Every value has a default, so a missing section (or a missing file, for
//! `Config::default()`) still yields a playable setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Banner title printed when the session starts.
    #[serde(default = "default_title")]
    pub title: String,
    /// Banner description printed under the title.
    #[serde(default)]
    pub description: String,
    /// Print the help screen as part of the opening banner.
    #[serde(default = "default_show_help")]
    pub show_help: bool,
    /// Path of the JSON game definition to load.
    #[serde(default = "default_data_file")]
    pub data_file: String,
}

fn default_title() -> String {
    "A Text Adventure".to_string()
}

fn default_show_help() -> bool {
    true
}

fn default_data_file() -> String {
    "data/demo_game.json".to_string()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            description: String::new(),
            show_help: default_show_help(),
            data_file: default_data_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// When false the game runs in no-save mode.
    #[serde(default = "default_save_enabled")]
    pub enabled: bool,
    /// Directory for the sled save database.
    #[serde(default = "default_save_path")]
    pub path: String,
}

fn default_save_enabled() -> bool {
    true
}

fn default_save_path() -> String {
    "data/saves".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: default_save_enabled(),
            path: default_save_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// error | warn | info | debug | trace
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub async fn load(path: &str) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config file {}", path))?;
        let config: Config =
            toml::from_str(&raw).with_context(|| format!("parsing config file {}", path))?;
        Ok(config)
    }

    /// Write a starter configuration file.
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let raw = toml::to_string_pretty(&config).context("serializing default config")?;
        fs::write(path, raw)
            .await
            .with_context(|| format!("writing config file {}", path))?;
        Ok(())
    }
}
