use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::constants::{DEFAULT_POSTER_EXTENSIONS, DEFAULT_THUMBNAIL_HEIGHT, DEFAULT_THUMBNAIL_WIDTH};
use crate::models::MediaLocation;
use crate::utils::{AppError, AppResult};
use crate::ui::video_list::{SortBy, SortOrder};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub thumbnails: ThumbnailConfig,

    #[serde(default)]
    pub list: ListConfig,

    #[serde(default)]
    pub last_media: LastMediaConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_poster_extensions")]
    pub poster_extensions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default)]
    pub sort_by: SortBy,

    #[serde(default)]
    pub descending: bool,
}

/// Last played media, written by the player and read when a list is activated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LastMediaConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default)]
    pub time_ms: u64,
}

impl ThumbnailConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(AppError::Configuration(format!(
                "thumbnail size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl ListConfig {
    pub fn sort_order(&self) -> SortOrder {
        if self.descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}

impl LastMediaConfig {
    pub fn last_played(&self) -> Option<(MediaLocation, Duration)> {
        self.location
            .as_deref()
            .filter(|location| !location.is_empty())
            .map(|location| (MediaLocation::new(location), Duration::from_millis(self.time_ms)))
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config file found, using defaults");
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
        config.thumbnails.validate()?;
        info!("Config loaded successfully");
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }

    /// Remember what was played last so the next activation can highlight it
    pub fn set_last_media(&mut self, location: &MediaLocation, time: Duration) {
        self.last_media.location = Some(location.to_string());
        self.last_media.time_ms = time.as_millis() as u64;
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("thumbline").join("config.toml"))
    }
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            poster_extensions: default_poster_extensions(),
        }
    }
}

fn default_width() -> u32 { DEFAULT_THUMBNAIL_WIDTH }
fn default_height() -> u32 { DEFAULT_THUMBNAIL_HEIGHT }
fn default_poster_extensions() -> Vec<String> {
    DEFAULT_POSTER_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}
