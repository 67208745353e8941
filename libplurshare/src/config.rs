//! Configuration management for plurshare

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::logging::LoggingConfig;
use crate::navigation::Scene;

/// Default upper bound for image files loaded by reference (20 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    pub ingestion: IngestionConfig,
    pub navigation: NavigationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Image files larger than this are skipped without being read
    pub max_image_bytes: u64,

    /// Whether shared links are added to the composition
    pub accept_urls: bool,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            accept_urls: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Scene presented when a session starts
    pub initial_scene: Scene,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            initial_scene: Scene::Rooms,
        }
    }
}

impl ShareConfig {
    /// Load configuration from the default location, falling back to
    /// defaults when no file exists there
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: ShareConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.ingestion.max_image_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ingestion.max_image_bytes".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Resolve the configuration file path (XDG Base Directory layout)
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("PLURSHARE_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("plurshare").join("config.toml"))
}
