//! Logging setup for plurshare hosts
//!
//! Text, JSON and pretty-printed output to stderr. Settings come from the
//! `[logging]` section of the config file and can be overridden with
//! `PLURSHARE_LOG_FORMAT` and `PLURSHARE_LOG_LEVEL`. `RUST_LOG`, when set,
//! wins over both.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::{Result, ShareError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Plain text, no colors
    #[default]
    Text,
    /// One JSON object per line
    Json,
    /// Colored multi-line output for development
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,

    /// Minimum level (error, warn, info, debug, trace) or a full filter
    /// directive such as `libplurshare=debug`
    pub level: String,

    /// Forces debug level
    #[serde(skip)]
    pub verbose: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: "warn".to_string(),
            verbose: false,
        }
    }
}

impl LoggingConfig {
    /// Apply `PLURSHARE_LOG_FORMAT` and `PLURSHARE_LOG_LEVEL` on top of the
    /// configured values. An unparseable format is ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(format) = std::env::var("PLURSHARE_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.format = format;
        }
        if let Ok(level) = std::env::var("PLURSHARE_LOG_LEVEL") {
            self.level = level;
        }
        self
    }

    /// Filter directive this configuration resolves to, ignoring `RUST_LOG`
    pub fn directive(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            &self.level
        }
    }

    /// Install the global subscriber. Fails if one is already installed.
    pub fn init(&self) -> Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.directive()))
            .map_err(|e| ShareError::Logging(e.to_string()))?;

        let installed = match self.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .flatten_event(true)
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init(),
        };

        installed.map_err(|e| ShareError::Logging(e.to_string()))
    }
}
