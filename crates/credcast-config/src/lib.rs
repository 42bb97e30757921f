//! Configuration management for credcast.
//!
//! Parses `credcast.toml` with serde and discovers the file in the current
//! directory or its parents. Embedders can adjust the loaded values through
//! [`ConfigOverrides`].
//!
//! ```toml
//! [diagrams]
//! theme = "dark"
//! security_level = "loose"
//!
//! [retry]
//! delay_ms = 1000
//! ```

mod diagrams;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

pub use diagrams::{DiagramsConfig, FlowchartConfig, SecurityLevel, Theme};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "credcast.toml";

/// Upper bound for the retry delay.
const MAX_RETRY_DELAY_MS: u64 = 60_000;

/// Values that override configuration file settings.
///
/// Only non-None values are applied.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    /// Override the diagram theme.
    pub theme: Option<Theme>,
    /// Override the retry delay in milliseconds.
    pub retry_delay_ms: Option<u64>,
    /// Override whether the deferred diagram retry runs.
    pub retry_enabled: Option<bool>,
}

/// Post-processing configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Diagram engine options.
    pub diagrams: DiagramsConfig,
    /// Deferred diagram retry.
    pub retry: RetryConfig,
    /// Per-pass switches.
    pub passes: PassesConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Deferred diagram retry settings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Whether the retry is scheduled at all.
    pub enabled: bool,
    /// Delay after activation, in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: 1000,
        }
    }
}

impl RetryConfig {
    /// Retry delay as a [`Duration`].
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Switches for the individual passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct PassesConfig {
    /// Invoke the syntax highlighter.
    pub highlight: bool,
    /// Queue math typesetting.
    pub typeset: bool,
    /// Convert and render diagrams.
    pub diagrams: bool,
    /// Wrap annotation tokens.
    pub annotations: bool,
}

impl Default for PassesConfig {
    fn default() -> Self {
        Self {
            highlight: true,
            typeset: true,
            diagrams: true,
            annotations: true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration with optional overrides.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `credcast.toml` in the current directory and its parents, falling
    /// back to defaults.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, or if reading,
    /// parsing or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_from(&cwd)),
        };

        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        if let Some(overrides) = overrides {
            config.apply_overrides(overrides);
            config.validate()?;
        }

        Ok(config)
    }

    /// Search for the config file in `start` and its parents.
    #[must_use]
    pub fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(theme) = overrides.theme {
            self.diagrams.theme = theme;
        }
        if let Some(delay_ms) = overrides.retry_delay_ms {
            self.retry.delay_ms = delay_ms;
        }
        if let Some(enabled) = overrides.retry_enabled {
            self.retry.enabled = enabled;
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the retry delay is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.delay_ms == 0 {
            return Err(ConfigError::Validation(
                "retry.delay_ms must be greater than 0".to_owned(),
            ));
        }
        if self.retry.delay_ms > MAX_RETRY_DELAY_MS {
            return Err(ConfigError::Validation(format!(
                "retry.delay_ms cannot exceed {MAX_RETRY_DELAY_MS}"
            )));
        }
        Ok(())
    }
}
