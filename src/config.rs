//! Configuration for the screen shield.

use crate::channel::CHANNEL_NAME;
use crate::presentation::{BlurStyle, CoverContent};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration for the shield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the control channel the host talks to
    pub channel_name: String,

    /// App identity shown on the background blur cover
    pub app_name: String,

    /// Caption under the lock glyph on the secured cover
    pub secured_caption: String,

    /// Glyph drawn on both covers
    pub lock_glyph: String,

    /// Whether the platform offers material blurs
    pub material_blur: bool,

    /// Blur cover fade-in when the app resigns active
    #[serde(with = "duration_ms")]
    pub blur_fade_in: Duration,

    /// Blur cover fade-out when the app becomes active
    #[serde(with = "duration_ms")]
    pub blur_fade_out: Duration,

    /// Secured cover fade-out when the app becomes active
    #[serde(with = "duration_ms")]
    pub secured_fade_out: Duration,

    /// How often the control thread advances animations while idle
    #[serde(with = "duration_ms")]
    pub frame_interval: Duration,

    /// Default tracing filter when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel_name: CHANNEL_NAME.to_string(),
            app_name: "Protected App".to_string(),
            secured_caption: "Protected Content".to_string(),
            lock_glyph: "🔒".to_string(),
            material_blur: true,
            blur_fade_in: Duration::from_millis(200),
            blur_fade_out: Duration::from_millis(200),
            secured_fade_out: Duration::from_millis(300),
            frame_interval: Duration::from_millis(16),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if it is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("screen-shield")
            .join("config.json")
    }

    /// Content of the opaque secured cover.
    pub fn secured_content(&self) -> CoverContent {
        CoverContent::secured(&self.lock_glyph, &self.secured_caption)
    }

    /// Content of the background blur cover.
    pub fn background_content(&self) -> CoverContent {
        CoverContent::background(
            &self.lock_glyph,
            &self.app_name,
            BlurStyle::for_platform(self.material_blur),
        )
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(serde_json::Error),
    #[error("Serialize error: {0}")]
    Serialize(serde_json::Error),
}

/// Serde support for millisecond durations.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
