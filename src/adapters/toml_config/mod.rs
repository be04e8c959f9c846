// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::model::*;
use crate::error::{BulkCropError, BulkCropResult};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "bulkcrop.toml";
/// Prefix of environment overrides, e.g. `BULKCROP_CRF`
pub const ENV_PREFIX: &str = "BULKCROP_";

/// Every settable configuration key
pub const CONFIG_KEYS: &[&str] = &[
    "ffmpeg_path",
    "ffprobe_path",
    "container_width",
    "container_height",
    "quality",
    "preset",
    "crf",
    "max_video_count",
    "max_file_size_mb",
    "max_duration_secs",
    "output_dir",
];

/// Resolved application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub container_width: f64,
    pub container_height: f64,
    /// Named preset; when set it replaces `preset` and `crf`
    pub quality: Option<QualityPreset>,
    pub preset: String,
    pub crf: u8,
    pub max_video_count: usize,
    pub max_file_size_mb: u64,
    pub max_duration_secs: u64,
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let encode = EncodeSettings::default();
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            container_width: DEFAULT_CONTAINER_WIDTH,
            container_height: DEFAULT_CONTAINER_HEIGHT,
            quality: None,
            preset: encode.preset,
            crf: encode.crf,
            max_video_count: 10,
            max_file_size_mb: 100,
            max_duration_secs: 60,
            output_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    pub fn container(&self) -> ContainerDimensions {
        ContainerDimensions::new(self.container_width, self.container_height)
    }

    /// Encoder settings for the crop pass
    pub fn encode_settings(&self) -> EncodeSettings {
        match self.quality {
            Some(quality) => quality.encode_settings(),
            None => EncodeSettings {
                preset: self.preset.clone(),
                crf: self.crf,
                ..EncodeSettings::default()
            },
        }
    }

    pub fn validate(&self) -> BulkCropResult<()> {
        if self.crf > 51 {
            return Err(config_error("CRF value cannot exceed 51"));
        }
        if !self.container().is_valid() {
            return Err(config_error(format!(
                "Container dimensions must be positive, got {}x{}",
                self.container_width, self.container_height
            )));
        }
        if self.preset.trim().is_empty() {
            return Err(config_error("Encoder preset cannot be empty"));
        }
        if self.max_video_count == 0 || self.max_file_size_mb == 0 || self.max_duration_secs == 0 {
            return Err(config_error(
                "max_video_count, max_file_size_mb and max_duration_secs must be positive",
            ));
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> BulkCropError {
    BulkCropError::Config {
        message: message.into(),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> BulkCropResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| config_error(format!("Invalid value '{}' for {}: {}", value, key, e)))
}

/// TOML configuration adapter
///
/// Holds the configuration being assembled. Layers are applied from lowest
/// to highest precedence: defaults, file, environment, command line.
pub struct TomlConfigAdapter {
    config: Arc<RwLock<AppConfig>>,
    config_file_path: Arc<RwLock<Option<PathBuf>>>,
}

impl Default for TomlConfigAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl TomlConfigAdapter {
    /// Create new TOML config adapter holding the defaults
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
            config_file_path: Arc::new(RwLock::new(None)),
        }
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> AppConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// File the configuration was loaded from, if any
    pub fn config_file_path(&self) -> Option<PathBuf> {
        self.config_file_path
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Deserialize config from TOML text
    ///
    /// Keys may sit at the top level or under a `[bulkcrop]` table.
    pub fn parse_toml(toml_content: &str) -> BulkCropResult<AppConfig> {
        let parsed: toml::Table = toml::from_str(toml_content)
            .map_err(|e| config_error(format!("Failed to parse TOML config: {}", e)))?;

        let table = match parsed.get("bulkcrop") {
            Some(toml::Value::Table(section)) => section.clone(),
            _ => parsed,
        };

        toml::Value::Table(table)
            .try_into()
            .map_err(|e| config_error(format!("Invalid configuration: {}", e)))
    }

    /// Replace the configuration with the contents of a file
    pub fn load_file(&self, path: &Path) -> BulkCropResult<()> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            config_error(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let loaded = Self::parse_toml(&content)?;

        *self.config.write().unwrap_or_else(|e| e.into_inner()) = loaded;
        *self.config_file_path.write().unwrap_or_else(|e| e.into_inner()) =
            Some(path.to_path_buf());
        info!(path = %path.display(), "Loaded configuration file");
        Ok(())
    }

    /// Set one key from its string form
    pub fn set(&self, key: &str, value: &str) -> BulkCropResult<()> {
        let mut config = self.config.write().unwrap_or_else(|e| e.into_inner());
        match key {
            "ffmpeg_path" => config.ffmpeg_path = PathBuf::from(value),
            "ffprobe_path" => config.ffprobe_path = PathBuf::from(value),
            "container_width" => config.container_width = parse_value(key, value)?,
            "container_height" => config.container_height = parse_value(key, value)?,
            "quality" => {
                config.quality = Some(
                    QualityPreset::parse(value).map_err(config_error)?,
                )
            }
            "preset" => config.preset = value.trim().to_string(),
            "crf" => config.crf = parse_value(key, value)?,
            "max_video_count" => config.max_video_count = parse_value(key, value)?,
            "max_file_size_mb" => config.max_file_size_mb = parse_value(key, value)?,
            "max_duration_secs" => config.max_duration_secs = parse_value(key, value)?,
            "output_dir" => config.output_dir = PathBuf::from(value),
            other => return Err(config_error(format!("Unknown configuration key: {}", other))),
        }
        debug!(key = %key, value = %value, "Set config");
        Ok(())
    }

    /// Apply `BULKCROP_*` overrides found through `lookup`
    ///
    /// Returns the number of keys overridden.
    pub fn apply_env_with<F>(&self, lookup: F) -> BulkCropResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;
        for key in CONFIG_KEYS {
            let var = format!("{}{}", ENV_PREFIX, key.to_uppercase());
            if let Some(value) = lookup(&var) {
                info!("Found environment override: {} = {}", var, value);
                self.set(key, &value)?;
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&self) -> BulkCropResult<usize> {
        self.apply_env_with(|var| std::env::var(var).ok())
    }

    /// Validate the assembled configuration
    pub fn validate(&self) -> BulkCropResult<()> {
        self.config.read().unwrap_or_else(|e| e.into_inner()).validate()
    }
}
