//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use tracing::info;

use crate::adapters::toml_config::{AppConfig, TomlConfigAdapter, DEFAULT_CONFIG_FILE};
use crate::error::BulkCropResult;

/// Where the configuration file comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`; must exist
    Explicit(PathBuf),
    /// `bulkcrop.toml` in this directory, used only if present
    Discover(PathBuf),
}

impl ConfigSource {
    pub fn from_cli(config: Option<&Path>) -> Self {
        match config {
            Some(path) => ConfigSource::Explicit(path.to_path_buf()),
            None => ConfigSource::Discover(PathBuf::from(".")),
        }
    }
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
///
/// `cli_overrides` are `(key, value)` pairs taken from command-line flags.
pub fn initialize_configuration_hierarchy(
    source: &ConfigSource,
    cli_overrides: &[(&str, String)],
) -> BulkCropResult<AppConfig> {
    initialize_with_env(source, cli_overrides, |var| std::env::var(var).ok())
}

/// Same as [`initialize_configuration_hierarchy`] with an injectable environment
pub fn initialize_with_env<F>(
    source: &ConfigSource,
    cli_overrides: &[(&str, String)],
    env: F,
) -> BulkCropResult<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    info!("Initializing configuration hierarchy");

    // Step 1: defaults, already held by a fresh adapter
    let adapter = TomlConfigAdapter::new();

    // Step 2: configuration file
    match source {
        ConfigSource::Explicit(path) => adapter.load_file(path)?,
        ConfigSource::Discover(dir) => {
            let candidate = dir.join(DEFAULT_CONFIG_FILE);
            if candidate.is_file() {
                adapter.load_file(&candidate)?;
            } else {
                info!("No config file loaded");
            }
        }
    }

    // Step 3: environment variables
    let env_overrides = adapter.apply_env_with(env)?;
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    // Step 4: command-line arguments
    for (key, value) in cli_overrides {
        adapter.set(key, value)?;
    }
    if !cli_overrides.is_empty() {
        info!("Applied {} CLI configuration overrides", cli_overrides.len());
    }

    adapter.validate()?;
    info!("Configuration hierarchy initialized successfully");
    Ok(adapter.config())
}
