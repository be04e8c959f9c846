//! Logging setup

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::{BulkCropError, BulkCropResult};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Pretty,
    /// Compact text format
    Compact,
    /// JSON format for structured logging
    Json,
}

/// Build the filter: `RUST_LOG` when set, `level` otherwise
pub fn build_filter(level: &str) -> BulkCropResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| BulkCropError::Config {
        message: format!("Invalid log level '{}': {}", level, e),
    })
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for `--json` output.
pub fn init_logging(level: &str, format: LogFormat) -> BulkCropResult<()> {
    let filter = build_filter(level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| BulkCropError::Config {
        message: format!("Failed to initialize logging: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_levels_parse() {
        for level in ["error", "warn", "info", "debug", "trace", "bulkcrop_cli=debug"] {
            assert!(EnvFilter::try_new(level).is_ok(), "{}", level);
        }
    }

    #[test]
    fn test_log_format_values() {
        assert_eq!(LogFormat::from_str("json", true), Ok(LogFormat::Json));
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }
}
