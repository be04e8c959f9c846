//! CLI module for BulkCrop
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::LogFormat;

pub mod args;
pub mod commands;

pub use args::{CropArgs, ProbeArgs, ValidateArgs};

/// BulkCrop CLI
///
/// Crops a batch of short videos to a rectangle drawn over a scaled preview,
/// re-encoding each one with ffmpeg.
#[derive(Parser, Debug)]
#[command(name = "bulkcrop")]
#[command(about = "BulkCrop - Crop batches of short videos with ffmpeg")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level or filter directive (overridden by RUST_LOG)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    /// Configuration file (default: ./bulkcrop.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the ffmpeg binary
    #[arg(long, global = true)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Path to the ffprobe binary
    #[arg(long, global = true)]
    pub ffprobe_path: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crop a batch of videos
    Crop(CropArgs),
    /// Show the dimensions and duration of videos
    Probe(ProbeArgs),
    /// Check videos against the upload limits
    Validate(ValidateArgs),
}

impl Cli {
    /// Configuration overrides given on the command line, as `(key, value)`
    pub fn config_overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = Vec::new();
        if let Some(path) = &self.ffmpeg_path {
            overrides.push(("ffmpeg_path", path.display().to_string()));
        }
        if let Some(path) = &self.ffprobe_path {
            overrides.push(("ffprobe_path", path.display().to_string()));
        }

        match &self.command {
            Commands::Crop(args) => overrides.extend(args.config_overrides()),
            Commands::Validate(args) => overrides.extend(args.config_overrides()),
            Commands::Probe(_) => {}
        }
        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_crop_overrides() {
        let cli = Cli::try_parse_from([
            "bulkcrop",
            "--ffmpeg-path",
            "/opt/ffmpeg",
            "crop",
            "a.mp4",
            "--crop",
            "0,0,10,10",
            "--crf",
            "20",
            "--container",
            "800x450",
        ])
        .unwrap();

        let overrides = cli.config_overrides();
        assert!(overrides.contains(&("ffmpeg_path", "/opt/ffmpeg".to_string())));
        assert!(overrides.contains(&("crf", "20".to_string())));
        assert!(overrides.contains(&("container_width", "800".to_string())));
        assert!(overrides.contains(&("container_height", "450".to_string())));
    }

    #[test]
    fn test_crf_out_of_range_rejected() {
        let result = Cli::try_parse_from([
            "bulkcrop", "crop", "a.mp4", "--crop", "0,0,10,10", "--crf", "52",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_crop_requires_a_source() {
        assert!(Cli::try_parse_from(["bulkcrop", "crop", "--crop", "0,0,10,10"]).is_err());
        assert!(Cli::try_parse_from(["bulkcrop", "crop", "a.mp4"]).is_err());
        assert!(Cli::try_parse_from(["bulkcrop", "crop", "--manifest", "jobs.json"]).is_ok());
    }
}
