//! Command-line argument definitions

use std::path::PathBuf;

use clap::{ArgGroup, Args};

use crate::domain::model::{ContainerDimensions, CropRect, QualityPreset};

fn parse_crop(value: &str) -> Result<CropRect, String> {
    CropRect::parse(value).map_err(|e| e.to_string())
}

fn parse_container(value: &str) -> Result<ContainerDimensions, String> {
    ContainerDimensions::parse(value).map_err(|e| e.to_string())
}

fn parse_quality(value: &str) -> Result<QualityPreset, String> {
    QualityPreset::parse(value)
}

fn crf_in_range(value: &str) -> Result<u8, String> {
    clap_num::number_range(value, 0, 51)
}

/// Arguments for the crop command
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .multiple(true)
        .args(["inputs", "dir", "manifest"])
))]
pub struct CropArgs {
    /// Input video files
    pub inputs: Vec<PathBuf>,

    /// Crop every video found under this directory
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Job manifest (.json, .yaml or .toml) with per-video crop settings
    #[arg(short, long, conflicts_with_all = ["inputs", "dir", "crop"])]
    pub manifest: Option<PathBuf>,

    /// Crop rectangle in preview pixels, applied to all inputs (x,y,width,height)
    #[arg(short, long, value_parser = parse_crop, required_unless_present = "manifest")]
    pub crop: Option<CropRect>,

    /// Preview container size the rectangle was drawn in (WIDTHxHEIGHT)
    #[arg(long, value_parser = parse_container)]
    pub container: Option<ContainerDimensions>,

    /// Directory for cropped outputs
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Quality preset (fastest, balanced, quality)
    #[arg(short, long, value_parser = parse_quality, conflicts_with_all = ["preset", "crf"])]
    pub quality: Option<QualityPreset>,

    /// x264 encoding preset
    #[arg(long)]
    pub preset: Option<String>,

    /// Constant Rate Factor (0-51)
    #[arg(long, value_parser = crf_in_range)]
    pub crf: Option<u8>,

    /// Print the batch summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl CropArgs {
    pub fn config_overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = Vec::new();
        if let Some(container) = &self.container {
            overrides.push(("container_width", container.width.to_string()));
            overrides.push(("container_height", container.height.to_string()));
        }
        if let Some(dir) = &self.output_dir {
            overrides.push(("output_dir", dir.display().to_string()));
        }
        if let Some(quality) = &self.quality {
            overrides.push(("quality", format!("{:?}", quality).to_lowercase()));
        }
        if let Some(preset) = &self.preset {
            overrides.push(("preset", preset.clone()));
        }
        if let Some(crf) = self.crf {
            overrides.push(("crf", crf.to_string()));
        }
        overrides
    }
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Video files to probe
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Video files to check
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Maximum file size in megabytes
    #[arg(long)]
    pub max_size_mb: Option<u64>,

    /// Maximum duration in seconds
    #[arg(long)]
    pub max_duration: Option<u64>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

impl ValidateArgs {
    pub fn config_overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = Vec::new();
        if let Some(size) = self.max_size_mb {
            overrides.push(("max_file_size_mb", size.to_string()));
        }
        if let Some(duration) = self.max_duration {
            overrides.push(("max_duration_secs", duration.to_string()));
        }
        overrides
    }
}
