//! FFprobe adapter for media file probing
//!
//! Reads only container and stream headers (`-show_streams -show_format`),
//! never decodes frames.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeSideData {
    rotation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    #[serde(default)]
    tags: Option<std::collections::HashMap<String, String>>,
    #[serde(default)]
    side_data_list: Option<Vec<FfprobeSideData>>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    streams: Option<Vec<FfprobeStream>>,
}

impl FfprobeStream {
    /// Display rotation in degrees, from side data or the legacy `rotate` tag
    fn rotation(&self) -> i64 {
        let from_side_data = self
            .side_data_list
            .as_ref()
            .and_then(|list| list.iter().find_map(|d| d.rotation));
        let from_tag = self
            .tags
            .as_ref()
            .and_then(|tags| tags.get("rotate"))
            .and_then(|r| r.trim().parse::<f64>().ok());

        from_side_data
            .or(from_tag)
            .map(|r| (r.round() as i64).rem_euclid(360))
            .unwrap_or(0)
    }
}

/// Parse ffprobe JSON output into metadata
///
/// Dimensions are reported as displayed: a stream rotated by 90 or 270
/// degrees has its width and height swapped.
pub fn parse_ffprobe_json(json: &str) -> Result<VideoMetadata, CropError> {
    let output: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| CropError::Probe(format!("Failed to parse ffprobe JSON: {}", e)))?;

    let stream = output
        .streams
        .as_ref()
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.codec_type.as_deref() == Some("video"))
        })
        .ok_or_else(|| CropError::Probe("No video stream found".to_string()))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(CropError::Probe(
                "Video stream has no dimensions".to_string(),
            ))
        }
    };
    let dimensions = match stream.rotation() {
        90 | 270 => VideoDimensions::new(height, width),
        _ => VideoDimensions::new(width, height),
    };

    let duration = output
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .map(Duration::from_secs_f64);

    Ok(VideoMetadata {
        dimensions,
        duration,
    })
}

/// FFprobe-based probe adapter
pub struct FfprobeAdapter {
    ffprobe_path: PathBuf,
}

impl FfprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }

    async fn probe_path(&self, path: &Path) -> Result<VideoMetadata, CropError> {
        debug!(path = %path.display(), "Running ffprobe");

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| CropError::Probe(format!("Failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CropError::Probe(format!("ffprobe failed: {}", stderr.trim())));
        }

        let json = String::from_utf8(output.stdout)
            .map_err(|_| CropError::Probe("ffprobe output was not valid UTF-8".to_string()))?;
        parse_ffprobe_json(&json)
    }
}

#[async_trait]
impl VideoProber for FfprobeAdapter {
    async fn probe(&self, file: &VideoFile) -> Result<VideoMetadata, CropError> {
        if let Some(path) = file.path.as_ref().filter(|p| p.exists()) {
            return self.probe_path(path).await;
        }

        // In-memory input: hand ffprobe a temporary copy
        let suffix = format!(".{}", file.extension());
        let temp = tempfile::Builder::new()
            .prefix("bulkcrop-probe-")
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| CropError::Probe(format!("Failed to create temp file: {}", e)))?;
        tokio::fs::write(temp.path(), &file.bytes)
            .await
            .map_err(|e| CropError::Probe(format!("Failed to write temp file: {}", e)))?;

        self.probe_path(temp.path()).await
    }
}
