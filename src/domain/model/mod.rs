// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::CropError;

/// Preview width used when a job carries no container size
pub const DEFAULT_CONTAINER_WIDTH: f64 = 640.0;
/// Preview height used when a job carries no container size
pub const DEFAULT_CONTAINER_HEIGHT: f64 = 360.0;
/// MIME type of every cropped output
pub const OUTPUT_MIME_TYPE: &str = "video/mp4";

/// Crop rectangle in preview-display pixels
///
/// A zero width or height means the rectangle has not been drawn yet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    /// Create a new crop rectangle
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// All fields are finite and non-negative
    pub fn is_well_formed(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Well formed with a positive area
    pub fn has_area(&self) -> bool {
        self.is_well_formed() && self.width > 0.0 && self.height > 0.0
    }

    /// Parse `x,y,width,height`
    pub fn parse(value: &str) -> Result<Self, CropError> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(CropError::InvalidCrop(format!(
                "Expected x,y,width,height but got '{}'",
                value
            )));
        }

        let mut numbers = [0.0f64; 4];
        for (slot, part) in numbers.iter_mut().zip(parts.iter()) {
            *slot = part.parse::<f64>().map_err(|_| {
                CropError::InvalidCrop(format!("'{}' is not a number", part))
            })?;
        }

        let rect = Self::new(numbers[0], numbers[1], numbers[2], numbers[3]);
        if !rect.is_well_formed() {
            return Err(CropError::InvalidCrop(format!(
                "Crop values must be finite and non-negative: '{}'",
                value
            )));
        }
        Ok(rect)
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.x, self.y
        )
    }
}

/// Size of the preview viewport the crop rectangle was drawn in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerDimensions {
    pub width: f64,
    pub height: f64,
}

impl ContainerDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Parse `WIDTHxHEIGHT`
    pub fn parse(value: &str) -> Result<Self, CropError> {
        let (w, h) = value
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| {
                CropError::InvalidCrop(format!("Expected WIDTHxHEIGHT but got '{}'", value))
            })?;
        let width = w
            .trim()
            .parse::<f64>()
            .map_err(|_| CropError::InvalidCrop(format!("Invalid container width '{}'", w)))?;
        let height = h
            .trim()
            .parse::<f64>()
            .map_err(|_| CropError::InvalidCrop(format!("Invalid container height '{}'", h)))?;

        let dims = Self::new(width, height);
        if !dims.is_valid() {
            return Err(CropError::InvalidCrop(format!(
                "Container dimensions must be positive: '{}'",
                value
            )));
        }
        Ok(dims)
    }
}

impl Default for ContainerDimensions {
    fn default() -> Self {
        Self::new(DEFAULT_CONTAINER_WIDTH, DEFAULT_CONTAINER_HEIGHT)
    }
}

/// Native pixel size of a source video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

impl VideoDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl fmt::Display for VideoDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Crop rectangle in native video pixels, ready for the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCrop {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl NativeCrop {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Encoder crop filter, `crop=<w>:<h>:<x>:<y>`
    pub fn to_filter(&self) -> String {
        format!("crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

/// Metadata obtained by probing a source video
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub dimensions: VideoDimensions,
    pub duration: Option<Duration>,
}

/// An input video held in memory
#[derive(Debug, Clone)]
pub struct VideoFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
    /// Where the bytes were read from, when known
    pub path: Option<PathBuf>,
}

impl VideoFile {
    /// Create a video file, deriving the MIME type from the name
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let mime_type = mime_type_for_name(&name).to_string();
        Self {
            name,
            mime_type,
            bytes: bytes.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercase extension without the dot, `mp4` when absent
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "mp4".to_string())
    }
}

/// Map a file name to its video MIME type
pub fn mime_type_for_name(name: &str) -> &'static str {
    let ext = std::path::Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "ogg" | "ogv" => "video/ogg",
        "mov" | "qt" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "flv" => "video/x-flv",
        _ => "application/octet-stream",
    }
}

/// One unit of work submitted to the batch orchestrator
#[derive(Debug, Clone)]
pub struct VideoJob {
    /// Caller-assigned identifier, unique within a batch
    pub id: String,
    /// Source video; `None` when it could not be loaded
    pub file: Option<VideoFile>,
    pub crop_settings: CropRect,
    pub container_dimensions: Option<ContainerDimensions>,
}

impl VideoJob {
    pub fn new(id: impl Into<String>, file: VideoFile, crop_settings: CropRect) -> Self {
        Self {
            id: id.into(),
            file: Some(file),
            crop_settings,
            container_dimensions: None,
        }
    }

    pub fn with_container(mut self, container: ContainerDimensions) -> Self {
        self.container_dimensions = Some(container);
        self
    }

    /// Name of the source file, empty when missing
    pub fn file_name(&self) -> &str {
        self.file.as_ref().map(|f| f.name.as_str()).unwrap_or("")
    }
}

/// Encoded output held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub bytes: Arc<[u8]>,
    pub mime_type: String,
}

impl Blob {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn mp4(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::new(bytes, OUTPUT_MIME_TYPE)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One completed crop, correlated to its job by id
#[derive(Debug, Clone, PartialEq)]
pub struct CroppedVideo {
    pub id: String,
    pub processed_video: Blob,
}

/// A job the batch could not process
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedJob {
    pub id: String,
    pub file_name: String,
    pub reason: String,
}

/// Everything a batch produced
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub results: Vec<CroppedVideo>,
    pub skipped: Vec<SkippedJob>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.results.iter().any(|r| r.id == id)
    }

    /// "N succeeded, M skipped"
    pub fn summary(&self) -> String {
        format!(
            "{} succeeded, {} skipped due to errors",
            self.succeeded(),
            self.skipped_count()
        )
    }
}

/// Lifecycle of a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatchState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// Progress notification emitted by the batch orchestrator
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Rounded percentage of jobs finished, 0-100
    pub percent: u8,
    /// File about to be processed, or empty after the last one
    pub current_file: String,
    /// Set when a job has just completed
    pub just_completed: Option<CroppedVideo>,
}

/// Cooperative cancellation flag shared between a batch and its canceller
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; takes effect at the next checkpoint
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

/// Named quality presets offered to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Fastest,
    Balanced,
    Quality,
}

impl QualityPreset {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "fastest" => Ok(QualityPreset::Fastest),
            "balanced" => Ok(QualityPreset::Balanced),
            "quality" => Ok(QualityPreset::Quality),
            other => Err(format!(
                "Unknown quality preset '{}'. Valid presets: fastest, balanced, quality",
                other
            )),
        }
    }

    pub fn encode_settings(&self) -> EncodeSettings {
        let (preset, crf) = match self {
            QualityPreset::Fastest => ("ultrafast", 23),
            QualityPreset::Balanced => ("fast", 18),
            QualityPreset::Quality => ("medium", 15),
        };
        EncodeSettings {
            video_codec: "libx264".to_string(),
            preset: preset.to_string(),
            crf,
        }
    }
}

/// Encoder parameters for the crop pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeSettings {
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            preset: "ultrafast".to_string(),
            crf: 28,
        }
    }
}

#[cfg(test)]
mod tests;
