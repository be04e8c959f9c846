// Validate interactor - Screens input videos before they are queued

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::VideoProber;

/// Limits applied to every input video
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadLimits {
    pub max_file_size_mb: u64,
    pub max_duration: Duration,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_duration: Duration::from_secs(60),
        }
    }
}

/// Outcome of screening one video
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub file_name: String,
    pub valid: bool,
    pub errors: Vec<String>,
    /// Duration in seconds, when it could be determined
    pub duration: Option<f64>,
}

/// Checks format, size, duration and file name of candidate inputs
pub struct UploadValidator {
    prober: Arc<dyn VideoProber>,
    limits: UploadLimits,
}

impl UploadValidator {
    pub fn new(prober: Arc<dyn VideoProber>, limits: UploadLimits) -> Self {
        Self { prober, limits }
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// Collect every problem with `file`; valid only when there are none
    pub async fn validate(&self, file: &VideoFile) -> ValidationReport {
        let mut errors = Vec::new();

        if !is_allowed_video_mime(&file.mime_type) {
            errors.push(format!(
                "Invalid file format: {}. Please use a supported video format (MP4, WebM, etc.)",
                file.mime_type
            ));
        }

        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if file.size() > max_bytes {
            errors.push(format!(
                "File too large: {:.2}MB. Maximum size is {}MB.",
                file.size() as f64 / (1024.0 * 1024.0),
                self.limits.max_file_size_mb
            ));
        }

        let mut duration = None;
        match self.prober.probe(file).await {
            Ok(VideoMetadata {
                duration: Some(length),
                ..
            }) => {
                duration = Some(length.as_secs_f64());
                if length > self.limits.max_duration {
                    errors.push(format!(
                        "Video too long: {:.1} seconds. Maximum duration is {} seconds.",
                        length.as_secs_f64(),
                        self.limits.max_duration.as_secs()
                    ));
                }
            }
            Ok(_) | Err(_) => {
                errors.push(
                    "Could not determine video duration. Please check the file.".to_string(),
                );
            }
        }

        if !is_safe_filename(&file.name) {
            errors.push("Invalid filename. Please rename the file before processing.".to_string());
        }

        debug!(file = %file.name, errors = errors.len(), "Validated input");
        ValidationReport {
            file_name: file.name.clone(),
            valid: errors.is_empty(),
            errors,
            duration,
        }
    }
}
