// Domain rules - Crop geometry and input policies

use crate::domain::errors::*;
use crate::domain::model::*;

/// MIME types accepted as crop inputs
pub const ALLOWED_VIDEO_MIME_TYPES: &[&str] = &[
    "video/mp4",
    "video/webm",
    "video/ogg",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-matroska",
    "video/x-flv",
];

/// File name extensions picked up when scanning a directory
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "webm", "ogg", "ogv", "mov", "qt", "avi", "mkv", "flv",
];

/// Prefix given to every cropped output file
pub const OUTPUT_PREFIX: &str = "cropped-";

const MAX_FILENAME_LEN: usize = 100;

/// How the video sits inside the preview viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewFit {
    /// Preview pixels per native pixel
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl PreviewFit {
    /// Fit a video into a container, preserving aspect ratio
    pub fn compute(video: &VideoDimensions, container: &ContainerDimensions) -> Self {
        let vw = video.width as f64;
        let vh = video.height as f64;

        if container.aspect_ratio() > video.aspect_ratio() {
            // Pillarboxed: bands left and right
            let scale = container.height / vh;
            Self {
                scale,
                offset_x: (container.width - vw * scale) / 2.0,
                offset_y: 0.0,
            }
        } else {
            // Letterboxed: bands top and bottom
            let scale = container.width / vw;
            Self {
                scale,
                offset_x: 0.0,
                offset_y: (container.height - vh * scale) / 2.0,
            }
        }
    }
}

/// Convert a crop drawn over the preview into native video pixels
///
/// The result is rounded to whole pixels and always lies within
/// `[0, width] x [0, height]` of the native frame.
pub fn map_to_native_crop(
    crop: &CropRect,
    video: &VideoDimensions,
    container: &ContainerDimensions,
) -> NativeCrop {
    let fit = PreviewFit::compute(video, container);
    let vw = video.width as f64;
    let vh = video.height as f64;

    let x = ((crop.x - fit.offset_x) / fit.scale).max(0.0);
    let y = ((crop.y - fit.offset_y) / fit.scale).max(0.0);
    let width = (vw - x).min(crop.width / fit.scale);
    let height = (vh - y).min(crop.height / fit.scale);

    let x = round_within(x, vw);
    let y = round_within(y, vh);
    let width = round_within(width, vw - x);
    let height = round_within(height, vh - y);

    NativeCrop::new(x as u32, y as u32, width as u32, height as u32)
}

/// Round to the nearest pixel and clamp into `[0, limit]`
fn round_within(value: f64, limit: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.round().clamp(0.0, limit.max(0.0))
}

/// Reject crops the encoder cannot apply to this video
pub fn validate_native_crop(crop: &NativeCrop, video: &VideoDimensions) -> Result<(), CropError> {
    if crop.width == 0 || crop.height == 0 {
        return Err(CropError::InvalidCrop(format!(
            "Mapped crop {}x{} has no area",
            crop.width, crop.height
        )));
    }

    let right = crop.x as u64 + crop.width as u64;
    let bottom = crop.y as u64 + crop.height as u64;
    if right > video.width as u64 || bottom > video.height as u64 {
        return Err(CropError::InvalidCrop(format!(
            "Crop area {} is outside video boundaries {}",
            crop.to_filter(),
            video
        )));
    }

    Ok(())
}

/// Reject preview crops that cannot be mapped
pub fn validate_preview_crop(crop: &CropRect) -> Result<(), CropError> {
    if !crop.is_well_formed() {
        return Err(CropError::InvalidCrop(format!(
            "Crop values must be finite and non-negative, got {}",
            crop
        )));
    }
    if crop.width <= 0.0 || crop.height <= 0.0 {
        return Err(CropError::InvalidCrop(
            "Invalid crop dimensions: width and height must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Whether the MIME type is an accepted video format
pub fn is_allowed_video_mime(mime_type: &str) -> bool {
    ALLOWED_VIDEO_MIME_TYPES.contains(&mime_type)
}

/// Whether a path looks like a video by extension
pub fn has_video_extension(path: &std::path::Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// File names must not try to escape their directory
pub fn is_safe_filename(name: &str) -> bool {
    !(name.contains("..") || name.contains('/') || name.contains('\\'))
}

/// Make a file name safe for writing into the output directory
pub fn sanitize_filename(name: &str) -> String {
    let stripped = name.replace("..", "").replace(['/', '\\'], "");
    let mut sanitized: String = stripped
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.chars().count() > MAX_FILENAME_LEN {
        let extension = sanitized.rsplit('.').next().unwrap_or("").to_string();
        let head: String = sanitized.chars().take(95).collect();
        sanitized = format!("{}.{}", head, extension);
    }

    sanitized
}

/// Output name for a cropped video
pub fn output_file_name(source_name: &str) -> String {
    format!("{}{}", OUTPUT_PREFIX, sanitize_filename(source_name))
}
