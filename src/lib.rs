//! BulkCrop CLI Library
//!
//! Crops batches of short videos to a rectangle drawn over a scaled preview.
//! The preview rectangle is mapped back to the source's native pixels and each
//! video is re-encoded through a single shared ffmpeg engine, one at a time.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::{BatchError, CropError, EngineError};
pub use domain::model::{
    BatchReport, CancelFlag, ContainerDimensions, CropRect, CroppedVideo, ProgressUpdate,
    VideoFile, VideoJob,
};
pub use error::{BulkCropError, BulkCropResult};
