//! Error handling module for BulkCrop

use thiserror::Error;

use crate::domain::errors::{BatchError, CropError};

/// Main error type for BulkCrop operations
#[derive(Error, Debug)]
pub enum BulkCropError {
    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Job manifest could not be read or parsed
    #[error("Invalid job manifest {path}: {message}")]
    Manifest { path: String, message: String },

    /// Input file not found or inaccessible
    #[error("Input file not found: {path}")]
    InputFileNotFound { path: String },

    /// More jobs than the configured limit
    #[error("Too many videos: {count} (maximum is {max})")]
    TooManyVideos { count: usize, max: usize },

    /// Nothing left to crop after filtering
    #[error("No videos with valid crop settings found")]
    NoCroppableVideos,

    /// Output file write error
    #[error("Failed to write output file {path}: {message}")]
    OutputError { path: String, message: String },

    /// Single-video crop error
    #[error(transparent)]
    Crop(#[from] CropError),

    /// Batch-level error
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for BulkCrop operations
pub type BulkCropResult<T> = std::result::Result<T, BulkCropError>;
