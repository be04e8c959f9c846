// Domain errors - Error types for the cropping pipeline

use thiserror::Error;

use crate::domain::model::BatchReport;

/// Errors raised by a codec engine adapter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Engine binary could not be found or initialized
    #[error("Engine failed to load: {0}")]
    Load(String),

    /// Engine used before `load` completed
    #[error("Engine is not loaded")]
    NotLoaded,

    /// File name rejected by the engine filesystem
    #[error("Invalid engine file name: {0}")]
    InvalidName(String),

    /// File missing from the engine filesystem
    #[error("Engine file not found: {0}")]
    FileNotFound(String),

    /// Encoder invocation returned a failure status
    #[error("Encoder exited with status {code:?}: {stderr}")]
    ExecFailed { code: Option<i32>, stderr: String },

    /// Underlying I/O failure
    #[error("Engine I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io(err.to_string())
    }
}

/// Errors raised while cropping a single video
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CropError {
    /// Codec engine could not be constructed or loaded
    #[error("Codec engine initialization failed: {0}")]
    Initialization(String),

    /// Degenerate or out-of-bounds crop rectangle
    #[error("Invalid crop: {0}")]
    InvalidCrop(String),

    /// Cancellation was requested
    #[error("Processing cancelled")]
    Cancelled,

    /// Native dimensions could not be determined
    #[error("Failed to probe video: {0}")]
    Probe(String),

    /// Encoder or engine filesystem failure
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl CropError {
    /// Errors that end the whole batch instead of skipping one job
    pub fn is_batch_fatal(&self) -> bool {
        matches!(self, CropError::Cancelled | CropError::Initialization(_))
    }
}

/// Errors that escape a batch run
#[derive(Error, Debug)]
pub enum BatchError {
    /// No jobs were submitted
    #[error("No videos provided for processing")]
    EmptyBatch,

    /// Another batch is still running on this orchestrator
    #[error("A batch is already running")]
    AlreadyRunning,

    /// Codec engine failed to load; nothing can be processed
    #[error("Codec engine initialization failed: {0}")]
    Initialization(String),

    /// Cancellation was requested; completed work is preserved
    #[error("Processing cancelled after {} completed video(s)", report.results.len())]
    Cancelled { report: BatchReport },
}

impl BatchError {
    /// Batch error for a job error that stops the run
    pub fn from_fatal(cause: CropError, report: BatchReport) -> Self {
        match cause {
            CropError::Cancelled => BatchError::Cancelled { report },
            CropError::Initialization(message) => BatchError::Initialization(message),
            other => BatchError::Initialization(other.to_string()),
        }
    }

    /// Results that completed before the batch stopped
    pub fn partial_report(&self) -> Option<&BatchReport> {
        match self {
            BatchError::Cancelled { report } => Some(report),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_fatal_classification() {
        assert!(CropError::Cancelled.is_batch_fatal());
        assert!(CropError::Initialization("offline".into()).is_batch_fatal());
        assert!(!CropError::Probe("corrupt".into()).is_batch_fatal());
        assert!(!CropError::InvalidCrop("zero width".into()).is_batch_fatal());
        assert!(!CropError::Engine(EngineError::NotLoaded).is_batch_fatal());
    }

    #[test]
    fn test_from_fatal_keeps_partial_report() {
        let mut report = BatchReport::default();
        report.skipped.push(crate::domain::model::SkippedJob {
            id: "a".into(),
            file_name: "a.mp4".into(),
            reason: "corrupt".into(),
        });

        let err = BatchError::from_fatal(CropError::Cancelled, report);
        assert_eq!(err.partial_report().map(|r| r.skipped.len()), Some(1));

        let err = BatchError::from_fatal(
            CropError::Initialization("offline".into()),
            BatchReport::default(),
        );
        assert!(matches!(err, BatchError::Initialization(m) if m == "offline"));
    }

    #[test]
    fn test_cancelled_display_counts_results() {
        let err = BatchError::Cancelled {
            report: BatchReport::default(),
        };
        assert_eq!(
            err.to_string(),
            "Processing cancelled after 0 completed video(s)"
        );
        assert!(err.partial_report().is_some());
        assert!(BatchError::EmptyBatch.partial_report().is_none());
    }
}
