// Ports - Interface definitions (contracts)

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for the external codec engine
///
/// The engine owns a private filesystem: inputs are written into it by name,
/// `exec` runs an encoder command line against those names, and outputs are
/// read back out. Implementations are not required to support concurrent
/// calls; `CodecSession` serializes access.
#[async_trait]
pub trait CodecEngine: Send + Sync {
    /// Initialize the engine (fetch/verify binaries, prepare storage)
    async fn load(&self) -> Result<(), EngineError>;

    /// Store bytes under `name` in the engine filesystem
    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), EngineError>;

    /// Run the encoder with the given argument list
    async fn exec(&self, args: &[String]) -> Result<(), EngineError>;

    /// Read a file back from the engine filesystem
    async fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError>;

    /// Remove a file from the engine filesystem
    async fn delete_file(&self, name: &str) -> Result<(), EngineError>;
}

/// Port for reading native video metadata
#[async_trait]
pub trait VideoProber: Send + Sync {
    /// Probe dimensions (and duration when available) without decoding frames
    async fn probe(&self, file: &VideoFile) -> Result<VideoMetadata, CropError>;
}

/// Port for batch progress notifications
///
/// Implementations must not panic; they are called inline from the batch loop.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: &ProgressUpdate);
}

impl<F> ProgressReporter for F
where
    F: Fn(&ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: &ProgressUpdate) {
        self(update)
    }
}
