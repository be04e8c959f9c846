//! FFmpeg execution adapter
//!
//! Runs the `ffmpeg` binary as a child process. A scratch directory created
//! on `load` stands in for the engine's private filesystem: every name passed
//! to the engine is a plain file name inside that directory, and `exec` runs
//! with the directory as its working directory.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::rules::is_safe_filename;
use crate::ports::*;

/// Keep only the tail of stderr in error reports
const MAX_STDERR_CHARS: usize = 2000;

/// FFmpeg-based codec engine
pub struct FfmpegProcessEngine {
    ffmpeg_path: PathBuf,
    scratch: OnceLock<TempDir>,
}

impl FfmpegProcessEngine {
    /// Create new FFmpeg engine; nothing runs until `load`
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            scratch: OnceLock::new(),
        }
    }

    /// Scratch directory, once loaded
    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch.get().map(|dir| dir.path())
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, EngineError> {
        let dir = self.scratch_dir().ok_or(EngineError::NotLoaded)?;
        if name.is_empty() || !is_safe_filename(name) {
            return Err(EngineError::InvalidName(name.to_string()));
        }
        Ok(dir.join(name))
    }
}

fn tail(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    let count = trimmed.chars().count();
    if count <= max_chars {
        return trimmed.to_string();
    }
    trimmed.chars().skip(count - max_chars).collect()
}

#[async_trait]
impl CodecEngine for FfmpegProcessEngine {
    async fn load(&self) -> Result<(), EngineError> {
        let output = Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                EngineError::Load(format!(
                    "Failed to run {}: {}",
                    self.ffmpeg_path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(EngineError::Load(format!(
                "{} -version exited with {}",
                self.ffmpeg_path.display(),
                output.status
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string();

        if self.scratch.get().is_none() {
            let dir = tempfile::Builder::new()
                .prefix("bulkcrop-")
                .tempdir()
                .map_err(|e| EngineError::Load(format!("Failed to create scratch directory: {}", e)))?;
            // A concurrent load may have won; its directory is kept
            let _ = self.scratch.set(dir);
        }

        info!(version = %version, "FFmpeg engine loaded");
        Ok(())
    }

    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), EngineError> {
        let path = self.resolve(name)?;
        tokio::fs::write(&path, bytes).await?;
        debug!(file = %name, bytes = bytes.len(), "Wrote engine file");
        Ok(())
    }

    async fn exec(&self, args: &[String]) -> Result<(), EngineError> {
        let dir = self.scratch_dir().ok_or(EngineError::NotLoaded)?;
        debug!(args = ?args, "Running ffmpeg");

        let output = Command::new(&self.ffmpeg_path)
            .current_dir(dir)
            .args(["-hide_banner", "-y", "-loglevel", "error", "-nostdin"])
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(EngineError::ExecFailed {
                code: output.status.code(),
                stderr: tail(&String::from_utf8_lossy(&output.stderr), MAX_STDERR_CHARS),
            });
        }
        Ok(())
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        let path = self.resolve(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(EngineError::FileNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_file(&self, name: &str) -> Result<(), EngineError> {
        let path = self.resolve(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(EngineError::FileNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_fails_to_load() {
        let engine = FfmpegProcessEngine::new("/nonexistent/bulkcrop/ffmpeg");
        let err = engine.load().await.unwrap_err();
        assert!(matches!(err, EngineError::Load(_)));
        assert!(engine.scratch_dir().is_none());
    }

    #[tokio::test]
    async fn test_file_operations_require_load() {
        let engine = FfmpegProcessEngine::new("ffmpeg");
        assert_eq!(
            engine.write_file("input.mp4", b"x").await,
            Err(EngineError::NotLoaded)
        );
        assert_eq!(
            engine.exec(&["-version".to_string()]).await,
            Err(EngineError::NotLoaded)
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let engine = FfmpegProcessEngine::new("ffmpeg");
        engine.scratch.set(TempDir::new().unwrap()).unwrap();

        assert!(engine.resolve("input-1-abc.mp4").is_ok());
        assert!(matches!(
            engine.resolve("../escape.mp4"),
            Err(EngineError::InvalidName(_))
        ));
        assert!(matches!(
            engine.resolve("nested/file.mp4"),
            Err(EngineError::InvalidName(_))
        ));
    }

    #[tokio::test]
    async fn test_scratch_round_trip_without_ffmpeg() {
        let engine = FfmpegProcessEngine::new("ffmpeg");
        engine.scratch.set(TempDir::new().unwrap()).unwrap();

        engine.write_file("a.bin", b"payload").await.unwrap();
        assert_eq!(engine.read_file("a.bin").await.unwrap(), b"payload".to_vec());
        engine.delete_file("a.bin").await.unwrap();
        assert_eq!(
            engine.read_file("a.bin").await,
            Err(EngineError::FileNotFound("a.bin".to_string()))
        );
    }

    #[test]
    fn test_stderr_tail() {
        assert_eq!(tail("  short  ", 10), "short");
        assert_eq!(tail("abcdefghij", 3), "hij");
    }
}
