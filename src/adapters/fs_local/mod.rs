// Local filesystem adapter - Reading inputs and persisting cropped outputs

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::domain::model::*;
use crate::domain::rules::*;
use crate::error::{BulkCropError, BulkCropResult};

/// Local filesystem adapter
///
/// Output names handed out by one adapter never collide: a second source
/// with the same file name gets a numbered suffix.
#[derive(Debug)]
pub struct LocalFsAdapter {
    output_dir: PathBuf,
    claimed: Mutex<HashSet<String>>,
}

impl LocalFsAdapter {
    /// Create adapter writing into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            claimed: Mutex::new(HashSet::new()),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Load a video into memory
    pub async fn read_video(path: &Path) -> BulkCropResult<VideoFile> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BulkCropError::InputFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                BulkCropError::IoError(e)
            }
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        debug!(file = %name, bytes = bytes.len(), "Loaded input video");
        Ok(VideoFile::new(name, bytes).with_path(path.to_path_buf()))
    }

    /// Every video file under `dir`, sorted by path
    pub fn discover_videos(dir: &Path) -> BulkCropResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(BulkCropError::InputFileNotFound {
                path: dir.display().to_string(),
            });
        }

        let mut videos = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry.map_err(|e| BulkCropError::IoError(e.into()))?;
            if entry.file_type().is_file() && has_video_extension(entry.path()) {
                videos.push(entry.into_path());
            }
        }
        videos.sort();

        info!(dir = %dir.display(), count = videos.len(), "Discovered input videos");
        Ok(videos)
    }

    /// Reserve `cropped-<name>`, or `cropped-<stem>-N.<ext>` once taken
    fn claim_name(&self, source_name: &str) -> String {
        let base = output_file_name(source_name);
        let mut claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());
        let mut candidate = base.clone();
        let mut n = 2;
        while claimed.contains(&candidate) {
            candidate = match base.rsplit_once('.') {
                Some((stem, ext)) if !stem.is_empty() => format!("{}-{}.{}", stem, n, ext),
                _ => format!("{}-{}", base, n),
            };
            n += 1;
        }
        claimed.insert(candidate.clone());
        candidate
    }

    /// Write a cropped video as `cropped-<name>`
    ///
    /// Files left by earlier runs are replaced. The bytes go to a temporary
    /// file in the output directory first and are then renamed into place, so
    /// a partially written output never appears.
    pub fn write_output(&self, source_name: &str, blob: &Blob) -> BulkCropResult<PathBuf> {
        let target = self.output_dir.join(self.claim_name(source_name));
        let output_error = |message: String| BulkCropError::OutputError {
            path: target.display().to_string(),
            message,
        };

        std::fs::create_dir_all(&self.output_dir).map_err(|e| output_error(e.to_string()))?;

        let mut temp =
            NamedTempFile::new_in(&self.output_dir).map_err(|e| output_error(e.to_string()))?;
        temp.write_all(&blob.bytes)
            .and_then(|_| temp.flush())
            .map_err(|e| output_error(e.to_string()))?;
        temp.persist(&target)
            .map_err(|e| output_error(e.error.to_string()))?;

        info!(output = %target.display(), bytes = blob.len(), "Wrote cropped video");
        Ok(target)
    }
}
