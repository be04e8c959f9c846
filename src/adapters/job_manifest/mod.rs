//! Job manifest loading
//!
//! A manifest lists the videos of a batch together with their crop
//! rectangles. JSON, YAML and TOML are accepted, chosen by file extension:
//!
//! ```toml
//! [container]
//! width = 640
//! height = 360
//!
//! [[jobs]]
//! id = "intro"
//! path = "videos/intro.mp4"
//! crop = { x = 10, y = 10, width = 100, height = 50 }
//! ```
//!
//! Relative paths are resolved against the manifest's directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::adapters::fs_local::LocalFsAdapter;
use crate::domain::model::*;
use crate::error::{BulkCropError, BulkCropResult};

/// Serialization format of a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Yaml,
    Toml,
}

impl ManifestFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "json" => Some(ManifestFormat::Json),
            "yaml" | "yml" => Some(ManifestFormat::Yaml),
            "toml" => Some(ManifestFormat::Toml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct ManifestContainer {
    pub width: f64,
    pub height: f64,
}

impl From<ManifestContainer> for ContainerDimensions {
    fn from(c: ManifestContainer) -> Self {
        ContainerDimensions::new(c.width, c.height)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ManifestJob {
    #[serde(default)]
    pub id: Option<String>,
    pub path: PathBuf,
    pub crop: CropRect,
    #[serde(default)]
    pub container: Option<ManifestContainer>,
}

/// Parsed manifest, before any video is read
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct JobManifest {
    #[serde(default)]
    pub container: Option<ManifestContainer>,
    #[serde(default)]
    pub jobs: Vec<ManifestJob>,
}

impl JobManifest {
    /// Parse manifest text in the given format
    pub fn parse(content: &str, format: ManifestFormat) -> Result<Self, String> {
        match format {
            ManifestFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ManifestFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            ManifestFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }

    /// Read and parse a manifest file
    pub fn load(path: &Path) -> BulkCropResult<Self> {
        let manifest_error = |message: String| BulkCropError::Manifest {
            path: path.display().to_string(),
            message,
        };

        let format = ManifestFormat::from_path(path).ok_or_else(|| {
            manifest_error("unsupported extension, expected .json, .yaml, .yml or .toml".to_string())
        })?;
        let content = std::fs::read_to_string(path).map_err(|e| manifest_error(e.to_string()))?;
        let manifest = Self::parse(&content, format).map_err(manifest_error)?;

        debug!(path = %path.display(), jobs = manifest.jobs.len(), "Parsed job manifest");
        Ok(manifest)
    }

    /// Read every listed video and build the batch jobs
    ///
    /// A video that cannot be read still yields a job, with no file, so the
    /// batch reports it as skipped.
    pub async fn into_jobs(self, base_dir: &Path) -> Vec<VideoJob> {
        let mut jobs = Vec::with_capacity(self.jobs.len());

        for (index, entry) in self.jobs.into_iter().enumerate() {
            let path = if entry.path.is_absolute() {
                entry.path.clone()
            } else {
                base_dir.join(&entry.path)
            };
            let id = entry.id.clone().unwrap_or_else(|| derive_job_id(index, &path));

            let file = match LocalFsAdapter::read_video(&path).await {
                Ok(file) => Some(file),
                Err(e) => {
                    warn!(job_id = %id, path = %path.display(), error = %e, "Could not read video");
                    None
                }
            };

            jobs.push(VideoJob {
                id,
                file,
                crop_settings: entry.crop,
                container_dimensions: entry.container.or(self.container).map(Into::into),
            });
        }

        jobs
    }
}

/// Id for a job that did not name one: position plus file stem
pub fn derive_job_id(index: usize, path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());
    format!("{}-{}", index + 1, stem)
}

/// Load a manifest file and turn it into batch jobs
pub async fn load_jobs(path: &Path) -> BulkCropResult<Vec<VideoJob>> {
    let manifest = JobManifest::load(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(manifest.into_jobs(base_dir).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_detection() {
        assert_eq!(ManifestFormat::from_path(Path::new("a.json")), Some(ManifestFormat::Json));
        assert_eq!(ManifestFormat::from_path(Path::new("a.YML")), Some(ManifestFormat::Yaml));
        assert_eq!(ManifestFormat::from_path(Path::new("a.toml")), Some(ManifestFormat::Toml));
        assert_eq!(ManifestFormat::from_path(Path::new("a.txt")), None);
    }

    #[test]
    fn test_same_manifest_in_every_format() {
        let json = r#"{"container": {"width": 640, "height": 360},
            "jobs": [{"id": "a", "path": "a.mp4", "crop": {"x": 10, "y": 10, "width": 100, "height": 50}}]}"#;
        let yaml = "
container: {width: 640, height: 360}
jobs:
  - id: a
    path: a.mp4
    crop: {x: 10, y: 10, width: 100, height: 50}
";
        let toml_text = r#"
[container]
width = 640
height = 360

[[jobs]]
id = "a"
path = "a.mp4"
crop = { x = 10, y = 10, width = 100, height = 50 }
"#;
        let from_json = JobManifest::parse(json, ManifestFormat::Json).unwrap();
        let from_yaml = JobManifest::parse(yaml, ManifestFormat::Yaml).unwrap();
        let from_toml = JobManifest::parse(toml_text, ManifestFormat::Toml).unwrap();

        assert_eq!(from_json, from_yaml);
        assert_eq!(from_json, from_toml);
        assert_eq!(from_json.jobs[0].crop, CropRect::new(10.0, 10.0, 100.0, 50.0));
    }

    #[test]
    fn test_malformed_manifest() {
        assert!(JobManifest::parse(r#"{"jobs": [{"path": "a.mp4"}]}"#, ManifestFormat::Json).is_err());

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.ini");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(
            JobManifest::load(&path),
            Err(BulkCropError::Manifest { .. })
        ));
    }

    #[test]
    fn test_derived_ids() {
        assert_eq!(derive_job_id(0, Path::new("dir/intro.mp4")), "1-intro");
        assert_eq!(derive_job_id(4, Path::new("outro.webm")), "5-outro");
    }

    #[tokio::test]
    async fn test_load_jobs_resolves_paths_and_containers() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.mp4"), b"aaa").unwrap();
        let manifest = r#"{
            "container": {"width": 800, "height": 450},
            "jobs": [
                {"path": "a.mp4", "crop": {"x": 0, "y": 0, "width": 10, "height": 10}},
                {"id": "gone", "path": "missing.mp4", "crop": {"x": 0, "y": 0, "width": 10, "height": 10},
                 "container": {"width": 320, "height": 180}}
            ]
        }"#;
        let manifest_path = dir.path().join("jobs.json");
        std::fs::write(&manifest_path, manifest).unwrap();

        let jobs = load_jobs(&manifest_path).await.unwrap();
        assert_eq!(jobs.len(), 2);

        assert_eq!(jobs[0].id, "1-a");
        assert_eq!(jobs[0].file_name(), "a.mp4");
        assert_eq!(
            jobs[0].container_dimensions,
            Some(ContainerDimensions::new(800.0, 450.0))
        );

        assert_eq!(jobs[1].id, "gone");
        assert!(jobs[1].file.is_none());
        assert_eq!(
            jobs[1].container_dimensions,
            Some(ContainerDimensions::new(320.0, 180.0))
        );
    }
}
