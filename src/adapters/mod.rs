// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod fs_local;
pub mod job_manifest;
pub mod mock;
pub mod probe_ffprobe;
pub mod toml_config;

// Re-export adapters
pub use exec_ffmpeg::FfmpegProcessEngine;
pub use fs_local::LocalFsAdapter;
pub use job_manifest::JobManifest;
pub use mock::{MockCodecEngine, MockProber};
pub use probe_ffprobe::FfprobeAdapter;
pub use toml_config::{AppConfig, TomlConfigAdapter};
