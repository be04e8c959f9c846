// In-memory adapters - Deterministic engine and prober for tests and dry runs

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

type ExecHook = Box<dyn Fn(&[String]) + Send + Sync>;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Codec engine backed by a `HashMap` filesystem
///
/// `exec` does not decode anything: it writes the crop filter followed by the
/// input bytes to the output name, which is enough to trace a result back to
/// its job and geometry.
#[derive(Default)]
pub struct MockCodecEngine {
    files: Mutex<HashMap<String, Vec<u8>>>,
    load_calls: AtomicUsize,
    fail_load: AtomicBool,
    fail_next_exec: AtomicBool,
    fail_deletes: AtomicBool,
    exec_log: Mutex<Vec<Vec<String>>>,
    deleted: Mutex<Vec<String>>,
    exec_hook: Mutex<Option<ExecHook>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockCodecEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `load` fail until switched off again
    pub fn fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    /// Make the next `exec` call fail
    pub fn fail_next_exec(&self) {
        self.fail_next_exec.store(true, Ordering::SeqCst);
    }

    /// Make every `delete_file` call fail
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Run `hook` after every `exec`, failed or not
    pub fn set_exec_hook(&self, hook: impl Fn(&[String]) + Send + Sync + 'static) {
        *locked(&self.exec_hook) = Some(Box::new(hook));
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn exec_calls(&self) -> Vec<Vec<String>> {
        locked(&self.exec_log).clone()
    }

    pub fn deleted_files(&self) -> Vec<String> {
        locked(&self.deleted).clone()
    }

    /// Names currently present in the engine filesystem
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = locked(&self.files).keys().cloned().collect();
        names.sort();
        names
    }

    /// Highest number of overlapping `exec` calls observed
    pub fn max_concurrent_execs(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn run_exec(&self, args: &[String]) -> Result<(), EngineError> {
        if self.fail_next_exec.swap(false, Ordering::SeqCst) {
            return Err(EngineError::ExecFailed {
                code: Some(1),
                stderr: "simulated encoder failure".to_string(),
            });
        }

        let input = args
            .iter()
            .position(|a| a == "-i")
            .and_then(|i| args.get(i + 1))
            .ok_or_else(|| EngineError::ExecFailed {
                code: Some(1),
                stderr: "no input specified".to_string(),
            })?;
        let output = args.last().ok_or_else(|| EngineError::ExecFailed {
            code: Some(1),
            stderr: "no output specified".to_string(),
        })?;
        let filter = args
            .iter()
            .position(|a| a == "-vf")
            .and_then(|i| args.get(i + 1))
            .cloned()
            .unwrap_or_default();

        let mut files = locked(&self.files);
        let source = files
            .get(input)
            .cloned()
            .ok_or_else(|| EngineError::FileNotFound(input.clone()))?;

        let mut encoded = format!("{}|", filter).into_bytes();
        encoded.extend_from_slice(&source);
        files.insert(output.clone(), encoded);
        Ok(())
    }
}

#[async_trait]
impl CodecEngine for MockCodecEngine {
    async fn load(&self) -> Result<(), EngineError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(EngineError::Load("simulated load failure".to_string()));
        }
        Ok(())
    }

    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), EngineError> {
        locked(&self.files).insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn exec(&self, args: &[String]) -> Result<(), EngineError> {
        locked(&self.exec_log).push(args.to_vec());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let result = self.run_exec(args);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(hook) = locked(&self.exec_hook).as_ref() {
            hook(args);
        }
        result
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        locked(&self.files)
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::FileNotFound(name.to_string()))
    }

    async fn delete_file(&self, name: &str) -> Result<(), EngineError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(EngineError::Io(format!("simulated delete failure for {}", name)));
        }
        locked(&self.deleted).push(name.to_string());
        locked(&self.files)
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| EngineError::FileNotFound(name.to_string()))
    }
}

/// Prober answering from a fixed table keyed by file name
#[derive(Default)]
pub struct MockProber {
    videos: HashMap<String, VideoMetadata>,
    probe_calls: AtomicUsize,
}

impl MockProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(mut self, name: &str, width: u32, height: u32) -> Self {
        self.videos.insert(
            name.to_string(),
            VideoMetadata {
                dimensions: VideoDimensions::new(width, height),
                duration: None,
            },
        );
        self
    }

    pub fn with_duration(mut self, name: &str, duration: Duration) -> Self {
        if let Some(meta) = self.videos.get_mut(name) {
            meta.duration = Some(duration);
        }
        self
    }

    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoProber for MockProber {
    async fn probe(&self, file: &VideoFile) -> Result<VideoMetadata, CropError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        self.videos
            .get(&file.name)
            .cloned()
            .ok_or_else(|| CropError::Probe(format!("no video stream found in {}", file.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_exec_writes_filtered_output() {
        let engine = MockCodecEngine::new();
        engine.write_file("in.mp4", b"DATA").await.unwrap();

        let args: Vec<String> = ["-i", "in.mp4", "-vf", "crop=1:2:3:4", "out.mp4"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        engine.exec(&args).await.unwrap();

        let out = engine.read_file("out.mp4").await.unwrap();
        assert_eq!(out, b"crop=1:2:3:4|DATA".to_vec());
        assert_eq!(engine.exec_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_exec_missing_input() {
        let engine = MockCodecEngine::new();
        let args: Vec<String> = vec!["-i".into(), "missing.mp4".into(), "out.mp4".into()];
        assert_eq!(
            engine.exec(&args).await,
            Err(EngineError::FileNotFound("missing.mp4".into()))
        );
    }

    #[tokio::test]
    async fn test_mock_prober_lookup() {
        let prober = MockProber::new()
            .with_video("a.mp4", 1920, 1080)
            .with_duration("a.mp4", Duration::from_secs(12));

        let meta = prober.probe(&VideoFile::new("a.mp4", vec![0u8])).await.unwrap();
        assert_eq!(meta.dimensions, VideoDimensions::new(1920, 1080));
        assert_eq!(meta.duration, Some(Duration::from_secs(12)));

        let err = prober.probe(&VideoFile::new("b.mp4", vec![0u8])).await.unwrap_err();
        assert!(matches!(err, CropError::Probe(_)));
        assert_eq!(prober.probe_calls(), 2);
    }
}
