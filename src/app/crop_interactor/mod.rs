// Crop interactor - Produces one cropped video from one input

use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::app::codec_session::{CodecSession, EngineGuard};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::VideoProber;

/// Interactor for the single-video crop use case
pub struct CropInteractor {
    session: Arc<CodecSession>,
    prober: Arc<dyn VideoProber>,
    settings: EncodeSettings,
}

impl CropInteractor {
    /// Create new crop interactor with injected session and prober
    pub fn new(
        session: Arc<CodecSession>,
        prober: Arc<dyn VideoProber>,
        settings: EncodeSettings,
    ) -> Self {
        Self {
            session,
            prober,
            settings,
        }
    }

    pub fn settings(&self) -> &EncodeSettings {
        &self.settings
    }

    /// Crop `file` to the region `crop` marks on a preview of size `container`
    pub async fn crop_video(
        &self,
        file: &VideoFile,
        crop: &CropRect,
        container: &ContainerDimensions,
        cancel: &CancelFlag,
    ) -> Result<Blob, CropError> {
        validate_preview_crop(crop)?;
        if !container.is_valid() {
            return Err(CropError::InvalidCrop(format!(
                "Container dimensions must be positive, got {}x{}",
                container.width, container.height
            )));
        }

        self.session.ensure_loaded().await?;

        let metadata = self.prober.probe(file).await?;
        let dimensions = metadata.dimensions;
        if dimensions.width == 0 || dimensions.height == 0 {
            return Err(CropError::Probe(format!(
                "{} reports zero-sized video {}",
                file.name, dimensions
            )));
        }

        let native = map_to_native_crop(crop, &dimensions, container);
        validate_native_crop(&native, &dimensions)?;
        debug!(
            file = %file.name,
            preview = %crop,
            native = %native.to_filter(),
            video = %dimensions,
            "Mapped crop to native pixels"
        );

        let names = ScratchNames::generate(&file.extension());
        let engine = self.session.lock().await?;

        let mut exec_attempted = false;
        let outcome = self
            .encode(&engine, file, &names, &native, cancel, &mut exec_attempted)
            .await;

        let mut leftovers = vec![names.input.as_str()];
        if exec_attempted {
            leftovers.push(names.output.as_str());
        }
        remove_scratch_files(&engine, &leftovers).await;

        if let Ok(blob) = &outcome {
            info!(file = %file.name, bytes = blob.len(), "Video cropped");
        }
        outcome
    }

    async fn encode(
        &self,
        engine: &EngineGuard<'_>,
        file: &VideoFile,
        names: &ScratchNames,
        native: &NativeCrop,
        cancel: &CancelFlag,
        exec_attempted: &mut bool,
    ) -> Result<Blob, CropError> {
        engine.write_file(&names.input, &file.bytes).await?;

        if cancel.is_cancelled() {
            info!(file = %file.name, "Cancelled before encoding");
            return Err(CropError::Cancelled);
        }

        let args = build_crop_args(&names.input, &names.output, native, &self.settings);
        *exec_attempted = true;
        if let Err(e) = engine.exec(&args).await {
            // Ctrl-C reaches the encoder child too, so its failure is the cancellation
            if cancel.is_cancelled() {
                info!(file = %file.name, error = %e, "Encoder stopped by cancellation");
                return Err(CropError::Cancelled);
            }
            return Err(e.into());
        }

        if cancel.is_cancelled() {
            info!(file = %file.name, "Cancelled after encoding");
            return Err(CropError::Cancelled);
        }

        let data = engine.read_file(&names.output).await?;
        Ok(Blob::mp4(data))
    }
}

/// Encoder argument list for one crop pass; audio is copied untouched
pub fn build_crop_args(
    input: &str,
    output: &str,
    crop: &NativeCrop,
    settings: &EncodeSettings,
) -> Vec<String> {
    vec![
        "-i".to_string(),
        input.to_string(),
        "-vf".to_string(),
        crop.to_filter(),
        "-c:v".to_string(),
        settings.video_codec.clone(),
        "-preset".to_string(),
        settings.preset.clone(),
        "-crf".to_string(),
        settings.crf.to_string(),
        "-c:a".to_string(),
        "copy".to_string(),
        output.to_string(),
    ]
}

/// Engine file names private to one crop invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ScratchNames {
    pub input: String,
    pub output: String,
}

impl ScratchNames {
    /// Timestamp plus random token, shared by the input and output names
    pub fn generate(input_extension: &str) -> Self {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();

        Self {
            input: format!("input-{}-{}.{}", timestamp, token, input_extension),
            output: format!("output-{}-{}.mp4", timestamp, token),
        }
    }
}

/// Best-effort removal; failures are logged and never propagated
async fn remove_scratch_files(engine: &EngineGuard<'_>, names: &[&str]) {
    for name in names {
        if let Err(e) = engine.delete_file(name).await {
            warn!(file = %name, error = %e, "Error cleaning up temporary file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockCodecEngine, MockProber};

    fn setup() -> (Arc<MockCodecEngine>, CropInteractor) {
        let engine = Arc::new(MockCodecEngine::new());
        let session = Arc::new(CodecSession::new(engine.clone()));
        let prober = Arc::new(MockProber::new().with_video("clip.mp4", 1920, 1080));
        let cropper = CropInteractor::new(session, prober, EncodeSettings::default());
        (engine, cropper)
    }

    fn clip() -> VideoFile {
        VideoFile::new("clip.mp4", b"FRAMES".to_vec())
    }

    fn preview() -> ContainerDimensions {
        ContainerDimensions::new(640.0, 360.0)
    }

    #[tokio::test]
    async fn test_crop_video_produces_mp4_blob() {
        let (engine, cropper) = setup();
        let blob = cropper
            .crop_video(
                &clip(),
                &CropRect::new(10.0, 10.0, 100.0, 50.0),
                &preview(),
                &CancelFlag::new(),
            )
            .await
            .unwrap();

        assert_eq!(blob.mime_type, "video/mp4");
        assert_eq!(&*blob.bytes, b"crop=300:150:30:30|FRAMES");
        assert!(engine.stored_files().is_empty());
        assert_eq!(engine.deleted_files().len(), 2);
    }

    #[tokio::test]
    async fn test_encoder_arguments() {
        let (engine, cropper) = setup();
        cropper
            .crop_video(
                &clip(),
                &CropRect::new(0.0, 0.0, 640.0, 360.0),
                &preview(),
                &CancelFlag::new(),
            )
            .await
            .unwrap();

        let args = &engine.exec_calls()[0];
        let joined = args.join(" ");
        assert!(joined.contains("-vf crop=1920:1080:0:0"));
        assert!(joined.contains("-c:v libx264"));
        assert!(joined.contains("-preset ultrafast"));
        assert!(joined.contains("-crf 28"));
        assert!(joined.contains("-c:a copy"));
        assert!(args[1].starts_with("input-"));
        assert!(args.last().unwrap().starts_with("output-"));
    }

    #[tokio::test]
    async fn test_zero_area_rejected_before_engine_load() {
        let (engine, cropper) = setup();
        let err = cropper
            .crop_video(
                &clip(),
                &CropRect::new(0.0, 0.0, 0.0, 20.0),
                &preview(),
                &CancelFlag::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CropError::InvalidCrop(_)));
        assert_eq!(engine.load_calls(), 0);
    }

    #[tokio::test]
    async fn test_probe_failure() {
        let (engine, cropper) = setup();
        let unknown = VideoFile::new("unknown.mp4", b"??".to_vec());
        let err = cropper
            .crop_video(
                &unknown,
                &CropRect::new(0.0, 0.0, 10.0, 10.0),
                &preview(),
                &CancelFlag::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CropError::Probe(_)));
        assert!(engine.exec_calls().is_empty());
    }

    #[tokio::test]
    async fn test_crop_outside_video_is_invalid() {
        let (engine, cropper) = setup();
        let err = cropper
            .crop_video(
                &clip(),
                &CropRect::new(700.0, 0.0, 10.0, 10.0),
                &preview(),
                &CancelFlag::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CropError::InvalidCrop(_)));
        assert!(engine.stored_files().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_before_encode_skips_exec() {
        let (engine, cropper) = setup();
        let cancel = CancelFlag::new();
        cancel.cancel();

        let err = cropper
            .crop_video(&clip(), &CropRect::new(0.0, 0.0, 10.0, 10.0), &preview(), &cancel)
            .await
            .unwrap_err();

        assert_eq!(err, CropError::Cancelled);
        assert!(engine.exec_calls().is_empty());
        assert_eq!(engine.deleted_files().len(), 1);
        assert!(engine.stored_files().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_during_encode_removes_both_files() {
        let (engine, cropper) = setup();
        let cancel = CancelFlag::new();
        let handle = cancel.clone();
        engine.set_exec_hook(move |_| handle.cancel());

        let err = cropper
            .crop_video(&clip(), &CropRect::new(0.0, 0.0, 10.0, 10.0), &preview(), &cancel)
            .await
            .unwrap_err();

        assert_eq!(err, CropError::Cancelled);
        assert_eq!(engine.exec_calls().len(), 1);
        assert_eq!(engine.deleted_files().len(), 2);
        assert!(engine.stored_files().is_empty());
    }

    #[tokio::test]
    async fn test_encoder_failure_still_cleans_up() {
        let (engine, cropper) = setup();
        engine.fail_next_exec();

        let err = cropper
            .crop_video(
                &clip(),
                &CropRect::new(0.0, 0.0, 10.0, 10.0),
                &preview(),
                &CancelFlag::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CropError::Engine(EngineError::ExecFailed { .. })));
        assert!(engine.stored_files().is_empty());
    }

    #[tokio::test]
    async fn test_encoder_killed_by_cancel_reports_cancelled() {
        let (engine, cropper) = setup();
        let cancel = CancelFlag::new();
        let handle = cancel.clone();
        engine.fail_next_exec();
        engine.set_exec_hook(move |_| handle.cancel());

        let err = cropper
            .crop_video(&clip(), &CropRect::new(0.0, 0.0, 10.0, 10.0), &preview(), &cancel)
            .await
            .unwrap_err();

        assert_eq!(err, CropError::Cancelled);
        assert!(engine.stored_files().is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_failure_does_not_mask_result() {
        let (engine, cropper) = setup();
        engine.fail_deletes(true);

        let blob = cropper
            .crop_video(
                &clip(),
                &CropRect::new(0.0, 0.0, 10.0, 10.0),
                &preview(),
                &CancelFlag::new(),
            )
            .await
            .unwrap();
        assert!(!blob.is_empty());
    }

    #[test]
    fn test_scratch_names_share_token() {
        let names = ScratchNames::generate("mov");
        assert!(names.input.starts_with("input-"));
        assert!(names.input.ends_with(".mov"));
        assert!(names.output.ends_with(".mp4"));

        let input_stem = names.input.trim_start_matches("input-").trim_end_matches(".mov");
        let output_stem = names.output.trim_start_matches("output-").trim_end_matches(".mp4");
        assert_eq!(input_stem, output_stem);
    }

    #[test]
    fn test_scratch_names_are_unique() {
        let a = ScratchNames::generate("mp4");
        let b = ScratchNames::generate("mp4");
        assert_ne!(a, b);
    }
}
