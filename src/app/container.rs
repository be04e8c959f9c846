use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{AppConfig, FfmpegProcessEngine, FfprobeAdapter};
use crate::app::{
    batch_interactor::BatchInteractor, codec_session::CodecSession,
    crop_interactor::CropInteractor, validate_interactor::{UploadLimits, UploadValidator},
};
use crate::ports::{CodecEngine, VideoProber};

pub trait AppContainer: Send + Sync {
    fn batch_interactor(&self) -> Arc<BatchInteractor>;
    fn crop_interactor(&self) -> Arc<CropInteractor>;
    fn upload_validator(&self) -> Arc<UploadValidator>;
    fn prober(&self) -> Arc<dyn VideoProber>;
}

pub struct DefaultAppContainer {
    prober: Arc<dyn VideoProber>,
    crop_interactor: Arc<CropInteractor>,
    batch_interactor: Arc<BatchInteractor>,
    upload_validator: Arc<UploadValidator>,
}

impl DefaultAppContainer {
    /// Wire the ffmpeg and ffprobe adapters described by `config`
    pub fn new(config: &AppConfig) -> Self {
        let engine = Arc::new(FfmpegProcessEngine::new(config.ffmpeg_path.clone()));
        let prober = Arc::new(FfprobeAdapter::new(config.ffprobe_path.clone()));

        Self::with_adapters(
            engine as Arc<dyn CodecEngine>,
            prober as Arc<dyn VideoProber>,
            config,
        )
    }

    /// Wire the use cases around arbitrary engine and prober adapters
    pub fn with_adapters(
        engine: Arc<dyn CodecEngine>,
        prober: Arc<dyn VideoProber>,
        config: &AppConfig,
    ) -> Self {
        let session = Arc::new(CodecSession::new(engine));

        let crop_interactor = Arc::new(CropInteractor::new(
            Arc::clone(&session),
            Arc::clone(&prober),
            config.encode_settings(),
        ));

        let batch_interactor = Arc::new(BatchInteractor::new(
            Arc::clone(&crop_interactor),
            config.container(),
        ));

        let upload_validator = Arc::new(UploadValidator::new(
            Arc::clone(&prober),
            UploadLimits {
                max_file_size_mb: config.max_file_size_mb,
                max_duration: Duration::from_secs(config.max_duration_secs),
            },
        ));

        Self {
            prober,
            crop_interactor,
            batch_interactor,
            upload_validator,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn batch_interactor(&self) -> Arc<BatchInteractor> {
        Arc::clone(&self.batch_interactor)
    }

    fn crop_interactor(&self) -> Arc<CropInteractor> {
        Arc::clone(&self.crop_interactor)
    }

    fn upload_validator(&self) -> Arc<UploadValidator> {
        Arc::clone(&self.upload_validator)
    }

    fn prober(&self) -> Arc<dyn VideoProber> {
        Arc::clone(&self.prober)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockCodecEngine, MockProber};
    use crate::domain::model::QualityPreset;

    #[test]
    fn test_container_applies_config() {
        let config = AppConfig {
            quality: Some(QualityPreset::Balanced),
            max_file_size_mb: 5,
            max_duration_secs: 10,
            ..AppConfig::default()
        };
        let container = DefaultAppContainer::with_adapters(
            Arc::new(MockCodecEngine::new()),
            Arc::new(MockProber::new()),
            &config,
        );

        assert_eq!(container.crop_interactor().settings().crf, 18);
        assert_eq!(container.upload_validator().limits().max_file_size_mb, 5);
        assert_eq!(
            container.upload_validator().limits().max_duration,
            Duration::from_secs(10)
        );
    }
}
