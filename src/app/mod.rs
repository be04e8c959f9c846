// Application layer - Use case interactors

pub mod batch_interactor;
pub mod codec_session;
pub mod container;
pub mod crop_interactor;
pub mod validate_interactor;

// Re-export interactors
pub use batch_interactor::BatchInteractor;
pub use codec_session::CodecSession;
pub use container::{AppContainer, DefaultAppContainer};
pub use crop_interactor::CropInteractor;
pub use validate_interactor::{UploadLimits, UploadValidator, ValidationReport};
