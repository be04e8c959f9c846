// Codec session - Owns the single codec engine instance

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, OnceCell};
use tracing::{debug, error, info};

use crate::domain::errors::*;
use crate::ports::CodecEngine;

/// Lazily-loaded, exclusively-accessed codec engine
///
/// Loading happens at most once per session: concurrent `ensure_loaded`
/// callers wait on the same in-flight initialization. Every engine call goes
/// through an [`EngineGuard`], so two jobs never drive the engine at once.
pub struct CodecSession {
    engine: Arc<dyn CodecEngine>,
    loaded: OnceCell<()>,
    access: Mutex<()>,
}

impl CodecSession {
    /// Create a session around an engine that has not been loaded yet
    pub fn new(engine: Arc<dyn CodecEngine>) -> Self {
        Self {
            engine,
            loaded: OnceCell::new(),
            access: Mutex::new(()),
        }
    }

    /// Load the engine if this has not happened yet
    pub async fn ensure_loaded(&self) -> Result<(), CropError> {
        self.loaded
            .get_or_try_init(|| async {
                info!("Loading codec engine");
                match self.engine.load().await {
                    Ok(()) => {
                        info!("Codec engine ready");
                        Ok(())
                    }
                    Err(e) => {
                        error!(error = %e, "Codec engine failed to load");
                        Err(CropError::Initialization(e.to_string()))
                    }
                }
            })
            .await?;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    /// Wait for exclusive use of the loaded engine
    pub async fn lock(&self) -> Result<EngineGuard<'_>, CropError> {
        if !self.is_loaded() {
            return Err(CropError::Engine(EngineError::NotLoaded));
        }
        let permit = self.access.lock().await;
        debug!("Acquired codec engine");
        Ok(EngineGuard {
            engine: self.engine.as_ref(),
            _permit: permit,
        })
    }
}

/// Exclusive handle on the engine; released on drop
pub struct EngineGuard<'a> {
    engine: &'a dyn CodecEngine,
    _permit: MutexGuard<'a, ()>,
}

impl EngineGuard<'_> {
    pub async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), EngineError> {
        self.engine.write_file(name, bytes).await
    }

    pub async fn exec(&self, args: &[String]) -> Result<(), EngineError> {
        self.engine.exec(args).await
    }

    pub async fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        self.engine.read_file(name).await
    }

    pub async fn delete_file(&self, name: &str) -> Result<(), EngineError> {
        self.engine.delete_file(name).await
    }
}
