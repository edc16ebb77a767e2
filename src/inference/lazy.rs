use super::{InferenceProvider, StagedImage};
use crate::analysis::{Classification, Detection};
use crate::error::InferenceError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Builds the provider the first time a model is needed.
#[async_trait]
pub trait ProviderLoader: Send + Sync {
    type Provider: InferenceProvider + 'static;

    async fn load(&self) -> Result<Self::Provider, InferenceError>;
}

/// Model handles shared by every analysis.
///
/// The first caller pays the loading cost; concurrent first callers wait on
/// the same initialization. A failed load is not cached, so the next call
/// tries again.
pub struct ModelHandles<L: ProviderLoader> {
    loader: L,
    provider: OnceCell<L::Provider>,
    load_attempts: AtomicUsize,
}

impl<L: ProviderLoader> ModelHandles<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            provider: OnceCell::new(),
            load_attempts: AtomicUsize::new(0),
        }
    }

    pub async fn get(&self) -> Result<&L::Provider, InferenceError> {
        self.provider
            .get_or_try_init(|| async {
                let attempt = self.load_attempts.fetch_add(1, Ordering::SeqCst) + 1;
                info!("Loading inference models (attempt {})", attempt);
                let provider = self.loader.load().await;
                match &provider {
                    Ok(p) => info!("Inference models ready: {}", p.name()),
                    Err(e) => warn!("Failed to load inference models: {}", e),
                }
                provider
            })
            .await
    }

    pub fn is_initialized(&self) -> bool {
        self.provider.initialized()
    }

    pub fn load_attempts(&self) -> usize {
        self.load_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<L: ProviderLoader> InferenceProvider for ModelHandles<L> {
    async fn detect_objects(&self, image: &StagedImage) -> Result<Vec<Detection>, InferenceError> {
        self.get().await?.detect_objects(image).await
    }

    async fn classify_image(
        &self,
        image: &StagedImage,
    ) -> Result<Vec<Classification>, InferenceError> {
        self.get().await?.classify_image(image).await
    }

    /// Name of the loaded provider, or of the wrapper before the first load.
    fn name(&self) -> &'static str {
        self.provider
            .get()
            .map(|provider| provider.name())
            .unwrap_or("ModelHandles")
    }
}
