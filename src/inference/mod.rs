pub mod hub;
pub mod lazy;
pub mod staging;

pub use hub::{HubInferenceProvider, HubLoader};
pub use lazy::{ModelHandles, ProviderLoader};
pub use staging::{ImageStore, StagedImage};

use crate::analysis::{Classification, Detection};
use crate::error::InferenceError;
use async_trait::async_trait;

/// The two model capabilities the analysis depends on.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    async fn detect_objects(&self, image: &StagedImage) -> Result<Vec<Detection>, InferenceError>;

    /// Returns classifications ranked by descending score.
    async fn classify_image(
        &self,
        image: &StagedImage,
    ) -> Result<Vec<Classification>, InferenceError>;

    fn name(&self) -> &'static str;
}
