use super::interpreter::ConditionInterpreter;
use super::types::AnalysisResult;
use crate::error::AnalysisError;
use crate::inference::{ImageStore, InferenceProvider, StagedImage};
use crate::input::ImageInput;
use futures::future::BoxFuture;
use std::{
    sync::Arc,
    task::{Context, Poll},
    time::Instant,
};
use tower::Service;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Validates an upload, runs both models on it and interprets the output.
///
/// One attempt per call, no retries. Calls are independent of each other;
/// the provider is the only shared piece.
pub struct AnalysisOrchestrator {
    provider: Arc<dyn InferenceProvider>,
    interpreter: ConditionInterpreter,
    store: ImageStore,
}

impl AnalysisOrchestrator {
    pub fn new(provider: Arc<dyn InferenceProvider>) -> Self {
        Self {
            provider,
            interpreter: ConditionInterpreter::new(),
            store: ImageStore::new(),
        }
    }

    pub fn with_store(mut self, store: ImageStore) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    #[instrument(skip(self, image), fields(request_id = %Uuid::new_v4(), file = %image.name()))]
    pub async fn analyze(&self, image: &ImageInput) -> Result<AnalysisResult, AnalysisError> {
        info!("Starting car condition analysis");

        if !image.is_image() {
            warn!("Rejected {} with MIME type {}", image.name(), image.mime_type());
            return Err(AnalysisError::InvalidInput(format!(
                "{} has MIME type {}",
                image.name(),
                image.mime_type()
            )));
        }

        let start = Instant::now();
        let staged = self.store.stage(image);
        let result = self.run(&staged).await;
        drop(staged);

        let elapsed_ms = start.elapsed().as_millis();
        match &result {
            Ok(r) => info!(
                "Analysis completed in {}ms: {} ({}/100, confidence {:.2})",
                elapsed_ms,
                r.overall_condition(),
                r.condition_score(),
                r.confidence()
            ),
            Err(e) => error!("Car analysis failed after {}ms: {}", elapsed_ms, e),
        }
        result
    }

    async fn run(&self, staged: &StagedImage) -> Result<AnalysisResult, AnalysisError> {
        let (detections, classifications) = tokio::try_join!(
            self.provider.detect_objects(staged),
            self.provider.classify_image(staged)
        )?;

        debug!("{} detections: {:?}", self.provider.name(), detections);
        debug!("{} classifications: {:?}", self.provider.name(), classifications);

        self.interpreter.interpret(&detections, &classifications)
    }
}

/// tower adapter so the orchestrator can sit behind middleware.
#[derive(Clone)]
pub struct AnalysisService {
    inner: Arc<AnalysisOrchestrator>,
}

impl AnalysisService {
    pub fn new(orchestrator: AnalysisOrchestrator) -> Self {
        Self {
            inner: Arc::new(orchestrator),
        }
    }
}

impl Service<ImageInput> for AnalysisService {
    type Response = AnalysisResult;
    type Error = AnalysisError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, image: ImageInput) -> Self::Future {
        let inner = self.inner.clone();
        Box::pin(async move { inner.analyze(&image).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Classification, Detection, OverallCondition};
    use crate::error::{InferenceError, GENERIC_FAILURE_MESSAGE, NO_VEHICLE_MESSAGE};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct FakeProvider {
        detections: Vec<Detection>,
        classifications: Vec<Classification>,
        fail: bool,
        calls: AtomicUsize,
        store: ImageStore,
        live_during_call: AtomicUsize,
    }

    impl FakeProvider {
        fn new(
            store: &ImageStore,
            detections: Vec<Detection>,
            classifications: Vec<Classification>,
        ) -> Self {
            Self {
                detections,
                classifications,
                fail: false,
                calls: AtomicUsize::new(0),
                store: store.clone(),
                live_during_call: AtomicUsize::new(0),
            }
        }

        fn failing(store: &ImageStore) -> Self {
            Self {
                fail: true,
                ..Self::new(store, Vec::new(), Vec::new())
            }
        }

        fn record(&self, image: &StagedImage) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.store.is_live(image.id()) {
                self.live_during_call.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[async_trait]
    impl InferenceProvider for FakeProvider {
        async fn detect_objects(
            &self,
            image: &StagedImage,
        ) -> Result<Vec<Detection>, InferenceError> {
            self.record(image);
            if self.fail {
                return Err(InferenceError::Status {
                    model: "facebook/detr-resnet-50".to_string(),
                    status: 503,
                });
            }
            Ok(self.detections.clone())
        }

        async fn classify_image(
            &self,
            image: &StagedImage,
        ) -> Result<Vec<Classification>, InferenceError> {
            self.record(image);
            if self.fail {
                return Err(InferenceError::Status {
                    model: "google/vit-base-patch16-224".to_string(),
                    status: 503,
                });
            }
            Ok(self.classifications.clone())
        }

        fn name(&self) -> &'static str {
            "FakeProvider"
        }
    }

    fn car_photo() -> ImageInput {
        ImageInput::new("car.jpg", "image/jpeg", vec![0xFFu8, 0xD8, 0xFF])
    }

    fn setup(
        provider: impl FnOnce(&ImageStore) -> FakeProvider,
    ) -> (AnalysisOrchestrator, Arc<FakeProvider>) {
        let store = ImageStore::new();
        let provider = Arc::new(provider(&store));
        let orchestrator = AnalysisOrchestrator::new(provider.clone()).with_store(store);
        (orchestrator, provider)
    }

    fn excellent_provider(store: &ImageStore) -> FakeProvider {
        FakeProvider::new(
            store,
            vec![Detection::new("car", 0.9, None).unwrap()],
            vec![Classification::new("sports car", 0.95).unwrap()],
        )
    }

    #[tokio::test]
    async fn test_analyze_car_photo() {
        let (orchestrator, provider) = setup(excellent_provider);

        let result = orchestrator.analyze(&car_photo()).await.unwrap();
        assert_eq!(result.overall_condition(), OverallCondition::Excellent);
        assert!((90..=100).contains(&result.condition_score()));
        assert!(result.damages().is_empty());
        assert_eq!(result.confidence(), 0.98);

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(provider.live_during_call.load(Ordering::SeqCst), 2);
        assert_eq!(orchestrator.store().live_count(), 0);
    }

    #[tokio::test]
    async fn test_text_file_rejected_before_inference() {
        let (orchestrator, provider) = setup(excellent_provider);
        let notes = ImageInput::from_bytes("notes.txt", b"service history".to_vec());

        let err = orchestrator.analyze(&notes).await.unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(orchestrator.store().live_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_releases_staged_image() {
        let (orchestrator, _provider) = setup(FakeProvider::failing);

        let err = orchestrator.analyze(&car_photo()).await.unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Inference(InferenceError::Status { status: 503, .. })
        ));
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(orchestrator.store().live_count(), 0);
    }

    #[tokio::test]
    async fn test_no_vehicle_is_reported_distinctly() {
        let (orchestrator, _provider) = setup(|store| {
            FakeProvider::new(
                store,
                Vec::new(),
                vec![Classification::new("kitchen utensil", 0.99).unwrap()],
            )
        });

        let err = orchestrator.analyze(&car_photo()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::NoVehicleDetected));
        assert_eq!(err.user_message(), NO_VEHICLE_MESSAGE);
        assert_eq!(orchestrator.store().live_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_analyses_are_independent() {
        let (orchestrator, provider) = setup(excellent_provider);
        let photo = car_photo();

        let (first, second) = tokio::join!(
            orchestrator.analyze(&photo),
            orchestrator.analyze(&photo)
        );
        assert_eq!(first.unwrap().overall_condition(), OverallCondition::Excellent);
        assert_eq!(second.unwrap().overall_condition(), OverallCondition::Excellent);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
        assert_eq!(orchestrator.store().live_count(), 0);
    }

    #[tokio::test]
    async fn test_service_oneshot() {
        let (orchestrator, _provider) = setup(excellent_provider);
        let service = AnalysisService::new(orchestrator);

        let result = service.clone().oneshot(car_photo()).await.unwrap();
        assert_eq!(result.overall_condition(), OverallCondition::Excellent);

        let err = service
            .oneshot(ImageInput::new("clip.mp4", "video/mp4", vec![0u8]))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }
}
