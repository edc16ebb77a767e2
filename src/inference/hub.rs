//! Hosted inference API client.
//!
//! Both models are called by POSTing the raw image bytes to
//! `{endpoint}/{model_id}`; the response is a JSON array of predictions.

use super::{InferenceProvider, ProviderLoader, StagedImage};
use crate::analysis::{rank_classifications, BoundingBox, Classification, Detection};
use crate::config::Configuration;
use crate::error::InferenceError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Detection entry as it arrives on the wire. Every field is optional so a
/// missing one is reported as malformed output instead of a decode error.
#[derive(Debug, Deserialize)]
pub struct RawDetection {
    pub label: Option<String>,
    pub score: Option<f64>,
    #[serde(rename = "box")]
    pub bounding_box: Option<RawBox>,
}

#[derive(Debug, Deserialize)]
pub struct RawBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawClassification {
    pub label: Option<String>,
    pub score: Option<f64>,
}

fn malformed(model: &str, reason: String) -> InferenceError {
    InferenceError::MalformedOutput {
        model: model.to_string(),
        reason,
    }
}

fn required<T>(
    model: &str,
    index: usize,
    field: &str,
    value: Option<T>,
) -> Result<T, InferenceError> {
    value.ok_or_else(|| malformed(model, format!("entry {index} is missing {field}")))
}

pub fn parse_detections(
    model: &str,
    raw: Vec<RawDetection>,
) -> Result<Vec<Detection>, InferenceError> {
    raw.into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let label = required(model, index, "label", entry.label)?;
            let score = required(model, index, "score", entry.score)?;
            let bounding_box = entry.bounding_box.map(|b| BoundingBox {
                xmin: b.xmin,
                ymin: b.ymin,
                xmax: b.xmax,
                ymax: b.ymax,
            });
            Detection::new(label, score, bounding_box)
                .map_err(|reason| malformed(model, format!("entry {index}: {reason}")))
        })
        .collect()
}

pub fn parse_classifications(
    model: &str,
    raw: Vec<RawClassification>,
) -> Result<Vec<Classification>, InferenceError> {
    let classifications = raw
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let label = required(model, index, "label", entry.label)?;
            let score = required(model, index, "score", entry.score)?;
            Classification::new(label, score)
                .map_err(|reason| malformed(model, format!("entry {index}: {reason}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rank_classifications(classifications))
}

pub struct HubInferenceProvider {
    client: reqwest::Client,
    endpoint: String,
    detection_model: String,
    classification_model: String,
    api_token: Option<String>,
}

impl HubInferenceProvider {
    pub fn new(configuration: &Configuration) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .timeout(configuration.request_timeout())
            .build()
            .map_err(|e| InferenceError::Initialization {
                model: configuration.detection_model.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint: configuration.hub_endpoint.trim_end_matches('/').to_string(),
            detection_model: configuration.detection_model.clone(),
            classification_model: configuration.classification_model.clone(),
            api_token: configuration.api_token.clone(),
        })
    }

    pub fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.endpoint, model)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        model: &str,
        image: &StagedImage,
    ) -> Result<T, InferenceError> {
        let mut request = self
            .client
            .post(self.model_url(model))
            .header(CONTENT_TYPE, image.mime_type())
            .body(image.bytes().to_vec());
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        debug!("Sending {} to {}", image.reference(), model);
        let response = request.send().await.map_err(|source| InferenceError::Request {
            model: model.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(InferenceError::Status {
                model: model.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| InferenceError::Request {
                model: model.to_string(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|e| malformed(model, e.to_string()))
    }
}

#[async_trait]
impl InferenceProvider for HubInferenceProvider {
    async fn detect_objects(&self, image: &StagedImage) -> Result<Vec<Detection>, InferenceError> {
        let raw: Vec<RawDetection> = self.post(&self.detection_model, image).await?;
        debug!("{} returned {} detections", self.detection_model, raw.len());
        parse_detections(&self.detection_model, raw)
    }

    async fn classify_image(
        &self,
        image: &StagedImage,
    ) -> Result<Vec<Classification>, InferenceError> {
        let raw: Vec<RawClassification> = self.post(&self.classification_model, image).await?;
        debug!(
            "{} returned {} classifications",
            self.classification_model,
            raw.len()
        );
        parse_classifications(&self.classification_model, raw)
    }

    fn name(&self) -> &'static str {
        "HubInferenceProvider"
    }
}

/// Loads a [`HubInferenceProvider`] from configuration on first use.
pub struct HubLoader {
    configuration: Configuration,
}

impl HubLoader {
    pub fn new(configuration: Configuration) -> Self {
        Self { configuration }
    }
}

#[async_trait]
impl ProviderLoader for HubLoader {
    type Provider = HubInferenceProvider;

    async fn load(&self) -> Result<HubInferenceProvider, InferenceError> {
        HubInferenceProvider::new(&self.configuration)
    }
}
