use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

pub const ENV_PREFIX: &str = "CAR_CONDITION";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub hub_endpoint: String,
    pub detection_model: String,
    pub classification_model: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            hub_endpoint: "https://api-inference.huggingface.co/models".to_string(),
            detection_model: "facebook/detr-resnet-50".to_string(),
            classification_model: "google/vit-base-patch16-224".to_string(),
            api_token: None,
            request_timeout_secs: 60,
            log_level: "info".to_string(),
        }
    }
}

impl Configuration {
    /// Loads defaults, then the optional file, then `CAR_CONDITION_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }
        let configuration: Configuration = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.hub_endpoint.starts_with("https://") || self.hub_endpoint.starts_with("http://"))
        {
            return Err(ConfigError::Invalid(format!(
                "hub endpoint must be an http(s) URL, got {:?}",
                self.hub_endpoint
            )));
        }

        if self.detection_model.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "detection model must not be empty".to_string(),
            ));
        }

        if self.classification_model.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "classification model must not be empty".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request timeout must be greater than 0".to_string(),
            ));
        }

        self.max_log_level()?;
        Ok(())
    }

    pub fn max_log_level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log_level)
            .map_err(|_| ConfigError::Invalid(format!("unknown log level {:?}", self.log_level)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    // Overrides the object detection model id.
    pub fn with_detection_model(mut self, model: impl Into<String>) -> Self {
        self.detection_model = model.into();
        self
    }

    // Overrides the image classification model id.
    pub fn with_classification_model(mut self, model: impl Into<String>) -> Self {
        self.classification_model = model.into();
        self
    }

    pub fn with_hub_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.hub_endpoint = endpoint.into();
        self
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }
}
