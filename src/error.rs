use thiserror::Error;

pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to analyze car condition. Please try again.";
pub const NO_VEHICLE_MESSAGE: &str = "No vehicle detected. Please upload a clear photo of a car.";

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
    #[error("Analysis Error: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("Failed to read image {1}: {0}")]
    ReadImage(std::io::Error, String),
    #[error("Failed to render report: {0}")]
    Render(#[from] serde_json::Error),
}

// Analysis Error Type
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("No vehicle detected in the image")]
    NoVehicleDetected,
}

impl AnalysisError {
    /// Text safe to show an end user. The internal cause stays in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            AnalysisError::NoVehicleDetected => NO_VEHICLE_MESSAGE,
            AnalysisError::InvalidInput(_) | AnalysisError::Inference(_) => {
                GENERIC_FAILURE_MESSAGE
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Failed to initialize {model}: {reason}")]
    Initialization { model: String, reason: String },
    #[error("Request to {model} failed: {source}")]
    Request {
        model: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{model} responded with HTTP {status}")]
    Status { model: String, status: u16 },
    #[error("Malformed output from {model}: {reason}")]
    MalformedOutput { model: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
