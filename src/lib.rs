pub mod analysis;
pub mod config;
pub mod error;
pub mod inference;
pub mod input;
pub mod report;

pub use analysis::{
    AnalysisOrchestrator, AnalysisResult, AnalysisService, Classification, ConditionInterpreter,
    Detection, OverallCondition,
};
pub use crate::config::Configuration;
pub use error::{AnalysisError, AppError, ConfigError, InferenceError};
pub use inference::{HubLoader, ImageStore, InferenceProvider, ModelHandles};
pub use input::ImageInput;
pub use report::{ConditionReport, ConditionTone};
