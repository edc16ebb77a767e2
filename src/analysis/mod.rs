pub mod bands;
pub mod interpreter;
pub mod orchestrator;
pub mod types;

pub use bands::{band_for, band_of, ConditionBand, CONDITION_BANDS};
pub use interpreter::{ConditionInterpreter, ConfidenceBreakdown};
pub use orchestrator::{AnalysisOrchestrator, AnalysisService};
pub use types::{
    rank_classifications, AnalysisResult, BoundingBox, Classification, Detection,
    OverallCondition,
};
