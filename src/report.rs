use crate::analysis::{AnalysisResult, OverallCondition};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;
use uuid::Uuid;

const BAR_WIDTH: usize = 20;

/// Display tone for a condition label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionTone {
    Success,
    Info,
    Warning,
    Danger,
    Neutral,
}

impl ConditionTone {
    pub fn for_condition(condition: OverallCondition) -> Self {
        match condition {
            OverallCondition::Excellent => ConditionTone::Success,
            OverallCondition::Good => ConditionTone::Info,
            OverallCondition::Fair => ConditionTone::Warning,
            OverallCondition::Poor => ConditionTone::Danger,
        }
    }

    /// Unrecognized labels render as neutral.
    pub fn from_label(label: &str) -> Self {
        label
            .parse::<OverallCondition>()
            .map(Self::for_condition)
            .unwrap_or(ConditionTone::Neutral)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionTone::Success => "success",
            ConditionTone::Info => "info",
            ConditionTone::Warning => "warning",
            ConditionTone::Danger => "danger",
            ConditionTone::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionReport {
    pub id: Uuid,
    pub file_name: String,
    pub analyzed_at: DateTime<Utc>,
    pub tone: ConditionTone,
    pub result: AnalysisResult,
}

impl ConditionReport {
    pub fn new(file_name: impl Into<String>, result: AnalysisResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            analyzed_at: Utc::now(),
            tone: ConditionTone::for_condition(result.overall_condition()),
            result,
        }
    }

    pub fn confidence_percent(&self) -> u32 {
        (self.result.confidence() * 100.0).round() as u32
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let result = &self.result;

        // Writing into a String cannot fail.
        let _ = writeln!(out, "Car condition report for {}", self.file_name);
        let _ = writeln!(
            out,
            "  Overall condition: {} ({})",
            result.overall_condition(),
            self.tone.as_str()
        );
        let _ = writeln!(
            out,
            "  Condition score:   {}/100 {}",
            result.condition_score(),
            progress_bar(result.condition_score() as u32)
        );
        let _ = writeln!(
            out,
            "  AI confidence:     {}% {}",
            self.confidence_percent(),
            progress_bar(self.confidence_percent())
        );

        let _ = writeln!(out, "\nDetected issues:");
        if result.damages().is_empty() {
            let _ = writeln!(out, "  No significant issues detected");
        } else {
            for damage in result.damages() {
                let _ = writeln!(out, "  - {}", damage);
            }
        }

        if !result.recommendations().is_empty() {
            let _ = writeln!(out, "\nRecommendations:");
            for (index, recommendation) in result.recommendations().iter().enumerate() {
                let _ = writeln!(out, "  {}. {}", index + 1, recommendation);
            }
        }

        out
    }
}

fn progress_bar(percent: u32) -> String {
    let filled = (percent.min(100) as usize * BAR_WIDTH) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}
