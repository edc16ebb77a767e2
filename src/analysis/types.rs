use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Region reported by the object detection model, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

/// A labeled region with a confidence score, as produced by object detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    label: String,
    score: f64,
    #[serde(rename = "box")]
    bounding_box: Option<BoundingBox>,
}

impl Detection {
    pub fn new(
        label: impl Into<String>,
        score: f64,
        bounding_box: Option<BoundingBox>,
    ) -> Result<Self, String> {
        let label = label.into();
        validate_prediction(&label, score)?;
        Ok(Self {
            label,
            score,
            bounding_box,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }
}

/// A label/score pair from image classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    label: String,
    score: f64,
}

impl Classification {
    pub fn new(label: impl Into<String>, score: f64) -> Result<Self, String> {
        let label = label.into();
        validate_prediction(&label, score)?;
        Ok(Self { label, score })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn score(&self) -> f64 {
        self.score
    }
}

fn validate_prediction(label: &str, score: f64) -> Result<(), String> {
    if label.trim().is_empty() {
        return Err("label must not be empty".to_string());
    }
    if !(0.0..=1.0).contains(&score) {
        return Err(format!("score {score} for {label:?} is outside [0, 1]"));
    }
    Ok(())
}

/// Orders classifications by descending score, the order the interpreter expects.
pub fn rank_classifications(mut classifications: Vec<Classification>) -> Vec<Classification> {
    classifications.sort_by(|a, b| b.score.total_cmp(&a.score));
    classifications
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OverallCondition {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl OverallCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallCondition::Excellent => "Excellent",
            OverallCondition::Good => "Good",
            OverallCondition::Fair => "Fair",
            OverallCondition::Poor => "Poor",
        }
    }
}

impl fmt::Display for OverallCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverallCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excellent" => Ok(OverallCondition::Excellent),
            "good" => Ok(OverallCondition::Good),
            "fair" => Ok(OverallCondition::Fair),
            "poor" => Ok(OverallCondition::Poor),
            other => Err(format!("unknown condition {other:?}")),
        }
    }
}

/// Condition report derived from one pair of model outputs. Never mutated
/// after construction; every analysis produces a fresh value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    overall_condition: OverallCondition,
    condition_score: u8,
    damages: Vec<String>,
    recommendations: Vec<String>,
    confidence: f64,
}

impl AnalysisResult {
    pub(crate) fn new(
        overall_condition: OverallCondition,
        condition_score: u8,
        damages: Vec<String>,
        recommendations: Vec<String>,
        confidence: f64,
    ) -> Self {
        Self {
            overall_condition,
            condition_score,
            damages,
            recommendations,
            confidence,
        }
    }

    pub fn overall_condition(&self) -> OverallCondition {
        self.overall_condition
    }

    pub fn condition_score(&self) -> u8 {
        self.condition_score
    }

    pub fn damages(&self) -> &[String] {
        &self.damages
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range_scores() {
        assert!(Detection::new("car", 1.2, None).is_err());
        assert!(Detection::new("car", f64::NAN, None).is_err());
        assert!(Classification::new("sports car", -0.1).is_err());
        assert!(Classification::new("", 0.5).is_err());
        assert!(Classification::new("sports car", 1.0).is_ok());
    }

    #[test]
    fn test_rank_classifications_descending() {
        let ranked = rank_classifications(vec![
            Classification::new("grille", 0.2).unwrap(),
            Classification::new("sports car", 0.7).unwrap(),
            Classification::new("convertible", 0.1).unwrap(),
        ]);
        let labels: Vec<&str> = ranked.iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["sports car", "grille", "convertible"]);
    }

    #[test]
    fn test_condition_parsing_is_case_insensitive() {
        assert_eq!(
            "EXCELLENT".parse::<OverallCondition>().unwrap(),
            OverallCondition::Excellent
        );
        assert_eq!(" fair ".parse::<OverallCondition>().unwrap(), OverallCondition::Fair);
        assert!("mint".parse::<OverallCondition>().is_err());
    }

    #[test]
    fn test_result_serializes_with_camel_case_fields() {
        let result = AnalysisResult::new(
            OverallCondition::Good,
            80,
            vec!["Minor paint wear".to_string()],
            vec!["Schedule detailed cleaning".to_string()],
            0.9,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["overallCondition"], "Good");
        assert_eq!(json["conditionScore"], 80);
        assert_eq!(json["damages"][0], "Minor paint wear");
        assert_eq!(json["confidence"], 0.9);
    }
}
