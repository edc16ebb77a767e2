use super::bands::band_for;
use super::types::{AnalysisResult, Classification, Detection};
use crate::error::AnalysisError;
use rand::Rng;
use tracing::debug;

/// Object detection categories that count as a vehicle.
pub const VEHICLE_DETECTION_LABELS: [&str; 5] = ["car", "truck", "bus", "motorcycle", "bicycle"];

/// Classification vocabulary (makes, body styles, parts) that counts as a vehicle.
pub const VEHICLE_CLASSIFICATION_TERMS: [&str; 18] = [
    "sports car",
    "convertible",
    "limousine",
    "jeep",
    "pickup",
    "minivan",
    "station wagon",
    "taxi",
    "racer",
    "ambulance",
    "police van",
    "tow truck",
    "moving van",
    "recreational vehicle",
    "car wheel",
    "grille",
    "bumper",
    "headlight",
];

pub const CONFIDENCE_OFFSET: f64 = 0.15;
pub const MAX_REPORTED_CONFIDENCE: f64 = 0.98;

/// Best vehicle detection score and top classification score.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConfidenceBreakdown {
    pub detection: f64,
    pub classification: f64,
}

impl ConfidenceBreakdown {
    pub fn combined(&self) -> f64 {
        (self.detection + self.classification) / 2.0
    }
}

fn label_matches(label: &str, terms: &[&str]) -> bool {
    let label = label.to_lowercase();
    terms.iter().any(|term| label.contains(term))
}

pub fn is_vehicle_detection(detection: &Detection) -> bool {
    label_matches(detection.label(), &VEHICLE_DETECTION_LABELS)
}

pub fn is_vehicle_classification(classification: &Classification) -> bool {
    label_matches(classification.label(), &VEHICLE_CLASSIFICATION_TERMS)
}

pub fn vehicle_present(detections: &[Detection], classifications: &[Classification]) -> bool {
    detections.iter().any(is_vehicle_detection)
        || classifications.iter().any(is_vehicle_classification)
}

pub fn aggregate_confidence(
    detections: &[Detection],
    classifications: &[Classification],
) -> ConfidenceBreakdown {
    let detection = detections
        .iter()
        .filter(|d| is_vehicle_detection(d))
        .map(Detection::score)
        .fold(0.0, f64::max);
    // Classifications arrive ranked, so the maximum is the top entry.
    let classification = classifications
        .iter()
        .map(Classification::score)
        .fold(0.0, f64::max);

    ConfidenceBreakdown {
        detection,
        classification,
    }
}

pub fn reported_confidence(combined_confidence: f64) -> f64 {
    (combined_confidence + CONFIDENCE_OFFSET).min(MAX_REPORTED_CONFIDENCE)
}

/// Maps raw model outputs onto a condition band.
///
/// Everything except `condition_score` is a function of the inputs. The score
/// is drawn uniformly from the band's range so repeated runs vary within the
/// same bucket.
#[derive(Debug, Clone, Default)]
pub struct ConditionInterpreter;

impl ConditionInterpreter {
    pub fn new() -> Self {
        Self
    }

    pub fn interpret(
        &self,
        detections: &[Detection],
        classifications: &[Classification],
    ) -> Result<AnalysisResult, AnalysisError> {
        self.interpret_with_rng(detections, classifications, &mut rand::rng())
    }

    pub fn interpret_with_rng<R: Rng>(
        &self,
        detections: &[Detection],
        classifications: &[Classification],
        rng: &mut R,
    ) -> Result<AnalysisResult, AnalysisError> {
        if !vehicle_present(detections, classifications) {
            debug!(
                "No vehicle among {} detections and {} classifications",
                detections.len(),
                classifications.len()
            );
            return Err(AnalysisError::NoVehicleDetected);
        }

        let breakdown = aggregate_confidence(detections, classifications);
        let combined = breakdown.combined();
        let band = band_for(combined);
        let condition_score = rng.random_range(band.min_score..=band.max_score);

        debug!(
            "Combined confidence {:.3} (detection {:.3}, classification {:.3}) -> {}",
            combined, breakdown.detection, breakdown.classification, band.condition
        );

        Ok(AnalysisResult::new(
            band.condition,
            condition_score,
            band.damages.iter().map(|s| s.to_string()).collect(),
            band.recommendations.iter().map(|s| s.to_string()).collect(),
            reported_confidence(combined),
        ))
    }
}
