use super::types::OverallCondition;

/// One row of the condition table: a half-open confidence interval mapped to
/// a condition label, an inclusive score range and canned text.
#[derive(Debug)]
pub struct ConditionBand {
    pub condition: OverallCondition,
    /// Exclusive lower bound on combined confidence. `None` admits everything.
    pub above: Option<f64>,
    pub min_score: u8,
    pub max_score: u8,
    pub damages: &'static [&'static str],
    pub recommendations: &'static [&'static str],
}

impl ConditionBand {
    pub fn admits(&self, combined_confidence: f64) -> bool {
        match self.above {
            Some(bound) => combined_confidence > bound,
            None => true,
        }
    }

    pub fn contains_score(&self, score: u8) -> bool {
        (self.min_score..=self.max_score).contains(&score)
    }
}

/// Ordered from the highest threshold down; the first band that admits a
/// value wins, so a value equal to a threshold lands in the band below it.
pub static CONDITION_BANDS: [ConditionBand; 4] = [
    ConditionBand {
        condition: OverallCondition::Excellent,
        above: Some(0.85),
        min_score: 90,
        max_score: 100,
        damages: &[],
        recommendations: &[
            "Continue regular maintenance schedule",
            "Keep up with routine cleaning and waxing",
            "Monitor tire wear and alignment",
        ],
    },
    ConditionBand {
        condition: OverallCondition::Good,
        above: Some(0.70),
        min_score: 75,
        max_score: 89,
        damages: &["Minor paint wear", "Light surface scratches"],
        recommendations: &[
            "Consider paint touch-up for minor scratches",
            "Schedule detailed cleaning",
            "Check brake pads and fluid levels",
        ],
    },
    ConditionBand {
        condition: OverallCondition::Fair,
        above: Some(0.55),
        min_score: 55,
        max_score: 74,
        damages: &["Visible wear and tear", "Paint fading", "Minor dents"],
        recommendations: &[
            "Professional inspection recommended",
            "Address paint and body work",
            "Service engine and transmission",
            "Replace worn components",
        ],
    },
    ConditionBand {
        condition: OverallCondition::Poor,
        above: None,
        min_score: 30,
        max_score: 54,
        damages: &[
            "Significant body damage",
            "Rust spots",
            "Mechanical issues likely",
        ],
        recommendations: &[
            "Comprehensive mechanical inspection required",
            "Major bodywork and paint restoration needed",
            "Consider professional appraisal",
            "Evaluate repair costs vs. vehicle value",
        ],
    },
];

pub fn band_for(combined_confidence: f64) -> &'static ConditionBand {
    CONDITION_BANDS
        .iter()
        .find(|band| band.admits(combined_confidence))
        .unwrap_or(&CONDITION_BANDS[CONDITION_BANDS.len() - 1])
}

pub fn band_of(condition: OverallCondition) -> &'static ConditionBand {
    match condition {
        OverallCondition::Excellent => &CONDITION_BANDS[0],
        OverallCondition::Good => &CONDITION_BANDS[1],
        OverallCondition::Fair => &CONDITION_BANDS[2],
        OverallCondition::Poor => &CONDITION_BANDS[3],
    }
}
