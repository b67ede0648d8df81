//! Scenario rule table.
//!
//! Each rule is an independent predicate over the image statistics and the
//! computed sub-scores. Rules only annotate a result; they never change a
//! number in it.
use crate::detector::ScenarioThresholds;
use crate::image::ImageStats;
use crate::scoring::ConfidenceBreakdown;
use serde::Serialize;
use std::fmt;

/// Condition that may undermine the reliability of a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioFlag {
    LowLight,
    Overexposed,
    LowQuality,
    MethodDisagreement,
    NoDetection,
    TooManyDetections,
    LowDetectionConfidence,
}

impl ScenarioFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioFlag::LowLight => "low_light",
            ScenarioFlag::Overexposed => "overexposed",
            ScenarioFlag::LowQuality => "low_quality",
            ScenarioFlag::MethodDisagreement => "method_disagreement",
            ScenarioFlag::NoDetection => "no_detection",
            ScenarioFlag::TooManyDetections => "too_many_detections",
            ScenarioFlag::LowDetectionConfidence => "low_detection_confidence",
        }
    }
}

impl fmt::Display for ScenarioFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs the rules look at.
#[derive(Clone, Copy, Debug)]
pub struct ScenarioInput<'a> {
    pub stats: &'a ImageStats,
    pub breakdown: &'a ConfidenceBreakdown,
    pub region_count: usize,
    pub extractor_count: usize,
}

type Rule = fn(&ScenarioInput<'_>, &ScenarioThresholds) -> bool;

const RULES: [(ScenarioFlag, Rule); 7] = [
    (ScenarioFlag::LowLight, |i, t| {
        (i.stats.mean_brightness as f64) < t.low_light
    }),
    (ScenarioFlag::Overexposed, |i, t| {
        (i.stats.mean_brightness as f64) > t.overexposed
    }),
    (ScenarioFlag::LowQuality, |i, t| {
        i.breakdown.image_quality < t.low_quality
    }),
    (ScenarioFlag::MethodDisagreement, |i, t| {
        i.extractor_count > 1 && i.breakdown.consensus < t.disagreement
    }),
    (ScenarioFlag::NoDetection, |i, _| i.region_count == 0),
    (ScenarioFlag::TooManyDetections, |i, t| {
        i.region_count > t.too_many
    }),
    (ScenarioFlag::LowDetectionConfidence, |i, t| {
        i.breakdown.region_confidence < t.low_detection_confidence
    }),
];

/// Evaluate every rule; the result is sorted and free of duplicates.
pub fn evaluate(input: &ScenarioInput<'_>, thresholds: &ScenarioThresholds) -> Vec<ScenarioFlag> {
    let mut flags: Vec<ScenarioFlag> = RULES
        .iter()
        .filter(|(_, rule)| rule(input, thresholds))
        .map(|(flag, _)| *flag)
        .collect();
    flags.sort();
    flags.dedup();
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(mean_brightness: f32) -> ImageStats {
        ImageStats {
            mean_brightness,
            std_dev: 40.0,
            contrast: 40.0 / 255.0,
            sharpness: 300.0,
            histograms: Vec::new(),
        }
    }

    fn breakdown(quality: f64, regions: f64, consensus: f64) -> ConfidenceBreakdown {
        ConfidenceBreakdown {
            image_quality: quality,
            region_confidence: regions,
            consensus,
            count_plausibility: 1.0,
            spatial_dispersion: 0.5,
        }
    }

    #[test]
    fn clean_detection_has_no_flags() {
        let s = stats(0.5);
        let b = breakdown(0.8, 0.8, 0.9);
        let input = ScenarioInput {
            stats: &s,
            breakdown: &b,
            region_count: 3,
            extractor_count: 3,
        };
        assert!(evaluate(&input, &ScenarioThresholds::default()).is_empty());
    }

    #[test]
    fn dark_empty_frame_collects_several_flags() {
        let s = stats(0.0);
        let b = breakdown(0.0, 0.3, 0.7);
        let input = ScenarioInput {
            stats: &s,
            breakdown: &b,
            region_count: 0,
            extractor_count: 1,
        };
        assert_eq!(
            evaluate(&input, &ScenarioThresholds::default()),
            vec![
                ScenarioFlag::LowLight,
                ScenarioFlag::LowQuality,
                ScenarioFlag::NoDetection,
                ScenarioFlag::LowDetectionConfidence
            ]
        );
    }

    #[test]
    fn disagreement_needs_several_extractors() {
        let s = stats(0.9);
        let b = breakdown(0.6, 0.6, 0.2);
        let single = ScenarioInput {
            stats: &s,
            breakdown: &b,
            region_count: 31,
            extractor_count: 1,
        };
        let flags = evaluate(&single, &ScenarioThresholds::default());
        assert_eq!(
            flags,
            vec![ScenarioFlag::Overexposed, ScenarioFlag::TooManyDetections]
        );
        let multi = ScenarioInput {
            extractor_count: 2,
            ..single
        };
        assert!(evaluate(&multi, &ScenarioThresholds::default())
            .contains(&ScenarioFlag::MethodDisagreement));
    }

    #[test]
    fn flags_serialize_as_snake_case() {
        let text = serde_json::to_string(&ScenarioFlag::TooManyDetections).expect("serialize");
        assert_eq!(text, "\"too_many_detections\"");
    }
}
