//! Confidence scoring.
//!
//! The overall confidence is a fixed weighted sum of five sub-scores, each in
//! `[0, 1]`:
//!
//! | sub-score            | default weight |
//! |----------------------|----------------|
//! | image quality        | 0.30           |
//! | mean region score    | 0.25           |
//! | extractor consensus  | 0.20           |
//! | count plausibility   | 0.15           |
//! | spatial dispersion   | 0.10           |
//!
//! Levels: HIGH ≥ 0.80, MEDIUM ≥ 0.60, LOW ≥ 0.40, VERY_LOW otherwise.

pub mod agreement;
pub mod quality;
pub mod region;

pub use agreement::{consensus, count_plausibility, spatial_dispersion};
pub use quality::image_quality;
pub use region::RegionScorer;

use crate::detector::{ConfidenceWeights, ScoringParams};
use crate::extractors::FeatureMask;
use crate::image::ImageStats;
use crate::types::Region;
use serde::Serialize;

/// Discrete confidence bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    VeryLow,
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Total mapping; lower bounds are inclusive.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceLevel::High
        } else if score >= 0.6 {
            ConfidenceLevel::Medium
        } else if score >= 0.4 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::VeryLow
        }
    }
}

/// The five sub-scores behind one confidence value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceBreakdown {
    pub image_quality: f64,
    pub region_confidence: f64,
    pub consensus: f64,
    pub count_plausibility: f64,
    pub spatial_dispersion: f64,
}

impl ConfidenceBreakdown {
    /// Weighted sum, clamped to `[0, 1]`.
    pub fn combine(&self, w: &ConfidenceWeights) -> f64 {
        (w.quality * self.image_quality
            + w.regions * self.region_confidence
            + w.consensus * self.consensus
            + w.count * self.count_plausibility
            + w.spatial * self.spatial_dispersion)
            .clamp(0.0, 1.0)
    }

    pub fn is_finite(&self) -> bool {
        [
            self.image_quality,
            self.region_confidence,
            self.consensus,
            self.count_plausibility,
            self.spatial_dispersion,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

pub struct ConfidenceScorer<'a> {
    params: &'a ScoringParams,
}

impl<'a> ConfidenceScorer<'a> {
    pub fn new(params: &'a ScoringParams) -> Self {
        Self { params }
    }

    /// Sub-scores for one detection. `masks` are the extractor outputs that
    /// ran; `width`/`height` are the frame the region centroids live in.
    pub fn breakdown(
        &self,
        stats: &ImageStats,
        regions: &[Region],
        masks: &[FeatureMask],
        width: usize,
        height: usize,
    ) -> ConfidenceBreakdown {
        let p = self.params;
        let region_confidence = if regions.is_empty() {
            p.empty_region_score
        } else {
            regions.iter().map(|r| r.confidence).sum::<f64>() / regions.len() as f64
        };
        ConfidenceBreakdown {
            image_quality: image_quality(stats),
            region_confidence: region_confidence.clamp(0.0, 1.0),
            consensus: consensus(masks, p.neutral_consensus),
            count_plausibility: count_plausibility(regions.len(), p.max_plausible_count),
            spatial_dispersion: spatial_dispersion(regions, width, height),
        }
    }

    pub fn score(&self, breakdown: &ConfidenceBreakdown) -> f64 {
        breakdown.combine(&self.params.weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_sum_and_level() {
        let b = ConfidenceBreakdown {
            image_quality: 0.9,
            region_confidence: 0.8,
            consensus: 0.7,
            count_plausibility: 1.0,
            spatial_dispersion: 0.6,
        };
        let score = b.combine(&ConfidenceWeights::default());
        assert!((score - 0.82).abs() < 1e-9);
        assert_eq!(ConfidenceLevel::from_score(score), ConfidenceLevel::High);
    }

    #[test]
    fn level_thresholds_are_inclusive_at_lower_bound() {
        assert_eq!(ConfidenceLevel::from_score(0.8), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.7999), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.6), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.4), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(0.3999), ConfidenceLevel::VeryLow);
        assert_eq!(ConfidenceLevel::from_score(0.0), ConfidenceLevel::VeryLow);
    }

    #[test]
    fn level_serializes_screaming_snake_case() {
        let text = serde_json::to_string(&ConfidenceLevel::VeryLow).expect("serialize");
        assert_eq!(text, "\"VERY_LOW\"");
    }

    #[test]
    fn empty_detection_uses_configured_region_score() {
        let params = ScoringParams::default();
        let stats = ImageStats {
            mean_brightness: 0.0,
            std_dev: 0.0,
            contrast: 0.0,
            sharpness: 0.0,
            histograms: Vec::new(),
        };
        let b = ConfidenceScorer::new(&params).breakdown(&stats, &[], &[], 64, 64);
        assert_eq!(b.region_confidence, 0.3);
        assert_eq!(b.count_plausibility, 0.0);
        assert_eq!(b.consensus, 0.7);
        assert_eq!(b.spatial_dispersion, 0.5);
        assert_eq!(b.image_quality, 0.0);
    }
}
