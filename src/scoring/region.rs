//! Per-region confidence.
//!
//! Pothole regions score by proximity of each shape ratio to its ideal,
//! normalised by the widest accepted excursion from that ideal:
//!
//! `term(v) = clamp(1 − |v − ideal| / max(ideal − lo, hi − ideal), 0, 1)`
//!
//! weighted 0.3 circularity, 0.3 convexity, 0.2 aspect ratio, plus 0.2
//! darkness `1 − mean/255`. Coverage regions score
//! `0.5·convexity + 0.5·min(area / (10·min_area), 1)`.
//! Multi-extractor methods multiply by the combined boost (capped at 1) and
//! precision mode blends in local contrast as `0.8·s + 0.2·min(2|contrast|, 1)`.
use crate::detector::{DetectionTarget, Method, ModeProfile, ScoringParams};
use crate::geometry::ShapeDescriptor;
use crate::regions::RegionBounds;

pub struct RegionScorer<'a> {
    params: &'a ScoringParams,
    bounds: &'a RegionBounds,
    target: DetectionTarget,
    boosted: bool,
    refine: bool,
}

fn proximity(v: f64, ideal: f64, lo: f64, hi: f64) -> f64 {
    let span = (ideal - lo).max(hi - ideal);
    if span <= f64::EPSILON {
        return if (v - ideal).abs() <= f64::EPSILON { 1.0 } else { 0.0 };
    }
    (1.0 - (v - ideal).abs() / span).clamp(0.0, 1.0)
}

impl<'a> RegionScorer<'a> {
    pub fn new(
        params: &'a ScoringParams,
        bounds: &'a RegionBounds,
        target: DetectionTarget,
        method: Method,
        profile: ModeProfile,
    ) -> Self {
        Self {
            params,
            bounds,
            target,
            boosted: method == Method::Combined,
            refine: profile.refine_confidence,
        }
    }

    /// Score in `[0, 1]`; `area` in full-resolution pixels.
    pub fn score(&self, shape: &ShapeDescriptor, area: f64, mean_intensity: f64, contrast: f64) -> f64 {
        let p = self.params;
        let base = match self.target {
            DetectionTarget::Pothole => {
                let (c_lo, c_hi) = self.bounds.circularity.unwrap_or((0.0, 1.0));
                let v_lo = self.bounds.min_convexity.unwrap_or(0.0);
                let (a_lo, a_hi) = self
                    .bounds
                    .aspect_ratio
                    .unwrap_or((0.0, 2.0 * p.ideal_aspect_ratio));
                let circ = proximity(shape.circularity, p.ideal_circularity, c_lo, c_hi);
                let conv = proximity(shape.convexity, p.ideal_convexity, v_lo, 1.0);
                let aspect = proximity(shape.aspect_ratio, p.ideal_aspect_ratio, a_lo, a_hi);
                let darkness = (1.0 - mean_intensity / 255.0).clamp(0.0, 1.0);
                0.3 * circ + 0.3 * conv + 0.2 * aspect + 0.2 * darkness
            }
            DetectionTarget::Vegetation => {
                let size = (area / (10.0 * self.bounds.min_area.max(1.0))).min(1.0);
                0.5 * shape.convexity + 0.5 * size
            }
        };
        let mut score = base.clamp(0.0, 1.0);
        if self.boosted {
            score = (score * p.combined_boost).min(1.0);
        }
        if self.refine {
            score = 0.8 * score + 0.2 * (2.0 * contrast.abs()).min(1.0);
        }
        score.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{ModeParams, QualityMode, RegionParams};
    use crate::types::BoundingBox;
    use nalgebra::Point2;

    fn shape(circularity: f64, convexity: f64, aspect_ratio: f64) -> ShapeDescriptor {
        ShapeDescriptor {
            area: 1000.0,
            perimeter: 120.0,
            circularity,
            convexity,
            aspect_ratio,
            bbox: BoundingBox::default(),
            centroid: Point2::origin(),
            orientation_deg: 0.0,
            elongation: 1.0,
        }
    }

    #[test]
    fn ideal_black_shape_scores_one() {
        let params = ScoringParams::default();
        let bounds = RegionBounds::for_target(DetectionTarget::Pothole, &RegionParams::default());
        let profile = ModeProfile::resolve(QualityMode::RealTime, &ModeParams::default());
        let scorer = RegionScorer::new(&params, &bounds, DetectionTarget::Pothole, Method::Contour, profile);
        let s = scorer.score(&shape(0.8, 1.0, 1.0), 1000.0, 0.0, 0.0);
        assert!((s - 1.0).abs() < 1e-12);
    }

    #[test]
    fn proximity_decreases_monotonically_away_from_ideal() {
        let params = ScoringParams::default();
        let bounds = RegionBounds::for_target(DetectionTarget::Pothole, &RegionParams::default());
        let profile = ModeProfile::resolve(QualityMode::RealTime, &ModeParams::default());
        let scorer = RegionScorer::new(&params, &bounds, DetectionTarget::Pothole, Method::Contour, profile);
        let near = scorer.score(&shape(0.7, 0.95, 1.2), 1000.0, 100.0, 0.0);
        let far = scorer.score(&shape(0.35, 0.5, 2.5), 1000.0, 100.0, 0.0);
        assert!(near > far);
        // circularity at the lower bound contributes nothing
        assert_eq!(proximity(0.3, 0.8, 0.3, 1.0), 0.0);
        assert!((proximity(1.0, 0.8, 0.3, 1.0) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn combined_boost_and_precision_refinement() {
        let params = ScoringParams::default();
        let bounds = RegionBounds::for_target(DetectionTarget::Pothole, &RegionParams::default());
        let rt = ModeProfile::resolve(QualityMode::RealTime, &ModeParams::default());
        let precise = ModeProfile::resolve(QualityMode::Precision, &ModeParams::default());
        let s = shape(0.6, 0.8, 1.5);
        let single = RegionScorer::new(&params, &bounds, DetectionTarget::Pothole, Method::Contour, rt)
            .score(&s, 1000.0, 128.0, 0.0);
        let combined = RegionScorer::new(&params, &bounds, DetectionTarget::Pothole, Method::Combined, rt)
            .score(&s, 1000.0, 128.0, 0.0);
        assert!((combined - (single * 1.2).min(1.0)).abs() < 1e-12);
        let refined = RegionScorer::new(&params, &bounds, DetectionTarget::Pothole, Method::Contour, precise)
            .score(&s, 1000.0, 128.0, 0.5);
        assert!((refined - (0.8 * single + 0.2)).abs() < 1e-12);
    }

    #[test]
    fn coverage_regions_score_convexity_and_size() {
        let params = ScoringParams::default();
        let bounds = RegionBounds::for_target(DetectionTarget::Vegetation, &RegionParams::default());
        let rt = ModeProfile::resolve(QualityMode::RealTime, &ModeParams::default());
        let scorer = RegionScorer::new(&params, &bounds, DetectionTarget::Vegetation, Method::Color, rt);
        let s = scorer.score(&shape(0.2, 0.6, 5.0), 5000.0, 90.0, 0.0);
        assert!((s - (0.3 + 0.25)).abs() < 1e-12);
    }
}
