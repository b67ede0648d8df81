use surface_detector::detector::{FusionParams, ModeParams, ModeProfile, ScoringParams};
use surface_detector::extractors::{ExtractorKind, FeatureMask};
use surface_detector::fusion::MaskFuser;
use surface_detector::image::ImageF32;
use surface_detector::scoring::ConfidenceScorer;
use surface_detector::{ConfidenceBreakdown, ConfidenceLevel, QualityMode};

#[test]
fn all_ones_extractor_masks_fuse_to_full_cover() {
    let params = FusionParams::default();
    let profile = ModeProfile::resolve(QualityMode::Precision, &ModeParams::default());
    let masks: Vec<FeatureMask> = [
        ExtractorKind::Contour,
        ExtractorKind::Texture,
        ExtractorKind::Shadow,
    ]
    .into_iter()
    .map(|kind| FeatureMask::new(kind, ImageF32::filled(64, 48, 1.0)))
    .collect();

    let fused = MaskFuser::new(&params, &profile)
        .fuse(&masks, 0.25)
        .expect("masks share a size");
    assert!(fused.field.data.iter().all(|&v| v == 1.0));
    assert_eq!(fused.mask.count(), 64 * 48);
}

#[test]
fn documented_breakdown_scores_high() {
    let breakdown = ConfidenceBreakdown {
        image_quality: 0.9,
        region_confidence: 0.8,
        consensus: 0.7,
        count_plausibility: 1.0,
        spatial_dispersion: 0.6,
    };
    let params = ScoringParams::default();
    let score = ConfidenceScorer::new(&params).score(&breakdown);
    assert!((score - 0.82).abs() < 1e-9, "score {score}");
    assert_eq!(ConfidenceLevel::from_score(score), ConfidenceLevel::High);
}

#[test]
fn level_thresholds_are_inclusive_at_lower_bound() {
    assert_eq!(ConfidenceLevel::from_score(0.8), ConfidenceLevel::High);
    assert_eq!(ConfidenceLevel::from_score(0.6), ConfidenceLevel::Medium);
    assert_eq!(ConfidenceLevel::from_score(0.4), ConfidenceLevel::Low);
    assert_eq!(ConfidenceLevel::from_score(0.399_999), ConfidenceLevel::VeryLow);
    assert_eq!(ConfidenceLevel::from_score(0.0), ConfidenceLevel::VeryLow);
}
