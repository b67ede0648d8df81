//! Parameter types configuring the detection stages.
//!
//! Every struct carries explicit defaults and rejects unknown keys when
//! deserialized, so a misspelled knob is a construction-time error instead of
//! a silently ignored setting. [`MethodConfig`] groups them; the two presets
//! [`MethodConfig::pothole`] and [`MethodConfig::vegetation`] mirror the two
//! detection targets.

use super::method::DetectionTarget;
use crate::error::ValidationError;
use crate::extractors::ExtractorKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One HSV band (OpenCV convention: H in 0..=179, S and V in 0..=255).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorBand {
    pub name: String,
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorBand {
    fn new(name: &str, lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self {
            name: name.to_string(),
            lower,
            upper,
        }
    }

    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| hsv[c] >= self.lower[c] && hsv[c] <= self.upper[c])
    }
}

/// Colour-coverage extractor parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorParams {
    pub bands: Vec<ColorBand>,
    /// Recalibrate bands per image from the V-channel statistics.
    pub adaptive_ranges: bool,
    /// Mean V (0..1) below which bands are widened towards dark tones.
    pub dark_brightness: f32,
    pub dark_lower_shift: [u8; 3],
    pub dark_upper_shift: [u8; 3],
    /// Std of V (0..1) above which saturation lower bounds relax.
    pub high_contrast: f32,
    pub saturation_relax: u8,
    pub saturation_floor: u8,
    /// CLAHE on V is applied when gray contrast (σ/255) is below this.
    pub clahe_contrast: f32,
    pub clahe_clip_limit: f32,
    pub clahe_tiles: usize,
    pub open_kernel: usize,
    pub close_kernels: Vec<usize>,
    /// Base minimum component area; halved before adaptive scaling.
    pub min_area: f64,
    pub adaptive_min_area: bool,
    pub sparse_coverage: f32,
    pub sparse_area_factor: f64,
    pub dense_coverage: f32,
    pub dense_area_factor: f64,
}

impl Default for ColorParams {
    fn default() -> Self {
        Self {
            bands: vec![
                ColorBand::new("green", [35, 40, 40], [85, 255, 255]),
                ColorBand::new("brown", [10, 50, 20], [20, 255, 200]),
                ColorBand::new("yellow_green", [25, 30, 30], [45, 255, 255]),
                ColorBand::new("dark_green", [60, 40, 20], [85, 255, 150]),
            ],
            adaptive_ranges: true,
            dark_brightness: 0.3,
            dark_lower_shift: [5, 20, 20],
            dark_upper_shift: [5, 20, 50],
            high_contrast: 0.4,
            saturation_relax: 10,
            saturation_floor: 30,
            clahe_contrast: 0.4,
            clahe_clip_limit: 2.0,
            clahe_tiles: 8,
            open_kernel: 3,
            close_kernels: vec![5, 7],
            min_area: 1000.0,
            adaptive_min_area: true,
            sparse_coverage: 0.05,
            sparse_area_factor: 0.3,
            dense_coverage: 0.8,
            dense_area_factor: 1.5,
        }
    }
}

/// Contour/geometry extractor parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContourParams {
    pub canny_low: f32,
    pub canny_high: f32,
    pub clahe_clip_limit: f32,
    pub clahe_tiles: usize,
    pub blur: bool,
    pub closing_kernel: usize,
}

impl Default for ContourParams {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 150.0,
            clahe_clip_limit: 2.0,
            clahe_tiles: 8,
            blur: true,
            closing_kernel: 5,
        }
    }
}

/// Texture-irregularity extractor parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextureParams {
    pub lbp_radius: f32,
    pub lbp_points: usize,
    /// Minimum local variance (gray levels²) for a pixel to be flagged.
    pub variance_threshold: f32,
    /// Maximum gray level (0..255) for a pixel to be flagged.
    pub darkness_threshold: f32,
    /// Side of the square variance window (odd).
    pub window: usize,
    pub morphology_kernel: usize,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            lbp_radius: 3.0,
            lbp_points: 24,
            variance_threshold: 50.0,
            darkness_threshold: 80.0,
            window: 15,
            morphology_kernel: 7,
        }
    }
}

/// Shadow/depth extractor parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShadowParams {
    pub dark_threshold: f32,
    pub gradient_threshold: f32,
    pub closing_kernel: usize,
}

impl Default for ShadowParams {
    fn default() -> Self {
        Self {
            dark_threshold: 60.0,
            gradient_threshold: 30.0,
            closing_kernel: 5,
        }
    }
}

/// Per-extractor fusion weights.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorWeights {
    pub color: f32,
    pub contour: f32,
    pub texture: f32,
    pub shadow: f32,
}

impl Default for ExtractorWeights {
    fn default() -> Self {
        Self {
            color: 0.0,
            contour: 0.5,
            texture: 0.3,
            shadow: 0.2,
        }
    }
}

impl ExtractorWeights {
    pub fn get(&self, kind: ExtractorKind) -> f32 {
        match kind {
            ExtractorKind::Color => self.color,
            ExtractorKind::Contour => self.contour,
            ExtractorKind::Texture => self.texture,
            ExtractorKind::Shadow => self.shadow,
        }
    }

    fn all(&self) -> [f32; 4] {
        [self.color, self.contour, self.texture, self.shadow]
    }
}

/// Mask fusion parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FusionParams {
    pub weights: ExtractorWeights,
    /// Binarisation cut on the fused field.
    pub threshold: f32,
    /// Gray contrast (σ/255) below which the cut is raised.
    pub low_contrast: f32,
    pub low_contrast_boost: f32,
    pub max_threshold: f32,
    pub refine_kernel: usize,
}

impl Default for FusionParams {
    fn default() -> Self {
        Self {
            weights: ExtractorWeights::default(),
            threshold: 0.4,
            low_contrast: 0.1,
            low_contrast_boost: 0.1,
            max_threshold: 0.95,
            refine_kernel: 5,
        }
    }
}

/// Region acceptance bounds and region-stage knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegionParams {
    pub min_area: f64,
    pub max_area: f64,
    pub min_circularity: f64,
    pub max_circularity: f64,
    pub min_convexity: f64,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
    /// Minimum area for coverage (vegetation) regions.
    pub coverage_min_area: f64,
    /// Margin (px) of the background ring sampled around each region.
    pub background_margin: u32,
    /// Components below this convexity are candidates for watershed splitting.
    pub watershed_convexity: f64,
    /// Marker cut as a fraction of the distance-transform maximum.
    pub marker_ratio: f32,
}

impl Default for RegionParams {
    fn default() -> Self {
        Self {
            min_area: 500.0,
            max_area: 50_000.0,
            min_circularity: 0.3,
            max_circularity: 1.0,
            min_convexity: 0.4,
            min_aspect_ratio: 0.3,
            max_aspect_ratio: 3.0,
            coverage_min_area: 1000.0,
            background_margin: 10,
            watershed_convexity: 0.9,
            marker_ratio: 0.6,
        }
    }
}

/// Weights of the five confidence sub-scores.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfidenceWeights {
    pub quality: f64,
    pub regions: f64,
    pub consensus: f64,
    pub count: f64,
    pub spatial: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            quality: 0.30,
            regions: 0.25,
            consensus: 0.20,
            count: 0.15,
            spatial: 0.10,
        }
    }
}

/// Confidence scoring parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringParams {
    pub weights: ConfidenceWeights,
    pub ideal_circularity: f64,
    pub ideal_convexity: f64,
    pub ideal_aspect_ratio: f64,
    /// Multiplier on region scores when several extractors agreed on them.
    pub combined_boost: f64,
    pub max_plausible_count: usize,
    pub neutral_consensus: f64,
    /// Region sub-score used when nothing was detected.
    pub empty_region_score: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            weights: ConfidenceWeights::default(),
            ideal_circularity: 0.8,
            ideal_convexity: 1.0,
            ideal_aspect_ratio: 1.0,
            combined_boost: 1.2,
            max_plausible_count: 30,
            neutral_consensus: 0.7,
            empty_region_score: 0.3,
        }
    }
}

/// Quality-mode knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModeParams {
    pub realtime_scale: f32,
    pub watershed: bool,
    pub multi_scale_texture: bool,
    pub refine_confidence: bool,
}

impl Default for ModeParams {
    fn default() -> Self {
        Self {
            realtime_scale: 0.5,
            watershed: true,
            multi_scale_texture: true,
            refine_confidence: true,
        }
    }
}

/// Thresholds of the scenario rule table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioThresholds {
    pub low_light: f64,
    pub overexposed: f64,
    pub low_quality: f64,
    pub disagreement: f64,
    pub too_many: usize,
    pub low_detection_confidence: f64,
}

impl Default for ScenarioThresholds {
    fn default() -> Self {
        Self {
            low_light: 0.25,
            overexposed: 0.75,
            low_quality: 0.4,
            disagreement: 0.5,
            too_many: 30,
            low_detection_confidence: 0.4,
        }
    }
}

/// Complete, immutable configuration of one detection call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MethodConfig {
    pub name: String,
    pub version: String,
    pub target: DetectionTarget,
    pub color: ColorParams,
    pub contour: ContourParams,
    pub texture: TextureParams,
    pub shadow: ShadowParams,
    pub fusion: FusionParams,
    pub regions: RegionParams,
    pub scoring: ScoringParams,
    pub modes: ModeParams,
    pub scenarios: ScenarioThresholds,
}

impl Default for MethodConfig {
    fn default() -> Self {
        Self::pothole()
    }
}

impl MethodConfig {
    /// Road-surface pothole preset.
    pub fn pothole() -> Self {
        Self {
            name: "pothole".to_string(),
            version: "1.0".to_string(),
            target: DetectionTarget::Pothole,
            color: ColorParams::default(),
            contour: ContourParams::default(),
            texture: TextureParams::default(),
            shadow: ShadowParams::default(),
            fusion: FusionParams::default(),
            regions: RegionParams::default(),
            scoring: ScoringParams::default(),
            modes: ModeParams::default(),
            scenarios: ScenarioThresholds::default(),
        }
    }

    /// Vegetation coverage preset.
    pub fn vegetation() -> Self {
        let mut cfg = Self::pothole();
        cfg.name = "vegetation".to_string();
        cfg.target = DetectionTarget::Vegetation;
        cfg.texture = TextureParams {
            variance_threshold: 200.0,
            darkness_threshold: 255.0,
            window: 9,
            ..TextureParams::default()
        };
        cfg.fusion.weights = ExtractorWeights {
            color: 0.6,
            contour: 0.0,
            texture: 0.4,
            shadow: 0.0,
        };
        cfg
    }

    /// Preset for `target`.
    pub fn for_target(target: DetectionTarget) -> Self {
        match target {
            DetectionTarget::Pothole => Self::pothole(),
            DetectionTarget::Vegetation => Self::vegetation(),
        }
    }

    /// Deep-merge `overrides` into this configuration and validate the result.
    ///
    /// Unknown keys at any depth are rejected.
    pub fn with_overrides(&self, overrides: &Value) -> Result<Self, ValidationError> {
        let mut base = serde_json::to_value(self)
            .map_err(|e| ValidationError::InvalidConfig(e.to_string()))?;
        merge_json(&mut base, overrides);
        let cfg: MethodConfig = serde_json::from_value(base)
            .map_err(|e| ValidationError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Range checks across all parameter groups.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |msg: String| Err(ValidationError::InvalidConfig(msg));

        for band in &self.color.bands {
            if band.lower[0] > 179 || band.upper[0] > 179 {
                return invalid(format!("color band '{}': hue must be <= 179", band.name));
            }
            if (0..3).any(|c| band.lower[c] > band.upper[c]) {
                return invalid(format!("color band '{}': lower exceeds upper", band.name));
            }
        }
        if self.contour.canny_low < 0.0 || self.contour.canny_low > self.contour.canny_high {
            return invalid("contour: require 0 <= canny_low <= canny_high".to_string());
        }
        if self.texture.lbp_points < 4 || self.texture.lbp_radius <= 0.0 {
            return invalid("texture: lbp_points >= 4 and lbp_radius > 0 required".to_string());
        }

        let kernels = [
            ("color.open_kernel", self.color.open_kernel),
            ("contour.closing_kernel", self.contour.closing_kernel),
            ("texture.window", self.texture.window),
            ("texture.morphology_kernel", self.texture.morphology_kernel),
            ("shadow.closing_kernel", self.shadow.closing_kernel),
            ("fusion.refine_kernel", self.fusion.refine_kernel),
        ];
        let closing = self
            .color
            .close_kernels
            .iter()
            .map(|&k| ("color.close_kernels", k));
        for (name, k) in kernels.into_iter().chain(closing) {
            if k == 0 || k % 2 == 0 {
                return invalid(format!("{name} must be odd and >= 1 (got {k})"));
            }
        }

        let weights = self.fusion.weights.all();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return invalid("fusion weights must be finite and non-negative".to_string());
        }
        let active: f32 = self
            .target
            .combined_extractors()
            .iter()
            .map(|&k| self.fusion.weights.get(k))
            .sum();
        if active <= 0.0 {
            return invalid("fusion weights of the combined extractors sum to zero".to_string());
        }
        let f = &self.fusion;
        if !(0.0..=1.0).contains(&f.threshold) || !(f.threshold..=1.0).contains(&f.max_threshold) {
            return invalid("fusion: require 0 <= threshold <= max_threshold <= 1".to_string());
        }

        let r = &self.regions;
        let finite = [
            r.min_area,
            r.max_area,
            r.min_circularity,
            r.max_circularity,
            r.min_convexity,
            r.min_aspect_ratio,
            r.max_aspect_ratio,
            r.coverage_min_area,
        ];
        if finite.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return invalid("region bounds must be finite and non-negative".to_string());
        }
        if r.min_area > r.max_area
            || r.min_circularity > r.max_circularity
            || r.min_aspect_ratio > r.max_aspect_ratio
        {
            return invalid("region bounds: every min must be <= its max".to_string());
        }
        if !(0.0..1.0).contains(&r.marker_ratio) {
            return invalid("regions.marker_ratio must be in [0, 1)".to_string());
        }

        let w = &self.scoring.weights;
        let sub = [w.quality, w.regions, w.consensus, w.count, w.spatial];
        if sub.iter().any(|v| !v.is_finite() || *v < 0.0) || sub.iter().sum::<f64>() <= 0.0 {
            return invalid("scoring weights must be non-negative with a positive sum".to_string());
        }
        if self.scoring.max_plausible_count == 0 {
            return invalid("scoring.max_plausible_count must be >= 1".to_string());
        }
        if !(self.modes.realtime_scale > 0.0 && self.modes.realtime_scale <= 1.0) {
            return invalid("modes.realtime_scale must be in (0, 1]".to_string());
        }
        Ok(())
    }
}

/// Recursive object merge: objects merge key by key, everything else replaces.
fn merge_json(base: &mut Value, overrides: &Value) {
    match (base, overrides) {
        (Value::Object(base_map), Value::Object(over_map)) => {
            for (key, value) in over_map {
                match base_map.get_mut(key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn presets_validate() {
        MethodConfig::pothole().validate().expect("pothole preset");
        MethodConfig::vegetation().validate().expect("vegetation preset");
        assert_eq!(MethodConfig::default(), MethodConfig::pothole());
    }

    #[test]
    fn overrides_merge_nested_values() {
        let cfg = MethodConfig::pothole()
            .with_overrides(&json!({ "contour": { "canny_low": 30.0 }, "fusion": { "threshold": 0.5 } }))
            .expect("valid override");
        assert_eq!(cfg.contour.canny_low, 30.0);
        assert_eq!(cfg.contour.canny_high, 150.0);
        assert_eq!(cfg.fusion.threshold, 0.5);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = MethodConfig::pothole()
            .with_overrides(&json!({ "contour": { "canny_lo": 30.0 } }))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidConfig(_)));
        assert!(MethodConfig::pothole()
            .with_overrides(&json!({ "colour": {} }))
            .is_err());
    }

    #[test]
    fn range_violations_are_rejected() {
        let mut cfg = MethodConfig::pothole();
        cfg.regions.min_area = 60_000.0;
        assert!(cfg.validate().is_err());

        let mut cfg = MethodConfig::pothole();
        cfg.fusion.refine_kernel = 4;
        assert!(cfg.validate().is_err());

        let mut cfg = MethodConfig::pothole();
        cfg.fusion.weights = ExtractorWeights {
            color: 1.0,
            contour: 0.0,
            texture: 0.0,
            shadow: 0.0,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = MethodConfig::vegetation();
        let text = serde_json::to_string(&cfg).expect("serialize");
        let back: MethodConfig = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, cfg);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: MethodConfig = serde_json::from_str(r#"{ "shadow": { "dark_threshold": 40 } }"#)
            .expect("partial config");
        assert_eq!(cfg.shadow.dark_threshold, 40.0);
        assert_eq!(cfg.shadow.gradient_threshold, 30.0);
        assert_eq!(cfg.target, DetectionTarget::Pothole);
    }
}
