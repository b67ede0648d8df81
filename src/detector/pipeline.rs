//! Detection pipeline orchestrating extraction, fusion, region extraction,
//! scoring and diagnostics.
//!
//! [`SurfaceDetector`] holds a validated [`MethodConfig`] and nothing else, so
//! one detector can serve any number of concurrent calls.
//!
//! ```no_run
//! use surface_detector::{Method, MethodConfig, QualityMode, SurfaceDetector};
//! use surface_detector::image::Image;
//!
//! # fn example(image: Image) -> Result<(), surface_detector::DetectionError> {
//! let detector = SurfaceDetector::new(MethodConfig::pothole())?;
//! let result = detector.detect(&image, Method::Combined, QualityMode::Precision)?;
//! println!("{} regions, confidence {:.2}", result.regions.len(), result.confidence);
//! # Ok(())
//! # }
//! ```
//
// Stages
// - Resize: real-time mode works on a downscaled copy.
// - Extract: each selected extractor produces a feature mask at working size.
// - Fuse: weighted sum, adaptive cut, morphological clean-up.
// - Regions: label, split, measure, filter, score; mapped to full resolution.
// - Score: five sub-scores and their weighted sum.
// - Diagnose: scenario flags.

use super::method::Method;
use super::mode::{ModeProfile, QualityMode};
use super::params::MethodConfig;
use crate::diagnostics::{
    elapsed_ms, evaluate_scenarios, DetectionReport, ExtractorStage, FusionStage, InputDescriptor,
    PipelineTrace, RegionStage, ScenarioInput, TimingBreakdown,
};
use crate::error::{DetectionError, ValidationError};
use crate::extractors::{ExtractContext, ExtractorKind, FeatureMask};
use crate::fusion::MaskFuser;
use crate::image::Image;
use crate::regions::{FrameMapping, RegionBounds, RegionExtractor};
use crate::scoring::{ConfidenceLevel, ConfidenceScorer, RegionScorer};
use crate::types::{DensityClass, DetectionResult};
use log::{debug, info};
use std::time::Instant;

/// Smallest accepted input width and height.
pub const MIN_DIMENSION: usize = 32;

/// Detector bound to one validated configuration.
#[derive(Clone, Debug)]
pub struct SurfaceDetector {
    config: MethodConfig,
}

impl SurfaceDetector {
    pub fn new(config: MethodConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MethodConfig {
        &self.config
    }

    /// Extractors that run for `method` under `profile`.
    ///
    /// Real-time mode drops texture from `combined`; an explicit texture-only
    /// request still runs it.
    pub fn plan(&self, method: Method, profile: &ModeProfile) -> Vec<ExtractorKind> {
        let mut kinds = method.extractors(self.config.target);
        if method == Method::Combined && profile.skip_texture {
            kinds.retain(|&k| k != ExtractorKind::Texture);
        }
        kinds
    }

    pub fn detect(
        &self,
        image: &Image,
        method: Method,
        mode: QualityMode,
    ) -> Result<DetectionResult, DetectionError> {
        self.run(image, method, mode).map(|report| report.result)
    }

    /// Same as [`detect`](Self::detect), returning the stage trace as well.
    pub fn detect_with_diagnostics(
        &self,
        image: &Image,
        method: Method,
        mode: QualityMode,
    ) -> Result<DetectionReport, DetectionError> {
        self.run(image, method, mode)
    }

    /// Run [`detect`](Self::detect) over many images; results keep input order.
    pub fn detect_batch(
        &self,
        images: &[Image],
        method: Method,
        mode: QualityMode,
    ) -> Vec<Result<DetectionResult, DetectionError>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            images
                .par_iter()
                .map(|img| self.detect(img, method, mode))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            images
                .iter()
                .map(|img| self.detect(img, method, mode))
                .collect()
        }
    }

    fn run(
        &self,
        image: &Image,
        method: Method,
        mode: QualityMode,
    ) -> Result<DetectionReport, DetectionError> {
        let total_start = Instant::now();
        let cfg = &self.config;
        let (width, height) = (image.width(), image.height());
        if width < MIN_DIMENSION || height < MIN_DIMENSION {
            return Err(ValidationError::TooSmall {
                width,
                height,
                min: MIN_DIMENSION,
            }
            .into());
        }

        let profile = ModeProfile::resolve(mode, &cfg.modes);
        let kinds = self.plan(method, &profile);
        let mut timings = TimingBreakdown::default();

        let resized;
        let work: &Image = if profile.is_downscaled() {
            let start = Instant::now();
            resized = image.resized(profile.scale)?;
            timings.push("resize", elapsed_ms(start));
            &resized
        } else {
            image
        };
        let mapping = FrameMapping {
            full_width: width,
            full_height: height,
            sx: width as f64 / work.width() as f64,
            sy: height as f64 / work.height() as f64,
        };
        debug!(
            "detect: method={} target={:?} mode={:?} {}x{} -> {}x{} extractors={:?}",
            method,
            cfg.target,
            mode,
            width,
            height,
            work.width(),
            work.height(),
            kinds
        );

        let bounds = RegionBounds::for_target(cfg.target, &cfg.regions);
        let ctx = ExtractContext {
            profile,
            area_scale: mapping.area_scale(),
            bounds: bounds.clone(),
        };
        let start = Instant::now();
        let extracted = run_extractors(&kinds, work, cfg, &ctx);
        timings.push("extract", elapsed_ms(start));
        let extractor_stages: Vec<ExtractorStage> = extracted
            .iter()
            .map(|(mask, ms)| ExtractorStage {
                kind: mask.kind,
                coverage: mask.coverage(),
                shapes: mask.shapes.len(),
                elapsed_ms: *ms,
            })
            .collect();
        let masks: Vec<FeatureMask> = extracted.into_iter().map(|(mask, _)| mask).collect();

        let stats = image.stats();
        let fuser = MaskFuser::new(&cfg.fusion, &profile);
        let fused = timings.time("fusion", || fuser.fuse(&masks, stats.contrast))?;

        let region_scorer = RegionScorer::new(&cfg.scoring, &bounds, cfg.target, method, profile);
        let (regions, final_mask, region_stats) = timings.time("regions", || {
            RegionExtractor::new(&cfg.regions, &bounds, profile).extract(
                &fused.mask,
                work.gray(),
                mapping,
                &region_scorer,
            )
        });

        let scorer = ConfidenceScorer::new(&cfg.scoring);
        let breakdown = timings.time("scoring", || {
            scorer.breakdown(stats, &regions, &masks, width, height)
        });
        if !breakdown.is_finite() {
            return Err(DetectionError::internal(
                "scoring",
                format!("non-finite sub-score in {breakdown:?}"),
            ));
        }
        let confidence = scorer.score(&breakdown);

        let total_area: f64 = regions.iter().map(|r| r.area).sum();
        let coverage_percentage = 100.0 * total_area / (width * height) as f64;
        let density = if cfg.target.is_coverage() {
            DensityClass::from_coverage(coverage_percentage, regions.len())
        } else {
            None
        };
        let flags = evaluate_scenarios(
            &ScenarioInput {
                stats,
                breakdown: &breakdown,
                region_count: regions.len(),
                extractor_count: masks.len(),
            },
            &cfg.scenarios,
        );

        timings.total_ms = elapsed_ms(total_start);
        info!(
            "detect: {} regions coverage={:.2}% confidence={:.3} flags={:?} in {:.1} ms",
            regions.len(),
            coverage_percentage,
            confidence,
            flags,
            timings.total_ms
        );

        let trace = PipelineTrace {
            input: InputDescriptor {
                width,
                height,
                work_width: work.width(),
                work_height: work.height(),
                method,
                target: cfg.target,
                mode,
            },
            timings,
            extractors: extractor_stages,
            fusion: Some(FusionStage {
                weights: fused.weights.clone(),
                threshold: fused.threshold,
                raised_for_low_contrast: fused.raised_for_low_contrast,
                coverage: fused.mask.fraction(),
            }),
            regions: Some(RegionStage {
                candidates: region_stats.candidates,
                accepted: region_stats.accepted,
                rejected: region_stats.rejected,
                watershed_splits: region_stats.watershed_splits,
            }),
        };
        let result = DetectionResult {
            method,
            target: cfg.target,
            mode,
            width,
            height,
            regions,
            coverage_percentage,
            total_area,
            confidence,
            confidence_level: ConfidenceLevel::from_score(confidence),
            breakdown,
            density,
            flags,
            mask: final_mask.resize_nearest(width, height),
        };
        Ok(DetectionReport { result, trace })
    }
}

#[cfg(feature = "parallel")]
fn run_extractors(
    kinds: &[ExtractorKind],
    image: &Image,
    config: &MethodConfig,
    ctx: &ExtractContext,
) -> Vec<(FeatureMask, f64)> {
    use rayon::prelude::*;

    kinds
        .par_iter()
        .map(|&kind| timed_extract(kind, image, config, ctx))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn run_extractors(
    kinds: &[ExtractorKind],
    image: &Image,
    config: &MethodConfig,
    ctx: &ExtractContext,
) -> Vec<(FeatureMask, f64)> {
    kinds
        .iter()
        .map(|&kind| timed_extract(kind, image, config, ctx))
        .collect()
}

fn timed_extract(
    kind: ExtractorKind,
    image: &Image,
    config: &MethodConfig,
    ctx: &ExtractContext,
) -> (FeatureMask, f64) {
    let start = Instant::now();
    let mask = kind.extract(image, config, ctx);
    let ms = elapsed_ms(start);
    debug!("extract: {} coverage={:.3} in {:.2} ms", kind, mask.coverage(), ms);
    (mask, ms)
}

/// Validate `config` and run one detection.
pub fn detect(
    image: &Image,
    method: Method,
    config: &MethodConfig,
    mode: QualityMode,
) -> Result<DetectionResult, DetectionError> {
    SurfaceDetector::new(config.clone())?.detect(image, method, mode)
}

/// Validate `config` once and run it over `images`; results keep input order.
pub fn detect_batch(
    images: &[Image],
    method: Method,
    config: &MethodConfig,
    mode: QualityMode,
) -> Result<Vec<Result<DetectionResult, DetectionError>>, ValidationError> {
    Ok(SurfaceDetector::new(config.clone())?.detect_batch(images, method, mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::ModeParams;

    fn gray(w: usize, h: usize, f: impl Fn(usize, usize) -> u8) -> Image {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(f(x, y));
            }
        }
        Image::from_gray(w, h, data).expect("image")
    }

    #[test]
    fn realtime_combined_skips_texture_only_when_fused() {
        let det = SurfaceDetector::new(MethodConfig::pothole()).expect("config");
        let rt = ModeProfile::resolve(QualityMode::RealTime, &ModeParams::default());
        assert_eq!(
            det.plan(Method::Combined, &rt),
            vec![ExtractorKind::Contour, ExtractorKind::Shadow]
        );
        assert_eq!(det.plan(Method::Texture, &rt), vec![ExtractorKind::Texture]);
        let pr = ModeProfile::resolve(QualityMode::Precision, &ModeParams::default());
        assert_eq!(det.plan(Method::Combined, &pr).len(), 3);
    }

    #[test]
    fn rejects_images_below_minimum() {
        let img = gray(31, 64, |_, _| 0);
        let err = detect(&img, Method::Contour, &MethodConfig::pothole(), QualityMode::Precision)
            .unwrap_err();
        assert!(matches!(
            err,
            DetectionError::Validation(ValidationError::TooSmall { width: 31, .. })
        ));
    }

    #[test]
    fn invalid_config_is_a_validation_error() {
        let mut cfg = MethodConfig::pothole();
        cfg.fusion.threshold = 2.0;
        let img = gray(64, 64, |_, _| 128);
        assert!(matches!(
            detect(&img, Method::Shadow, &cfg, QualityMode::Precision),
            Err(DetectionError::Validation(ValidationError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn realtime_reports_full_resolution_frame() {
        let img = gray(128, 96, |x, y| {
            let (dx, dy) = (x as f64 - 64.0, y as f64 - 48.0);
            if dx * dx + dy * dy <= 30.0 * 30.0 {
                30
            } else {
                210
            }
        });
        let det = SurfaceDetector::new(MethodConfig::pothole()).expect("config");
        let report = det
            .detect_with_diagnostics(&img, Method::Contour, QualityMode::RealTime)
            .expect("detect");
        assert_eq!((report.trace.input.work_width, report.trace.input.work_height), (64, 48));
        assert_eq!((report.result.mask.w, report.result.mask.h), (128, 96));
        assert!(report.trace.timings.stage_ms("resize").is_some());
        for r in &report.result.regions {
            assert!(r.bbox.right() as usize <= 128 && r.bbox.bottom() as usize <= 96);
        }
    }

    #[test]
    fn batch_keeps_input_order() {
        let images = vec![gray(64, 64, |_, _| 0), gray(16, 16, |_, _| 0)];
        let out = detect_batch(&images, Method::Shadow, &MethodConfig::pothole(), QualityMode::Precision)
            .expect("config");
        assert_eq!(out.len(), 2);
        assert!(out[0].is_ok());
        assert!(out[1].is_err());
    }
}
