//! Region extraction: label the fused binary mask, measure each component,
//! keep the ones inside the configured bounds and emit typed [`Region`]s.
//!
//! Components are visited in scan order and accepted regions keep that order.
//! Rejection is ordinary filtering and is only counted, never reported.
use crate::detector::{DetectionTarget, ModeProfile, RegionParams};
use crate::geometry::{label_components, split_touching, Component, Labeling, ShapeDescriptor};
use crate::image::{BinaryMask, ImageF32};
use crate::scoring::RegionScorer;
use crate::types::{BoundingBox, Region};
use log::debug;
use nalgebra::Point2;

/// Acceptance predicate for candidate components. All bounds are inclusive.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionBounds {
    pub min_area: f64,
    pub max_area: f64,
    pub circularity: Option<(f64, f64)>,
    pub min_convexity: Option<f64>,
    pub aspect_ratio: Option<(f64, f64)>,
}

impl RegionBounds {
    /// Strict shape bounds for potholes; only a minimum area for coverage.
    pub fn for_target(target: DetectionTarget, params: &RegionParams) -> Self {
        match target {
            DetectionTarget::Pothole => Self {
                min_area: params.min_area,
                max_area: params.max_area,
                circularity: Some((params.min_circularity, params.max_circularity)),
                min_convexity: Some(params.min_convexity),
                aspect_ratio: Some((params.min_aspect_ratio, params.max_aspect_ratio)),
            },
            DetectionTarget::Vegetation => Self {
                min_area: params.coverage_min_area,
                max_area: f64::INFINITY,
                circularity: None,
                min_convexity: None,
                aspect_ratio: None,
            },
        }
    }

    /// `area` is in full-resolution pixels; the shape ratios are scale-free.
    pub fn accepts(&self, area: f64, shape: &ShapeDescriptor) -> bool {
        let within = |v: f64, (lo, hi): (f64, f64)| v >= lo && v <= hi;
        within(area, (self.min_area, self.max_area))
            && self.circularity.map_or(true, |b| within(shape.circularity, b))
            && self.min_convexity.map_or(true, |m| shape.convexity >= m)
            && self.aspect_ratio.map_or(true, |b| within(shape.aspect_ratio, b))
    }
}

/// How working-resolution measurements map back to the input frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMapping {
    pub full_width: usize,
    pub full_height: usize,
    pub sx: f64,
    pub sy: f64,
}

impl FrameMapping {
    pub fn identity(width: usize, height: usize) -> Self {
        Self {
            full_width: width,
            full_height: height,
            sx: 1.0,
            sy: 1.0,
        }
    }

    pub fn area_scale(&self) -> f64 {
        self.sx * self.sy
    }

    fn point(&self, p: Point2<f64>) -> Point2<f64> {
        Point2::new((p.x + 0.5) * self.sx - 0.5, (p.y + 0.5) * self.sy - 0.5)
    }
}

/// Counters reported by one extraction pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionStats {
    pub candidates: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub watershed_splits: usize,
}

pub struct RegionExtractor<'a> {
    params: &'a RegionParams,
    bounds: &'a RegionBounds,
    profile: ModeProfile,
}

impl<'a> RegionExtractor<'a> {
    pub fn new(params: &'a RegionParams, bounds: &'a RegionBounds, profile: ModeProfile) -> Self {
        Self {
            params,
            bounds,
            profile,
        }
    }

    /// Extract accepted regions from `mask` (working resolution) with
    /// intensities sampled from `gray` (same resolution).
    ///
    /// Returns the regions, the mask after optional watershed splitting and
    /// the pass counters.
    pub fn extract(
        &self,
        mask: &BinaryMask,
        gray: &ImageF32,
        mapping: FrameMapping,
        scorer: &RegionScorer<'_>,
    ) -> (Vec<Region>, BinaryMask, RegionStats) {
        let mut stats = RegionStats::default();
        let mut working = mask.clone();
        let mut labeling = label_components(&working);

        if self.profile.watershed {
            stats.watershed_splits = self.split_non_convex(&mut working, &labeling);
            if stats.watershed_splits > 0 {
                labeling = label_components(&working);
            }
        }

        let fallback_bg = gray.mean() as f64;
        let mut regions = Vec::new();
        for comp in &labeling.components {
            stats.candidates += 1;
            let Some(shape) = ShapeDescriptor::measure(&labeling, comp) else {
                stats.rejected += 1;
                continue;
            };
            let area = shape.area * mapping.area_scale();
            if !self.bounds.accepts(area, &shape) {
                stats.rejected += 1;
                continue;
            }

            let mean_intensity = mean_inside(&labeling, comp, gray);
            let background_intensity = self
                .background_mean(&working, comp.bbox, gray)
                .unwrap_or(fallback_bg);
            let contrast = (background_intensity - mean_intensity) / 255.0;
            let confidence = scorer.score(&shape, area, mean_intensity, contrast);

            regions.push(Region {
                bbox: comp
                    .bbox
                    .scaled(mapping.sx, mapping.sy, mapping.full_width, mapping.full_height),
                area,
                perimeter: shape.perimeter * 0.5 * (mapping.sx + mapping.sy),
                circularity: shape.circularity,
                convexity: shape.convexity,
                aspect_ratio: shape.aspect_ratio,
                centroid: mapping.point(shape.centroid),
                orientation_deg: shape.orientation_deg,
                elongation: shape.elongation,
                mean_intensity,
                background_intensity,
                contrast,
                confidence,
            });
        }
        stats.accepted = regions.len();
        debug!(
            "regions: candidates={} accepted={} rejected={} splits={}",
            stats.candidates, stats.accepted, stats.rejected, stats.watershed_splits
        );
        (regions, working, stats)
    }

    /// Watershed-split components whose convexity is below the configured
    /// cut. Returns the number of components that were split.
    fn split_non_convex(&self, mask: &mut BinaryMask, labeling: &Labeling) -> usize {
        let mut splits = 0;
        for comp in &labeling.components {
            let Some(shape) = ShapeDescriptor::measure(labeling, comp) else {
                continue;
            };
            if shape.convexity >= self.params.watershed_convexity {
                continue;
            }
            let b = comp.bbox;
            let (x0, y0) = (b.x as usize, b.y as usize);
            let (pw, ph) = (b.width as usize + 2, b.height as usize + 2);
            let local = BinaryMask::from_fn(pw, ph, |x, y| {
                let (gx, gy) = (x as i64 + x0 as i64 - 1, y as i64 + y0 as i64 - 1);
                labeling.label_at_signed(gx, gy) == comp.label
            });
            let Some(split) = split_touching(&local, self.params.marker_ratio) else {
                continue;
            };
            for y in 1..ph - 1 {
                for x in 1..pw - 1 {
                    if local.get(x, y) && !split.get(x, y) {
                        mask.set(x + x0 - 1, y + y0 - 1, false);
                    }
                }
            }
            splits += 1;
        }
        splits
    }

    /// Mean gray level of non-foreground pixels in the bbox grown by the
    /// background margin.
    fn background_mean(&self, mask: &BinaryMask, bbox: BoundingBox, gray: &ImageF32) -> Option<f64> {
        let ring = bbox.expanded(self.params.background_margin, mask.w, mask.h);
        let mut sum = 0.0f64;
        let mut n = 0usize;
        for y in ring.y as usize..ring.bottom() as usize {
            for x in ring.x as usize..ring.right() as usize {
                if !mask.get(x, y) {
                    sum += gray.get(x, y) as f64;
                    n += 1;
                }
            }
        }
        (n > 0).then(|| sum / n as f64)
    }
}

fn mean_inside(labeling: &Labeling, comp: &Component, gray: &ImageF32) -> f64 {
    let sum: f64 = labeling
        .pixels(comp)
        .map(|(x, y)| gray.get(x, y) as f64)
        .sum();
    sum / comp.area.max(1) as f64
}
