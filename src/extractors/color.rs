//! Colour-band coverage in HSV space.
//!
//! Pixels are matched against a small set of HSV bands (green, brown,
//! yellow-green, dark-green by default). Bands are recalibrated per image from
//! the V-channel brightness and spread, and low-contrast images get CLAHE on V
//! first. The binary match is cleaned with an opening and two closings, then
//! components smaller than an adaptive minimum area are dropped.
use super::{DegenerateInput, ExtractContext, ExtractorKind, FeatureExtractor, FeatureMask};
use crate::detector::{ColorBand, ColorParams};
use crate::filters::clahe;
use crate::geometry::label_components;
use crate::image::{BinaryMask, Image, ImageU8};
use crate::morphology::{close, open, StructuringElement};
use log::debug;

pub struct ColorCoverageExtractor<'a> {
    params: &'a ColorParams,
}

impl<'a> ColorCoverageExtractor<'a> {
    pub fn new(params: &'a ColorParams) -> Self {
        Self { params }
    }

    /// Bands adjusted to the measured V statistics (both in `[0, 1]`).
    pub fn calibrate(&self, brightness: f32, spread: f32) -> Vec<ColorBand> {
        let p = self.params;
        let mut bands = p.bands.clone();
        if !p.adaptive_ranges {
            return bands;
        }
        const MAX: [u8; 3] = [179, 255, 255];
        if brightness < p.dark_brightness {
            for band in &mut bands {
                for c in 0..3 {
                    band.lower[c] = band.lower[c].saturating_sub(p.dark_lower_shift[c]);
                    band.upper[c] = band.upper[c].saturating_add(p.dark_upper_shift[c]).min(MAX[c]);
                }
            }
        }
        if spread > p.high_contrast {
            for band in &mut bands {
                band.lower[1] = band.lower[1]
                    .saturating_sub(p.saturation_relax)
                    .max(p.saturation_floor);
            }
        }
        bands
    }

    /// Minimum component area (full-resolution units) given the initial
    /// coverage fraction of the cleaned mask.
    pub fn adaptive_min_area(&self, coverage: f32) -> f64 {
        let p = self.params;
        let base = (p.min_area / 2.0).floor();
        if !p.adaptive_min_area {
            return base;
        }
        if coverage < p.sparse_coverage {
            (base * p.sparse_area_factor).floor()
        } else if coverage > p.dense_coverage {
            (base * p.dense_area_factor).floor()
        } else {
            base
        }
    }
}

/// RGB to HSV with OpenCV's 8-bit convention (H halved into 0..=179).
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let v = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let diff = v - min;
    let s = if v > 0.0 { 255.0 * diff / v } else { 0.0 };
    let mut h = if diff == 0.0 {
        0.0
    } else if v == rf {
        60.0 * (gf - bf) / diff
    } else if v == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }
    [
        ((h / 2.0).round() as u32 % 180) as u8,
        s.round().clamp(0.0, 255.0) as u8,
        v as u8,
    ]
}

impl FeatureExtractor for ColorCoverageExtractor<'_> {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Color
    }

    fn extract(&self, image: &Image, ctx: &ExtractContext) -> Result<FeatureMask, DegenerateInput> {
        let p = self.params;
        let (w, h) = (image.width(), image.height());
        let mut hsv: Vec<[u8; 3]> = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                hsv.push(rgb_to_hsv(image.rgb(x, y)));
            }
        }

        let clahe_applied = image.stats().contrast < p.clahe_contrast;
        if clahe_applied {
            let v: Vec<u8> = hsv.iter().map(|px| px[2]).collect();
            let equalised = clahe(&ImageU8::packed(w, h, &v), p.clahe_clip_limit, p.clahe_tiles);
            for (px, v) in hsv.iter_mut().zip(equalised) {
                px[2] = v;
            }
        }

        let n = (w * h).max(1) as f64;
        let mean_v = hsv.iter().map(|px| px[2] as f64).sum::<f64>() / n;
        let var_v = hsv
            .iter()
            .map(|px| {
                let d = px[2] as f64 - mean_v;
                d * d
            })
            .sum::<f64>()
            / n;
        let bands = self.calibrate((mean_v / 255.0) as f32, (var_v.sqrt() / 255.0) as f32);

        let mut mask = BinaryMask {
            w,
            h,
            data: hsv
                .iter()
                .map(|&px| bands.iter().any(|b| b.contains(px)) as u8)
                .collect(),
        };
        mask = open(&mask, &StructuringElement::ellipse(p.open_kernel));
        for &k in &p.close_kernels {
            mask = close(&mask, &StructuringElement::ellipse(k));
        }

        let initial = mask.fraction();
        let min_area = self.adaptive_min_area(initial);
        let labeling = label_components(&mask);
        let mut removed = 0usize;
        for comp in &labeling.components {
            if (comp.area as f64) * ctx.area_scale < min_area {
                for (x, y) in labeling.pixels(comp) {
                    mask.set(x, y, false);
                }
                removed += 1;
            }
        }
        debug!(
            "color: clahe={} brightness={:.3} initial_coverage={:.3} min_area={} removed={}",
            clahe_applied,
            mean_v / 255.0,
            initial,
            min_area,
            removed
        );
        Ok(FeatureMask::new(ExtractorKind::Color, mask.to_field()))
    }
}
