//! Mask fusion: weighted sum of min-max normalised feature masks, adaptive
//! binarisation and a morphological clean-up pass.
//!
//! Weights come from [`FusionParams::weights`] and are renormalised over the
//! masks actually supplied, so a single-method call fuses to its own mask.
//! When every supplied mask has zero configured weight the masks are averaged
//! with equal weights.
use crate::detector::{FusionParams, ModeProfile};
use crate::error::DetectionError;
use crate::extractors::{ExtractorKind, FeatureMask};
use crate::image::{BinaryMask, ImageF32};
use crate::morphology::{close, open, StructuringElement};
use log::debug;

/// Output of [`MaskFuser::fuse`].
#[derive(Clone, Debug)]
pub struct FusedMask {
    /// Fused field in `[0, 1]`.
    pub field: ImageF32,
    /// Binarised and refined mask.
    pub mask: BinaryMask,
    /// Cut applied to `field` (strictly greater is foreground).
    pub threshold: f32,
    pub raised_for_low_contrast: bool,
    /// Effective weights after renormalisation, in input order.
    pub weights: Vec<(ExtractorKind, f32)>,
}

pub struct MaskFuser<'a> {
    params: &'a FusionParams,
    closing_only: bool,
}

impl<'a> MaskFuser<'a> {
    pub fn new(params: &'a FusionParams, profile: &ModeProfile) -> Self {
        Self {
            params,
            closing_only: profile.closing_only,
        }
    }

    /// Cut for an image whose gray contrast is `contrast` (σ/255).
    pub fn threshold_for(&self, contrast: f32) -> (f32, bool) {
        let p = self.params;
        if contrast < p.low_contrast {
            ((p.threshold + p.low_contrast_boost).min(p.max_threshold), true)
        } else {
            (p.threshold, false)
        }
    }

    /// Effective per-mask weights summing to one.
    pub fn weights_for(&self, kinds: &[ExtractorKind]) -> Vec<(ExtractorKind, f32)> {
        let raw: Vec<f32> = kinds.iter().map(|&k| self.params.weights.get(k)).collect();
        let total: f32 = raw.iter().sum();
        if total > f32::EPSILON {
            kinds.iter().zip(raw).map(|(&k, w)| (k, w / total)).collect()
        } else {
            let equal = 1.0 / kinds.len().max(1) as f32;
            kinds.iter().map(|&k| (k, equal)).collect()
        }
    }

    pub fn fuse(&self, masks: &[FeatureMask], contrast: f32) -> Result<FusedMask, DetectionError> {
        let first = masks
            .first()
            .ok_or_else(|| DetectionError::internal("fusion", "no feature masks to fuse"))?;
        let (w, h) = (first.field.w, first.field.h);
        if let Some(bad) = masks.iter().find(|m| (m.field.w, m.field.h) != (w, h)) {
            return Err(DetectionError::internal(
                "fusion",
                format!(
                    "{} mask is {}x{}, expected {w}x{h}",
                    bad.kind, bad.field.w, bad.field.h
                ),
            ));
        }

        let kinds: Vec<ExtractorKind> = masks.iter().map(|m| m.kind).collect();
        let weights = self.weights_for(&kinds);
        let mut field = ImageF32::new(w, h);
        for (mask, &(_, weight)) in masks.iter().zip(&weights) {
            if weight <= 0.0 {
                continue;
            }
            let normalized = min_max_normalize(&mask.field);
            for (acc, v) in field.data.iter_mut().zip(&normalized.data) {
                *acc += weight * v;
            }
        }
        field.clamp_in_place(0.0, 1.0);

        let (threshold, raised) = self.threshold_for(contrast);
        let binary = BinaryMask::from_field_above(&field, threshold);
        let se = StructuringElement::ellipse(self.params.refine_kernel);
        let mask = if self.closing_only {
            close(&binary, &se)
        } else {
            open(&close(&binary, &se), &se)
        };
        debug!(
            "fusion: {} masks, cut={:.2}{} binary={:.3} refined={:.3}",
            masks.len(),
            threshold,
            if raised { " (raised)" } else { "" },
            binary.fraction(),
            mask.fraction()
        );
        Ok(FusedMask {
            field,
            mask,
            threshold,
            raised_for_low_contrast: raised,
            weights,
        })
    }
}

/// Rescale to `[0, 1]`; a constant field is only clamped.
pub fn min_max_normalize(field: &ImageF32) -> ImageF32 {
    let mut out = field.clone();
    match field.min_max() {
        Some((lo, hi)) if hi - lo > 1e-6 => {
            let inv = 1.0 / (hi - lo);
            for v in out.data.iter_mut() {
                *v = (*v - lo) * inv;
            }
        }
        _ => {}
    }
    out.clamp_in_place(0.0, 1.0);
    out
}
