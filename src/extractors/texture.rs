//! Texture-irregularity extractor.
//!
//! A pixel is flagged when the local variance over a square window reaches
//! `variance_threshold` and its gray level does not exceed
//! `darkness_threshold`. Flagged pixels carry `0.5 + 0.5·d` where `d` is the
//! local density of non-uniform LBP codes, so rough dark patches score higher
//! than smooth dark ones. The support is cleaned by closing then opening.
//!
//! In precision mode the variance is also taken over a window twice as wide
//! and the larger of the two responses is used.
use super::{DegenerateInput, ExtractContext, ExtractorKind, FeatureExtractor, FeatureMask};
use crate::detector::TextureParams;
use crate::filters::{box_mean, local_variance};
use crate::image::{BinaryMask, Image, ImageF32};
use crate::morphology::{close, open, StructuringElement};
use log::debug;

const MIN_VARIANCE: f32 = 1e-6;

pub struct TextureIrregularityExtractor<'a> {
    params: &'a TextureParams,
}

impl<'a> TextureIrregularityExtractor<'a> {
    pub fn new(params: &'a TextureParams) -> Self {
        Self { params }
    }

    /// `1.0` where the circular LBP code at the pixel is non-uniform
    /// (more than two 0/1 transitions), `0.0` elsewhere.
    pub fn non_uniform_lbp(&self, gray: &ImageF32) -> ImageF32 {
        let p = self.params.lbp_points.max(1);
        let r = self.params.lbp_radius;
        let offsets: Vec<(f32, f32)> = (0..p)
            .map(|i| {
                let theta = 2.0 * std::f32::consts::PI * i as f32 / p as f32;
                (r * theta.cos(), -r * theta.sin())
            })
            .collect();
        let mut bits = vec![false; p];
        ImageF32::from_fn(gray.w, gray.h, |x, y| {
            let centre = gray.get(x, y);
            for (bit, &(dx, dy)) in bits.iter_mut().zip(&offsets) {
                *bit = gray.sample_bilinear(x as f32 + dx, y as f32 + dy) >= centre;
            }
            let transitions = (0..p).filter(|&i| bits[i] != bits[(i + 1) % p]).count();
            if transitions > 2 {
                1.0
            } else {
                0.0
            }
        })
    }
}

impl FeatureExtractor for TextureIrregularityExtractor<'_> {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Texture
    }

    fn extract(&self, image: &Image, ctx: &ExtractContext) -> Result<FeatureMask, DegenerateInput> {
        let p = self.params;
        let gray = image.gray();
        let radius = p.window / 2;
        let mut variance = local_variance(gray, radius);
        if ctx.profile.multi_scale_texture {
            let wide = local_variance(gray, p.window);
            for (v, &w) in variance.data.iter_mut().zip(&wide.data) {
                *v = v.max(w);
            }
        }
        let peak = variance.min_max().map(|(_, hi)| hi).unwrap_or(0.0);
        if peak < MIN_VARIANCE {
            return Err(DegenerateInput("zero-variance texture field"));
        }

        let flagged = BinaryMask::from_fn(gray.w, gray.h, |x, y| {
            variance.get(x, y) >= p.variance_threshold && gray.get(x, y) <= p.darkness_threshold
        });
        let se = StructuringElement::ellipse(p.morphology_kernel);
        let support = open(&close(&flagged, &se), &se);

        let density = box_mean(&self.non_uniform_lbp(gray), radius);
        let field = ImageF32::from_fn(gray.w, gray.h, |x, y| {
            if support.get(x, y) {
                0.5 + 0.5 * density.get(x, y)
            } else {
                0.0
            }
        });
        debug!(
            "texture: peak_variance={:.1} flagged={} support={}",
            peak,
            flagged.count(),
            support.count()
        );
        Ok(FeatureMask::new(ExtractorKind::Texture, field))
    }
}
