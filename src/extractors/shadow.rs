//! Shadow/depth extractor: dark pixels OR strong Sobel response, closed with
//! an elliptical element to join fragmented shadow rims.
use super::{DegenerateInput, ExtractContext, ExtractorKind, FeatureExtractor, FeatureMask};
use crate::detector::ShadowParams;
use crate::edges::sobel_gradients;
use crate::image::{BinaryMask, Image};
use crate::morphology::{close, StructuringElement};
use log::debug;

pub struct ShadowDepthExtractor<'a> {
    params: &'a ShadowParams,
}

impl<'a> ShadowDepthExtractor<'a> {
    pub fn new(params: &'a ShadowParams) -> Self {
        Self { params }
    }
}

impl FeatureExtractor for ShadowDepthExtractor<'_> {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Shadow
    }

    fn extract(&self, image: &Image, _ctx: &ExtractContext) -> Result<FeatureMask, DegenerateInput> {
        let p = self.params;
        let gray = image.gray();
        let grad = sobel_gradients(gray);
        let dark = BinaryMask::from_fn(gray.w, gray.h, |x, y| gray.get(x, y) < p.dark_threshold);
        let rims = BinaryMask::from_fn(gray.w, gray.h, |x, y| {
            grad.mag.get(x, y) > p.gradient_threshold
        });
        let joined = close(&dark.union(&rims), &StructuringElement::ellipse(p.closing_kernel));
        debug!(
            "shadow: dark={} rims={} joined={}",
            dark.count(),
            rims.count(),
            joined.count()
        );
        Ok(FeatureMask::new(ExtractorKind::Shadow, joined.to_field()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{DetectionTarget, ModeParams, ModeProfile, QualityMode, RegionParams};
    use crate::regions::RegionBounds;

    fn ctx() -> ExtractContext {
        ExtractContext {
            profile: ModeProfile::resolve(QualityMode::Precision, &ModeParams::default()),
            area_scale: 1.0,
            bounds: RegionBounds::for_target(DetectionTarget::Pothole, &RegionParams::default()),
        }
    }

    #[test]
    fn black_image_is_all_shadow() {
        let params = ShadowParams::default();
        let image = Image::from_gray(64, 64, vec![0; 64 * 64]).expect("valid image");
        let mask = ShadowDepthExtractor::new(&params)
            .extract(&image, &ctx())
            .expect("mask");
        assert!(mask.field.data.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn bright_flat_image_has_no_shadow() {
        let params = ShadowParams::default();
        let image = Image::from_gray(64, 64, vec![200; 64 * 64]).expect("valid image");
        let mask = ShadowDepthExtractor::new(&params)
            .extract(&image, &ctx())
            .expect("mask");
        assert_eq!(mask.binarize().count(), 0);
    }

    #[test]
    fn dark_blob_and_its_rim_are_marked() {
        let data = (0..64 * 64)
            .map(|i| {
                let (x, y) = ((i % 64) as i32, (i / 64) as i32);
                if (x - 32).pow(2) + (y - 32).pow(2) <= 100 {
                    30
                } else {
                    180
                }
            })
            .collect();
        let image = Image::from_gray(64, 64, data).expect("valid image");
        let params = ShadowParams::default();
        let mask = ShadowDepthExtractor::new(&params)
            .extract(&image, &ctx())
            .expect("mask");
        assert_eq!(mask.field.get(32, 32), 1.0);
        // rim pixel just outside the disk
        assert_eq!(mask.field.get(43, 32), 1.0);
        assert_eq!(mask.field.get(2, 2), 0.0);
    }
}
