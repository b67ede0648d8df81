//! Closed-contour geometry extractor.
//!
//! CLAHE-normalised luma, optional 5-tap Gaussian, Canny, elliptical closing
//! to bridge broken edges, then every region enclosed by an edge loop is
//! filled. Filled components are measured and only those passing the
//! configured shape bounds enter the mask; their descriptors travel with it.
use super::{DegenerateInput, ExtractContext, ExtractorKind, FeatureExtractor, FeatureMask};
use crate::detector::ContourParams;
use crate::edges::canny;
use crate::filters::{clahe, gaussian_blur};
use crate::geometry::{label_components, ShapeDescriptor};
use crate::image::{BinaryMask, Image, ImageF32, ImageU8};
use crate::morphology::{close, fill_holes, StructuringElement};
use log::debug;

pub struct ContourGeometryExtractor<'a> {
    params: &'a ContourParams,
}

impl<'a> ContourGeometryExtractor<'a> {
    pub fn new(params: &'a ContourParams) -> Self {
        Self { params }
    }

    /// Closed edge loops with their interiors filled.
    pub fn closed_regions(&self, image: &Image) -> BinaryMask {
        let p = self.params;
        let gray = image.gray_u8();
        let equalised = clahe(&gray, p.clahe_clip_limit, p.clahe_tiles);
        let plane = ImageU8::packed(gray.w, gray.h, &equalised);
        let mut l = ImageF32::from_fn(plane.w, plane.h, |x, y| plane.get(x, y) as f32);
        if p.blur {
            l = gaussian_blur(&l);
        }
        let edges = canny(&l, p.canny_low, p.canny_high).edges;
        let closed = close(&edges, &StructuringElement::ellipse(p.closing_kernel));
        fill_holes(&closed)
    }
}

impl FeatureExtractor for ContourGeometryExtractor<'_> {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Contour
    }

    fn extract(&self, image: &Image, ctx: &ExtractContext) -> Result<FeatureMask, DegenerateInput> {
        let filled = self.closed_regions(image);
        if filled.is_all_background() {
            return Err(DegenerateInput("no closed edge loops"));
        }

        let labeling = label_components(&filled);
        let mut mask = BinaryMask::new(filled.w, filled.h);
        let mut shapes = Vec::new();
        for comp in &labeling.components {
            let Some(shape) = ShapeDescriptor::measure(&labeling, comp) else {
                continue;
            };
            if !ctx.bounds.accepts(shape.area * ctx.area_scale, &shape) {
                continue;
            }
            for (x, y) in labeling.pixels(comp) {
                mask.set(x, y, true);
            }
            shapes.push(shape);
        }
        debug!(
            "contour: components={} kept={}",
            labeling.components.len(),
            shapes.len()
        );
        let mut out = FeatureMask::new(ExtractorKind::Contour, mask.to_field());
        out.shapes = shapes;
        Ok(out)
    }
}
