//! Linear and histogram filters shared by the feature extractors.
//!
//! - Separable convolution with a 5-tap Gaussian (`[1, 4, 6, 4, 1] / 16`).
//! - Integral-image box statistics (local mean / variance).
//! - 4-neighbour Laplacian variance used as the sharpness proxy.
//! - CLAHE for local contrast normalisation of 8-bit planes.
//!
//! All operators clamp coordinates at the borders (replicate).

pub mod clahe;
pub mod local_stats;

pub use clahe::clahe;
pub use local_stats::{box_mean, local_variance, IntegralImage};

use crate::image::{ImageF32, ImageView, ImageViewMut};

/// Trait implemented by separable 1D filters.
pub trait SeparableFilter {
    /// Return the 1D taps (in left-to-right order). The kernel is assumed to be
    /// symmetric around its centre, but the implementation does not rely on it.
    fn taps(&self) -> &[f32];
}

/// Simple wrapper around a static filter kernel.
#[derive(Clone, Copy, Debug)]
pub struct StaticSeparableFilter {
    taps: &'static [f32],
}

impl StaticSeparableFilter {
    pub const fn new(taps: &'static [f32]) -> Self {
        Self { taps }
    }
}

impl SeparableFilter for StaticSeparableFilter {
    #[inline]
    fn taps(&self) -> &[f32] {
        self.taps
    }
}

/// Normalised 5-tap Gaussian filter `[1, 4, 6, 4, 1] / 16`.
pub const GAUSSIAN_5TAP: StaticSeparableFilter =
    StaticSeparableFilter::new(&[0.0625, 0.25, 0.375, 0.25, 0.0625]);

/// Convolve `src` with `filter` horizontally then vertically.
pub fn apply_separable(filter: &dyn SeparableFilter, src: &ImageF32) -> ImageF32 {
    let taps = filter.taps();
    let (w, h) = (src.w, src.h);
    if w == 0 || h == 0 || taps.is_empty() {
        return src.clone();
    }
    let half = (taps.len() / 2) as isize;

    let mut tmp = ImageF32::new(w, h);
    for y in 0..h {
        let row = src.row(y);
        let out = tmp.row_mut(y);
        for (x, dst) in out.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (k, &t) in taps.iter().enumerate() {
                let sx = (x as isize + k as isize - half).clamp(0, w as isize - 1) as usize;
                acc += t * row[sx];
            }
            *dst = acc;
        }
    }

    let mut out = ImageF32::new(w, h);
    for y in 0..h {
        for (k, &t) in taps.iter().enumerate() {
            let sy = (y as isize + k as isize - half).clamp(0, h as isize - 1) as usize;
            let src_row = tmp.row(sy);
            let dst_row = out.row_mut(y);
            for (d, &s) in dst_row.iter_mut().zip(src_row) {
                *d += t * s;
            }
        }
    }
    out
}

/// Gaussian smoothing with the 5-tap kernel.
pub fn gaussian_blur(src: &ImageF32) -> ImageF32 {
    apply_separable(&GAUSSIAN_5TAP, src)
}

/// 4-neighbour Laplacian response (`[0 1 0; 1 -4 1; 0 1 0]`).
pub fn laplacian(src: &ImageF32) -> ImageF32 {
    ImageF32::from_fn(src.w, src.h, |x, y| {
        let (xi, yi) = (x as isize, y as isize);
        src.get_clamped(xi - 1, yi)
            + src.get_clamped(xi + 1, yi)
            + src.get_clamped(xi, yi - 1)
            + src.get_clamped(xi, yi + 1)
            - 4.0 * src.get(x, y)
    })
}

/// Variance of the Laplacian response, the usual focus/sharpness proxy.
pub fn laplacian_variance(src: &ImageF32) -> f32 {
    if src.w == 0 || src.h == 0 {
        return 0.0;
    }
    laplacian(src).variance()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_preserves_constant_field() {
        let img = ImageF32::filled(9, 7, 42.0);
        let out = gaussian_blur(&img);
        assert!(out.data.iter().all(|&v| (v - 42.0).abs() < 1e-4));
    }

    #[test]
    fn gaussian_spreads_an_impulse_with_unit_mass() {
        let mut img = ImageF32::new(9, 9);
        img.set(4, 4, 1.0);
        let out = gaussian_blur(&img);
        let total: f32 = out.data.iter().sum();
        assert!((total - 1.0).abs() < 1e-5, "total={total}");
        assert!((out.get(4, 4) - 0.375 * 0.375).abs() < 1e-6);
    }

    #[test]
    fn laplacian_variance_is_zero_on_flat_and_positive_on_edges() {
        assert_eq!(laplacian_variance(&ImageF32::filled(8, 8, 10.0)), 0.0);
        let step = ImageF32::from_fn(8, 8, |x, _| if x < 4 { 0.0 } else { 255.0 });
        assert!(laplacian_variance(&step) > 100.0);
    }
}
