//! Sliding-window mean and variance via summed-area tables.
//!
//! Windows are square with side `2·radius + 1` and are truncated at the image
//! border, so border pixels average over the in-bounds part only.
use crate::image::ImageF32;

/// Summed-area tables of values and squared values (f64 accumulation).
pub struct IntegralImage {
    w: usize,
    h: usize,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl IntegralImage {
    pub fn new(img: &ImageF32) -> Self {
        let (w, h) = (img.w, img.h);
        let stride = w + 1;
        let mut sum = vec![0.0f64; stride * (h + 1)];
        let mut sum_sq = vec![0.0f64; stride * (h + 1)];
        for y in 0..h {
            let mut row_sum = 0.0f64;
            let mut row_sq = 0.0f64;
            for x in 0..w {
                let v = img.get(x, y) as f64;
                row_sum += v;
                row_sq += v * v;
                let i = (y + 1) * stride + (x + 1);
                sum[i] = sum[i - stride] + row_sum;
                sum_sq[i] = sum_sq[i - stride] + row_sq;
            }
        }
        Self { w, h, sum, sum_sq }
    }

    /// Sum, squared sum and pixel count over `[x0, x1) × [y0, y1)`.
    fn rect(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> (f64, f64, f64) {
        let stride = self.w + 1;
        let a = y0 * stride + x0;
        let b = y0 * stride + x1;
        let c = y1 * stride + x0;
        let d = y1 * stride + x1;
        let s = self.sum[d] - self.sum[b] - self.sum[c] + self.sum[a];
        let sq = self.sum_sq[d] - self.sum_sq[b] - self.sum_sq[c] + self.sum_sq[a];
        (s, sq, ((x1 - x0) * (y1 - y0)) as f64)
    }

    /// Mean and population variance of the window centred at (x, y).
    pub fn window_stats(&self, x: usize, y: usize, radius: usize) -> (f32, f32) {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius + 1).min(self.w);
        let y1 = (y + radius + 1).min(self.h);
        let (s, sq, n) = self.rect(x0, y0, x1, y1);
        if n <= 0.0 {
            return (0.0, 0.0);
        }
        let mean = s / n;
        let var = (sq / n - mean * mean).max(0.0);
        (mean as f32, var as f32)
    }
}

/// Local mean over a `(2r+1)²` window.
pub fn box_mean(img: &ImageF32, radius: usize) -> ImageF32 {
    let integral = IntegralImage::new(img);
    ImageF32::from_fn(img.w, img.h, |x, y| integral.window_stats(x, y, radius).0)
}

/// Local population variance over a `(2r+1)²` window.
pub fn local_variance(img: &ImageF32, radius: usize) -> ImageF32 {
    let integral = IntegralImage::new(img);
    ImageF32::from_fn(img.w, img.h, |x, y| integral.window_stats(x, y, radius).1)
}
