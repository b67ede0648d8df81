//! Image quality sub-score from global statistics.
//!
//! `0.4·brightness + 0.3·contrast + 0.3·sharpness` where brightness peaks at
//! mid-gray (`1 − 2|b − 0.5|`), contrast is `σ/128` and sharpness is the
//! Laplacian variance over 500, each capped at 1.
use crate::image::ImageStats;

pub fn image_quality(stats: &ImageStats) -> f64 {
    let b = stats.mean_brightness as f64;
    let brightness = (1.0 - 2.0 * (b - 0.5).abs()).clamp(0.0, 1.0);
    let contrast = (stats.std_dev as f64 / 128.0).min(1.0);
    let sharpness = (stats.sharpness as f64 / 500.0).min(1.0);
    (0.4 * brightness + 0.3 * contrast + 0.3 * sharpness).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(mean_brightness: f32, std_dev: f32, sharpness: f32) -> ImageStats {
        ImageStats {
            mean_brightness,
            std_dev,
            contrast: std_dev / 255.0,
            sharpness,
            histograms: Vec::new(),
        }
    }

    #[test]
    fn black_frame_has_zero_quality() {
        assert_eq!(image_quality(&stats(0.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn well_exposed_sharp_frame_saturates() {
        assert!((image_quality(&stats(0.5, 200.0, 900.0)) - 1.0).abs() < 1e-9);
        let mid = image_quality(&stats(0.75, 64.0, 250.0));
        assert!((mid - (0.4 * 0.5 + 0.3 * 0.5 + 0.3 * 0.5)).abs() < 1e-6);
    }
}
