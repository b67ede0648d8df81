//! Rescaling helpers used by the real-time quality mode.
use super::{ChannelLayout, Image};
use crate::error::ValidationError;
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};

impl Image {
    /// Return a copy rescaled by `scale` (triangle filter), keeping the layout.
    ///
    /// The output is at least 1×1. A scale of `1.0` returns a clone.
    pub fn resized(&self, scale: f32) -> Result<Image, ValidationError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ValidationError::InvalidConfig(format!(
                "resize scale must be positive, got {scale}"
            )));
        }
        if (scale - 1.0).abs() < f32::EPSILON {
            return Ok(self.clone());
        }
        let new_w = ((self.width() as f32 * scale).round() as u32).max(1);
        let new_h = ((self.height() as f32 * scale).round() as u32).max(1);
        let (w, h) = (self.width() as u32, self.height() as u32);
        let data = self.data().to_vec();
        let resized = match self.layout() {
            ChannelLayout::Rgb => {
                let buf = RgbImage::from_raw(w, h, data).ok_or(ValidationError::BufferSize {
                    expected: self.pixel_count() * 3,
                    actual: self.data().len(),
                })?;
                imageops::resize(&buf, new_w, new_h, FilterType::Triangle).into_raw()
            }
            ChannelLayout::Gray => {
                let buf = GrayImage::from_raw(w, h, data).ok_or(ValidationError::BufferSize {
                    expected: self.pixel_count(),
                    actual: self.data().len(),
                })?;
                imageops::resize(&buf, new_w, new_h, FilterType::Triangle).into_raw()
            }
        };
        Image::new(new_w as usize, new_h as usize, self.layout(), resized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_scale_keeps_uniform_colour() {
        let img = Image::from_rgb(40, 30, [10u8, 120, 200].repeat(40 * 30)).unwrap();
        let small = img.resized(0.5).unwrap();
        assert_eq!((small.width(), small.height()), (20, 15));
        assert_eq!(small.rgb(7, 7), [10, 120, 200]);
    }

    #[test]
    fn rejects_non_positive_scale() {
        let img = Image::from_gray(4, 4, vec![0; 16]).unwrap();
        assert!(img.resized(0.0).is_err());
    }
}
