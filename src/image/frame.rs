//! Immutable decoded input image with lazily computed global statistics.
//!
//! An [`Image`] is created once per request and never mutated. Derived data
//! (grayscale planes, brightness/contrast/sharpness, per-channel histograms)
//! is computed on first access and cached in `OnceLock`s, so a shared
//! reference can be handed to several extractors running on different
//! threads.
use super::{ImageF32, ImageU8};
use crate::error::ValidationError;
use crate::filters::laplacian_variance;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Pixel layout of the raw buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    /// One byte per pixel.
    Gray,
    /// Three interleaved bytes per pixel in R, G, B order.
    Rgb,
}

impl ChannelLayout {
    pub fn channels(self) -> usize {
        match self {
            ChannelLayout::Gray => 1,
            ChannelLayout::Rgb => 3,
        }
    }
}

/// Global statistics of an image, all derived from the luma plane unless noted.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStats {
    /// Mean luma normalised to `[0, 1]`.
    pub mean_brightness: f32,
    /// Luma standard deviation in 8-bit units.
    pub std_dev: f32,
    /// `std_dev / 255`.
    pub contrast: f32,
    /// Variance of the 4-neighbour Laplacian response (focus proxy).
    pub sharpness: f32,
    /// 256-bin histogram per raw channel.
    #[serde(skip)]
    pub histograms: Vec<Vec<u32>>,
}

#[derive(Clone, Debug)]
pub struct Image {
    width: usize,
    height: usize,
    layout: ChannelLayout,
    data: Vec<u8>,
    gray: OnceLock<ImageF32>,
    gray_u8: OnceLock<Vec<u8>>,
    stats: OnceLock<ImageStats>,
}

impl Image {
    /// Wrap a raw interleaved buffer, checking that its length matches the layout.
    pub fn new(
        width: usize,
        height: usize,
        layout: ChannelLayout,
        data: Vec<u8>,
    ) -> Result<Self, ValidationError> {
        if width == 0 || height == 0 {
            return Err(ValidationError::EmptyImage);
        }
        let expected = width * height * layout.channels();
        if data.len() != expected {
            return Err(ValidationError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
            gray: OnceLock::new(),
            gray_u8: OnceLock::new(),
            stats: OnceLock::new(),
        })
    }

    pub fn from_rgb(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ValidationError> {
        Self::new(width, height, ChannelLayout::Rgb, data)
    }

    pub fn from_gray(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ValidationError> {
        Self::new(width, height, ChannelLayout::Gray, data)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Raw interleaved bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// RGB triple at (x, y); gray images replicate the single channel.
    #[inline]
    pub fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        let i = y * self.width + x;
        match self.layout {
            ChannelLayout::Gray => {
                let v = self.data[i];
                [v, v, v]
            }
            ChannelLayout::Rgb => [self.data[3 * i], self.data[3 * i + 1], self.data[3 * i + 2]],
        }
    }

    /// Luma plane in 8-bit units (`0.299 R + 0.587 G + 0.114 B`).
    pub fn gray(&self) -> &ImageF32 {
        self.gray.get_or_init(|| match self.layout {
            ChannelLayout::Gray => ImageF32 {
                w: self.width,
                h: self.height,
                stride: self.width,
                data: self.data.iter().map(|&v| v as f32).collect(),
            },
            ChannelLayout::Rgb => ImageF32 {
                w: self.width,
                h: self.height,
                stride: self.width,
                data: self
                    .data
                    .chunks_exact(3)
                    .map(|px| 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32)
                    .collect(),
            },
        })
    }

    /// Rounded 8-bit luma view.
    pub fn gray_u8(&self) -> ImageU8<'_> {
        let data = self.gray_u8.get_or_init(|| {
            self.gray()
                .data
                .iter()
                .map(|&v| v.round().clamp(0.0, 255.0) as u8)
                .collect()
        });
        ImageU8::packed(self.width, self.height, data)
    }

    /// Global statistics, computed on first use.
    pub fn stats(&self) -> &ImageStats {
        self.stats.get_or_init(|| self.compute_stats())
    }

    fn compute_stats(&self) -> ImageStats {
        let gray = self.gray();
        let mean = gray.mean();
        let std_dev = gray.variance().sqrt();
        let channels = self.layout.channels();
        let mut histograms = vec![vec![0u32; 256]; channels];
        for px in self.data.chunks_exact(channels) {
            for (c, &v) in px.iter().enumerate() {
                histograms[c][v as usize] += 1;
            }
        }
        ImageStats {
            mean_brightness: mean / 255.0,
            std_dev,
            contrast: std_dev / 255.0,
            sharpness: laplacian_variance(gray),
            histograms,
        }
    }
}
