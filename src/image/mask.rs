//! Binary raster used for thresholded feature maps and region masks.
//!
//! Pixels are stored as `0`/`1` bytes in row-major order (`stride == w`).
use super::ImageF32;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    pub w: usize,
    pub h: usize,
    pub data: Vec<u8>,
}

impl BinaryMask {
    /// All-background mask.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0; w * h],
        }
    }

    /// All-foreground mask.
    pub fn full(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![1; w * h],
        }
    }

    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(f(x, y) as u8);
            }
        }
        Self { w, h, data }
    }

    /// Threshold a scalar field: foreground where `value > cut`.
    pub fn from_field_above(field: &ImageF32, cut: f32) -> Self {
        Self {
            w: field.w,
            h: field.h,
            data: field.data.iter().map(|&v| (v > cut) as u8).collect(),
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[self.idx(x, y)] != 0
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        let i = self.idx(x, y);
        self.data[i] = on as u8;
    }

    /// Number of foreground pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Foreground fraction in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        if self.data.is_empty() {
            0.0
        } else {
            self.count() as f32 / self.data.len() as f32
        }
    }

    pub fn is_all_background(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }

    /// Pixel-wise OR.
    pub fn union(&self, other: &BinaryMask) -> BinaryMask {
        debug_assert_eq!((self.w, self.h), (other.w, other.h));
        BinaryMask {
            w: self.w,
            h: self.h,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| ((a | b) != 0) as u8)
                .collect(),
        }
    }

    /// Intersection-over-union with another mask of the same size.
    ///
    /// Returns `None` when both masks are empty.
    pub fn iou(&self, other: &BinaryMask) -> Option<f32> {
        debug_assert_eq!((self.w, self.h), (other.w, other.h));
        let mut inter = 0usize;
        let mut union = 0usize;
        for (&a, &b) in self.data.iter().zip(&other.data) {
            let (a, b) = (a != 0, b != 0);
            inter += (a && b) as usize;
            union += (a || b) as usize;
        }
        (union > 0).then(|| inter as f32 / union as f32)
    }

    /// Convert to a `{0.0, 1.0}` field.
    pub fn to_field(&self) -> ImageF32 {
        ImageF32 {
            w: self.w,
            h: self.h,
            stride: self.w,
            data: self.data.iter().map(|&v| v as f32).collect(),
        }
    }

    /// Nearest-neighbour resample to `new_w × new_h`.
    pub fn resize_nearest(&self, new_w: usize, new_h: usize) -> BinaryMask {
        if (new_w, new_h) == (self.w, self.h) {
            return self.clone();
        }
        if self.w == 0 || self.h == 0 {
            return BinaryMask::new(new_w, new_h);
        }
        let sx = self.w as f32 / new_w.max(1) as f32;
        let sy = self.h as f32 / new_h.max(1) as f32;
        BinaryMask::from_fn(new_w, new_h, |x, y| {
            let src_x = (((x as f32 + 0.5) * sx) as usize).min(self.w - 1);
            let src_y = (((y as f32 + 0.5) * sy) as usize).min(self.h - 1);
            self.get(src_x, src_y)
        })
    }
}

impl crate::image::traits::ImageView for BinaryMask {
    type Pixel = u8;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.w
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }
}
