//! 8-connected component labelling.
//!
//! Labels are assigned in raster order of each component's first pixel,
//! starting at 1; 0 marks background.
use crate::image::BinaryMask;
use crate::types::BoundingBox;
use nalgebra::Point2;

/// Summary of one connected component.
#[derive(Clone, Debug)]
pub struct Component {
    pub label: u32,
    /// Pixel count.
    pub area: usize,
    pub bbox: BoundingBox,
    /// First pixel in raster order; its west neighbour is background.
    pub start: (usize, usize),
    /// Mean of pixel-centre coordinates.
    pub centroid: Point2<f64>,
}

/// Label image plus per-component summaries.
#[derive(Clone, Debug)]
pub struct Labeling {
    pub w: usize,
    pub h: usize,
    pub labels: Vec<u32>,
    pub components: Vec<Component>,
}

impl Labeling {
    #[inline]
    pub fn label_at(&self, x: usize, y: usize) -> u32 {
        self.labels[y * self.w + x]
    }

    /// Label at signed coordinates, 0 outside the image.
    #[inline]
    pub fn label_at_signed(&self, x: i64, y: i64) -> u32 {
        if x < 0 || y < 0 || x >= self.w as i64 || y >= self.h as i64 {
            0
        } else {
            self.label_at(x as usize, y as usize)
        }
    }

    /// Pixels of `component` in raster order.
    pub fn pixels<'a>(&'a self, component: &'a Component) -> impl Iterator<Item = (usize, usize)> + 'a {
        let b = component.bbox;
        let (x0, y0) = (b.x as usize, b.y as usize);
        let (x1, y1) = (x0 + b.width as usize, y0 + b.height as usize);
        (y0..y1)
            .flat_map(move |y| (x0..x1).map(move |x| (x, y)))
            .filter(move |&(x, y)| self.label_at(x, y) == component.label)
    }

    /// Binary mask holding only `component`.
    pub fn component_mask(&self, component: &Component) -> BinaryMask {
        let mut mask = BinaryMask::new(self.w, self.h);
        for (x, y) in self.pixels(component) {
            mask.set(x, y, true);
        }
        mask
    }
}

/// Label the 8-connected foreground components of `mask`.
pub fn label_components(mask: &BinaryMask) -> Labeling {
    let (w, h) = (mask.w, mask.h);
    let mut labels = vec![0u32; w * h];
    let mut components = Vec::new();
    let mut stack = Vec::new();

    for start in 0..w * h {
        if mask.data[start] == 0 || labels[start] != 0 {
            continue;
        }
        let label = components.len() as u32 + 1;
        labels[start] = label;
        stack.push(start);

        let (mut min_x, mut min_y) = (usize::MAX, usize::MAX);
        let (mut max_x, mut max_y) = (0usize, 0usize);
        let (mut sum_x, mut sum_y) = (0.0f64, 0.0f64);
        let mut area = 0usize;

        while let Some(i) = stack.pop() {
            let (x, y) = (i % w, i / w);
            area += 1;
            sum_x += x as f64;
            sum_y += y as f64;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
            for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                    let j = ny * w + nx;
                    if mask.data[j] != 0 && labels[j] == 0 {
                        labels[j] = label;
                        stack.push(j);
                    }
                }
            }
        }

        components.push(Component {
            label,
            area,
            bbox: BoundingBox {
                x: min_x as u32,
                y: min_y as u32,
                width: (max_x - min_x + 1) as u32,
                height: (max_y - min_y + 1) as u32,
            },
            start: (start % w, start / w),
            centroid: Point2::new(sum_x / area as f64, sum_y / area as f64),
        });
    }

    Labeling {
        w,
        h,
        labels,
        components,
    }
}
