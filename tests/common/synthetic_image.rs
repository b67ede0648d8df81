#![allow(dead_code)]

use surface_detector::image::Image;

/// Filled disk of `fg` on a uniform `bg` background.
pub fn disk_u8(width: usize, height: usize, cx: f64, cy: f64, r: f64, fg: u8, bg: u8) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    assert!(r > 0.0, "radius must be positive");

    let mut img = vec![bg; width * height];
    for y in 0..height {
        for x in 0..width {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            if dx * dx + dy * dy <= r * r {
                img[y * width + x] = fg;
            }
        }
    }
    img
}

/// Several dark disks `(cx, cy, r)` on a bright background.
pub fn disks_u8(width: usize, height: usize, disks: &[(f64, f64, f64)], fg: u8, bg: u8) -> Vec<u8> {
    let mut img = vec![bg; width * height];
    for y in 0..height {
        for x in 0..width {
            let inside = disks.iter().any(|&(cx, cy, r)| {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                dx * dx + dy * dy <= r * r
            });
            if inside {
                img[y * width + x] = fg;
            }
        }
    }
    img
}

pub fn uniform_u8(width: usize, height: usize, value: u8) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    vec![value; width * height]
}

/// Vertical stripes alternating between `lo` and `hi` every `period / 2` px.
pub fn stripes_u8(width: usize, height: usize, period: usize, lo: u8, hi: u8) -> Vec<u8> {
    assert!(period >= 2, "period must be at least 2");
    let mut img = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            img[y * width + x] = if (x % period) < period / 2 { lo } else { hi };
        }
    }
    img
}

/// RGB image with axis-aligned `(x, y, w, h)` patches of `patch` colour.
pub fn patches_rgb(
    width: usize,
    height: usize,
    patches: &[(usize, usize, usize, usize)],
    patch: [u8; 3],
    background: [u8; 3],
) -> Vec<u8> {
    let mut img = background.repeat(width * height);
    for &(px, py, pw, ph) in patches {
        for y in py..(py + ph).min(height) {
            for x in px..(px + pw).min(width) {
                let i = 3 * (y * width + x);
                img[i..i + 3].copy_from_slice(&patch);
            }
        }
    }
    img
}

pub fn gray_image(width: usize, height: usize, data: Vec<u8>) -> Image {
    Image::from_gray(width, height, data).expect("valid gray buffer")
}

pub fn rgb_image(width: usize, height: usize, data: Vec<u8>) -> Image {
    Image::from_rgb(width, height, data).expect("valid rgb buffer")
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
