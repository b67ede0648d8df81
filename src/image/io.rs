//! I/O helpers for decoded images, masks and JSON.
//!
//! - `load_image`: read a PNG/JPEG/etc. into an [`Image`] (gray or RGB).
//! - `decode_image`: same, from an in-memory encoded buffer.
//! - `save_mask_png`: write a [`BinaryMask`] as a black/white PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{BinaryMask, Image, ImageView};
use crate::error::ValidationError;
use image::{DynamicImage, GrayImage, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

fn from_dynamic(img: DynamicImage) -> Result<Image, ValidationError> {
    if img.color().has_color() {
        let rgb = img.into_rgb8();
        let (w, h) = (rgb.width() as usize, rgb.height() as usize);
        Image::from_rgb(w, h, rgb.into_raw())
    } else {
        let gray = img.into_luma8();
        let (w, h) = (gray.width() as usize, gray.height() as usize);
        Image::from_gray(w, h, gray.into_raw())
    }
}

/// Decode an encoded image buffer (any format enabled in the `image` crate).
pub fn decode_image(bytes: &[u8]) -> Result<Image, ValidationError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ValidationError::UnsupportedFormat(e.to_string()))?;
    from_dynamic(img)
}

/// Load an image from disk, keeping colour when present.
pub fn load_image(path: &Path) -> Result<Image, String> {
    let img = image::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    from_dynamic(img).map_err(|e| format!("Failed to load {}: {e}", path.display()))
}

/// Save a binary mask as an 8-bit PNG (foreground = 255).
pub fn save_mask_png(mask: &BinaryMask, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let mut out = GrayImage::new(mask.w as u32, mask.h as u32);
    for (y, row) in mask.rows().enumerate() {
        for (x, &v) in row.iter().enumerate() {
            out.put_pixel(x as u32, y as u32, Luma([if v != 0 { 255 } else { 0 }]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_garbage() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedFormat(_)));
    }

    #[test]
    fn decode_png_round_trip_keeps_gray_layout() {
        let gray = GrayImage::from_fn(6, 4, |x, _| Luma([(x * 40) as u8]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(gray)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        let img = decode_image(bytes.get_ref()).unwrap();
        assert_eq!(img.layout(), crate::image::ChannelLayout::Gray);
        assert_eq!((img.width(), img.height()), (6, 4));
        assert_eq!(img.rgb(5, 0), [200, 200, 200]);
    }
}
