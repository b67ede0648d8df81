//! Raster types shared by the extractors and the pipeline.
//!
//! - [`Image`]: immutable decoded input (gray or RGB) with cached statistics.
//! - [`ImageU8`]: borrowed 8-bit single-channel view.
//! - [`ImageF32`]: owned float raster for intensity planes and scalar fields.
//! - [`BinaryMask`]: owned `0/1` raster for thresholded maps.
pub mod f32;
pub mod frame;
pub mod io;
pub mod mask;
mod resize;
pub mod traits;
pub mod u8;

pub use self::f32::ImageF32;
pub use self::frame::{ChannelLayout, Image, ImageStats};
pub use self::mask::BinaryMask;
pub use self::traits::{ImageView, ImageViewMut, Rows};
pub use self::u8::ImageU8;
