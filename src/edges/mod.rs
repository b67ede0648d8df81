//! Edge processing: Sobel gradients and the Canny detector.
//!
//! - Gradient computation returning `gx`, `gy` and Euclidean magnitude.
//! - Canny with directional NMS and hysteresis, producing a binary edge map.
//!
//! Borders are handled by clamping indices (replicate).

pub mod canny;
pub mod grad;

pub use canny::{canny, canny_from_gradients, CannyResult};
pub use grad::{sobel_gradients, Grad};
