//! Planar geometry on binary masks.
//!
//! Component labelling, boundary tracing and the shape descriptors the region
//! stage filters on, plus the distance transform and watershed used to split
//! touching blobs.

pub mod components;
pub mod contour;
pub mod descriptor;
pub mod distance;
pub mod hull;
pub mod watershed;

pub use components::{label_components, Component, Labeling};
pub use contour::{chain_perimeter, polygon_area, trace_outer_boundary};
pub use descriptor::ShapeDescriptor;
pub use distance::chamfer_distance;
pub use hull::{convex_hull, hull_area};
pub use watershed::split_touching;
