//! Depth-sorted sprite compositing over the ground plane.
//!
//! Each frame: `update_all` projects every element with the camera state, `sort`
//! orders the draw index far to near, `draw_all` issues canvas calls in that order.

mod element;
mod store;

pub use element::{ElementId, ElementKind, SpaceData, ZBufferElement};
pub use store::ZBuffer;
