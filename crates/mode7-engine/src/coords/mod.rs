//! Coordinate and geometry types shared by the camera, the element store and renderers.
//!
//! Two spaces are in play:
//! - world units on the ground plane (camera position, element placement)
//! - target pixels, origin top-left, +X right, +Y down
//!
//! Renderers convert pixels to NDC in shaders using a viewport uniform.

mod mat2;
mod rect;
mod vec2;
mod viewport;

pub use mat2::Mat2;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
