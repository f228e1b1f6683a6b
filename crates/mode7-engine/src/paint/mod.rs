//! Color model shared between the camera, the Z-buffer and renderers.
//!
//! Colors are linear premultiplied RGBA; geometry lives in `coords`.

pub mod color;

pub use color::Color;
