//! Rendering backend contract.
//!
//! The camera never talks to a GPU API directly. Everything it needs from a renderer
//! goes through these two traits:
//! - [`Canvas`]: immediate drawing (textured quads, filled rectangles and circles);
//!   all the Z-buffer needs.
//! - [`Backend`]: adds offscreen targets and the ground-plane program.
//!
//! Coordinates are pixels in the currently active target, origin top-left, y down.

#[cfg(test)]
pub(crate) mod recording;

mod uniforms;

pub use uniforms::PlaneUniforms;

use crate::coords::{Rect, Vec2};
use crate::paint::Color;

/// Drawing subset of a backend.
pub trait Canvas {
    /// Handle to a sampled texture.
    type Texture: Clone;

    /// Draws the `src` region of `texture` (texels) into `dst` (pixels), multiplied by `tint`.
    ///
    /// A negative `src` width or height flips the read along that axis.
    fn draw_texture(&mut self, texture: &Self::Texture, src: Rect, dst: Rect, tint: Color);

    /// Fills `rect`. Negative sizes are drawn as their normalized rectangle.
    fn draw_rect(&mut self, rect: Rect, color: Color);

    /// Fills a circle. Negative radii are drawn with their absolute value.
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color);
}

/// Full backend: offscreen targets and the perspective plane program.
pub trait Backend: Canvas {
    /// Offscreen color target.
    type Target;

    /// Compiled plane-mapping program.
    type Program;

    fn create_plane_program(&mut self) -> anyhow::Result<Self::Program>;
    fn destroy_plane_program(&mut self, program: Self::Program);

    /// Creates a color target of `width × height` pixels.
    fn create_target(&mut self, width: u32, height: u32) -> anyhow::Result<Self::Target>;
    fn destroy_target(&mut self, target: Self::Target);

    /// Redirects drawing into `target` and clears it to `clear`.
    fn begin_target(&mut self, target: &Self::Target, clear: Color);

    /// Restores drawing to the screen.
    fn end_target(&mut self);

    /// Texture view of a target, for blitting it with [`Canvas::draw_texture`].
    ///
    /// Target contents are stored bottom-up; read them with a negative source height.
    fn target_texture(&self, target: &Self::Target) -> Self::Texture;

    /// Size of `texture` in texels.
    fn texture_size(&self, texture: &Self::Texture) -> Vec2;

    /// Sets the uniforms used by the next [`draw_plane`](Self::draw_plane) calls.
    fn set_plane_uniforms(&mut self, program: &Self::Program, uniforms: &PlaneUniforms);

    /// Runs the plane program over every pixel of the active target, sampling `texture`.
    fn draw_plane(&mut self, program: &Self::Program, texture: &Self::Texture);
}
