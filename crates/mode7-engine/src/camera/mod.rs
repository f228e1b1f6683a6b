//! Mode 7 camera.
//!
//! A [`Camera`] owns an offscreen target, a plane program and a [`ZBuffer`]. One frame is
//! `begin → draw_plane* → end → render`; `end` composites the sprite elements over the
//! planes in depth order.

mod config;
mod movement;
pub mod projection;
mod state;

pub use config::CameraConfig;
pub use movement::MoveInput;
pub use projection::{rotation_matrix, screen_to_world, world_to_screen, ScreenPoint};
pub use state::CameraState;

use crate::backend::{Backend, PlaneUniforms};
use crate::coords::{Rect, Vec2, Viewport};
use crate::error::{Mode7Error, Result};
use crate::paint::Color;
use crate::zbuffer::{ElementId, ZBuffer, ZBufferElement};

/// Where a camera is in its frame lifecycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameState {
    /// Between frames; the target holds the last finished image.
    Idle,
    /// Between `begin` and `end`; drawing goes into the target.
    Recording,
}

/// Perspective ground-plane camera with depth-sorted sprites.
///
/// Backend handles are owned by the camera but created and released through the
/// backend passed to each call. Call [`unload`](Self::unload) before dropping the
/// backend; dropping a loaded camera leaks its target until the backend goes away.
pub struct Camera<B: Backend> {
    state: CameraState,
    target: Option<B::Target>,
    program: Option<B::Program>,
    zbuffer: ZBuffer<B::Texture>,
    frame: FrameState,
}

impl<B: Backend> Camera<B> {
    /// Creates the plane program, an offscreen target of the screen size and the element store.
    pub fn load(backend: &mut B, config: CameraConfig) -> Result<Self> {
        let program = backend.create_plane_program()?;
        let target = match backend.create_target(config.screen_width, config.screen_height) {
            Ok(t) => t,
            Err(e) => {
                backend.destroy_plane_program(program);
                return Err(Mode7Error::Backend(e.context("creating camera target")));
            }
        };

        let viewport = Viewport::new(config.screen_width as f32, config.screen_height as f32);
        let state = CameraState::new(
            viewport,
            config.position,
            config.rotation,
            config.zoom,
            config.fov,
            config.offset,
        );

        log::info!(
            "camera loaded: {}x{} target, {} elements max",
            config.screen_width,
            config.screen_height,
            config.max_elements
        );

        Ok(Self {
            state,
            target: Some(target),
            program: Some(program),
            zbuffer: ZBuffer::with_capacity(config.max_elements),
            frame: FrameState::Idle,
        })
    }

    /// Releases the target, program and elements. Idempotent.
    pub fn unload(&mut self, backend: &mut B) {
        if self.target.is_none() && self.program.is_none() {
            return;
        }

        if self.frame == FrameState::Recording {
            log::warn!("camera unloaded mid-frame; closing its target pass");
            backend.end_target();
            self.frame = FrameState::Idle;
        }

        if let Some(program) = self.program.take() {
            backend.destroy_plane_program(program);
        }
        if let Some(target) = self.target.take() {
            backend.destroy_target(target);
        }
        self.zbuffer.release();

        log::info!("camera unloaded");
    }

    /// The offscreen target, or `None` once unloaded.
    pub fn target(&self) -> Option<&B::Target> {
        self.target.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.target.is_some()
    }

    pub fn frame_state(&self) -> FrameState {
        self.frame
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    // ── pose ──────────────────────────────────────────────────────────────

    pub fn position(&self) -> Vec2 {
        self.state.position()
    }

    pub fn rotation(&self) -> f32 {
        self.state.rotation()
    }

    pub fn zoom(&self) -> f32 {
        self.state.zoom()
    }

    pub fn fov(&self) -> f32 {
        self.state.fov()
    }

    pub fn offset(&self) -> f32 {
        self.state.offset()
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.state.set_position(position);
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.state.set_rotation(rotation);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.state.set_zoom(zoom);
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.state.set_fov(fov);
    }

    pub fn set_offset(&mut self, offset: f32) {
        self.state.set_offset(offset);
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.state.translate(dx, dy);
    }

    pub fn rotate(&mut self, delta: f32) {
        self.state.rotate(delta);
    }

    pub fn move_with(&mut self, input: MoveInput, dt: f32, speed: f32) {
        self.state.move_with(input, dt, speed);
    }

    pub fn world_to_screen(&self, point: Vec2) -> ScreenPoint {
        world_to_screen(&self.state, point)
    }

    pub fn screen_to_world(&self, point: Vec2) -> Vec2 {
        screen_to_world(&self.state, point)
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Starts a frame: activates the target and clears it to `background`.
    pub fn begin(&mut self, backend: &mut B, background: Color) -> Result<()> {
        self.expect_frame("begin", FrameState::Idle)?;
        let target = self.target.as_ref().ok_or(Mode7Error::Unloaded)?;

        backend.begin_target(target, background);
        self.frame = FrameState::Recording;
        Ok(())
    }

    /// Draws `texture` as a ground plane placed at `position`, pivoting around `origin`.
    ///
    /// `scale` is world units per texel; `wrap` repeats the texture to infinity.
    pub fn draw_plane(
        &mut self,
        backend: &mut B,
        texture: &B::Texture,
        position: Vec2,
        origin: Vec2,
        scale: Vec2,
        wrap: bool,
    ) -> Result<()> {
        self.expect_frame("draw_plane", FrameState::Recording)?;
        let program = self.program.as_ref().ok_or(Mode7Error::Unloaded)?;

        let uniforms = plane_uniforms(&self.state, backend.texture_size(texture), position, origin, scale, wrap);
        backend.set_plane_uniforms(program, &uniforms);
        backend.draw_plane(program, texture);
        Ok(())
    }

    /// Composites the elements over the planes and deactivates the target.
    pub fn end(&mut self, backend: &mut B) -> Result<()> {
        self.expect_frame("end", FrameState::Recording)?;

        self.zbuffer.update_all(&self.state);
        self.zbuffer.sort();
        self.zbuffer.draw_all(backend);

        backend.end_target();
        self.frame = FrameState::Idle;
        Ok(())
    }

    /// Draws the finished target to the active surface at the origin.
    pub fn render(&self, backend: &mut B) -> Result<()> {
        self.expect_frame("render", FrameState::Idle)?;
        let target = self.target.as_ref().ok_or(Mode7Error::Unloaded)?;

        let texture = backend.target_texture(target);
        let size = backend.texture_size(&texture);
        backend.draw_texture(
            &texture,
            Rect::new(0.0, 0.0, size.x, -size.y),
            Rect::new(0.0, 0.0, size.x, size.y),
            Color::WHITE,
        );
        Ok(())
    }

    /// One-plane frame: `begin`, a plane centred on its own middle, `end`.
    pub fn update(
        &mut self,
        backend: &mut B,
        texture: &B::Texture,
        position: Vec2,
        scale: Vec2,
        wrap: bool,
        background: Color,
    ) -> Result<()> {
        let size = backend.texture_size(texture);
        let origin = Vec2::new((size.x * scale.x) * 0.5, (size.y * scale.y) * 0.5);

        self.begin(backend, background)?;
        self.draw_plane(backend, texture, position, origin, scale, wrap)?;
        self.end(backend)
    }

    fn expect_frame(&self, operation: &'static str, expected: FrameState) -> Result<()> {
        if self.target.is_none() {
            return Err(Mode7Error::Unloaded);
        }
        if self.frame != expected {
            log::warn!("camera `{operation}` called while {:?}", self.frame);
            return Err(Mode7Error::FrameState { operation, state: self.frame });
        }
        Ok(())
    }

    // ── elements ──────────────────────────────────────────────────────────

    /// Adds a textured sprite showing `src` of `texture`, standing on `position`.
    pub fn add_texture(
        &mut self,
        texture: B::Texture,
        src: Rect,
        position: Vec2,
        scale: Vec2,
        tint: Color,
    ) -> Result<ElementId> {
        self.add_element(ZBufferElement::texture(texture, src, position, scale, tint))
    }

    pub fn add_rectangle(&mut self, rect: Rect, tint: Color) -> Result<ElementId> {
        self.add_element(ZBufferElement::rectangle(rect, tint))
    }

    pub fn add_circle(&mut self, center: Vec2, radius: f32, tint: Color) -> Result<ElementId> {
        self.add_element(ZBufferElement::circle(center, radius, tint))
    }

    fn add_element(&mut self, element: ZBufferElement<B::Texture>) -> Result<ElementId> {
        if !self.is_loaded() {
            log::warn!("element added to an unloaded camera");
            return Err(Mode7Error::Unloaded);
        }
        self.zbuffer.add(element)
    }

    pub fn element(&self, id: ElementId) -> Option<&ZBufferElement<B::Texture>> {
        self.zbuffer.get(id)
    }

    /// World-space fields may be edited; screen fields are overwritten on the next `end`.
    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut ZBufferElement<B::Texture>> {
        self.zbuffer.get_mut(id)
    }

    pub fn elements(&self) -> &ZBuffer<B::Texture> {
        &self.zbuffer
    }
}

fn plane_uniforms(
    state: &CameraState,
    texture_size: Vec2,
    position: Vec2,
    origin: Vec2,
    scale: Vec2,
    wrap: bool,
) -> PlaneUniforms {
    PlaneUniforms {
        map_size: texture_size.mul_elem(scale),
        cam_pos: state.position() + position + origin,
        cam_rot: state.rotation_matrix(),
        offset: state.offset(),
        zoom: state.zoom(),
        fov: state.fov(),
        wrap,
    }
}
