//! In-memory backend that records every call. Test-only.

use super::{Backend, Canvas, PlaneUniforms};
use crate::coords::{Rect, Vec2};
use crate::paint::Color;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Texture { texture: u32, src: Rect, dst: Rect, tint: Color },
    Rect { rect: Rect, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
    CreateProgram(u32),
    DestroyProgram(u32),
    CreateTarget { id: u32, width: u32, height: u32 },
    DestroyTarget(u32),
    BeginTarget { id: u32, clear: Color },
    EndTarget,
    Uniforms(PlaneUniforms),
    Plane { texture: u32 },
}

#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub calls: Vec<Call>,
    pub fail_targets: bool,
    next_id: u32,
}

#[derive(Debug)]
pub(crate) struct TestTarget {
    id: u32,
    width: u32,
    height: u32,
}

#[derive(Debug)]
pub(crate) struct TestProgram(u32);

/// Textures are `(id, width, height)` triples.
pub(crate) type TestTexture = (u32, u32, u32);

impl RecordingBackend {
    /// Backend whose target allocations always fail.
    pub fn failing_targets() -> Self {
        Self { fail_targets: true, ..Self::default() }
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn draws(&self) -> Vec<&Call> {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Texture { .. } | Call::Rect { .. } | Call::Circle { .. }))
            .collect()
    }
}

impl Canvas for RecordingBackend {
    type Texture = TestTexture;

    fn draw_texture(&mut self, texture: &TestTexture, src: Rect, dst: Rect, tint: Color) {
        self.calls.push(Call::Texture { texture: texture.0, src, dst, tint });
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(Call::Rect { rect, color });
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.calls.push(Call::Circle { center, radius, color });
    }
}

impl Backend for RecordingBackend {
    type Target = TestTarget;
    type Program = TestProgram;

    fn create_plane_program(&mut self) -> anyhow::Result<TestProgram> {
        let id = self.next();
        self.calls.push(Call::CreateProgram(id));
        Ok(TestProgram(id))
    }

    fn destroy_plane_program(&mut self, program: TestProgram) {
        self.calls.push(Call::DestroyProgram(program.0));
    }

    fn create_target(&mut self, width: u32, height: u32) -> anyhow::Result<TestTarget> {
        if self.fail_targets {
            anyhow::bail!("target allocation refused");
        }
        let id = self.next();
        self.calls.push(Call::CreateTarget { id, width, height });
        Ok(TestTarget { id, width, height })
    }

    fn destroy_target(&mut self, target: TestTarget) {
        self.calls.push(Call::DestroyTarget(target.id));
    }

    fn begin_target(&mut self, target: &TestTarget, clear: Color) {
        self.calls.push(Call::BeginTarget { id: target.id, clear });
    }

    fn end_target(&mut self) {
        self.calls.push(Call::EndTarget);
    }

    fn target_texture(&self, target: &TestTarget) -> TestTexture {
        (target.id, target.width, target.height)
    }

    fn texture_size(&self, texture: &TestTexture) -> Vec2 {
        Vec2::new(texture.1 as f32, texture.2 as f32)
    }

    fn set_plane_uniforms(&mut self, _program: &TestProgram, uniforms: &PlaneUniforms) {
        self.calls.push(Call::Uniforms(*uniforms));
    }

    fn draw_plane(&mut self, _program: &TestProgram, texture: &TestTexture) {
        self.calls.push(Call::Plane { texture: texture.0 });
    }
}
