use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::coords::{Rect, Vec2};
use crate::paint::Color;

use super::common::{create_pipeline, InstanceBuffer, QuadBuffers, QuadVertex, SharedLayouts};

/// Textured quad renderer.
///
/// Instances are drawn in runs sharing one texture bind group (group 1).
pub(crate) struct SpriteRenderer {
    pipeline: wgpu::RenderPipeline,
    instances: InstanceBuffer,
}

impl SpriteRenderer {
    pub(crate) fn new(device: &wgpu::Device, format: wgpu::TextureFormat, layouts: &SharedLayouts) -> Self {
        let pipeline = create_pipeline(
            device,
            format,
            "mode7 sprite pipeline",
            include_str!("shaders/sprite.wgsl"),
            &[&layouts.viewport, &layouts.texture],
            &[QuadVertex::layout(), SpriteInstance::layout()],
        );

        Self { pipeline, instances: InstanceBuffer::default() }
    }

    pub(crate) fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &[SpriteInstance]) {
        self.instances.upload(device, queue, "mode7 sprite instances", instances);
    }

    /// Draws `range` with `texture` bound at group 1. Group 0 must already be bound.
    pub(crate) fn draw(
        &self,
        rpass: &mut wgpu::RenderPass<'_>,
        quad: &QuadBuffers,
        texture: &wgpu::BindGroup,
        range: Range<u32>,
    ) {
        let Some(instances) = self.instances.slice() else { return };

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(1, texture, &[]);
        quad.bind(rpass);
        rpass.set_vertex_buffer(1, instances);
        rpass.draw_indexed(0..6, 0, range);
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct SpriteInstance {
    origin: [f32; 2],
    size: [f32; 2],
    uv_origin: [f32; 2],
    uv_size: [f32; 2],
    tint: [f32; 4],
    /// `1.0` when texels are already premultiplied (render targets).
    premultiplied: f32,
}

impl SpriteInstance {
    const ATTRS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2, // size
        3 => Float32x2, // uv_origin
        4 => Float32x2, // uv_size
        5 => Float32x4, // tint
        6 => Float32    // premultiplied
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }

    /// Instance drawing `src` (texels of a `texture_size` texture) into `dst` (pixels).
    ///
    /// A negative source extent reads the same region mirrored. `None` when the
    /// destination is not finite or the texture is empty.
    pub(crate) fn new(src: Rect, dst: Rect, texture_size: Vec2, tint: Color, premultiplied: bool) -> Option<Self> {
        if !dst.is_finite() || !src.is_finite() || texture_size.x <= 0.0 || texture_size.y <= 0.0 {
            return None;
        }

        let (u0, du) = flipped_span(src.origin.x, src.size.x, texture_size.x);
        let (v0, dv) = flipped_span(src.origin.y, src.size.y, texture_size.y);

        Some(Self {
            origin: [dst.origin.x, dst.origin.y],
            size: [dst.size.x, dst.size.y],
            uv_origin: [u0, v0],
            uv_size: [du, dv],
            tint: tint.to_array(),
            premultiplied: if premultiplied { 1.0 } else { 0.0 },
        })
    }
}

/// Normalized `(start, extent)` of a source span; negative extents start at the far edge.
fn flipped_span(origin: f32, extent: f32, texture_extent: f32) -> (f32, f32) {
    if extent < 0.0 {
        ((origin - extent) / texture_extent, extent / texture_extent)
    } else {
        (origin / texture_extent, extent / texture_extent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tex() -> Vec2 {
        Vec2::new(64.0, 32.0)
    }

    #[test]
    fn plain_source_maps_to_unit_range() {
        let s = SpriteInstance::new(
            Rect::new(16.0, 8.0, 32.0, 16.0),
            Rect::new(0.0, 0.0, 10.0, 10.0),
            tex(),
            Color::WHITE,
            false,
        )
        .unwrap();
        assert_eq!(s.uv_origin, [0.25, 0.25]);
        assert_eq!(s.uv_size, [0.5, 0.5]);
        assert_eq!(s.premultiplied, 0.0);
    }

    #[test]
    fn negative_height_reads_same_rows_reversed() {
        let s = SpriteInstance::new(
            Rect::new(0.0, 0.0, 64.0, -32.0),
            Rect::new(0.0, 0.0, 64.0, 32.0),
            tex(),
            Color::WHITE,
            true,
        )
        .unwrap();
        assert_eq!(s.uv_origin, [0.0, 1.0]);
        assert_eq!(s.uv_size, [1.0, -1.0]);
        assert_eq!(s.premultiplied, 1.0);
    }

    #[test]
    fn non_finite_destination_is_dropped() {
        let dst = Rect::new(f32::NAN, 0.0, 1.0, 1.0);
        assert!(SpriteInstance::new(Rect::new(0.0, 0.0, 1.0, 1.0), dst, tex(), Color::WHITE, false).is_none());
    }
}
