use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::coords::Rect;
use crate::paint::Color;

use super::common::{create_pipeline, InstanceBuffer, QuadBuffers, QuadVertex, SharedLayouts};

/// Solid rectangle renderer.
///
/// Geometry is provided in target pixels and converted to NDC in the vertex shader using
/// the pass viewport. Color is linear premultiplied RGBA (`paint::Color`).
pub(crate) struct RectRenderer {
    pipeline: wgpu::RenderPipeline,
    instances: InstanceBuffer,
}

impl RectRenderer {
    pub(crate) fn new(device: &wgpu::Device, format: wgpu::TextureFormat, layouts: &SharedLayouts) -> Self {
        let pipeline = create_pipeline(
            device,
            format,
            "mode7 rect pipeline",
            include_str!("shaders/rect.wgsl"),
            &[&layouts.viewport],
            &[QuadVertex::layout(), RectInstance::layout()],
        );

        Self { pipeline, instances: InstanceBuffer::default() }
    }

    /// Uploads every rectangle of the frame; draws then address ranges of this slice.
    pub(crate) fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &[RectInstance]) {
        self.instances.upload(device, queue, "mode7 rect instances", instances);
    }

    /// Draws `range` of the uploaded instances. Group 0 must already be bound.
    pub(crate) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, quad: &QuadBuffers, range: Range<u32>) {
        let Some(instances) = self.instances.slice() else { return };

        rpass.set_pipeline(&self.pipeline);
        quad.bind(rpass);
        rpass.set_vertex_buffer(1, instances);
        rpass.draw_indexed(0..6, 0, range);
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct RectInstance {
    origin: [f32; 2],
    size: [f32; 2],
    color: [f32; 4],
}

impl RectInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2, // size
        3 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<RectInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }

    /// Instance for `rect`, normalized. `None` for empty or non-finite rectangles.
    pub(crate) fn new(rect: Rect, color: Color) -> Option<Self> {
        let r = rect.normalized();
        if r.is_empty() || !r.is_finite() {
            return None;
        }
        Some(Self {
            origin: [r.origin.x, r.origin.y],
            size: [r.size.x, r.size.y],
            color: color.to_array(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_extent_is_normalized() {
        let inst = RectInstance::new(Rect::new(10.0, 10.0, -4.0, -2.0), Color::WHITE).unwrap();
        assert_eq!(inst.origin, [6.0, 8.0]);
        assert_eq!(inst.size, [4.0, 2.0]);
    }

    #[test]
    fn degenerate_rects_are_dropped() {
        assert!(RectInstance::new(Rect::new(0.0, 0.0, 0.0, 3.0), Color::WHITE).is_none());
        assert!(RectInstance::new(Rect::new(f32::NAN, 0.0, 1.0, 1.0), Color::WHITE).is_none());
        assert!(RectInstance::new(Rect::new(0.0, 0.0, f32::INFINITY, 1.0), Color::WHITE).is_none());
    }
}
