use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::paint::Color;

use super::common::{create_pipeline, InstanceBuffer, QuadBuffers, QuadVertex, SharedLayouts};

/// Solid circle renderer.
///
/// Each circle is a quad around its bounds; the fragment shader evaluates a signed
/// distance with one pixel of anti-aliasing.
pub(crate) struct CircleRenderer {
    pipeline: wgpu::RenderPipeline,
    instances: InstanceBuffer,
}

impl CircleRenderer {
    pub(crate) fn new(device: &wgpu::Device, format: wgpu::TextureFormat, layouts: &SharedLayouts) -> Self {
        let pipeline = create_pipeline(
            device,
            format,
            "mode7 circle pipeline",
            include_str!("shaders/circle.wgsl"),
            &[&layouts.viewport],
            &[QuadVertex::layout(), CircleInstance::layout()],
        );

        Self { pipeline, instances: InstanceBuffer::default() }
    }

    pub(crate) fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &[CircleInstance]) {
        self.instances.upload(device, queue, "mode7 circle instances", instances);
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
pub(crate) struct CircleInstance {
    center: [f32; 2],
    radius: f32,
    _pad: f32,
    color: [f32; 4],
}

impl CircleInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x2, // center
        2 => Float32,   // radius
        3 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CircleInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }

    /// Negative radii draw with their magnitude; zero or non-finite ones are dropped.
    pub(crate) fn new(center: Vec2, radius: f32, color: Color) -> Option<Self> {
        let radius = radius.abs();
        if radius == 0.0 || !radius.is_finite() || !center.is_finite() {
            return None;
        }
        Some(Self {
            center: [center.x, center.y],
            radius,
            _pad: 0.0,
            color: color.to_array(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_radius_uses_magnitude() {
        let c = CircleInstance::new(Vec2::new(1.0, 2.0), -3.0, Color::WHITE).unwrap();
        assert_eq!(c.radius, 3.0);
    }

    #[test]
    fn degenerate_circles_are_dropped() {
        assert!(CircleInstance::new(Vec2::zero(), 0.0, Color::WHITE).is_none());
        assert!(CircleInstance::new(Vec2::new(f32::NAN, 0.0), 1.0, Color::WHITE).is_none());
    }
}
