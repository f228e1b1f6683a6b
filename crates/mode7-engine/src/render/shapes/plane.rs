use bytemuck::{Pod, Zeroable};

use crate::backend::PlaneUniforms;

use super::common::{create_pipeline, min_binding_size, QuadBuffers, QuadVertex, SharedLayouts, UniformSlots};

/// Perspective ground-plane renderer.
///
/// Covers the whole pass target with one quad; the fragment shader maps each pixel back
/// to the plane texture. Uniforms for every plane of the frame live in one buffer,
/// one dynamic-offset slot per draw (group 2).
pub(crate) struct PlaneRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_bgl: wgpu::BindGroupLayout,
    uniforms: UniformSlots,
    uniform_bg: Option<wgpu::BindGroup>,
}

impl PlaneRenderer {
    pub(crate) fn new(device: &wgpu::Device, format: wgpu::TextureFormat, layouts: &SharedLayouts) -> Self {
        let uniform_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mode7 plane uniform bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: min_binding_size::<PlaneUniformData>(),
                },
                count: None,
            }],
        });

        let pipeline = create_pipeline(
            device,
            format,
            "mode7 plane pipeline",
            include_str!("shaders/plane.wgsl"),
            &[&layouts.viewport, &layouts.texture, &uniform_bgl],
            &[QuadVertex::layout()],
        );

        Self {
            pipeline,
            uniform_bgl,
            uniforms: UniformSlots::new::<PlaneUniformData>(device, "mode7 plane uniforms"),
            uniform_bg: None,
        }
    }

    /// Writes the uniforms of every plane drawn this frame, slot `i` for `planes[i]`.
    pub(crate) fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, planes: &[PlaneUniforms]) {
        if planes.is_empty() {
            return;
        }

        if self.uniforms.ensure(device, planes.len()) || self.uniform_bg.is_none() {
            let Some(resource) = self.uniforms.binding() else { return };
            self.uniform_bg = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("mode7 plane uniform bind group"),
                layout: &self.uniform_bgl,
                entries: &[wgpu::BindGroupEntry { binding: 0, resource }],
            }));
        }

        for (slot, plane) in planes.iter().enumerate() {
            self.uniforms.write(queue, slot, &PlaneUniformData::from(plane));
        }
    }

    /// Draws the plane stored in `slot`, sampling `texture`. Group 0 must already be bound.
    pub(crate) fn draw(
        &self,
        rpass: &mut wgpu::RenderPass<'_>,
        quad: &QuadBuffers,
        texture: &wgpu::BindGroup,
        slot: usize,
    ) {
        let Some(uniform_bg) = self.uniform_bg.as_ref() else { return };

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(1, texture, &[]);
        rpass.set_bind_group(2, uniform_bg, &[self.uniforms.offset(slot)]);
        quad.bind(rpass);
        rpass.draw_indexed(0..6, 0, 0..1);
    }
}

/// GPU layout of [`PlaneUniforms`] (48 bytes).
///
/// `cam_rot` is written in row order; WGSL reads it as columns, so `v * cam_rot`
/// in the shader equals `R · v`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct PlaneUniformData {
    map_size: [f32; 2],
    cam_pos: [f32; 2],
    cam_rot: [f32; 4],
    offset: f32,
    zoom: f32,
    fov: f32,
    wrap: u32,
}

impl From<&PlaneUniforms> for PlaneUniformData {
    fn from(u: &PlaneUniforms) -> Self {
        Self {
            map_size: [u.map_size.x, u.map_size.y],
            cam_pos: [u.cam_pos.x, u.cam_pos.y],
            cam_rot: u.cam_rot.to_row_major(),
            offset: u.offset,
            zoom: u.zoom,
            fov: u.fov,
            wrap: u32::from(u.wrap),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Mat2, Vec2};

    #[test]
    fn layout_matches_wgsl_struct() {
        assert_eq!(std::mem::size_of::<PlaneUniformData>(), 48);
    }

    #[test]
    fn packs_rotation_in_row_order() {
        let u = PlaneUniforms {
            map_size: Vec2::new(512.0, 256.0),
            cam_pos: Vec2::new(1.0, 2.0),
            cam_rot: Mat2::new(1.0, 2.0, 3.0, 4.0),
            offset: 0.5,
            zoom: 80.0,
            fov: 0.5,
            wrap: true,
        };
        let d = PlaneUniformData::from(&u);
        assert_eq!(d.cam_rot, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(d.map_size, [512.0, 256.0]);
        assert_eq!(d.wrap, 1);
    }
}
