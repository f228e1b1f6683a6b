//! Shared GPU types and utilities used by all shape renderers.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

// ── blend ─────────────────────────────────────────────────────────────────

pub(crate) fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

// ── viewport uniform ──────────────────────────────────────────────────────

/// Per-pass viewport. `flip_y = 1` stores the pass bottom-up (offscreen targets).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct ViewportUniform {
    pub viewport: [f32; 2],
    pub flip_y: f32,
    pub _pad: f32, // 16-byte alignment
}

/// Returns the `wgpu` minimum binding size for a uniform of type `T`.
pub(crate) fn min_binding_size<T>() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

// ── quad vertex ───────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct QuadVertex {
    pub pos: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Unit quad shared by every renderer.
pub(crate) struct QuadBuffers {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
}

impl QuadBuffers {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        Self {
            vbo: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mode7 quad vbo"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            ibo: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mode7 quad ibo"),
                contents: bytemuck::cast_slice(&QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            }),
        }
    }

    /// Binds the quad at vertex slot 0 and the index buffer.
    pub(crate) fn bind(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_vertex_buffer(0, self.vbo.slice(..));
        rpass.set_index_buffer(self.ibo.slice(..), wgpu::IndexFormat::Uint16);
    }
}

// ── bind group layouts ────────────────────────────────────────────────────

/// Layouts shared across pipelines so bind groups can be reused between them.
///
/// - group 0: viewport uniform (dynamic offset, one slot per pass)
/// - group 1: texture + sampler
pub(crate) struct SharedLayouts {
    pub viewport: wgpu::BindGroupLayout,
    pub texture: wgpu::BindGroupLayout,
}

impl SharedLayouts {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let viewport = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mode7 viewport bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: min_binding_size::<ViewportUniform>(),
                },
                count: None,
            }],
        });

        let texture = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mode7 texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        Self { viewport, texture }
    }
}

// ── dynamic uniform slots ─────────────────────────────────────────────────

/// Growable uniform buffer addressed with dynamic offsets.
///
/// Slot `i` lives at `i * stride`; `stride` honours the device's offset alignment.
pub(crate) struct UniformSlots {
    label: &'static str,
    slot_size: u64,
    stride: u64,
    buffer: Option<wgpu::Buffer>,
    capacity: usize,
}

impl UniformSlots {
    pub(crate) fn new<T>(device: &wgpu::Device, label: &'static str) -> Self {
        let align = device.limits().min_uniform_buffer_offset_alignment as u64;
        let slot_size = std::mem::size_of::<T>() as u64;
        Self {
            label,
            slot_size,
            stride: slot_size.div_ceil(align) * align,
            buffer: None,
            capacity: 0,
        }
    }

    /// Ensures room for `count` slots. Returns `true` when the buffer was (re)created,
    /// in which case bind groups referencing it must be rebuilt.
    pub(crate) fn ensure(&mut self, device: &wgpu::Device, count: usize) -> bool {
        if count <= self.capacity && self.buffer.is_some() {
            return false;
        }

        let new_cap = count.next_power_of_two().max(8);
        self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(self.label),
            size: new_cap as u64 * self.stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.capacity = new_cap;
        true
    }

    pub(crate) fn write<T: Pod>(&self, queue: &wgpu::Queue, slot: usize, value: &T) {
        let Some(buffer) = self.buffer.as_ref() else { return };
        debug_assert!(slot < self.capacity);
        queue.write_buffer(buffer, self.offset(slot) as u64, bytemuck::bytes_of(value));
    }

    #[inline]
    pub(crate) fn offset(&self, slot: usize) -> u32 {
        (slot as u64 * self.stride) as u32
    }

    /// Binding covering a single slot, for use with dynamic offsets.
    pub(crate) fn binding(&self) -> Option<wgpu::BindingResource<'_>> {
        let buffer = self.buffer.as_ref()?;
        Some(wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer,
            offset: 0,
            size: std::num::NonZeroU64::new(self.slot_size),
        }))
    }
}

// ── instance buffers ──────────────────────────────────────────────────────

/// Growable per-instance vertex buffer.
#[derive(Default)]
pub(crate) struct InstanceBuffer {
    vbo: Option<wgpu::Buffer>,
    capacity: usize,
}

impl InstanceBuffer {
    /// Uploads `instances` at offset 0, growing the buffer if needed.
    pub(crate) fn upload<T: Pod>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &'static str,
        instances: &[T],
    ) {
        if instances.is_empty() {
            return;
        }

        if instances.len() > self.capacity || self.vbo.is_none() {
            let new_cap = instances.len().next_power_of_two().max(64);
            self.vbo = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: (new_cap * std::mem::size_of::<T>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.capacity = new_cap;
        }

        if let Some(vbo) = self.vbo.as_ref() {
            queue.write_buffer(vbo, 0, bytemuck::cast_slice(instances));
        }
    }

    pub(crate) fn slice(&self) -> Option<wgpu::BufferSlice<'_>> {
        self.vbo.as_ref().map(|b| b.slice(..))
    }
}

// ── pipeline ──────────────────────────────────────────────────────────────

/// Builds a premultiplied-alpha triangle-list pipeline with `vs_main`/`fs_main` entry points.
pub(crate) fn create_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    label: &'static str,
    shader_src: &'static str,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    buffers: &[wgpu::VertexBufferLayout<'_>],
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(shader_src.into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts,
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),

        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers,
        },

        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(premul_alpha_blend()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
