use std::ops::Range;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};

use crate::backend::{Backend, Canvas, PlaneUniforms};
use crate::coords::{Rect, Vec2, Viewport};
use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList, PassTarget, TextureId};

use super::shapes::circle::{CircleInstance, CircleRenderer};
use super::shapes::common::{QuadBuffers, SharedLayouts, UniformSlots, ViewportUniform};
use super::shapes::plane::PlaneRenderer;
use super::shapes::rect::{RectInstance, RectRenderer};
use super::shapes::sprite::{SpriteInstance, SpriteRenderer};
use super::{RenderCtx, RenderTarget};

/// Offscreen color target owned by a [`WgpuBackend`].
#[derive(Debug, PartialEq, Eq)]
pub struct TargetId(TextureId);

impl TargetId {
    /// Registry id of the target's texture.
    pub fn texture(&self) -> TextureId {
        self.0
    }
}

/// Handle returned by [`Backend::create_plane_program`].
#[derive(Debug, PartialEq, Eq)]
pub struct PlaneProgramId(u32);

struct TextureEntry {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
    size: (u32, u32),
    /// Render attachments hold premultiplied texels; uploaded images are straight alpha.
    is_target: bool,
}

impl TextureEntry {
    fn size_vec(&self) -> Vec2 {
        Vec2::new(self.size.0 as f32, self.size.1 as f32)
    }
}

/// [`Backend`] on wgpu.
///
/// Calls are recorded into a draw list and replayed by [`flush`](Self::flush) once per
/// frame, inside the frame's command encoder.
pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    format: wgpu::TextureFormat,

    layouts: SharedLayouts,
    quad: QuadBuffers,
    sampler: wgpu::Sampler,

    viewport_slots: UniformSlots,
    viewport_bg: Option<wgpu::BindGroup>,

    rects: RectRenderer,
    circles: CircleRenderer,
    sprites: SpriteRenderer,
    planes: PlaneRenderer,

    textures: Vec<Option<TextureEntry>>,
    /// Pending uniforms per plane program; `None` until `set_plane_uniforms`.
    programs: Vec<Option<Option<PlaneUniforms>>>,

    draw_list: DrawList,
}

/// One contiguous batch of a pass, drawn with a single pipeline.
#[derive(Debug, Clone, PartialEq)]
enum Run {
    Rects(Range<u32>),
    Circles(Range<u32>),
    Sprites { texture: TextureId, range: Range<u32> },
    Plane { texture: TextureId, slot: usize },
}

struct PassPlan {
    target: PassTarget,
    clear: Option<Color>,
    runs: Vec<Run>,
}

#[derive(Default)]
struct FrameBatches {
    rects: Vec<RectInstance>,
    circles: Vec<CircleInstance>,
    sprites: Vec<SpriteInstance>,
    planes: Vec<PlaneUniforms>,
    viewports: Vec<ViewportUniform>,
    passes: Vec<PassPlan>,
}

impl WgpuBackend {
    /// Builds every pipeline for `format`, the surface format targets are also created with.
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>, format: wgpu::TextureFormat) -> Self {
        let layouts = SharedLayouts::new(&device);
        let quad = QuadBuffers::new(&device);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("mode7 nearest repeat sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let rects = RectRenderer::new(&device, format, &layouts);
        let circles = CircleRenderer::new(&device, format, &layouts);
        let sprites = SpriteRenderer::new(&device, format, &layouts);
        let planes = PlaneRenderer::new(&device, format, &layouts);
        let viewport_slots = UniformSlots::new::<ViewportUniform>(&device, "mode7 viewport uniforms");

        log::info!("wgpu backend created for {format:?}");

        Self {
            device,
            queue,
            format,
            layouts,
            quad,
            sampler,
            viewport_slots,
            viewport_bg: None,
            rects,
            circles,
            sprites,
            planes,
            textures: Vec::new(),
            programs: Vec::new(),
            draw_list: DrawList::new(),
        }
    }

    /// Uploads a straight-alpha RGBA8 (sRGB) image, rows top to bottom.
    pub fn load_texture_rgba(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<TextureId> {
        self.check_extent(width, height)?;
        let expected = width as usize * height as usize * 4;
        ensure!(
            rgba.len() == expected,
            "texture data is {} bytes, expected {expected} for {width}x{height}",
            rgba.len()
        );

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("mode7 texture"),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        );

        let id = self.register(texture, (width, height), false);
        log::debug!("texture {id:?} loaded ({width}x{height})");
        Ok(id)
    }

    /// Releases a loaded texture. Unknown ids are logged and ignored.
    pub fn unload_texture(&mut self, id: TextureId) {
        match self.textures.get_mut(id.0 as usize).and_then(Option::take) {
            Some(entry) => {
                entry.texture.destroy();
                log::debug!("texture {id:?} released");
            }
            None => log::warn!("unload of unknown texture {id:?}"),
        }
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Drops everything recorded since the last flush, for frames whose surface could
    /// not be acquired. Returns the number of passes dropped.
    pub fn discard(&mut self) -> usize {
        self.draw_list.discard()
    }

    /// Encodes every recorded pass into `target.encoder` and clears the recording.
    ///
    /// Screen passes draw into `target.color_view` with `ctx.viewport`; offscreen passes
    /// use their texture size and are stored bottom-up.
    pub fn flush(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        if self.draw_list.passes().is_empty() {
            return;
        }

        let batches = self.build_batches(ctx.viewport);
        self.upload(&batches);

        let Some(viewport_bg) = self.viewport_bg.as_ref() else {
            self.draw_list.clear();
            return;
        };

        for (index, plan) in batches.passes.iter().enumerate() {
            let view = match plan.target {
                PassTarget::Screen => target.color_view,
                PassTarget::Texture(id) => match self.entry(id) {
                    Some(entry) => &entry.view,
                    None => {
                        log::warn!("pass into unknown target {id:?} dropped");
                        continue;
                    }
                },
            };

            let load = match plan.clear {
                Some(c) => wgpu::LoadOp::Clear(c.into()),
                None => wgpu::LoadOp::Load,
            };

            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("mode7 pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations { load, store: wgpu::StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_bind_group(0, viewport_bg, &[self.viewport_slots.offset(index)]);

            for run in &plan.runs {
                match run {
                    Run::Rects(range) => self.rects.draw(&mut rpass, &self.quad, range.clone()),
                    Run::Circles(range) => self.circles.draw(&mut rpass, &self.quad, range.clone()),
                    Run::Sprites { texture, range } => {
                        if let Some(entry) = self.entry(*texture) {
                            self.sprites.draw(&mut rpass, &self.quad, &entry.bind_group, range.clone());
                        }
                    }
                    Run::Plane { texture, slot } => {
                        if let Some(entry) = self.entry(*texture) {
                            self.planes.draw(&mut rpass, &self.quad, &entry.bind_group, *slot);
                        }
                    }
                }
            }
        }

        log::debug!(
            "flushed {} passes ({} rects, {} circles, {} sprites, {} planes)",
            batches.passes.len(),
            batches.rects.len(),
            batches.circles.len(),
            batches.sprites.len(),
            batches.planes.len()
        );

        self.draw_list.clear();
    }

    // ── batching ──────────────────────────────────────────────────────────

    fn build_batches(&self, screen: Viewport) -> FrameBatches {
        let mut out = FrameBatches::default();

        for pass in self.draw_list.passes() {
            let (size, flip_y) = match pass.target {
                PassTarget::Screen => (Vec2::new(screen.width, screen.height), 0.0),
                PassTarget::Texture(id) => match self.entry(id) {
                    Some(entry) => (entry.size_vec(), 1.0),
                    None => (Vec2::new(1.0, 1.0), 1.0),
                },
            };
            out.viewports.push(ViewportUniform {
                viewport: [size.x, size.y],
                flip_y,
                _pad: 0.0,
            });

            let mut runs: Vec<Run> = Vec::new();
            for cmd in &pass.cmds {
                match cmd {
                    DrawCmd::Rect(c) => {
                        if let Some(inst) = RectInstance::new(c.rect, c.color) {
                            let i = out.rects.len() as u32;
                            out.rects.push(inst);
                            extend_run(&mut runs, Run::Rects(i..i + 1));
                        }
                    }
                    DrawCmd::Circle(c) => {
                        if let Some(inst) = CircleInstance::new(c.center, c.radius, c.color) {
                            let i = out.circles.len() as u32;
                            out.circles.push(inst);
                            extend_run(&mut runs, Run::Circles(i..i + 1));
                        }
                    }
                    DrawCmd::Sprite(c) => {
                        let Some(entry) = self.sampled_entry(c.texture, pass.target) else { continue };
                        if let Some(inst) =
                            SpriteInstance::new(c.src, c.dst, entry.size_vec(), c.tint, entry.is_target)
                        {
                            let i = out.sprites.len() as u32;
                            out.sprites.push(inst);
                            extend_run(&mut runs, Run::Sprites { texture: c.texture, range: i..i + 1 });
                        }
                    }
                    DrawCmd::Plane(c) => {
                        if self.sampled_entry(c.texture, pass.target).is_none() {
                            continue;
                        }
                        let slot = out.planes.len();
                        out.planes.push(c.uniforms);
                        runs.push(Run::Plane { texture: c.texture, slot });
                    }
                }
            }

            out.passes.push(PassPlan { target: pass.target, clear: pass.clear, runs });
        }

        out
    }

    fn upload(&mut self, batches: &FrameBatches) {
        let (device, queue) = (&*self.device, &*self.queue);

        if self.viewport_slots.ensure(device, batches.viewports.len()) || self.viewport_bg.is_none() {
            self.viewport_bg = self.viewport_slots.binding().map(|resource| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("mode7 viewport bind group"),
                    layout: &self.layouts.viewport,
                    entries: &[wgpu::BindGroupEntry { binding: 0, resource }],
                })
            });
        }
        for (slot, vp) in batches.viewports.iter().enumerate() {
            self.viewport_slots.write(queue, slot, vp);
        }

        self.rects.upload(device, queue, &batches.rects);
        self.circles.upload(device, queue, &batches.circles);
        self.sprites.upload(device, queue, &batches.sprites);
        self.planes.upload(device, queue, &batches.planes);
    }

    // ── registry ──────────────────────────────────────────────────────────

    fn check_extent(&self, width: u32, height: u32) -> Result<()> {
        let max = self.device.limits().max_texture_dimension_2d;
        ensure!(width > 0 && height > 0, "texture size {width}x{height} is empty");
        ensure!(
            width <= max && height <= max,
            "texture size {width}x{height} exceeds device limit {max}"
        );
        Ok(())
    }

    fn register(&mut self, texture: wgpu::Texture, size: (u32, u32), is_target: bool) -> TextureId {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mode7 texture bind group"),
            layout: &self.layouts.texture,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&self.sampler) },
            ],
        });

        let slot = insert_slot(&mut self.textures, TextureEntry { texture, view, bind_group, size, is_target });
        TextureId(slot as u32)
    }

    fn entry(&self, id: TextureId) -> Option<&TextureEntry> {
        self.textures.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Entry for a texture sampled inside a pass; a target cannot sample itself.
    fn sampled_entry(&self, id: TextureId, pass: PassTarget) -> Option<&TextureEntry> {
        if pass == PassTarget::Texture(id) {
            log::warn!("texture {id:?} sampled while it is the render target; draw skipped");
            return None;
        }
        let entry = self.entry(id);
        if entry.is_none() {
            log::warn!("draw with unknown texture {id:?} skipped");
        }
        entry
    }
}

/// Stores `value` in the first free slot, growing the registry only when it is full.
fn insert_slot<T>(slots: &mut Vec<Option<T>>, value: T) -> usize {
    match slots.iter().position(Option::is_none) {
        Some(index) => {
            slots[index] = Some(value);
            index
        }
        None => {
            slots.push(Some(value));
            slots.len() - 1
        }
    }
}

/// Appends `run`, merging it into the previous run when both draw with the same pipeline
/// and bindings and their ranges touch.
fn extend_run(runs: &mut Vec<Run>, run: Run) {
    if let Some(last) = runs.last_mut() {
        match (last, &run) {
            (Run::Rects(a), Run::Rects(b)) | (Run::Circles(a), Run::Circles(b)) if a.end == b.start => {
                a.end = b.end;
                return;
            }
            (Run::Sprites { texture: ta, range: a }, Run::Sprites { texture: tb, range: b })
                if ta == tb && a.end == b.start =>
            {
                a.end = b.end;
                return;
            }
            _ => {}
        }
    }
    runs.push(run);
}

impl Canvas for WgpuBackend {
    type Texture = TextureId;

    fn draw_texture(&mut self, texture: &TextureId, src: Rect, dst: Rect, tint: Color) {
        self.draw_list.push_sprite(*texture, src, dst, tint);
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.draw_list.push_rect(rect, color);
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.draw_list.push_circle(center, radius, color);
    }
}

impl Backend for WgpuBackend {
    type Target = TargetId;
    type Program = PlaneProgramId;

    fn create_plane_program(&mut self) -> Result<PlaneProgramId> {
        let id = PlaneProgramId(insert_slot(&mut self.programs, None) as u32);
        log::debug!("plane program {} created", id.0);
        Ok(id)
    }

    fn destroy_plane_program(&mut self, program: PlaneProgramId) {
        match self.programs.get_mut(program.0 as usize) {
            Some(slot @ Some(_)) => {
                *slot = None;
                log::debug!("plane program {} destroyed", program.0);
            }
            _ => log::warn!("destroy of unknown plane program {}", program.0),
        }
    }

    fn create_target(&mut self, width: u32, height: u32) -> Result<TargetId> {
        self.check_extent(width, height).context("creating render target")?;

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("mode7 render target"),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let id = self.register(texture, (width, height), true);
        log::debug!("render target {id:?} created ({width}x{height})");
        Ok(TargetId(id))
    }

    fn destroy_target(&mut self, target: TargetId) {
        self.unload_texture(target.0);
    }

    fn begin_target(&mut self, target: &TargetId, clear: Color) {
        if self.entry(target.0).is_none() {
            log::warn!("begin_target on unknown target {:?}", target.0);
        }
        self.draw_list.begin_pass(target.0, Some(clear));
    }

    fn end_target(&mut self) {
        self.draw_list.end_pass();
    }

    fn target_texture(&self, target: &TargetId) -> TextureId {
        target.0
    }

    fn texture_size(&self, texture: &TextureId) -> Vec2 {
        match self.entry(*texture) {
            Some(entry) => entry.size_vec(),
            None => {
                log::warn!("size of unknown texture {texture:?} requested");
                Vec2::zero()
            }
        }
    }

    fn set_plane_uniforms(&mut self, program: &PlaneProgramId, uniforms: &PlaneUniforms) {
        match self.programs.get_mut(program.0 as usize) {
            Some(Some(pending)) => *pending = Some(*uniforms),
            _ => log::warn!("uniforms for unknown plane program {}", program.0),
        }
    }

    fn draw_plane(&mut self, program: &PlaneProgramId, texture: &TextureId) {
        let uniforms = match self.programs.get(program.0 as usize) {
            Some(Some(Some(u))) => *u,
            Some(Some(None)) => {
                log::warn!("plane program {} drawn without uniforms", program.0);
                return;
            }
            _ => {
                log::warn!("draw with unknown plane program {}", program.0);
                return;
            }
        };
        self.draw_list.push_plane(*texture, uniforms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_runs_merge() {
        let mut runs = Vec::new();
        extend_run(&mut runs, Run::Rects(0..1));
        extend_run(&mut runs, Run::Rects(1..2));
        extend_run(&mut runs, Run::Circles(0..1));
        extend_run(&mut runs, Run::Rects(2..3));
        assert_eq!(runs, vec![Run::Rects(0..2), Run::Circles(0..1), Run::Rects(2..3)]);
    }

    #[test]
    fn sprite_runs_split_on_texture_change() {
        let mut runs = Vec::new();
        extend_run(&mut runs, Run::Sprites { texture: TextureId(1), range: 0..1 });
        extend_run(&mut runs, Run::Sprites { texture: TextureId(1), range: 1..2 });
        extend_run(&mut runs, Run::Sprites { texture: TextureId(2), range: 2..3 });
        assert_eq!(
            runs,
            vec![
                Run::Sprites { texture: TextureId(1), range: 0..2 },
                Run::Sprites { texture: TextureId(2), range: 2..3 },
            ]
        );
    }

    #[test]
    fn planes_never_merge() {
        let mut runs = Vec::new();
        extend_run(&mut runs, Run::Plane { texture: TextureId(0), slot: 0 });
        extend_run(&mut runs, Run::Plane { texture: TextureId(0), slot: 1 });
        assert_eq!(runs.len(), 2);
    }

    // ── registries ────────────────────────────────────────────────────────

    #[test]
    fn freed_slots_are_reused() {
        let mut slots: Vec<Option<u32>> = Vec::new();
        assert_eq!(insert_slot(&mut slots, 10), 0);
        assert_eq!(insert_slot(&mut slots, 11), 1);
        assert_eq!(insert_slot(&mut slots, 12), 2);

        slots[1].take();
        assert_eq!(insert_slot(&mut slots, 13), 1);
        assert_eq!(slots, vec![Some(10), Some(13), Some(12)]);
    }

    #[test]
    fn load_unload_cycles_do_not_grow_registry() {
        let mut slots: Vec<Option<u32>> = Vec::new();
        for i in 0..50 {
            let a = insert_slot(&mut slots, i);
            let b = insert_slot(&mut slots, i + 1);
            slots[a].take();
            slots[b].take();
        }
        assert_eq!(slots.len(), 2);
    }
}
