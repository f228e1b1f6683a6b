//! Mode 7 demo: a tiled ground, a grid skirt and a column of characters.
//!
//! Controls: W/A/S/D move, Left/Right turn, Up/Down zoom, PageUp/PageDown horizon,
//! wheel fov, left mouse places the front character, Space shows one wrapped grid.

mod textures;

use mode7_engine::camera::{Camera, CameraConfig, MoveInput};
use mode7_engine::core::{App, AppControl, FrameCtx};
use mode7_engine::coords::{Rect, Vec2};
use mode7_engine::device::{Gpu, GpuInit};
use mode7_engine::input::{InputFrame, InputState, Key, MouseButton};
use mode7_engine::logging::{init_logging, LoggingConfig};
use mode7_engine::paint::Color;
use mode7_engine::render::{TextureId, WgpuBackend};
use mode7_engine::window::{LogicalSize, Runtime, RuntimeConfig};
use mode7_engine::ElementId;

const SCREEN_WIDTH: u32 = 1280;
const SCREEN_HEIGHT: u32 = 720;
const MOVE_SPEED: f32 = 64.0;
const TITLE_REFRESH: f32 = 0.25;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());
    log::info!("mode7 demo starting");

    Runtime::run(
        RuntimeConfig {
            title: "mode7 demo".to_string(),
            initial_size: LogicalSize::new(SCREEN_WIDTH as f64, SCREEN_HEIGHT as f64),
        },
        GpuInit::default(),
        Demo::default(),
    )
}

#[derive(Default)]
struct Demo {
    scene: Option<Scene>,
    title_timer: f32,
}

impl App for Demo {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.scene.is_none() {
            match Scene::new(ctx.gpu) {
                Ok(scene) => self.scene = Some(scene),
                Err(e) => {
                    log::error!("demo setup failed: {e:#}");
                    return AppControl::Exit;
                }
            }
        }
        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Exit;
        };

        if ctx.input_frame.key_pressed(Key::Escape) {
            return AppControl::Exit;
        }

        scene.update(ctx.input, ctx.input_frame, ctx.time.dt);
        let wrapped = ctx.input.key_down(Key::Space);

        self.title_timer -= ctx.time.dt;
        if self.title_timer <= 0.0 {
            self.title_timer = TITLE_REFRESH;
            ctx.window.set_title(&scene.title(ctx.time.fps));
        }

        // Recording happens only once the surface frame is acquired.
        let mut recorded = Ok(());
        let control = ctx.render(Color::BLACK, |rctx, target| {
            recorded = scene.record(wrapped);
            scene.backend.flush(rctx, target);
        });

        if let Err(e) = recorded {
            log::error!("frame failed: {e:#}");
            return AppControl::Exit;
        }
        control
    }
}

struct Scene {
    backend: WgpuBackend,
    camera: Camera<WgpuBackend>,
    grid: TextureId,
    ground: TextureId,
    character: TextureId,
    first_character: ElementId,
}

impl Scene {
    fn new(gpu: &Gpu<'_>) -> anyhow::Result<Self> {
        let mut backend = WgpuBackend::new(gpu.device_handle(), gpu.queue_handle(), gpu.surface_format());

        let grid = textures::grid(512, 64);
        let grid = backend.load_texture_rgba(grid.width, grid.height, &grid.rgba)?;
        let ground = textures::ground(64);
        let ground = backend.load_texture_rgba(ground.width, ground.height, &ground.rgba)?;
        let character = textures::character();
        let (cw, ch) = (character.width as f32, character.height as f32);
        let character = backend.load_texture_rgba(character.width, character.height, &character.rgba)?;

        let mut camera = Camera::load(
            &mut backend,
            CameraConfig {
                screen_width: SCREEN_WIDTH,
                screen_height: SCREEN_HEIGHT,
                ..CameraConfig::default()
            },
        )?;

        let src = Rect::new(0.0, 0.0, cw, ch);
        let first_character =
            camera.add_texture(character, src, Vec2::zero(), Vec2::splat(8.0), Color::WHITE)?;

        for i in 1..10 {
            let y = i as f32 * -16.0;
            camera.add_texture(character, src, Vec2::new(0.0, y), Vec2::splat(12.0), Color::WHITE)?;
            for x in [-16.0, 16.0, -32.0, 32.0] {
                camera.add_texture(character, src, Vec2::new(x, y), Vec2::splat(8.0), Color::WHITE)?;
            }
        }

        camera.add_rectangle(Rect::new(64.0, 64.0, 16.0, 16.0), Color::from_srgb_u8(230, 41, 55, 255))?;
        camera.add_circle(Vec2::new(-64.0, 64.0), 8.0, Color::from_srgb_u8(253, 249, 0, 255))?;

        log::info!("scene ready: {} elements", camera.elements().len());

        Ok(Self {
            backend,
            camera,
            grid,
            ground,
            character,
            first_character,
        })
    }

    fn update(&mut self, input: &InputState, frame: &InputFrame, dt: f32) {
        self.camera.move_with(MoveInput::from_input(input, frame), dt, MOVE_SPEED);

        if input.button_down(MouseButton::Left) {
            if let Some(pointer) = input.pointer_pos {
                let world = self.camera.screen_to_world(pointer);
                if let Some(element) = self.camera.element_mut(self.first_character) {
                    element.world.position = world;
                }
            }
        }
    }

    fn record(&mut self, wrapped: bool) -> mode7_engine::Result<()> {
        self.backend.discard();

        let background = Color::from_srgb_u8(0, 121, 241, 255);
        self.camera.begin(&mut self.backend, background)?;

        if wrapped {
            self.camera.draw_plane(
                &mut self.backend,
                &self.grid,
                Vec2::zero(),
                Vec2::new(256.0, 256.0),
                Vec2::splat(1.0),
                true,
            )?;
        } else {
            self.draw_tiles()?;
        }

        self.camera.end(&mut self.backend)?;
        self.camera.render(&mut self.backend)
    }

    /// 8×8 ground tiles around the origin, ringed by eight grid planes.
    fn draw_tiles(&mut self) -> mode7_engine::Result<()> {
        let tile = 64;
        let origin = Vec2::new(tile as f32, tile as f32);

        for y in (-256..256).step_by(tile) {
            for x in (-256..256).step_by(tile) {
                self.camera.draw_plane(
                    &mut self.backend,
                    &self.ground,
                    Vec2::new(x as f32, y as f32),
                    origin,
                    Vec2::splat(1.0),
                    false,
                )?;
            }
        }

        for y in -1..=1 {
            for x in -1..=1 {
                if x == 0 && y == 0 {
                    continue;
                }
                self.camera.draw_plane(
                    &mut self.backend,
                    &self.grid,
                    Vec2::new(x as f32 * 512.0, y as f32 * 512.0),
                    Vec2::new(256.0, 256.0),
                    Vec2::splat(1.0),
                    false,
                )?;
            }
        }
        Ok(())
    }

    fn title(&self, fps: u32) -> String {
        let p = self.camera.position();
        format!(
            "mode7 demo | {fps} fps | pos ({:.2}, {:.2}) rot {:.3} zoom {:.1} fov {:.2} offset {:.2} | {} sprites",
            p.x,
            p.y,
            self.camera.rotation(),
            self.camera.zoom(),
            self.camera.fov(),
            self.camera.offset(),
            self.camera.elements().len()
        )
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.camera.unload(&mut self.backend);
        for texture in [self.character, self.ground, self.grid] {
            self.backend.unload_texture(texture);
        }
    }
}
