mod keymap;

use anyhow::{Context as _, Result};
use clap::Parser;
use cubescape_assets::{PendingResources, ResourceLoader, Resources};
use cubescape_common::SceneConfig;
use cubescape_input::InputTracker;
use cubescape_kernel::{LogicLoop, RenderLoop, Scene, StopHandle};
use cubescape_objects::build_demo_scene;
use cubescape_render::{GpuContext, ProgramCache, default_programs};
use cubescape_render_wgpu::WgpuContext;
use cubescape_tools::SceneInspector;
use egui::Context as EguiContext;
use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "cubescape-desktop", about = "Interactive cube demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Texture image to put on the cubes
    #[arg(long)]
    texture: Option<PathBuf>,

    /// Seed for cube colors
    #[arg(long)]
    seed: Option<u64>,
}

/// Window, GPU context and overlay renderer. Dropped last on teardown.
struct Gpu {
    window: Arc<Window>,
    context: WgpuContext,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct Running {
    scene: Scene,
    render: RenderLoop,
    logic: LogicLoop,
    stops: [StopHandle; 2],
}

enum Phase {
    /// Window not created yet.
    Unmounted,
    Loading(PendingResources),
    Running(Box<Running>),
    Failed(String),
    Closed,
}

struct App {
    config: SceneConfig,
    seed: Option<u64>,
    programs: ProgramCache,
    tracker: InputTracker<Scene>,
    phase: Phase,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    show_overlay: bool,
    cursor: Vec2,
}

impl App {
    fn new(config: SceneConfig, seed: Option<u64>) -> Self {
        Self {
            config,
            seed,
            programs: default_programs(),
            tracker: InputTracker::new(),
            phase: Phase::Unmounted,
            gpu: None,
            egui_ctx: EguiContext::default(),
            show_overlay: true,
            cursor: Vec2::ZERO,
        }
    }

    fn mount(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("cubescape")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);
        let size = window.inner_size();
        let context = WgpuContext::new(window.clone(), size.width, size.height)
            .context("create GPU context")?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(context.device(), context.surface_format(), None, 1, false);

        self.gpu = Some(Gpu {
            window,
            context,
            egui_winit,
            egui_renderer,
        });
        self.phase = Phase::Loading(ResourceLoader::new(vec![self.config.texture.clone()]).spawn());
        tracing::info!(texture = %self.config.texture.path.display(), "loading textures");
        Ok(())
    }

    /// Build the scene once textures are in and start both loops.
    fn start_scene(&mut self, resources: Resources) -> Result<Running> {
        let gpu = self.gpu.as_mut().context("GPU context not ready")?;
        let textures = resources.upload(&mut gpu.context);
        let texture = textures.get(&self.config.texture.name).copied();
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let demo = build_demo_scene(
            &self.config,
            &mut gpu.context,
            &mut self.tracker,
            texture,
            &mut rng,
        )?;

        let now = Instant::now();
        let mut render = RenderLoop::new(self.config.program.clone());
        let mut logic = LogicLoop::new(self.config.logic_hz)?;
        let stops = [render.start(now), logic.start(now)];
        tracing::info!(entities = demo.scene.len(), "scene running");
        Ok(Running {
            scene: demo.scene,
            render,
            logic,
            stops,
        })
    }

    fn poll_loading(&mut self) {
        let Phase::Loading(pending) = &mut self.phase else {
            return;
        };
        let Some(result) = pending.try_take() else {
            return;
        };
        let started = result
            .map_err(anyhow::Error::from)
            .and_then(|resources| self.start_scene(resources));
        self.phase = match started {
            Ok(running) => Phase::Running(Box::new(running)),
            Err(e) => {
                tracing::error!("unable to start scene: {e:#}");
                Phase::Failed(format!("{e:#}"))
            }
        };
    }

    /// Stop both loops, drop listeners and the scene, then the GPU context.
    fn unmount(&mut self) {
        if let Phase::Running(running) = &self.phase {
            for stop in &running.stops {
                stop.stop();
            }
        }
        self.tracker.clear_listeners();
        self.phase = Phase::Closed;
        if self.gpu.take().is_some() {
            tracing::info!("unmounted");
        }
    }

    fn redraw(&mut self) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let size = gpu.window.inner_size();
        match &mut self.phase {
            Phase::Running(running) => {
                running.render.tick(
                    Instant::now(),
                    (size.width, size.height),
                    &mut running.scene,
                    &mut gpu.context,
                    &mut self.programs,
                );
            }
            _ => gpu.context.clear(),
        }

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if self.show_overlay {
                draw_overlay(ctx, &self.phase);
            }
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);
        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let (width, height) = gpu.context.drawing_buffer_size();
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };
        let textures = full_output.textures_delta;

        let Gpu {
            window,
            context,
            egui_renderer,
            ..
        } = gpu;
        let presented = context.present(|device, queue, encoder, view| {
            for (id, delta) in &textures.set {
                egui_renderer.update_texture(device, queue, *id, delta);
            }
            egui_renderer.update_buffers(device, queue, encoder, &paint_jobs, &screen);
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen);
        });
        for id in &textures.free {
            egui_renderer.free_texture(id);
        }
        if let Err(e) = presented {
            tracing::error!("frame not presented: {e}");
        }
        window.request_redraw();
    }

    fn key(&mut self, code: KeyCode, state: ElementState) {
        if code == KeyCode::F1 && state == ElementState::Pressed {
            self.show_overlay = !self.show_overlay;
        }
        let Some(id) = keymap::input_id(code) else {
            return;
        };
        let Phase::Running(running) = &mut self.phase else {
            return;
        };
        match state {
            ElementState::Pressed => {
                self.tracker.key_down(id, Instant::now(), &mut running.scene);
            }
            ElementState::Released => self.tracker.key_up(id, &mut running.scene),
        }
    }

    fn mouse_button(&mut self, state: ElementState) {
        let Phase::Running(running) = &mut self.phase else {
            return;
        };
        let now = Instant::now();
        match state {
            ElementState::Pressed => self.tracker.mouse_down(self.cursor, now, &mut running.scene),
            ElementState::Released => self.tracker.mouse_up(self.cursor, now, &mut running.scene),
        }
    }

    fn cursor_moved(&mut self, at: Vec2) {
        self.cursor = at;
        if let Phase::Running(running) = &mut self.phase {
            self.tracker.mouse_move(at, Instant::now(), &mut running.scene);
        }
    }
}

fn draw_overlay(ctx: &EguiContext, phase: &Phase) {
    egui::Window::new("cubescape")
        .default_pos([12.0, 12.0])
        .resizable(false)
        .show(ctx, |ui| match phase {
            Phase::Unmounted | Phase::Loading(_) => {
                ui.label("Loading textures...");
            }
            Phase::Running(running) => {
                let summary = SceneInspector::summary(&running.scene);
                ui.label(format!("Frame rate: {}", running.render.frame_rate()));
                ui.label(format!(
                    "Entities: {}  moving: {}",
                    summary.entity_count, summary.in_motion
                ));
                ui.label(format!("Logic ticks: {}", running.logic.ticks()));
                if summary.camera_dragging {
                    ui.label("Dragging camera");
                }
                ui.separator();
                ui.small("WASD: thrust | Space: stop | Arrows: spin");
                ui.small("Drag: turn camera (Shift freezes) | F1: overlay");
            }
            Phase::Failed(message) => {
                ui.colored_label(egui::Color32::LIGHT_RED, "Unable to start");
                ui.label(message.as_str());
            }
            Phase::Closed => {}
        });
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        if let Err(e) = self.mount(event_loop) {
            tracing::error!("mount failed: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.unmount();
                event_loop.exit();
            }
            WindowEvent::Resized(_) => {
                if let Some(gpu) = &self.gpu {
                    gpu.window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => self.key(code, state),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => self.mouse_button(state),
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.poll_loading();
        if let Phase::Running(running) = &mut self.phase {
            running.logic.poll(Instant::now(), &mut running.scene);
        }
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.unmount();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if let Some(texture) = cli.texture {
        config.texture.path = texture;
    }
    tracing::info!(
        cubes = config.cube_count,
        program = %config.program,
        "cubescape-desktop starting"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, cli.seed);
    event_loop.run_app(&mut app)?;

    Ok(())
}
