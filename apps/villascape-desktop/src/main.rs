use anyhow::{Context, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use villascape_input::{Action, Applied};
use villascape_kernel::{SceneConfig, SceneContext};
use villascape_render::FrameDriver;
use villascape_render_wgpu::{OrbitControls, WgpuFrame, WgpuRenderer};
use villascape_tools::SceneInspector;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

/// Longest frame fed to the scene, so a stalled window doesn't jump the pan.
const MAX_FRAME: Duration = Duration::from_millis(100);

/// Pixels of trackpad scroll per wheel notch.
const PIXELS_PER_NOTCH: f32 = 50.0;

#[derive(Parser)]
#[command(name = "villascape-desktop", about = "Villa scene desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for prop placement (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Hour of day at startup (overrides the config)
    #[arg(long)]
    hour: Option<f32>,
}

impl Cli {
    fn scene_config(&self) -> Result<SceneConfig> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SceneConfig::default(),
        };
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(hour) = self.hour {
            config.start_hour.0 = hour;
        }
        Ok(config)
    }
}

/// Application state.
struct AppState {
    ctx: SceneContext,
    driver: FrameDriver,
    orbit: OrbitControls,
    show_controls: bool,
    // Input state
    dragging: bool,
    last_cursor: Option<Vec2>,
    last_frame: Instant,
}

impl AppState {
    fn new(ctx: SceneContext) -> Self {
        Self {
            ctx,
            driver: FrameDriver::new(),
            orbit: OrbitControls::default(),
            show_controls: true,
            dragging: false,
            last_cursor: None,
            last_frame: Instant::now(),
        }
    }

    fn frame_time(&mut self) -> Duration {
        let now = Instant::now();
        let dt = (now - self.last_frame).min(MAX_FRAME);
        self.last_frame = now;
        dt
    }

    /// Apply an action. Returns false when the app should exit.
    fn handle_action(&mut self, action: Action) -> bool {
        match action.apply(&mut self.ctx.controls) {
            Ok(Applied::Handled) => {}
            Ok(Applied::Forward) => match action {
                Action::Orbit(delta) => self.orbit.rotate(delta.x, delta.y),
                Action::Zoom(notches) => self.orbit.zoom(notches),
                Action::ToggleControls => self.show_controls = !self.show_controls,
                Action::Quit => return false,
                _ => {}
            },
            Err(e) => tracing::warn!("ignored {action:?}: {e}"),
        }
        true
    }

    fn draw_ui(&mut self, ui_ctx: &EguiContext) {
        if !self.show_controls {
            return;
        }

        let summary = SceneInspector::summary(&self.ctx);
        let fps = self.driver.frame_timer().fps();

        egui::SidePanel::left("controls")
            .default_width(260.0)
            .show(ui_ctx, |ui| {
                ui.heading("Villa");
                ui.separator();
                ui.label(format!("Tick: {}  FPS: {fps:.0}", summary.tick));
                ui.label(format!(
                    "Parts: {}  Houses: {}  Trees: {}",
                    summary.parts, summary.houses, summary.trees
                ));
                ui.label(format!(
                    "Camera: {:?} ({:.1}, {:.1}, {:.1})",
                    summary.phase, summary.camera[0], summary.camera[1], summary.camera[2]
                ));
                ui.label(format!("Cloud x: {:.2}", summary.cloud_x));
                if let Some(sun) = SceneInspector::sun(&self.ctx) {
                    ui.label(sun.to_string());
                }
                ui.separator();

                ui.heading("Time");
                let mut hour = summary.hour;
                if ui
                    .add(egui::Slider::new(&mut hour, 0.0..=24.0).step_by(1.0).text("hour"))
                    .changed()
                {
                    self.handle_action(Action::SetHour(hour));
                }
                ui.separator();

                ui.heading("Sun");
                let light = self.ctx.scene.sun_light;
                let mut pos = light.position;
                let mut intensity = light.intensity;
                let moved = [
                    ui.add(egui::Slider::new(&mut pos.x, -10.0..=10.0).text("x")),
                    ui.add(egui::Slider::new(&mut pos.y, -10.0..=30.0).text("y")),
                    ui.add(egui::Slider::new(&mut pos.z, -10.0..=10.0).text("z")),
                ]
                .iter()
                .any(|r| r.changed());
                if moved {
                    self.ctx.controls.light.position = Some(pos);
                }
                if ui
                    .add(egui::Slider::new(&mut intensity, 0.0..=1.0).text("intensity"))
                    .changed()
                {
                    self.ctx.controls.light.intensity = Some(intensity);
                }
                ui.add_enabled_ui(summary.light_overridden, |ui| {
                    if ui.button("Follow sun (R)").clicked() {
                        self.handle_action(Action::ResetLight);
                    }
                });

                ui.separator();
                ui.small("F1: Toggle Panel | LMB: Orbit | Wheel: Zoom | [ ]: Hour");
            });
    }
}

/// Window plus everything bound to its surface.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Villascape")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("villascape_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn draw_egui(
        &mut self,
        egui_ctx: &EguiContext,
        view: &wgpu::TextureView,
        state: &mut AppState,
    ) {
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| state.draw_ui(ctx));
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
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
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(ctx: SceneContext) -> Self {
        Self {
            state: AppState::new(ctx),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn redraw(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let dt = self.state.frame_time();
        gpu.renderer.prepare(&gpu.device, &self.state.ctx.scene);
        let frame = WgpuFrame {
            renderer: &gpu.renderer,
            device: &gpu.device,
            queue: &gpu.queue,
            target: &view,
        };
        self.state
            .driver
            .tick(&mut self.state.ctx, dt, &mut self.state.orbit, &frame);

        gpu.draw_egui(&self.egui_ctx, &view, &mut self.state);

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => {
                let size = gpu.window.inner_size();
                self.state.ctx.camera.set_viewport(size.width, size.height);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
                event_loop.exit();
            }
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

        let action = match event {
            WindowEvent::CloseRequested => Action::Quit,
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                }
                self.state.ctx.camera.set_viewport(size.width, size.height);
                Action::Noop
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match logical_key {
                Key::Named(NamedKey::F1) => Action::ToggleControls,
                Key::Named(NamedKey::Escape) => Action::Quit,
                Key::Character(text) => text.chars().next().map_or(Action::Noop, Action::for_key),
                _ => Action::Noop,
            },
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.state.dragging = state == ElementState::Pressed;
                Action::Noop
            }
            WindowEvent::CursorMoved { position, .. } => {
                let cursor = Vec2::new(position.x as f32, position.y as f32);
                let last = self.state.last_cursor.replace(cursor);
                match last {
                    Some(last) if self.state.dragging => Action::Orbit(cursor - last),
                    _ => Action::Noop,
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.last_cursor = None;
                Action::Noop
            }
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, y) => Action::Zoom(y),
                MouseScrollDelta::PixelDelta(p) => Action::Zoom(p.y as f32 / PIXELS_PER_NOTCH),
            },
            WindowEvent::RedrawRequested => {
                self.redraw();
                Action::Noop
            }
            _ => Action::Noop,
        };

        if !self.state.handle_action(action) {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("villascape-desktop starting");

    let config = cli.scene_config()?;
    let ctx = SceneContext::build(&config)?;
    tracing::info!(
        hour = ctx.controls.hour(),
        sun = ?ctx.scene.sun_light.position,
        "scene ready"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(ctx);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use villascape_render::ViewControls;

    fn state() -> AppState {
        let config = SceneConfig {
            seed: Some(5),
            ..SceneConfig::default()
        };
        AppState::new(SceneContext::build(&config).unwrap())
    }

    #[test]
    fn cli_flags_override_config() {
        let cli = Cli::parse_from(["villascape-desktop", "--seed", "9", "--hour", "20"]);
        let config = cli.scene_config().unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.start_hour.0, 20.0);
    }

    #[test]
    fn quit_and_toggle_actions() {
        let mut s = state();
        assert!(s.handle_action(Action::ToggleControls));
        assert!(!s.show_controls);
        assert!(!s.handle_action(Action::Quit));
    }

    #[test]
    fn panel_hour_is_clamped_like_set_hour() {
        let mut s = state();
        assert!(s.handle_action(Action::SetHour(30.0)));
        assert_eq!(s.ctx.controls.hour(), 24.0);
        assert!(s.handle_action(Action::SetHour(f32::NAN)));
        assert_eq!(s.ctx.controls.hour(), 24.0);
    }

    #[test]
    fn hour_keys_reach_the_controls() {
        let mut s = state();
        s.handle_action(Action::for_key(']'));
        assert_eq!(s.ctx.controls.hour(), 13.0);
    }

    #[test]
    fn orbit_action_feeds_controls() {
        let mut s = state();
        s.handle_action(Action::Orbit(Vec2::new(100.0, 0.0)));
        assert!(!s.orbit.is_idle());
        let before = s.ctx.camera.position;
        s.orbit.update(&mut s.ctx.camera);
        assert_ne!(s.ctx.camera.position, before);
        assert!((s.ctx.camera.position.length() - before.length()).abs() < 1e-3);
    }
}
