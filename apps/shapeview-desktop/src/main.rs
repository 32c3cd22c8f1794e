use anyhow::{Context, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use shapeview_geometry::MAX_ICOSPHERE_LEVEL;
use shapeview_render::{Drawable, ShaderKind};
use shapeview_render_wgpu::WgpuRenderer;
use shapeview_scene::{App, Controls, FrameTimer, GeometryKind};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{
    DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "shapeview-desktop", about = "Procedural mesh viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initial window width
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height
    #[arg(long, default_value = "720")]
    height: u32,

    /// JSON controls preset
    #[arg(long)]
    controls: Option<PathBuf>,

    /// Initial icosphere subdivision level (0-8)
    #[arg(short, long)]
    tessellation: Option<u32>,

    /// Initial shader: Lambert or Special
    #[arg(short, long)]
    shader: Option<ShaderKind>,

    /// Initial geometry: Cube, Sphere or Square
    #[arg(short, long)]
    geometry: Option<GeometryKind>,
}

impl Cli {
    fn initial_controls(&self) -> Result<Controls> {
        let mut controls = match &self.controls {
            Some(path) => Controls::from_json_file(path)
                .with_context(|| format!("loading controls preset {}", path.display()))?,
            None => Controls::default(),
        };
        if let Some(t) = self.tessellation {
            controls.tessellation = t;
        }
        if let Some(s) = self.shader {
            controls.shader = s;
        }
        if let Some(g) = self.geometry {
            controls.geometry = g;
        }
        Ok(controls.clamped())
    }
}

/// Host-side state: the panel's controls, input, and frame timing.
struct UiState {
    controls: Controls,
    show_panel: bool,
    reload_requested: bool,
    dragging: bool,
    timer: FrameTimer,
    last_frame: Instant,
}

/// Figures shown in the stats overlay, captured before the UI pass.
struct OverlayStats {
    fps: f32,
    avg_ms: f32,
    max_ms: f32,
    vertices: u32,
    triangles: u32,
}

impl UiState {
    fn new(controls: Controls) -> Self {
        Self {
            controls,
            show_panel: true,
            reload_requested: false,
            dragging: false,
            timer: FrameTimer::new(120),
            last_frame: Instant::now(),
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::F1 => self.show_panel = !self.show_panel,
            KeyCode::F5 => self.reload_requested = true,
            _ => {}
        }
    }

    /// A press starts an orbit drag only when the UI did not take it. Any
    /// release ends the drag, including one over the panel.
    fn handle_left_button(&mut self, state: ElementState, consumed_by_ui: bool) {
        match state {
            ElementState::Pressed if !consumed_by_ui => self.dragging = true,
            ElementState::Pressed => {}
            ElementState::Released => self.dragging = false,
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext, stats: &OverlayStats) {
        egui::Window::new("stats")
            .title_bar(false)
            .resizable(false)
            .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
            .show(ctx, |ui| {
                ui.monospace(format!("{:>5.0} fps", stats.fps));
                ui.monospace(format!("avg {:.2} ms  max {:.2} ms", stats.avg_ms, stats.max_ms));
                ui.monospace(format!("{} verts  {} tris", stats.vertices, stats.triangles));
            });

        if !self.show_panel {
            return;
        }

        let controls = &mut self.controls;
        egui::SidePanel::right("controls")
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Controls");
                ui.separator();

                ui.add(
                    egui::Slider::new(&mut controls.tessellation, 0..=MAX_ICOSPHERE_LEVEL)
                        .text("tessellation"),
                );
                if ui.button("Load Scene (F5)").clicked() {
                    self.reload_requested = true;
                }

                egui::ComboBox::from_label("Shader")
                    .selected_text(controls.shader.name())
                    .show_ui(ui, |ui| {
                        for kind in ShaderKind::ALL {
                            ui.selectable_value(&mut controls.shader, kind, kind.name());
                        }
                    });

                egui::ComboBox::from_label("Geometry")
                    .selected_text(controls.geometry.name())
                    .show_ui(ui, |ui| {
                        for kind in GeometryKind::ALL {
                            ui.selectable_value(&mut controls.geometry, kind, kind.name());
                        }
                    });

                ui.horizontal(|ui| {
                    ui.label("Color");
                    ui.color_edit_button_srgb(&mut controls.color.0);
                });

                ui.separator();
                ui.small("F1: Toggle Panel | LMB drag: Orbit | Wheel: Zoom");
            });
    }
}

struct GpuApp {
    state: UiState,
    initial_size: PhysicalSize<u32>,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<Arc<wgpu::Device>>,
    queue: Option<Arc<wgpu::Queue>>,
    config: Option<wgpu::SurfaceConfiguration>,
    app: Option<App<WgpuRenderer>>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    fatal: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(controls: Controls, width: u32, height: u32) -> Self {
        Self {
            state: UiState::new(controls),
            initial_size: PhysicalSize::new(width, height),
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            app: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
            fatal: None,
        }
    }

    /// Create the window, graphics context, renderer and scene. Any failure
    /// here is unrecoverable.
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("shapeview")
            .with_inner_size(self.initial_size);
        let window = Arc::new(event_loop.create_window(attrs).context("creating window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("creating surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no graphics adapter supports this window"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("shapeview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("creating graphics device")?;
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no texture formats"))?;

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

        let renderer = WgpuRenderer::new(
            device.clone(),
            queue.clone(),
            surface_format,
            config.width,
            config.height,
        )?;
        let mut app = App::new(renderer, &self.state.controls)?;
        app.resize(config.width, config.height);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
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

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.app = Some(app);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if let (Some(surface), Some(device), Some(config)) =
            (&self.surface, &self.device, &mut self.config)
        {
            config.width = new_size.width.max(1);
            config.height = new_size.height.max(1);
            surface.configure(device, config);
            if let Some(app) = &mut self.app {
                app.resize(config.width, config.height);
            }
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        self.state.timer.record(now - self.state.last_frame);
        self.state.last_frame = now;

        let (
            Some(window),
            Some(surface),
            Some(device),
            Some(queue),
            Some(config),
            Some(app),
            Some(egui_winit),
            Some(egui_renderer),
        ) = (
            &self.window,
            &self.surface,
            &self.device,
            &self.queue,
            &self.config,
            &mut self.app,
            &mut self.egui_winit,
            &mut self.egui_renderer,
        )
        else {
            return;
        };

        if std::mem::take(&mut self.state.reload_requested) {
            if let Err(e) = app.reload_scene(&self.state.controls) {
                tracing::error!("scene reload failed: {e}");
            }
        }

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(device, config);
                window.request_redraw();
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                window.request_redraw();
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let Err(e) = app.tick(&self.state.controls, &view) {
            tracing::error!("frame failed: {e}");
        }

        let drawn = app.meshes().drawable(self.state.controls.geometry);
        let stats = OverlayStats {
            fps: self.state.timer.fps(),
            avg_ms: self.state.timer.average().as_secs_f32() * 1000.0,
            max_ms: self.state.timer.max().as_secs_f32() * 1000.0,
            vertices: drawn.vertex_count(),
            triangles: drawn.index_count() / 3,
        };

        let raw_input = egui_winit.take_egui_input(window);
        let state = &mut self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx, &stats);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
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
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
        // Schedule the next frame.
        window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("startup failed: {e:#}");
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let consumed = match (&mut self.egui_winit, &self.window) {
            (Some(egui_winit), Some(window)) => {
                egui_winit.on_window_event(window, &event).consumed
            }
            _ => false,
        };
        if let WindowEvent::MouseInput {
            button: MouseButton::Left,
            state,
            ..
        } = event
        {
            self.state.handle_left_button(state, consumed);
        }
        if consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.resize(new_size);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.state.handle_key(key);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 40.0,
                };
                if let Some(app) = &mut self.app {
                    app.camera_mut().zoom(amount);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.dragging {
                if let Some(app) = &mut self.app {
                    app.camera_mut().orbit(delta.0 as f32, delta.1 as f32);
                }
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let controls = cli.initial_controls()?;
    tracing::info!(?controls, "shapeview-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = GpuApp::new(controls, cli.width, cli.height);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_over_panel_ends_drag() {
        let mut state = UiState::new(Controls::default());
        state.handle_left_button(ElementState::Pressed, false);
        assert!(state.dragging);
        state.handle_left_button(ElementState::Released, true);
        assert!(!state.dragging);
    }

    #[test]
    fn press_on_panel_does_not_orbit() {
        let mut state = UiState::new(Controls::default());
        state.handle_left_button(ElementState::Pressed, true);
        assert!(!state.dragging);
    }

    #[test]
    fn function_keys_toggle_panel_and_request_reload() {
        let mut state = UiState::new(Controls::default());
        state.handle_key(KeyCode::F1);
        assert!(!state.show_panel);
        state.handle_key(KeyCode::F5);
        assert!(state.reload_requested);
    }
}
