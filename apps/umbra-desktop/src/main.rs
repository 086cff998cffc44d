use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use umbra_assets::{LoadErrors, ResourceKind, load_scene_assets};
use umbra_common::DemoConfig;
use umbra_input::{Action, Key, MouseLook, action_for_key};
use umbra_render::{FrameOrchestrator, RenderError, ShadingMode};
use umbra_render_wgpu::{GpuGeometry, WgpuRenderer, upload_scene};
use umbra_scene::{Camera, FrameClock, Scene};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "umbra-desktop", about = "Real-time shadow mapping demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML file overriding the built-in demo configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Everything that changes frame to frame, apart from GPU handles.
struct AppState {
    camera: Camera,
    scene: Scene<GpuGeometry>,
    orchestrator: FrameOrchestrator,
    mouse: MouseLook,
    clock: FrameClock,
    move_speed: f32,
    near: f32,
    far: f32,
    show_overlay: bool,
    frame_ms: f32,
}

impl AppState {
    /// Apply one input action. Returns `false` when the app should quit.
    fn handle_action(&mut self, action: Action) -> bool {
        if action.apply_to_camera(&mut self.camera, self.move_speed) {
            return true;
        }
        match action {
            Action::SetShadingMode(index) => match ShadingMode::from_index(index) {
                Ok(mode) => self.orchestrator.set_shading_mode(mode),
                Err(e) => tracing::warn!("{e}"),
            },
            Action::ToggleOverlay => self.show_overlay = !self.show_overlay,
            Action::CycleShadowView => {
                self.orchestrator.cycle_debug_view();
            }
            Action::Quit => return false,
            _ => {}
        }
        true
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_overlay {
            return;
        }

        let position = self.camera.position();
        let target = self.camera.target();
        let light = self.orchestrator.light_position();
        let current = self.orchestrator.shading_mode();

        egui::SidePanel::left("overlay")
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("umbra");
                ui.separator();
                ui.label(format!(
                    "Camera: ({:.1}, {:.1}, {:.1})",
                    position.x, position.y, position.z
                ));
                ui.label(format!(
                    "Looking: ({:.2}, {:.2}, {:.2})",
                    target.x, target.y, target.z
                ));
                ui.label(format!("Light: ({:.1}, {:.1}, {:.1})", light.x, light.y, light.z));
                ui.label(format!(
                    "Frame: {:.2} ms  ({} objects)",
                    self.frame_ms,
                    self.scene.len()
                ));
                ui.separator();

                ui.heading("Shading");
                for (mode, key) in ShadingMode::ALL.into_iter().zip(["Z", "X", "C", "V", "B"]) {
                    let label = format!("{} ({key})", mode.label());
                    if ui.selectable_label(mode == current, label).clicked() {
                        self.orchestrator.set_shading_mode(mode);
                    }
                }
                ui.separator();
                ui.label(format!(
                    "Shadow map: {} (F2)",
                    self.orchestrator.debug_view().label()
                ));

                ui.separator();
                ui.small("F1: Toggle Overlay | RMB: Look | WASD: Move | Esc: Quit");
            });
    }
}

/// Window, surface and every GPU object the app owns.
struct GpuContext {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    config: DemoConfig,
    base_dir: PathBuf,
    gpu: Option<GpuContext>,
    state: Option<AppState>,
    egui_ctx: EguiContext,
    failed: bool,
}

impl GpuApp {
    fn new(config: DemoConfig, base_dir: PathBuf) -> Self {
        Self {
            config,
            base_dir,
            gpu: None,
            state: None,
            egui_ctx: EguiContext::default(),
            failed: false,
        }
    }

    /// Create the window and device, then load every resource the config
    /// names. All loading failures are collected into one error.
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_config = &self.config.window;
        let attrs = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("umbra_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        let mut errors = LoadErrors::new();
        let assets = match load_scene_assets(&self.config, &self.base_dir) {
            Ok(assets) => Some(assets),
            Err(e) => {
                errors.merge(e);
                None
            }
        };
        let mut renderer = match WgpuRenderer::new(
            &device,
            &queue,
            surface_format,
            surface_config.width,
            surface_config.height,
            &self.config,
        ) {
            Ok(renderer) => Some(renderer),
            Err(e) => {
                errors.push(resource_kind(&e), "renderer", e);
                None
            }
        };
        let mut scene = None;
        if let Some(assets) = &assets {
            if let Some(renderer) = renderer.as_mut() {
                errors.check(
                    ResourceKind::GpuResource,
                    "material textures",
                    renderer.set_textures(&device, &queue, &assets.diffuse, &assets.normal),
                );
            }
            match upload_scene(&device, &self.config, &assets.meshes) {
                Ok(uploaded) => scene = Some(uploaded),
                Err(e) => errors.merge(e),
            }
        }
        errors.into_result()?;
        let (Some(renderer), Some(scene)) = (renderer, scene) else {
            anyhow::bail!("startup resources missing");
        };

        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        let orchestrator = FrameOrchestrator::new(&self.config, alignment)?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        let camera_config = &self.config.camera;
        self.state = Some(AppState {
            camera: Camera::from_config(camera_config, surface_config.width, surface_config.height),
            scene,
            orchestrator,
            mouse: MouseLook::new(camera_config.rotate_speed),
            clock: FrameClock::new(),
            move_speed: camera_config.move_speed,
            near: camera_config.near,
            far: camera_config.far,
            show_overlay: self.config.debug.overlay,
            frame_ms: 0.0,
        });
        self.gpu = Some(GpuContext {
            window,
            surface,
            device,
            queue,
            surface_config,
            renderer,
            egui_winit,
            egui_renderer,
        });
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        self.failed = true;
        event_loop.exit();
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        let (Some(gpu), Some(state)) = (&mut self.gpu, &mut self.state) else {
            return Ok(());
        };
        if width == 0 || height == 0 {
            return Ok(());
        }
        gpu.surface_config.width = width;
        gpu.surface_config.height = height;
        gpu.surface.configure(&gpu.device, &gpu.surface_config);
        state
            .camera
            .set_properties(width as f32, height as f32, state.near, state.far);
        gpu.renderer.resize(&gpu.device, width, height)
    }

    fn redraw(&mut self) -> Result<(), RenderError> {
        let (Some(gpu), Some(state)) = (&mut self.gpu, &mut self.state) else {
            return Ok(());
        };
        let time = state.clock.tick();
        state.frame_ms = time.delta * 1000.0;

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.surface_config);
                return Ok(());
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return Ok(());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let frame = state
            .orchestrator
            .plan_frame(time, &mut state.scene, &state.camera)?;
        gpu.renderer
            .render(&gpu.device, &gpu.queue, &view, &frame, &state.scene)?;

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.surface_config.width, gpu.surface_config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
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
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
        Ok(())
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() || self.failed {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
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
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Err(e) = self.resize(new_size.width, new_size.height) {
                    self.fail(event_loop, e.into());
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                let (Some(key), Some(state)) = (map_key(code), &mut self.state) else {
                    return;
                };
                if !state.handle_action(action_for_key(key)) {
                    event_loop.exit();
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: button_state,
                ..
            } => {
                if let Some(state) = &mut self.state {
                    state
                        .mouse
                        .set_dragging(button_state == ElementState::Pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(state) = &mut self.state {
                    if let Some(action) = state.mouse.cursor_moved(position.x, position.y) {
                        state.handle_action(action);
                    }
                }
            }
            WindowEvent::CursorLeft { .. } => {
                if let Some(state) = &mut self.state {
                    state.mouse.reset();
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e.into());
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyZ => Key::Z,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyB => Key::B,
        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    })
}

fn resource_kind(error: &RenderError) -> ResourceKind {
    match error {
        RenderError::Shader { .. } => ResourceKind::Shader,
        _ => ResourceKind::GpuResource,
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("umbra-desktop starting");

    let (config, base_dir) = match &cli.config {
        Some(path) => {
            let config = DemoConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            let base_dir = path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            (config, base_dir)
        }
        None => (DemoConfig::default(), PathBuf::from(".")),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config, base_dir);
    event_loop.run_app(&mut app)?;

    if app.failed {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_common::CameraConfig;
    use umbra_scene::glam::Vec3;

    #[test]
    fn demo_keys_are_bound() {
        assert_eq!(map_key(KeyCode::KeyW), Some(Key::W));
        assert_eq!(map_key(KeyCode::KeyB), Some(Key::B));
        assert_eq!(map_key(KeyCode::F2), Some(Key::F2));
        assert_eq!(map_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn startup_camera_looks_along_unit_target() {
        let config = CameraConfig::default();
        let camera = Camera::from_config(&config, 800, 600);
        assert_eq!(camera.position(), config.position);
        assert!(camera.target().abs_diff_eq(config.target.normalize(), 1e-6));
        assert!((camera.target().length() - 1.0).abs() < 1e-5);
        assert_ne!(camera.target(), Vec3::ZERO);
    }

    #[test]
    fn shader_failures_are_reported_as_shaders() {
        let shader = RenderError::Shader {
            name: "scene_shader",
            message: "parse error".into(),
        };
        assert_eq!(resource_kind(&shader), ResourceKind::Shader);
        let buffer = RenderError::ResourceCreation {
            resource: "uniform buffers",
            message: "out of memory".into(),
        };
        assert_eq!(resource_kind(&buffer), ResourceKind::GpuResource);
    }
}
