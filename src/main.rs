//! seafloat - real-time ocean under an analytic sky
//!
//! Gerstner waves, a baked sky environment for reflections and ambient
//! light, and floating bodies that ride the surface.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, ModifiersState, PhysicalKey},
    window::{Window, WindowId},
};

use seafloat::camera::OrbitCamera;
use seafloat::cli::Args;
use seafloat::environment::EnvironmentBaker;
use seafloat::floater::{AssetLoader, FloaterController, Pose};
use seafloat::lighting::{cycle_wave, EditOutcome, Knob, LightingState, ParameterEdit, WaveKnob};
use seafloat::ocean::WaveField;
use seafloat::params::{HullShape, OceanConfig, OrbitCameraConfig, RenderConfig, WaterAppearance};
use seafloat::rendering::{GpuBakeBackend, RenderSystem};
use seafloat::simulation::{Scene, SimulationLoop};

/// Spacing between floaters spawned in a row (meters)
const FLOATER_SPACING_M: f32 = 25.0;
/// Height floaters are dropped from before the first settle (meters)
const FLOATER_DROP_HEIGHT_M: f32 = 5.0;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    baker: Option<EnvironmentBaker<GpuBakeBackend>>,

    // Simulation
    scene: Scene,
    sim: SimulationLoop,
    loader: AssetLoader,
    hull_shape: HullShape,
    selected_wave: usize,

    // Configuration
    render_config: RenderConfig,
    ocean_config: OceanConfig,

    // Input
    viewport: (u32, u32),
    modifiers: ModifiersState,
    dragging: bool,
    cursor: Option<(f64, f64)>,

    // Time tracking
    last_frame: Instant,
}

impl App {
    fn new(args: &Args) -> Self {
        let render_config = args.render_config();
        let ocean_config = args.ocean_config();
        let floater_config = args.floater_config();
        let hull_shape = args.hull_shape();

        let lighting = LightingState::new(
            args.sun_parameters(),
            args.sky_parameters(),
            WaterAppearance::default(),
        );

        let offset = (args.floaters.saturating_sub(1)) as f32 * 0.5;
        let floaters = (0..args.floaters)
            .map(|i| {
                let x = (i as f32 - offset) * FLOATER_SPACING_M;
                FloaterController::pending(
                    floater_config.clone(),
                    Pose::at(Vec3::new(x, FLOATER_DROP_HEIGHT_M, 0.0)),
                )
            })
            .collect();

        let scene = Scene {
            waves: WaveField::new(ocean_config.waves.clone()),
            floaters,
            camera: OrbitCamera::new(OrbitCameraConfig::default()),
            lighting,
        };

        Self {
            window: None,
            render_system: None,
            baker: None,
            scene,
            sim: SimulationLoop::new(),
            loader: AssetLoader::spawn(hull_shape, floater_config.hull_scale),
            hull_shape,
            selected_wave: 0,
            viewport: (render_config.window_width, render_config.window_height),
            render_config,
            ocean_config,
            modifiers: ModifiersState::empty(),
            dragging: false,
            cursor: None,
            last_frame: Instant::now(),
        }
    }

    /// Window, renderer and the first bake; the loop starts only after all three
    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("seafloat")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("Failed to create window")?,
        );

        let mut render_system = pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &self.render_config,
            &self.ocean_config,
        ))?;

        let mut baker = EnvironmentBaker::new(render_system.bake_backend());
        self.scene
            .lighting
            .bake(&mut baker)
            .context("Initial environment bake failed")?;
        if let Some(bake) = baker.current() {
            render_system.set_environment(bake);
        }

        let size = window.inner_size();
        self.viewport = (size.width, size.height);
        self.window = Some(window);
        self.render_system = Some(render_system);
        self.baker = Some(baker);
        self.last_frame = Instant::now();
        self.sim.start();

        log::info!("seafloat is running");
        log::info!("Drag to orbit, scroll to zoom, arrows move the sun");
        log::info!("T/R/M/G sky knobs (Shift decreases), Space toggles floaters, Esc quits");
        log::info!("W selects a wave, S/L nudge its steepness/wavelength (Shift decreases)");
        Ok(())
    }

    fn apply_edit(&mut self, edit: ParameterEdit) -> Result<()> {
        let (Some(baker), Some(render_system)) =
            (self.baker.as_mut(), self.render_system.as_mut())
        else {
            return Ok(());
        };
        let outcome = self
            .scene
            .lighting
            .apply(edit, &mut self.scene.waves, baker)?;
        if let EditOutcome::Rebaked { .. } = outcome {
            if let Some(bake) = baker.current() {
                render_system.set_environment(bake);
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode, event_loop: &ActiveEventLoop) {
        let sign = if self.modifiers.shift_key() { -1.0 } else { 1.0 };
        let nudge = match code {
            KeyCode::Escape => {
                event_loop.exit();
                return;
            }
            KeyCode::Space => {
                self.toggle_floaters();
                return;
            }
            KeyCode::KeyW => {
                let count = self.scene.waves.components().len();
                self.selected_wave = cycle_wave(self.selected_wave, sign > 0.0, count);
                log::info!("Editing wave {} of {}", self.selected_wave + 1, count);
                return;
            }
            KeyCode::KeyS => {
                self.nudge_wave(WaveKnob::Steepness, 0.02 * sign, event_loop);
                return;
            }
            KeyCode::KeyL => {
                self.nudge_wave(WaveKnob::Wavelength, 2.0 * sign, event_loop);
                return;
            }
            KeyCode::ArrowUp => Some((Knob::Elevation, 1.0)),
            KeyCode::ArrowDown => Some((Knob::Elevation, -1.0)),
            KeyCode::ArrowLeft => Some((Knob::Azimuth, -5.0)),
            KeyCode::ArrowRight => Some((Knob::Azimuth, 5.0)),
            KeyCode::KeyT => Some((Knob::Turbidity, 0.5 * sign)),
            KeyCode::KeyR => Some((Knob::Rayleigh, 0.1 * sign)),
            KeyCode::KeyM => Some((Knob::MieCoefficient, 0.001 * sign)),
            KeyCode::KeyG => Some((Knob::MieDirectionalG, 0.05 * sign)),
            _ => None,
        };

        if let Some((knob, delta)) = nudge {
            let edit = ParameterEdit::nudge(knob, delta, &self.scene.lighting);
            if let Err(e) = self.apply_edit(edit) {
                log::error!("Environment bake failed: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn nudge_wave(&mut self, knob: WaveKnob, delta: f32, event_loop: &ActiveEventLoop) {
        let Some(edit) =
            ParameterEdit::nudge_wave(self.selected_wave, knob, delta, &self.scene.waves)
        else {
            log::warn!("No wave {} to edit", self.selected_wave);
            return;
        };
        if let Err(e) = self.apply_edit(edit) {
            log::error!("Wave edit failed: {:#}", e);
            event_loop.exit();
        }
    }

    fn toggle_floaters(&mut self) {
        for floater in &mut self.scene.floaters {
            let active = floater.is_active();
            floater.set_active(!active);
        }
    }

    /// Render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(render_system) = self.render_system.as_mut() else {
            return;
        };

        if let Some(geometry) = self.loader.poll() {
            for floater in &mut self.scene.floaters {
                floater.attach_geometry(&geometry);
            }
            render_system.set_hull(&geometry, self.hull_shape);
        }

        let now = Instant::now();
        let raw_dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if let Err(e) = self
            .sim
            .tick(&mut self.scene, raw_dt, self.viewport, render_system)
        {
            log::error!("Render error: {:#}", e);
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }
        if let Err(e) = self.initialize(event_loop) {
            log::error!("Startup failed: {:#}", e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                self.viewport = (size.width, size.height);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => self.handle_key(code, event_loop),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some((x, y)) = self.cursor {
                    if self.dragging {
                        self.scene
                            .camera
                            .rotate((position.x - x) as f32, (position.y - y) as f32);
                    }
                }
                self.cursor = Some((position.x, position.y));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / 40.0) as f32,
                };
                self.scene.camera.zoom(lines);
            }
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut app = App::new(&args);

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.run_app(&mut app).context("Event loop failed")?;
    Ok(())
}
