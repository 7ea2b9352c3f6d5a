//! Per-frame simulation loop.
//!
//! Tick order is fixed: wave time, floaters, camera, viewport, render. The
//! renderer sees wave time and floater poses from the same tick.

use anyhow::Result;

use crate::camera::OrbitCamera;
use crate::floater::FloaterController;
use crate::lighting::LightingState;
use crate::ocean::WaveField;

/// Longest step fed to the simulation (seconds). Longer gaps (window
/// dragged, debugger pause) are treated as one slow frame.
pub const MAX_FRAME_DT: f32 = 0.1;

/// Frame delta bookkeeping
#[derive(Debug, Clone, Default)]
pub struct SimulationClock {
    elapsed_s: f64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sanitise a raw frame delta and accumulate it.
    ///
    /// Negative or non-finite deltas become 0; a zero delta is a valid
    /// paused frame.
    pub fn tick(&mut self, raw_dt: f32) -> f32 {
        let dt = if raw_dt.is_finite() {
            raw_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.elapsed_s += f64::from(dt);
        dt
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }
}

/// Shared scene state mutated by the loop
pub struct Scene {
    pub waves: WaveField,
    pub floaters: Vec<FloaterController>,
    pub camera: OrbitCamera,
    pub lighting: LightingState,
}

/// Read-only view of one finished tick, handed to the renderer
pub struct FrameView<'a> {
    pub waves: &'a WaveField,
    pub floaters: &'a [FloaterController],
    pub camera: &'a OrbitCamera,
    pub lighting: &'a LightingState,
    /// Wave time for this frame (seconds)
    pub time: f32,
    /// Current surface size (pixels)
    pub viewport: (u32, u32),
}

/// Renderer side of the loop
pub trait FrameSink {
    /// Resize surfaces; called only when the viewport actually changed
    fn reconcile_viewport(&mut self, width: u32, height: u32);

    fn render(&mut self, frame: &FrameView) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// Renderer or initial bake not ready yet
    Uninitialized,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Loop not started; nothing touched
    Skipped,
    /// Frame simulated and rendered with this delta
    Rendered { dt: f32 },
}

pub struct SimulationLoop {
    phase: LoopPhase,
    clock: SimulationClock,
    viewport: Option<(u32, u32)>,
}

impl Default for SimulationLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationLoop {
    pub fn new() -> Self {
        Self {
            phase: LoopPhase::Uninitialized,
            clock: SimulationClock::new(),
            viewport: None,
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Begin ticking. Call once the renderer exists and the first bake is done.
    pub fn start(&mut self) {
        match self.phase {
            LoopPhase::Uninitialized => {
                log::info!("Simulation running");
                self.phase = LoopPhase::Running;
            }
            LoopPhase::Running => log::warn!("Simulation already running"),
        }
    }

    /// Run one frame.
    pub fn tick(
        &mut self,
        scene: &mut Scene,
        raw_dt: f32,
        viewport: (u32, u32),
        sink: &mut impl FrameSink,
    ) -> Result<TickOutcome> {
        if self.phase == LoopPhase::Uninitialized {
            return Ok(TickOutcome::Skipped);
        }

        let dt = self.clock.tick(raw_dt);

        // 1. Wave time
        scene.waves.advance(dt);
        let time = scene.waves.time();

        // 2. Floaters sample this tick's surface
        for floater in &mut scene.floaters {
            floater.update(&scene.waves, time, dt);
        }

        // 3. Camera
        scene.camera.update(dt);

        // 4. Viewport, on change only
        if self.viewport != Some(viewport) {
            log::debug!("Viewport {}x{}", viewport.0, viewport.1);
            sink.reconcile_viewport(viewport.0, viewport.1);
            self.viewport = Some(viewport);
        }

        // 5. Render
        sink.render(&FrameView {
            waves: &scene.waves,
            floaters: &scene.floaters,
            camera: &scene.camera,
            lighting: &scene.lighting,
            time,
            viewport,
        })?;

        Ok(TickOutcome::Rendered { dt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::floater::{HullGeometry, Pose};
    use crate::params::{FloaterConfig, HullShape, OrbitCameraConfig};
    use glam::Vec3;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Resize(u32, u32),
        Render { time: f32, floater_y: Vec<f32>, eye: Vec3 },
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<Event>,
        fail: bool,
    }

    impl FrameSink for RecordingSink {
        fn reconcile_viewport(&mut self, width: u32, height: u32) {
            self.events.push(Event::Resize(width, height));
        }

        fn render(&mut self, frame: &FrameView) -> Result<()> {
            if self.fail {
                anyhow::bail!("device lost");
            }
            self.events.push(Event::Render {
                time: frame.time,
                floater_y: frame.floaters.iter().map(|f| f.pose().position.y).collect(),
                eye: frame.camera.eye(),
            });
            Ok(())
        }
    }

    fn scene() -> Scene {
        let hull = HullGeometry::build(HullShape::Crate, 1.0);
        let floaters = (0..3)
            .map(|i| {
                let mut f = FloaterController::pending(
                    FloaterConfig::default(),
                    Pose::at(Vec3::new(i as f32 * 20.0, 5.0, 0.0)),
                );
                f.attach_geometry(&hull);
                f
            })
            .collect();
        Scene {
            waves: WaveField::default(),
            floaters,
            camera: OrbitCamera::new(OrbitCameraConfig::default()),
            lighting: LightingState::default(),
        }
    }

    fn running() -> SimulationLoop {
        let mut sim = SimulationLoop::new();
        sim.start();
        sim
    }

    #[test]
    fn test_clock_sanitises_deltas() {
        let mut clock = SimulationClock::new();
        assert_eq!(clock.tick(-1.0), 0.0);
        assert_eq!(clock.tick(f32::NAN), 0.0);
        assert_eq!(clock.tick(5.0), MAX_FRAME_DT);
        assert_eq!(clock.tick(0.0), 0.0);
        assert_eq!(clock.tick(0.02), 0.02);
        assert!((clock.elapsed_s() - 0.12).abs() < 1e-6);
    }

    #[test]
    fn test_uninitialized_tick_is_skipped() {
        let mut sim = SimulationLoop::new();
        let mut scene = scene();
        let mut sink = RecordingSink::default();
        let outcome = sim.tick(&mut scene, 0.016, (800, 600), &mut sink);
        assert_eq!(outcome.ok(), Some(TickOutcome::Skipped));
        assert!(sink.events.is_empty());
        assert_eq!(scene.waves.time(), 0.0);
        assert_eq!(sim.phase(), LoopPhase::Uninitialized);
    }

    #[test]
    fn test_start_is_one_way() {
        let mut sim = running();
        sim.start();
        assert_eq!(sim.phase(), LoopPhase::Running);
    }

    #[test]
    fn test_render_sees_same_tick_state() {
        let mut sim = running();
        let mut scene = scene();
        let mut sink = RecordingSink::default();

        let outcome = sim.tick(&mut scene, 0.016, (800, 600), &mut sink);
        assert_eq!(outcome.ok(), Some(TickOutcome::Rendered { dt: 0.016 }));

        let expected_y: Vec<f32> = scene.floaters.iter().map(|f| f.pose().position.y).collect();
        assert_eq!(
            sink.events,
            vec![
                Event::Resize(800, 600),
                Event::Render {
                    time: 0.016,
                    floater_y: expected_y,
                    eye: scene.camera.eye(),
                },
            ]
        );
        // Floaters moved before the render read them
        assert!(scene.floaters.iter().all(|f| f.pose().position.y != 5.0));
    }

    #[test]
    fn test_camera_updates_before_render() {
        let mut sim = running();
        let mut scene = scene();
        let mut sink = RecordingSink::default();
        let before = scene.camera.eye();
        scene.camera.rotate(300.0, 0.0);

        assert!(sim.tick(&mut scene, 0.016, (800, 600), &mut sink).is_ok());
        match sink.events.last() {
            Some(Event::Render { eye, .. }) => assert_ne!(*eye, before),
            other => panic!("expected render, got {:?}", other),
        }
    }

    #[test]
    fn test_viewport_reconciled_only_on_change() {
        let mut sim = running();
        let mut scene = scene();
        let mut sink = RecordingSink::default();

        for size in [(800, 600), (800, 600), (800, 600), (1024, 768), (1024, 768)] {
            assert!(sim.tick(&mut scene, 0.016, size, &mut sink).is_ok());
        }
        let resizes: Vec<&Event> = sink
            .events
            .iter()
            .filter(|e| matches!(e, Event::Resize(..)))
            .collect();
        assert_eq!(resizes, vec![&Event::Resize(800, 600), &Event::Resize(1024, 768)]);
    }

    #[test]
    fn test_zero_dt_frame_still_renders_without_motion() {
        let mut sim = running();
        let mut scene = scene();
        let mut sink = RecordingSink::default();
        assert!(sim.tick(&mut scene, 0.016, (800, 600), &mut sink).is_ok());
        let poses: Vec<Pose> = scene.floaters.iter().map(|f| *f.pose()).collect();
        let time = scene.waves.time();

        let outcome = sim.tick(&mut scene, 0.0, (800, 600), &mut sink);
        assert_eq!(outcome.ok(), Some(TickOutcome::Rendered { dt: 0.0 }));
        assert_eq!(scene.waves.time(), time);
        let after: Vec<Pose> = scene.floaters.iter().map(|f| *f.pose()).collect();
        assert_eq!(after, poses);
        assert_eq!(sink.events.len(), 3);
    }

    #[test]
    fn test_render_failure_propagates() {
        let mut sim = running();
        let mut scene = scene();
        let mut sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        assert!(sim.tick(&mut scene, 0.016, (800, 600), &mut sink).is_err());
    }

    #[test]
    fn test_inactive_floaters_are_left_alone() {
        let mut sim = running();
        let mut scene = scene();
        scene.floaters[1].set_active(false);
        let parked = *scene.floaters[1].pose();
        let mut sink = RecordingSink::default();
        for _ in 0..10 {
            assert!(sim.tick(&mut scene, 0.016, (800, 600), &mut sink).is_ok());
        }
        assert_eq!(*scene.floaters[1].pose(), parked);
    }
}
