//! Floating bodies that ride the wave field.
//!
//! Each controller samples the field under four footprint corners, derives
//! a target height and up vector, and eases its pose toward them with
//! frame-rate independent exponential smoothing. There is no rigid-body
//! solver: horizontal position never changes and heading is preserved.

mod footprint;
mod hull;

pub use footprint::{support, Footprint, Support};
pub use hull::{Aabb, AssetLoader, HullGeometry, HullVertex};

use glam::{Mat4, Quat, Vec3};

use crate::ocean::WaveField;
use crate::params::FloaterConfig;

/// Position and orientation of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    /// Object-to-world transform
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    /// Local +Y in world space
    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// Rotation about +Y that remains after removing tilt (radians, 0 = facing +Z)
    pub fn heading(&self) -> f32 {
        let untilt = Quat::from_rotation_arc(self.up(), Vec3::Y);
        let forward = untilt * self.orientation * Vec3::Z;
        forward.x.atan2(forward.z)
    }
}

/// Drives one body's pose from the wave field.
#[derive(Debug, Clone)]
pub struct FloaterController {
    config: FloaterConfig,
    pose: Pose,
    footprint: Option<Footprint>,
    active: bool,
}

impl FloaterController {
    /// A floater waiting for its geometry; inactive until
    /// [`attach_geometry`](Self::attach_geometry).
    pub fn pending(config: FloaterConfig, pose: Pose) -> Self {
        Self {
            config,
            pose,
            footprint: None,
            active: false,
        }
    }

    /// Fix the footprint from the hull's bounds and start floating.
    pub fn attach_geometry(&mut self, geometry: &HullGeometry) {
        let footprint = Footprint::from_bounds(&geometry.bounds(), self.config.footprint_inset);
        log::debug!("Floater footprint {:?}", footprint.corners);
        self.footprint = Some(footprint);
        self.active = true;
    }

    /// Enable or pause physics. A floater without geometry stays inactive.
    pub fn set_active(&mut self, active: bool) {
        if active && self.footprint.is_none() {
            log::debug!("Floater geometry not loaded yet, staying inactive");
            return;
        }
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active && self.footprint.is_some()
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn footprint(&self) -> Option<&Footprint> {
        self.footprint.as_ref()
    }

    /// Angle between the body's up axis and world +Y (radians)
    pub fn tilt(&self) -> f32 {
        self.pose.up().dot(Vec3::Y).clamp(-1.0, 1.0).acos()
    }

    /// Ease the pose toward equilibrium with the surface at `time`.
    ///
    /// No-op while inactive and for `dt <= 0` (paused frames), so a zero step
    /// leaves the pose bit-for-bit unchanged.
    pub fn update(&mut self, field: &WaveField, time: f32, dt: f32) {
        if !self.is_active() || !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let Some(footprint) = self.footprint else {
            return;
        };

        let heading = Quat::from_rotation_y(self.pose.heading());
        let points = footprint.sample(self.pose.position, heading, field, time);
        let target = support(&points);

        let target_y = target.mean_height + self.config.rest_offset_m;

        let height_blend = approach(self.config.buoyancy_strength, dt);
        let tilt_blend = approach(self.config.orientation_strength, dt);

        self.pose.position.y += (target_y - self.pose.position.y) * height_blend;

        // Blend tilt only, then re-apply the heading so yaw never drifts
        let current_tilt = Quat::from_rotation_arc(Vec3::Y, self.pose.up());
        let target_tilt = Quat::from_rotation_arc(Vec3::Y, target.up);
        let up = (current_tilt.slerp(target_tilt, tilt_blend) * Vec3::Y)
            .try_normalize()
            .unwrap_or(Vec3::Y);
        self.pose.orientation = (Quat::from_rotation_arc(Vec3::Y, up) * heading).normalize();

        log::trace!(
            "Floater y={:.3} target={:.3} tilt={:.4}",
            self.pose.position.y,
            target_y,
            self.tilt()
        );
    }
}

/// Fraction of the remaining gap closed in `dt` at `rate` (1/s)
fn approach(rate: f32, dt: f32) -> f32 {
    if !rate.is_finite() || rate <= 0.0 {
        return 0.0;
    }
    1.0 - (-rate * dt).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocean::WaveComponent;
    use crate::params::HullShape;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn floating(config: FloaterConfig, pose: Pose) -> FloaterController {
        let mut floater = FloaterController::pending(config, pose);
        floater.attach_geometry(&HullGeometry::build(HullShape::Crate, 1.0));
        floater
    }

    fn tilted(axis: Vec3, angle: f32, yaw: f32) -> Quat {
        Quat::from_axis_angle(axis.normalize(), angle) * Quat::from_rotation_y(yaw)
    }

    fn swell() -> WaveField {
        WaveField::new(vec![
            WaveComponent::new(Vec2::X, 0.4, 30.0),
            WaveComponent::new(Vec2::new(0.6, 0.8), 0.2, 12.0),
        ])
    }

    #[test]
    fn test_pending_floater_is_inactive() {
        let mut floater = FloaterController::pending(FloaterConfig::default(), Pose::at(Vec3::Y * 5.0));
        assert!(!floater.is_active());

        floater.set_active(true);
        assert!(!floater.is_active());

        floater.update(&WaveField::flat(), 0.0, DT);
        assert_eq!(floater.pose().position.y, 5.0);
    }

    #[test]
    fn test_zero_dt_leaves_pose_unchanged() {
        let pose = Pose {
            position: Vec3::new(3.0, 7.0, -2.0),
            orientation: tilted(Vec3::new(1.0, 0.0, 1.0), 0.8, 0.3),
        };
        let mut floater = floating(FloaterConfig::default(), pose);
        floater.update(&swell(), 2.0, 0.0);
        assert_eq!(*floater.pose(), pose);
    }

    #[test]
    fn test_inactive_update_is_noop() {
        let pose = Pose::at(Vec3::new(0.0, 4.0, 0.0));
        let mut floater = floating(FloaterConfig::default(), pose);
        floater.set_active(false);
        for i in 0..100 {
            floater.update(&swell(), i as f32 * DT, DT);
        }
        assert_eq!(*floater.pose(), pose);
    }

    #[test]
    fn test_flat_water_converges_to_rest_from_any_orientation() {
        let config = FloaterConfig {
            rest_offset_m: 0.5,
            ..Default::default()
        };
        let starts = [
            Quat::IDENTITY,
            tilted(Vec3::X, 2.5, 0.0),
            tilted(Vec3::Z, -1.2, 1.0),
            tilted(Vec3::new(1.0, 0.0, 1.0), 3.0, -2.0),
            tilted(Vec3::new(0.3, 0.5, -1.0), 0.4, 2.8),
        ];

        for start in starts {
            let pose = Pose {
                position: Vec3::new(10.0, 12.0, -4.0),
                orientation: start,
            };
            let mut floater = floating(config.clone(), pose);
            let field = WaveField::flat();
            for i in 0..600 {
                floater.update(&field, i as f32 * DT, DT);
            }
            let p = floater.pose();
            assert!((p.position.y - 0.5).abs() < 1e-3, "height {}", p.position.y);
            assert!(floater.tilt() < 1e-3, "tilt {} from {:?}", floater.tilt(), start);
            // No horizontal drift
            assert_eq!(p.position.x, 10.0);
            assert_eq!(p.position.z, -4.0);
        }
    }

    #[test]
    fn test_heading_is_preserved() {
        let yaw = 0.7;
        let pose = Pose {
            position: Vec3::ZERO,
            orientation: tilted(Vec3::X, 0.5, yaw),
        };
        assert!((pose.heading() - yaw).abs() < 1e-4);

        let mut floater = floating(FloaterConfig::default(), pose);
        let field = swell();
        for i in 0..300 {
            floater.update(&field, i as f32 * DT, DT);
            assert!(
                (floater.pose().heading() - yaw).abs() < 1e-3,
                "heading drifted to {}",
                floater.pose().heading()
            );
        }
    }

    #[test]
    fn test_settles_on_frozen_waves() {
        let field = swell();
        let time = 3.0;
        let mut floater = floating(FloaterConfig::default(), Pose::at(Vec3::new(5.0, 10.0, 2.0)));
        for _ in 0..900 {
            floater.update(&field, time, DT);
        }

        let pose = *floater.pose();
        let heading = Quat::from_rotation_y(pose.heading());
        let footprint = floater.footprint().copied().expect("geometry attached");
        let expected = support(&footprint.sample(pose.position, heading, &field, time));

        assert!((pose.position.y - expected.mean_height).abs() < 1e-2);
        assert!(pose.up().dot(expected.up) > 0.999);
        assert!(floater.tilt() > 1e-3, "waves should tilt the hull");
    }

    #[test]
    fn test_height_smoothing_is_frame_rate_independent() {
        let run = |dt: f32, steps: usize| {
            let mut floater = floating(FloaterConfig::default(), Pose::at(Vec3::new(0.0, 8.0, 0.0)));
            for _ in 0..steps {
                floater.update(&WaveField::flat(), 0.0, dt);
            }
            floater.pose().position.y
        };
        let fine = run(1.0 / 120.0, 120);
        let coarse = run(1.0 / 30.0, 30);
        assert!((fine - coarse).abs() < 1e-3, "{} vs {}", fine, coarse);
    }

    #[test]
    fn test_tilt_smoothing_is_frame_rate_independent() {
        let start = tilted(Vec3::new(1.0, 0.0, 0.5), 0.6, 0.8);
        let run = |dt: f32, steps: usize| {
            let mut floater = floating(
                FloaterConfig::default(),
                Pose {
                    position: Vec3::ZERO,
                    orientation: start,
                },
            );
            let mut previous = floater.tilt();
            for _ in 0..steps {
                floater.update(&WaveField::flat(), 0.0, dt);
                let tilt = floater.tilt();
                assert!(tilt <= previous + 1e-5, "tilt grew from {} to {}", previous, tilt);
                previous = tilt;
            }
            floater.tilt()
        };
        let fine = run(1.0 / 120.0, 120);
        let coarse = run(1.0 / 30.0, 30);
        assert!((fine - coarse).abs() < 1e-3, "{} vs {}", fine, coarse);

        // One second at rate 2/s leaves exp(-2) of the starting tilt
        let expected = 0.6 * (-FloaterConfig::default().orientation_strength).exp();
        assert!((fine - expected).abs() < 1e-2, "{} vs {}", fine, expected);
    }

    #[test]
    fn test_never_overshoots_target() {
        let mut floater = floating(
            FloaterConfig {
                buoyancy_strength: 50.0,
                ..Default::default()
            },
            Pose::at(Vec3::new(0.0, 3.0, 0.0)),
        );
        // A huge step still only closes the gap
        floater.update(&WaveField::flat(), 0.0, 10.0);
        assert!(floater.pose().position.y >= 0.0);
        assert!(floater.pose().position.y < 1e-6);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn zero_or_negative_dt_is_identity(
                x in -100.0_f32..100.0,
                y in -20.0_f32..20.0,
                angle in -3.0_f32..3.0,
                yaw in -3.0_f32..3.0,
                t in 0.0_f32..100.0,
                dt in -1.0_f32..=0.0,
            ) {
                let pose = Pose {
                    position: Vec3::new(x, y, -x),
                    orientation: tilted(Vec3::new(1.0, 0.0, 0.5), angle, yaw),
                };
                let mut floater = floating(FloaterConfig::default(), pose);
                floater.update(&swell(), t, dt);
                prop_assert_eq!(*floater.pose(), pose);
            }

            #[test]
            fn pose_stays_finite(
                x in -200.0_f32..200.0,
                z in -200.0_f32..200.0,
                t in 0.0_f32..500.0,
                dt in 0.0001_f32..0.1,
            ) {
                let mut floater = floating(FloaterConfig::default(), Pose::at(Vec3::new(x, 0.0, z)));
                for i in 0..10 {
                    floater.update(&swell(), t + i as f32 * dt, dt);
                }
                let p = floater.pose();
                prop_assert!(p.position.is_finite());
                prop_assert!(p.orientation.is_finite());
                prop_assert!((p.orientation.length() - 1.0).abs() < 1e-4);
            }
        }
    }
}
