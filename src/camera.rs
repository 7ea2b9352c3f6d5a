//! Damped orbit camera driven by mouse drag and scroll.

use glam::{Mat4, Vec3};

use crate::params::{OrbitCameraConfig, RenderConfig};

/// Orbit camera around a fixed target
///
/// Input accumulates as pending rotation/zoom; `update` bleeds it into the
/// actual angles at `damping_per_s`, so motion eases out after the mouse
/// stops.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    config: OrbitCameraConfig,
    target: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
    pending_yaw: f32,
    pending_pitch: f32,
    /// Pending zoom as a log-distance offset
    pending_zoom: f32,
}

impl OrbitCamera {
    pub fn new(config: OrbitCameraConfig) -> Self {
        let pitch = config
            .pitch_deg
            .clamp(config.min_pitch_deg, config.max_pitch_deg)
            .to_radians();
        let distance = config
            .distance_m
            .clamp(config.min_distance_m, config.max_distance_m);
        Self {
            target: Vec3::from_array(config.target),
            yaw: config.yaw_deg.to_radians(),
            pitch,
            distance,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 0.0,
            config,
        }
    }

    /// Queue a drag of `dx`, `dy` pixels
    pub fn rotate(&mut self, dx_px: f32, dy_px: f32) {
        let rate = self.config.rotate_speed_deg_per_px.to_radians();
        self.pending_yaw -= dx_px * rate;
        self.pending_pitch += dy_px * rate;
    }

    /// Queue a zoom of `lines` scroll steps (positive = closer)
    pub fn zoom(&mut self, lines: f32) {
        self.pending_zoom -= lines * self.config.zoom_step;
    }

    /// Apply the damped share of pending input for this frame
    pub fn update(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let blend = 1.0 - (-self.config.damping_per_s * dt).exp();

        let d_yaw = self.pending_yaw * blend;
        let d_pitch = self.pending_pitch * blend;
        let d_zoom = self.pending_zoom * blend;
        self.pending_yaw -= d_yaw;
        self.pending_pitch -= d_pitch;
        self.pending_zoom -= d_zoom;

        self.yaw = (self.yaw + d_yaw).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + d_pitch).clamp(
            self.config.min_pitch_deg.to_radians(),
            self.config.max_pitch_deg.to_radians(),
        );
        self.distance = (self.distance * d_zoom.exp())
            .clamp(self.config.min_distance_m, self.config.max_distance_m);
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Pitch above the horizon (radians)
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Camera position in world space
    pub fn eye(&self) -> Vec3 {
        let (sin_p, cos_p) = self.pitch.sin_cos();
        let (sin_y, cos_y) = self.yaw.sin_cos();
        self.target + self.distance * Vec3::new(cos_p * sin_y, sin_p, cos_p * cos_y)
    }

    /// View-projection for the current viewport aspect
    ///
    /// # Returns
    /// Tuple of (view_proj_matrix, camera_position)
    pub fn view_proj(&self, render_config: &RenderConfig, aspect: f32) -> (Mat4, Vec3) {
        let eye = self.eye();
        let view = Mat4::look_at_rh(eye, self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            render_config.fov_degrees.to_radians(),
            aspect.max(1e-3),
            render_config.near_plane_m,
            render_config.far_plane_m,
        );
        (proj * view, eye)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_eye_position() {
        let camera = OrbitCamera::new(OrbitCameraConfig::default());
        let eye = camera.eye();
        assert!((eye - Vec3::new(50.0, 50.0, -150.0)).length() < 1.0, "eye {:?}", eye);
    }

    #[test]
    fn test_zero_dt_applies_nothing() {
        let mut camera = OrbitCamera::new(OrbitCameraConfig::default());
        let before = camera.eye();
        camera.rotate(100.0, 40.0);
        camera.update(0.0);
        assert_eq!(camera.eye(), before);
    }

    #[test]
    fn test_rotation_eases_in() {
        let mut camera = OrbitCamera::new(OrbitCameraConfig::default());
        let start = camera.eye();
        camera.rotate(200.0, 0.0);
        camera.update(1.0 / 60.0);
        let partial = camera.eye();
        for _ in 0..600 {
            camera.update(1.0 / 60.0);
        }
        let settled = camera.eye();

        let moved_first = (partial - start).length();
        let moved_total = (settled - start).length();
        assert!(moved_first > 0.0);
        assert!(moved_first < moved_total * 0.5);
        // Orbiting keeps the distance
        assert!(((settled - camera.target()).length() - camera.distance()).abs() < 1e-3);
    }

    #[test]
    fn test_pitch_stays_above_water() {
        let config = OrbitCameraConfig::default();
        let min_pitch = config.min_pitch_deg.to_radians();
        let mut camera = OrbitCamera::new(config);
        camera.rotate(0.0, -100_000.0);
        for _ in 0..600 {
            camera.update(1.0 / 60.0);
        }
        assert!((camera.pitch() - min_pitch).abs() < 1e-5);
        assert!(camera.eye().y > 0.0);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let config = OrbitCameraConfig::default();
        let max = config.max_distance_m;
        let mut camera = OrbitCamera::new(config);
        camera.zoom(-500.0);
        for _ in 0..600 {
            camera.update(1.0 / 60.0);
        }
        assert_eq!(camera.distance(), max);
    }

    #[test]
    fn test_view_proj_matrix_generation() {
        let camera = OrbitCamera::new(OrbitCameraConfig::default());
        let render_config = RenderConfig::default();

        let (view_proj, eye_pos) = camera.view_proj(&render_config, render_config.aspect_ratio());

        assert_ne!(view_proj, Mat4::IDENTITY);
        assert_ne!(view_proj, Mat4::ZERO);
        assert!(eye_pos.is_finite());

        // Target projects to the middle of the screen
        let clip = view_proj * camera.target().extend(1.0);
        assert!((clip.x / clip.w).abs() < 1e-4);
        assert!((clip.y / clip.w).abs() < 1e-4);
    }
}
