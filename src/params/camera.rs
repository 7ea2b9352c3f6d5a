//! Orbit camera configuration.

/// Orbit camera parameters (mouse-driven, damped)
#[derive(Debug, Clone)]
pub struct OrbitCameraConfig {
    /// Point the camera orbits around (meters)
    pub target: [f32; 3],

    /// Initial distance from the target (meters)
    pub distance_m: f32,

    /// Initial yaw around +Y (degrees, 0 = camera on +Z side)
    pub yaw_deg: f32,

    /// Initial pitch above the horizon (degrees)
    pub pitch_deg: f32,

    /// Pitch limits (degrees); the lower limit keeps the eye above the waves
    pub min_pitch_deg: f32,
    pub max_pitch_deg: f32,

    /// Zoom limits (meters)
    pub min_distance_m: f32,
    pub max_distance_m: f32,

    /// Degrees of rotation per pixel of mouse drag
    pub rotate_speed_deg_per_px: f32,

    /// Fractional distance change per scroll line
    pub zoom_step: f32,

    /// Damping rate for pending rotation/zoom (1/s, higher = snappier)
    pub damping_per_s: f32,
}

impl Default for OrbitCameraConfig {
    fn default() -> Self {
        Self {
            target: [0.0, 0.0, 0.0],
            distance_m: 165.0, // Eye starts near (50, 50, -150)
            yaw_deg: 161.6,
            pitch_deg: 17.6,
            min_pitch_deg: 2.0,
            max_pitch_deg: 89.0,
            min_distance_m: 10.0,
            max_distance_m: 800.0,
            rotate_speed_deg_per_px: 0.25,
            zoom_step: 0.1,
            damping_per_s: 12.0,
        }
    }
}
