//! Sun angles to direction.

use glam::Vec3;

/// Convert user-facing sun angles into a unit direction toward the sun.
///
/// Spherical-to-Cartesian with unit radius: `phi = 90° - elevation` is the
/// polar angle from +Y and `theta = azimuth` is measured from +Z toward +X.
/// At `elevation = 90` the result is exactly `(0, 1, 0)` for any azimuth.
pub fn sun_direction(elevation_deg: f32, azimuth_deg: f32) -> Vec3 {
    let phi = (90.0 - elevation_deg).to_radians();
    let theta = azimuth_deg.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zenith_ignores_azimuth() {
        for azimuth in [-180.0, -90.0, 0.0, 45.0, 137.5, 180.0] {
            assert_eq!(sun_direction(90.0, azimuth), Vec3::Y);
        }
    }

    #[test]
    fn test_horizon_sun_is_horizontal() {
        let dir = sun_direction(0.0, 0.0);
        assert!(dir.y.abs() < 1e-6);
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!((dir.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_azimuth_rotates_toward_x() {
        let dir = sun_direction(0.0, 90.0);
        assert!((dir.x - 1.0).abs() < 1e-6);
        assert!(dir.z.abs() < 1e-6);
    }

    #[test]
    fn test_negative_elevation_points_down() {
        assert!(sun_direction(-5.0, 30.0).y < 0.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn direction_is_unit(elevation in -90.0_f32..90.0, azimuth in -180.0_f32..180.0) {
                let dir = sun_direction(elevation, azimuth);
                prop_assert!((dir.length() - 1.0).abs() < 1e-5);
            }
        }
    }
}
