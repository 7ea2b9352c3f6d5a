//! Sun position, sky scattering knobs, and water shading colors.

use glam::Vec3;

use crate::sky::sun_direction;

/// Sun placement as the user edits it.
///
/// Only the two angles are stored; the direction vector is derived on
/// demand so it can never disagree with them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunParameters {
    /// Angle above the horizon (degrees, signed; negative = below horizon)
    pub elevation_deg: f32,

    /// Compass angle around +Y (degrees, -180..180, 0 = +Z)
    pub azimuth_deg: f32,
}

impl Default for SunParameters {
    fn default() -> Self {
        Self {
            elevation_deg: 2.0, // Low sun, long orange glints on the water
            azimuth_deg: 180.0,
        }
    }
}

impl SunParameters {
    /// Unit vector pointing from the scene toward the sun
    pub fn direction(&self) -> Vec3 {
        sun_direction(self.elevation_deg, self.azimuth_deg)
    }

    /// Wrap an azimuth into [-180, 180]
    pub fn wrap_azimuth(azimuth_deg: f32) -> f32 {
        let wrapped = (azimuth_deg + 180.0).rem_euclid(360.0) - 180.0;
        // rem_euclid maps 180 to -180; keep the user's +180 when that's what they typed
        if wrapped == -180.0 && azimuth_deg > 0.0 {
            180.0
        } else {
            wrapped
        }
    }
}

/// Atmospheric scattering knobs for the analytic sky.
///
/// Each value is independent; the UI may push any of them out of the
/// physically sensible range and the sky model must still return finite
/// colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyParameters {
    /// Haze amount (dimensionless, ~1 = clear, 10 = hazy, 20 = smoggy)
    pub turbidity: f32,

    /// Rayleigh scattering multiplier (dimensionless)
    pub rayleigh: f32,

    /// Mie scattering coefficient (dimensionless, ~0.001..0.01)
    pub mie_coefficient: f32,

    /// Henyey-Greenstein anisotropy for Mie scattering (-1..1, forward > 0)
    pub mie_directional_g: f32,
}

impl Default for SkyParameters {
    fn default() -> Self {
        Self {
            turbidity: 10.0,
            rayleigh: 2.0,
            mie_coefficient: 0.005,
            mie_directional_g: 0.8,
        }
    }
}

/// Water shading colors (linear RGB)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterAppearance {
    /// Deep water body color
    pub water_color: [f32; 3],

    /// Tint applied to the sun's specular highlight
    pub sun_color: [f32; 3],

    /// Specular exponent for the sun glint
    pub sun_shininess: f32,
}

impl Default for WaterAppearance {
    fn default() -> Self {
        Self {
            water_color: [0.0024, 0.0044, 0.071], // #070e4c in linear space
            sun_color: [1.0, 0.04, 0.04],         // #ff3636 in linear space
            sun_shininess: 100.0,
        }
    }
}
