//! Ocean surface configuration: wave sets and render grid.

use glam::Vec2;

use crate::ocean::WaveComponent;

/// Named wave sets, from glassy to choppy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WavePreset {
    Calm,
    #[default]
    Moderate,
    Rough,
}

impl WavePreset {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "calm" => Some(Self::Calm),
            "moderate" | "default" => Some(Self::Moderate),
            "rough" | "storm" => Some(Self::Rough),
            _ => None,
        }
    }

    /// Wave components for this preset.
    ///
    /// Directions fan out at 0°, 30°, 60° and 90° so crests interfere
    /// instead of lining up into a single swell.
    pub fn components(&self) -> Vec<WaveComponent> {
        let (steepness, wavelengths): (f32, [f32; 4]) = match self {
            Self::Calm => (0.08, [60.0, 30.0, 15.0, 8.0]),
            Self::Moderate => (0.15, [60.0, 30.0, 15.0, 8.0]),
            Self::Rough => (0.25, [90.0, 45.0, 22.0, 11.0]),
        };

        [0.0_f32, 30.0, 60.0, 90.0]
            .iter()
            .zip(wavelengths)
            .map(|(deg, wavelength)| {
                let rad = deg.to_radians();
                WaveComponent::new(Vec2::new(rad.cos(), rad.sin()), steepness, wavelength)
            })
            .collect()
    }
}

/// Largest render grid accepted (quads per side)
pub const MAX_GRID_SIZE: usize = 1024;

/// Ocean surface parameters
#[derive(Debug, Clone)]
pub struct OceanConfig {
    /// Wave components summed into the height field
    pub waves: Vec<WaveComponent>,

    /// Grid resolution (quads per side, e.g., 200 = 40,401 vertices)
    pub grid_size: usize,

    /// Spacing between grid vertices in world units (meters)
    pub grid_spacing_m: f32,
}

impl Default for OceanConfig {
    fn default() -> Self {
        Self {
            waves: WavePreset::default().components(),
            grid_size: 256,      // Dense enough for 8m ripples near the hull
            grid_spacing_m: 1.5, // ~384m square patch
        }
    }
}

impl OceanConfig {
    pub fn from_preset(preset: WavePreset) -> Self {
        Self {
            waves: preset.components(),
            ..Self::default()
        }
    }

    /// Side length of the render grid (meters)
    pub fn extent_m(&self) -> f32 {
        self.grid_size as f32 * self.grid_spacing_m
    }
}
