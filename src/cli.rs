//! Command-line argument parsing.

use clap::Parser;

use crate::params::{
    FloaterConfig, HullShape, OceanConfig, RenderConfig, SkyParameters, SunParameters,
    WavePreset, MAX_GRID_SIZE,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "seafloat")]
#[command(about = "Real-time ocean with an analytic sky and floating bodies", long_about = None)]
pub struct Args {
    /// Initial window width (pixels)
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<u32>,

    /// Initial window height (pixels)
    #[arg(long, value_name = "PIXELS")]
    pub height: Option<u32>,

    /// Disable vsync
    #[arg(long)]
    pub no_vsync: bool,

    /// Sun elevation above the horizon (degrees, may be negative)
    #[arg(long, value_name = "DEGREES", allow_hyphen_values = true)]
    pub elevation: Option<f32>,

    /// Sun azimuth (degrees, wrapped into [-180, 180])
    #[arg(long, value_name = "DEGREES", allow_hyphen_values = true)]
    pub azimuth: Option<f32>,

    /// Atmospheric haze
    #[arg(long, allow_hyphen_values = true)]
    pub turbidity: Option<f32>,

    /// Rayleigh scattering scale
    #[arg(long, allow_hyphen_values = true)]
    pub rayleigh: Option<f32>,

    /// Mie scattering coefficient
    #[arg(long, allow_hyphen_values = true)]
    pub mie_coefficient: Option<f32>,

    /// Mie anisotropy (forward-scattering bias)
    #[arg(long, allow_hyphen_values = true)]
    pub mie_directional_g: Option<f32>,

    /// Wave preset: calm, moderate (default), rough
    #[arg(long, value_name = "PRESET", default_value = "moderate")]
    pub preset: String,

    /// Ocean grid resolution (quads per side)
    #[arg(long, value_name = "QUADS")]
    pub grid_size: Option<usize>,

    /// Spacing between grid vertices (meters)
    #[arg(long, value_name = "METERS")]
    pub grid_spacing: Option<f32>,

    /// Hull shape: crate (default), skiff
    #[arg(long, value_name = "SHAPE", default_value = "crate")]
    pub hull: String,

    /// Uniform hull scale
    #[arg(long, value_name = "SCALE")]
    pub hull_scale: Option<f32>,

    /// Number of floating bodies
    #[arg(long, value_name = "COUNT", default_value = "1")]
    pub floaters: usize,

    /// Height approach rate (1/s)
    #[arg(long, value_name = "RATE")]
    pub buoyancy: Option<f32>,
}

impl Args {
    pub fn render_config(&self) -> RenderConfig {
        let mut config = RenderConfig::default();
        if let Some(width) = self.width {
            config.window_width = width.max(1);
        }
        if let Some(height) = self.height {
            config.window_height = height.max(1);
        }
        config.vsync = !self.no_vsync;
        config
    }

    pub fn sun_parameters(&self) -> SunParameters {
        let mut sun = SunParameters::default();
        if let Some(elevation) = self.elevation {
            sun.elevation_deg = elevation;
        }
        if let Some(azimuth) = self.azimuth {
            sun.azimuth_deg = SunParameters::wrap_azimuth(azimuth);
        }
        sun
    }

    pub fn sky_parameters(&self) -> SkyParameters {
        let mut sky = SkyParameters::default();
        if let Some(v) = self.turbidity {
            sky.turbidity = v;
        }
        if let Some(v) = self.rayleigh {
            sky.rayleigh = v;
        }
        if let Some(v) = self.mie_coefficient {
            sky.mie_coefficient = v;
        }
        if let Some(v) = self.mie_directional_g {
            sky.mie_directional_g = v;
        }
        sky
    }

    /// Parse wave preset from command-line arguments
    pub fn wave_preset(&self) -> WavePreset {
        WavePreset::parse(&self.preset).unwrap_or_else(|| {
            log::warn!("Unknown wave preset '{}', using moderate", self.preset);
            WavePreset::default()
        })
    }

    pub fn ocean_config(&self) -> OceanConfig {
        let mut config = OceanConfig::from_preset(self.wave_preset());
        if let Some(size) = self.grid_size {
            config.grid_size = size.clamp(1, MAX_GRID_SIZE);
            if config.grid_size != size {
                log::warn!("Grid size {} clamped to {}", size, config.grid_size);
            }
        }
        if let Some(spacing) = self.grid_spacing {
            if spacing.is_finite() && spacing > 0.0 {
                config.grid_spacing_m = spacing;
            } else {
                log::warn!("Invalid grid spacing {}, keeping {}", spacing, config.grid_spacing_m);
            }
        }
        log::info!(
            "Ocean: {} waves, {}x{} grid over {:.0}m",
            config.waves.len(),
            config.grid_size,
            config.grid_size,
            config.extent_m()
        );
        config
    }

    /// Parse hull shape from command-line arguments
    pub fn hull_shape(&self) -> HullShape {
        HullShape::parse(&self.hull).unwrap_or_else(|| {
            log::warn!("Unknown hull shape '{}', using crate", self.hull);
            HullShape::default()
        })
    }

    pub fn floater_config(&self) -> FloaterConfig {
        let mut config = FloaterConfig::default();
        if let Some(rate) = self.buoyancy {
            config.buoyancy_strength = rate;
        }
        if let Some(scale) = self.hull_scale {
            config.hull_scale = scale;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("seafloat").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults_match_parameter_defaults() {
        let args = parse(&[]);
        assert_eq!(args.sun_parameters(), SunParameters::default());
        assert_eq!(args.sky_parameters(), SkyParameters::default());
        assert_eq!(args.wave_preset(), WavePreset::Moderate);
        assert_eq!(args.hull_shape(), HullShape::Crate);
        assert_eq!(args.floaters, 1);
        assert!(args.render_config().vsync);
    }

    #[test]
    fn test_overrides_apply() {
        let args = parse(&[
            "--elevation",
            "-5",
            "--azimuth",
            "270",
            "--turbidity",
            "4",
            "--hull",
            "skiff",
            "--preset",
            "rough",
            "--floaters",
            "3",
            "--no-vsync",
        ]);
        let sun = args.sun_parameters();
        assert_eq!(sun.elevation_deg, -5.0);
        assert!((sun.azimuth_deg - (-90.0)).abs() < 1e-4);
        assert_eq!(args.sky_parameters().turbidity, 4.0);
        assert_eq!(args.hull_shape(), HullShape::Skiff);
        assert_eq!(args.wave_preset(), WavePreset::Rough);
        assert_eq!(args.floaters, 3);
        assert!(!args.render_config().vsync);
    }

    #[test]
    fn test_unknown_names_fall_back() {
        let args = parse(&["--hull", "submarine", "--preset", "tsunami"]);
        assert_eq!(args.hull_shape(), HullShape::Crate);
        assert_eq!(args.wave_preset(), WavePreset::Moderate);
    }

    #[test]
    fn test_grid_size_is_clamped() {
        assert_eq!(parse(&["--grid-size", "1000000"]).ocean_config().grid_size, MAX_GRID_SIZE);
        assert_eq!(parse(&["--grid-size", "0"]).ocean_config().grid_size, 1);
        assert_eq!(parse(&["--grid-size", "64"]).ocean_config().grid_size, 64);
    }

    #[test]
    fn test_invalid_grid_spacing_is_ignored() {
        let args = parse(&["--grid-spacing", "0"]);
        assert_eq!(
            args.ocean_config().grid_spacing_m,
            OceanConfig::default().grid_spacing_m
        );
    }
}
