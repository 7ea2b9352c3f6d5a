//! Live parameter edits for sun, sky and waves.
//!
//! Every edit is one absolute write followed by one recompute. The sun
//! direction is derived exactly once per edit and that same vector feeds the
//! sky pass, the water shader and the environment bake.

use anyhow::{Context, Result};
use glam::Vec3;

use crate::environment::{BakeBackend, EnvironmentBaker};
use crate::ocean::{WaveComponent, WaveField};
use crate::params::{SkyParameters, SunParameters, WaterAppearance};
use crate::sky::{SkyEnvironment, SkyUniform};

/// Scalar knobs that can be nudged from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Knob {
    Elevation,
    Azimuth,
    Turbidity,
    Rayleigh,
    MieCoefficient,
    MieDirectionalG,
}

/// Per-wave knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveKnob {
    Steepness,
    Wavelength,
}

/// Step a wave selection forward or back, wrapping over `count` waves
pub fn cycle_wave(selected: usize, forward: bool, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let selected = selected % count;
    if forward {
        (selected + 1) % count
    } else {
        (selected + count - 1) % count
    }
}

/// One atomic parameter write
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterEdit {
    Elevation(f32),
    Azimuth(f32),
    Turbidity(f32),
    Rayleigh(f32),
    MieCoefficient(f32),
    MieDirectionalG(f32),
    Wave { index: usize, component: WaveComponent },
}

impl ParameterEdit {
    /// Absolute edit that moves `knob` by `delta` from its current value
    pub fn nudge(knob: Knob, delta: f32, state: &LightingState) -> Self {
        let sun = state.sun;
        let sky = state.sky;
        match knob {
            Knob::Elevation => Self::Elevation(sun.elevation_deg + delta),
            Knob::Azimuth => Self::Azimuth(sun.azimuth_deg + delta),
            Knob::Turbidity => Self::Turbidity(sky.turbidity + delta),
            Knob::Rayleigh => Self::Rayleigh(sky.rayleigh + delta),
            Knob::MieCoefficient => Self::MieCoefficient(sky.mie_coefficient + delta),
            Knob::MieDirectionalG => Self::MieDirectionalG(sky.mie_directional_g + delta),
        }
    }

    /// Wave edit moving one field of wave `index`; `None` when there is no
    /// such wave. Range clamping happens when the field re-resolves.
    pub fn nudge_wave(index: usize, knob: WaveKnob, delta: f32, waves: &WaveField) -> Option<Self> {
        let mut component = *waves.components().get(index)?;
        match knob {
            WaveKnob::Steepness => component.steepness += delta,
            WaveKnob::Wavelength => component.wavelength_m += delta,
        }
        Some(Self::Wave { index, component })
    }

    fn value(&self) -> Option<f32> {
        match *self {
            Self::Elevation(v)
            | Self::Azimuth(v)
            | Self::Turbidity(v)
            | Self::Rayleigh(v)
            | Self::MieCoefficient(v)
            | Self::MieDirectionalG(v) => Some(v),
            Self::Wave { .. } => None,
        }
    }
}

/// Everything derived from one sun/sky state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingSnapshot {
    pub sky: SkyEnvironment,
}

impl LightingSnapshot {
    fn new(sun: &SunParameters, sky: SkyParameters) -> Self {
        Self {
            sky: SkyEnvironment::new(sun.direction(), sky),
        }
    }

    /// The one sun direction every consumer reads
    pub fn sun_direction(&self) -> Vec3 {
        self.sky.sun_direction
    }

    pub fn sky_uniform(&self) -> SkyUniform {
        self.sky.uniform()
    }
}

/// What an edit triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Sun or sky changed and the environment was re-baked
    Rebaked { generation: u64 },
    /// Wave set changed; lighting untouched
    WavesUpdated,
    /// Non-finite value, nothing written
    Ignored,
}

/// Sun, sky and water shading state owned by the scene.
#[derive(Debug, Clone)]
pub struct LightingState {
    sun: SunParameters,
    sky: SkyParameters,
    pub water: WaterAppearance,
    snapshot: LightingSnapshot,
}

impl LightingState {
    pub fn new(sun: SunParameters, sky: SkyParameters, water: WaterAppearance) -> Self {
        let sun = SunParameters {
            azimuth_deg: SunParameters::wrap_azimuth(sun.azimuth_deg),
            ..sun
        };
        Self {
            sun,
            sky,
            water,
            snapshot: LightingSnapshot::new(&sun, sky),
        }
    }

    pub fn sun(&self) -> &SunParameters {
        &self.sun
    }

    pub fn sky(&self) -> &SkyParameters {
        &self.sky
    }

    pub fn snapshot(&self) -> &LightingSnapshot {
        &self.snapshot
    }

    /// Bake for the current state (scene setup)
    pub fn bake<B: BakeBackend>(&self, baker: &mut EnvironmentBaker<B>) -> Result<u64> {
        let bake = baker
            .bake(&self.snapshot.sky)
            .context("Failed to bake environment")?;
        Ok(bake.generation)
    }

    /// Write one parameter, then recompute what depends on it.
    ///
    /// Sun and sky edits re-bake synchronously. A failed bake is returned
    /// as an error; the new parameters stay applied.
    pub fn apply<B: BakeBackend>(
        &mut self,
        edit: ParameterEdit,
        waves: &mut WaveField,
        baker: &mut EnvironmentBaker<B>,
    ) -> Result<EditOutcome> {
        if edit.value().is_some_and(|v| !v.is_finite()) {
            log::warn!("Ignoring non-finite edit {:?}", edit);
            return Ok(EditOutcome::Ignored);
        }

        match edit {
            ParameterEdit::Elevation(v) => self.sun.elevation_deg = v,
            ParameterEdit::Azimuth(v) => self.sun.azimuth_deg = SunParameters::wrap_azimuth(v),
            ParameterEdit::Turbidity(v) => self.sky.turbidity = v,
            ParameterEdit::Rayleigh(v) => self.sky.rayleigh = v,
            ParameterEdit::MieCoefficient(v) => self.sky.mie_coefficient = v,
            ParameterEdit::MieDirectionalG(v) => self.sky.mie_directional_g = v,
            ParameterEdit::Wave { index, component } => {
                waves.set_component(index, component);
                log::debug!("Wave {} updated: {:?}", index, component);
                return Ok(EditOutcome::WavesUpdated);
            }
        }

        self.snapshot = LightingSnapshot::new(&self.sun, self.sky);
        log::debug!(
            "Sun {:.1}°/{:.1}° -> {:.3?}, sky {:?}",
            self.sun.elevation_deg,
            self.sun.azimuth_deg,
            self.snapshot.sun_direction(),
            self.sky
        );

        let generation = self.bake(baker)?;
        Ok(EditOutcome::Rebaked { generation })
    }
}

impl Default for LightingState {
    fn default() -> Self {
        Self::new(
            SunParameters::default(),
            SkyParameters::default(),
            WaterAppearance::default(),
        )
    }
}
