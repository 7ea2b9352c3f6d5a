//! Analytic daylight sky (Preetham-style Rayleigh + Mie scattering).
//!
//! CPU twin of `rendering/sky_common.wgsl`. The GPU sky pass and the
//! environment bake evaluate the same formula; the CPU copy feeds the
//! spherical-harmonic ambient projection and tests.

use glam::Vec3;
use std::f32::consts::PI;

use crate::params::SkyParameters;

const E: f32 = std::f32::consts::E;
const UP: Vec3 = Vec3::Y;

/// Total Rayleigh scattering coefficients for 680/550/450 nm (1/m)
const TOTAL_RAYLEIGH: Vec3 = Vec3::new(5.804_543e-6, 1.356_291_1e-5, 3.026_590_3e-5);

/// Mie constant for the same wavelengths
const MIE_CONST: Vec3 = Vec3::new(1.839_991_8e14, 2.779_802_4e14, 4.079_048e14);

/// Sun intensity falloff past the horizon
const CUTOFF_ANGLE: f32 = 1.611_073_1;
const STEEPNESS: f32 = 1.5;
const SUN_ILLUMINANCE: f32 = 1000.0;

/// Optical path lengths at zenith (meters)
const RAYLEIGH_ZENITH_LENGTH: f32 = 8.4e3;
const MIE_ZENITH_LENGTH: f32 = 1.25e3;

/// cos of the sun's angular radius
const SUN_ANGULAR_DIAMETER_COS: f32 = 0.999_956_7;

const THREE_OVER_SIXTEEN_PI: f32 = 0.059_683_104;
const ONE_OVER_FOUR_PI: f32 = 0.079_577_47;

/// Packed sky state for the WGSL sky function (std140-compatible)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyUniform {
    /// xyz = unit sun direction, w = sun illuminance (vSunE)
    pub sun_direction: [f32; 4],
    /// xyz = Rayleigh beta, w = sun fade
    pub beta_rayleigh: [f32; 4],
    /// xyz = Mie beta, w = Mie directional g
    pub beta_mie: [f32; 4],
}

/// Sky radiance model for one sun direction and set of scattering knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyEnvironment {
    pub sun_direction: Vec3,
    pub params: SkyParameters,
    // Derived once per state change, outside the per-pixel path
    sun_e: f32,
    sun_fade: f32,
    beta_r: Vec3,
    beta_m: Vec3,
}

impl SkyEnvironment {
    pub fn new(sun_direction: Vec3, params: SkyParameters) -> Self {
        let sun_direction = sun_direction.try_normalize().unwrap_or(UP);
        let sun_e = sun_intensity(sun_direction.dot(UP));
        let sun_fade = 1.0 - (1.0 - (sun_direction.y / 450_000.0).exp()).clamp(0.0, 1.0);
        let rayleigh_coefficient = params.rayleigh - (1.0 - sun_fade);
        let beta_r = TOTAL_RAYLEIGH * rayleigh_coefficient;
        let beta_m = total_mie(params.turbidity) * params.mie_coefficient;

        Self {
            sun_direction,
            params,
            sun_e,
            sun_fade,
            beta_r,
            beta_m,
        }
    }

    /// GPU layout of this state
    pub fn uniform(&self) -> SkyUniform {
        SkyUniform {
            sun_direction: self.sun_direction.extend(self.sun_e).to_array(),
            beta_rayleigh: self.beta_r.extend(self.sun_fade).to_array(),
            beta_mie: self.beta_m.extend(self.params.mie_directional_g).to_array(),
        }
    }

    /// Display-ready sky color seen along `direction`.
    ///
    /// Always finite and non-negative, even for knob values outside the
    /// physical range.
    pub fn radiance(&self, direction: Vec3) -> Vec3 {
        let direction = direction.try_normalize().unwrap_or(UP);

        // Optical length through the atmosphere
        let zenith_angle = UP.dot(direction).max(0.0).acos();
        let inverse = 1.0
            / (zenith_angle.cos()
                + 0.15 * (93.885 - zenith_angle * 180.0 / PI).powf(-1.253));
        let s_r = RAYLEIGH_ZENITH_LENGTH * inverse;
        let s_m = MIE_ZENITH_LENGTH * inverse;

        // Combined extinction
        let fex = exp3(-(self.beta_r * s_r + self.beta_m * s_m));

        // In-scattering
        let cos_theta = direction.dot(self.sun_direction);
        let r_phase = rayleigh_phase(cos_theta * 0.5 + 0.5);
        let beta_r_theta = self.beta_r * r_phase;
        let m_phase = hg_phase(cos_theta, self.params.mie_directional_g);
        let beta_m_theta = self.beta_m * m_phase;

        let beta_sum = self.beta_r + self.beta_m;
        let scatter = safe_div3(beta_r_theta + beta_m_theta, beta_sum) * self.sun_e;
        let mut lin = pow3(scatter * (Vec3::ONE - fex), 1.5);
        let horizon_mix = (1.0 - UP.dot(self.sun_direction)).powf(5.0).clamp(0.0, 1.0);
        lin *= Vec3::ONE.lerp(pow3(scatter * fex, 0.5), horizon_mix);

        // Night sky and sun disk
        let mut l0 = Vec3::splat(0.1) * fex;
        let sun_disk = smoothstep(
            SUN_ANGULAR_DIAMETER_COS,
            SUN_ANGULAR_DIAMETER_COS + 0.000_02,
            cos_theta,
        );
        l0 += fex * (self.sun_e * 19_000.0 * sun_disk);

        let tex_color = (lin + l0) * 0.04 + Vec3::new(0.0, 0.0003, 0.00075);
        let color = pow3(tex_color, 1.0 / (1.2 + 1.2 * self.sun_fade));
        sanitize(color)
    }
}

fn sun_intensity(zenith_angle_cos: f32) -> f32 {
    let zenith_angle_cos = zenith_angle_cos.clamp(-1.0, 1.0);
    SUN_ILLUMINANCE
        * (1.0 - E.powf(-((CUTOFF_ANGLE - zenith_angle_cos.acos()) / STEEPNESS))).max(0.0)
}

fn total_mie(turbidity: f32) -> Vec3 {
    let c = 0.2 * turbidity * 10e-18;
    MIE_CONST * (0.434 * c)
}

fn rayleigh_phase(cos_theta: f32) -> f32 {
    THREE_OVER_SIXTEEN_PI * (1.0 + cos_theta * cos_theta)
}

/// Henyey-Greenstein phase function
fn hg_phase(cos_theta: f32, g: f32) -> f32 {
    let g2 = g * g;
    let denom = (1.0 - 2.0 * g * cos_theta + g2).max(1e-6);
    ONE_OVER_FOUR_PI * ((1.0 - g2) / denom.powf(1.5))
}

fn exp3(v: Vec3) -> Vec3 {
    Vec3::new(v.x.exp(), v.y.exp(), v.z.exp())
}

/// Component-wise power of the non-negative part
fn pow3(v: Vec3, e: f32) -> Vec3 {
    let v = v.max(Vec3::ZERO);
    Vec3::new(v.x.powf(e), v.y.powf(e), v.z.powf(e))
}

fn safe_div3(a: Vec3, b: Vec3) -> Vec3 {
    let div = |n: f32, d: f32| if d.abs() > f32::MIN_POSITIVE { n / d } else { 0.0 };
    Vec3::new(div(a.x, b.x), div(a.y, b.y), div(a.z, b.z))
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn sanitize(v: Vec3) -> Vec3 {
    let fix = |c: f32| if c.is_finite() { c.max(0.0) } else { 0.0 };
    Vec3::new(fix(v.x), fix(v.y), fix(v.z))
}
