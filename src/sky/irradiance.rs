//! L2 spherical-harmonic irradiance projected from the sky model.
//!
//! Diffuse ambient for the water body and floaters. Computed on the CPU as
//! part of every environment bake.

use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use super::SkyEnvironment;

/// Integration resolution over the sphere
const THETA_STEPS: usize = 16;
const PHI_STEPS: usize = 32;

/// Fraction of horizon light the ocean sends back up
const OCEAN_ALBEDO: f32 = 0.08;

/// Nine RGB coefficients, already convolved with the cosine lobe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sh9Irradiance {
    pub coefficients: [Vec3; 9],
}

/// GPU layout: nine vec4 (rgb + padding)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Sh9Uniform {
    pub coefficients: [[f32; 4]; 9],
}

impl Default for Sh9Irradiance {
    fn default() -> Self {
        Self {
            coefficients: [Vec3::ZERO; 9],
        }
    }
}

impl Sh9Irradiance {
    /// Project sky radiance over the full sphere.
    ///
    /// The lower hemisphere is the ocean: a dim reflection of the horizon,
    /// enough to keep hull undersides from going pitch black.
    pub fn project(sky: &SkyEnvironment) -> Self {
        let d_theta = PI / THETA_STEPS as f32;
        let d_phi = TAU / PHI_STEPS as f32;
        let mut coefficients = [Vec3::ZERO; 9];

        for it in 0..THETA_STEPS {
            let theta = (it as f32 + 0.5) * d_theta; // polar angle from +Y
            let (sin_t, cos_t) = theta.sin_cos();
            for ip in 0..PHI_STEPS {
                let phi = (ip as f32 + 0.5) * d_phi;
                let dir = Vec3::new(sin_t * phi.cos(), cos_t, sin_t * phi.sin());
                let radiance = incoming_radiance(sky, dir);
                let weight = sin_t * d_theta * d_phi; // solid angle element
                for (c, y) in coefficients.iter_mut().zip(sh_basis(dir)) {
                    *c += radiance * (y * weight);
                }
            }
        }

        // Convolve with the Lambert kernel per band
        for (i, c) in coefficients.iter_mut().enumerate() {
            *c *= match i {
                0 => PI,
                1..=3 => 2.0 * PI / 3.0,
                _ => FRAC_PI_2 / 2.0,
            };
        }

        Self { coefficients }
    }

    /// Irradiance arriving at a surface with unit normal `n` (divided by π,
    /// i.e. ready to multiply by albedo)
    pub fn evaluate(&self, n: Vec3) -> Vec3 {
        let basis = sh_basis(n);
        let sum = self
            .coefficients
            .iter()
            .zip(basis)
            .fold(Vec3::ZERO, |acc, (c, y)| acc + *c * y);
        (sum / PI).max(Vec3::ZERO)
    }

    pub fn uniform(&self) -> Sh9Uniform {
        let mut out = [[0.0; 4]; 9];
        for (slot, c) in out.iter_mut().zip(self.coefficients) {
            *slot = c.extend(0.0).to_array();
        }
        Sh9Uniform { coefficients: out }
    }
}

fn incoming_radiance(sky: &SkyEnvironment, dir: Vec3) -> Vec3 {
    if dir.y >= 0.0 {
        return sky.radiance(dir);
    }
    let horizon = Vec3::new(dir.x, 0.0, dir.z).try_normalize().unwrap_or(Vec3::X);
    sky.radiance(horizon) * OCEAN_ALBEDO
}

/// Real SH basis (l <= 2) in the order used by `ocean.wgsl`
fn sh_basis(d: Vec3) -> [f32; 9] {
    let (x, y, z) = (d.x, d.y, d.z);
    [
        0.282_095,
        0.488_603 * y,
        0.488_603 * z,
        0.488_603 * x,
        1.092_548 * x * y,
        1.092_548 * y * z,
        0.315_392 * (3.0 * z * z - 1.0),
        1.092_548 * x * z,
        0.546_274 * (x * x - y * y),
    ]
}
