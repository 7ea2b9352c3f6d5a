//! Analytic Gerstner wave field.
//!
//! The same field displaces the render grid and feeds floater buoyancy, so
//! everything here is a pure function of `(x, z, t)` plus the resolved
//! component list.

use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

/// Gravity for the deep-water dispersion relation (m/s²)
pub const GRAVITY: f32 = 9.8;

/// Shortest wavelength accepted from the UI (meters)
pub const MIN_WAVELENGTH_M: f32 = 0.01;

/// Fixed-point iterations used to undo horizontal displacement in
/// [`WaveField::surface_height`]
const SURFACE_HEIGHT_ITERATIONS: usize = 2;

/// One wave as the user configures it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveComponent {
    /// Travel axis in the XZ plane (normalized on resolve)
    pub direction: Vec2,
    /// Crest sharpness Q (0..1)
    pub steepness: f32,
    /// Crest-to-crest distance (meters)
    pub wavelength_m: f32,
    /// Fixed amplitude (meters); `None` derives it as `steepness / k`
    pub amplitude_m: Option<f32>,
    /// Phase rate (radians per second); `None` uses deep-water dispersion
    pub speed: Option<f32>,
    /// Constant phase offset (radians)
    pub phase: f32,
}

impl WaveComponent {
    pub fn new(direction: Vec2, steepness: f32, wavelength_m: f32) -> Self {
        Self {
            direction,
            steepness,
            wavelength_m,
            amplitude_m: None,
            speed: None,
            phase: 0.0,
        }
    }

    pub fn with_amplitude(mut self, amplitude_m: f32) -> Self {
        self.amplitude_m = Some(amplitude_m);
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase;
        self
    }
}

/// A component after clamping, with derived constants cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedWave {
    pub direction: Vec2,
    pub steepness: f32,
    /// Wavenumber 2π / wavelength
    pub k: f32,
    pub amplitude: f32,
    pub speed: f32,
    pub phase: f32,
}

impl ResolvedWave {
    #[inline]
    fn phase_at(&self, pos: Vec2, time: f32) -> f32 {
        self.direction.dot(pos) * self.k + time * self.speed + self.phase
    }
}

/// Sum-of-Gerstner-waves height field.
#[derive(Debug, Clone)]
pub struct WaveField {
    components: Vec<WaveComponent>,
    resolved: Vec<ResolvedWave>,
    time: f32,
}

impl Default for WaveField {
    fn default() -> Self {
        Self::new(crate::params::OceanConfig::default().waves)
    }
}

impl WaveField {
    /// Build a field, clamping any component that would break the surface.
    pub fn new(components: Vec<WaveComponent>) -> Self {
        let resolved = resolve(&components);
        Self {
            components,
            resolved,
            time: 0.0,
        }
    }

    /// A field with no waves (flat water at y = 0)
    pub fn flat() -> Self {
        Self::new(Vec::new())
    }

    /// Components as configured (before clamping)
    pub fn components(&self) -> &[WaveComponent] {
        &self.components
    }

    /// Components after clamping, in evaluation order
    pub fn resolved(&self) -> &[ResolvedWave] {
        &self.resolved
    }

    /// Replace one component. Out-of-range indices are ignored.
    ///
    /// The whole set is re-resolved, since the amplitude limit depends on
    /// the total steepness.
    pub fn set_component(&mut self, index: usize, component: WaveComponent) {
        let Some(slot) = self.components.get_mut(index) else {
            log::warn!(
                "Ignoring edit to wave {} ({} components)",
                index,
                self.components.len()
            );
            return;
        };
        *slot = component;
        self.resolved = resolve(&self.components);
    }

    pub fn push(&mut self, component: WaveComponent) {
        self.components.push(component);
        self.resolved = resolve(&self.components);
    }

    /// Accumulated wave time (seconds)
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advance wave time. Negative or non-finite steps are dropped.
    pub fn advance(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.time += dt;
        }
    }

    /// Upper bound on |height|: the sum of component amplitudes
    pub fn max_height(&self) -> f32 {
        self.resolved.iter().map(|w| w.amplitude).sum()
    }

    /// Vertical offset of the surface point that rests at `(x, z)`
    pub fn height(&self, x: f32, z: f32, t: f32) -> f32 {
        let pos = Vec2::new(x, z);
        self.resolved
            .iter()
            .map(|w| w.amplitude * w.phase_at(pos, t).sin())
            .sum()
    }

    /// Full Gerstner displacement `(dx, dy, dz)` of the surface point that
    /// rests at `(x, z)`
    pub fn displacement(&self, x: f32, z: f32, t: f32) -> Vec3 {
        let pos = Vec2::new(x, z);
        let mut out = Vec3::ZERO;
        for w in &self.resolved {
            let (sin, cos) = w.phase_at(pos, t).sin_cos();
            let horizontal = w.steepness * w.amplitude * cos;
            out.x += horizontal * w.direction.x;
            out.y += w.amplitude * sin;
            out.z += horizontal * w.direction.y;
        }
        out
    }

    /// Unit surface normal from the analytic partial derivatives of the
    /// displaced surface
    pub fn normal(&self, x: f32, z: f32, t: f32) -> Vec3 {
        let pos = Vec2::new(x, z);
        // Tangents of P(x0, z0) = (x0 + Dx, Dy, z0 + Dz)
        let mut tangent_x = Vec3::X;
        let mut tangent_z = Vec3::Z;
        for w in &self.resolved {
            let (sin, cos) = w.phase_at(pos, t).sin_cos();
            let d = w.direction;
            let qak_sin = w.steepness * w.amplitude * w.k * sin;
            let ak_cos = w.amplitude * w.k * cos;

            tangent_x += Vec3::new(-qak_sin * d.x * d.x, ak_cos * d.x, -qak_sin * d.x * d.y);
            tangent_z += Vec3::new(-qak_sin * d.x * d.y, ak_cos * d.y, -qak_sin * d.y * d.y);
        }
        tangent_z.cross(tangent_x).try_normalize().unwrap_or(Vec3::Y)
    }

    /// Height of the displaced surface directly above world `(x, z)`.
    ///
    /// `height` answers for the lattice point that *rests* at `(x, z)`, which
    /// Gerstner displacement moves sideways. This walks back along the
    /// horizontal displacement so the answer matches what is rendered there.
    pub fn surface_height(&self, x: f32, z: f32, t: f32) -> f32 {
        let target = Vec2::new(x, z);
        let mut rest = target;
        for _ in 0..SURFACE_HEIGHT_ITERATIONS {
            let d = self.displacement(rest.x, rest.y, t);
            rest = target - Vec2::new(d.x, d.z);
        }
        self.height(rest.x, rest.y, t)
    }
}

/// Clamp components into a non-self-intersecting set.
fn resolve(components: &[WaveComponent]) -> Vec<ResolvedWave> {
    let mut steepness_budget = 0.0;
    let mut out: Vec<ResolvedWave> = components
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let wavelength = if c.wavelength_m.is_finite() && c.wavelength_m >= MIN_WAVELENGTH_M {
                c.wavelength_m
            } else {
                log::warn!(
                    "Wave {}: wavelength {} clamped to {}",
                    i,
                    c.wavelength_m,
                    MIN_WAVELENGTH_M
                );
                MIN_WAVELENGTH_M
            };
            let steepness = if c.steepness.is_finite() {
                c.steepness.clamp(0.0, 1.0)
            } else {
                0.0
            };
            let direction = c.direction.try_normalize().unwrap_or(Vec2::X);
            let k = TAU / wavelength;
            let amplitude = c
                .amplitude_m
                .unwrap_or(steepness / k)
                .max(0.0);
            let speed = c.speed.unwrap_or_else(|| (GRAVITY * k).sqrt());

            steepness_budget += steepness;
            ResolvedWave {
                direction,
                steepness,
                k,
                amplitude: if amplitude.is_finite() { amplitude } else { 0.0 },
                speed: if speed.is_finite() { speed } else { 0.0 },
                phase: if c.phase.is_finite() { c.phase } else { 0.0 },
            }
        })
        .collect();

    // Σ Q·k·A ≤ 1 keeps the horizontal displacement from folding crests over
    if steepness_budget > 0.0 {
        for (i, w) in out.iter_mut().enumerate() {
            let limit = 1.0 / (w.k * steepness_budget);
            if w.amplitude > limit {
                log::warn!(
                    "Wave {}: amplitude {:.3}m clamped to {:.3}m",
                    i,
                    w.amplitude,
                    limit
                );
                w.amplitude = limit;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_wave() -> WaveField {
        WaveField::new(vec![
            WaveComponent::new(Vec2::new(1.0, 0.0), 0.5, 60.0).with_amplitude(1.0)
        ])
    }

    #[test]
    fn test_single_wave_height_at_origin_is_zero() {
        let field = single_wave();
        assert!(field.height(0.0, 0.0, 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_single_wave_peaks_at_quarter_wavelength() {
        let field = single_wave();
        let h = field.height(15.0, 0.0, 0.0);
        assert!((h - 1.0).abs() < 1e-4, "expected crest, got {}", h);
    }

    #[test]
    fn test_displacement_y_matches_height() {
        let field = WaveField::default();
        for &(x, z, t) in &[(0.0, 0.0, 0.0), (12.5, -3.0, 1.7), (-40.0, 90.0, 33.0)] {
            let d = field.displacement(x, z, t);
            assert!((d.y - field.height(x, z, t)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_horizontal_displacement_follows_direction() {
        let field = single_wave();
        // At phase 0, cos = 1: full push along +X, none along Z
        let d = field.displacement(0.0, 0.0, 0.0);
        assert!((d.x - 0.5).abs() < 1e-5);
        assert!(d.z.abs() < 1e-6);
    }

    #[test]
    fn test_flat_field_normal_is_up() {
        let field = WaveField::flat();
        assert_eq!(field.normal(3.0, 4.0, 5.0), Vec3::Y);
        assert_eq!(field.height(3.0, 4.0, 5.0), 0.0);
    }

    #[test]
    fn test_normal_matches_finite_difference() {
        let field = WaveField::default();
        let (x, z, t) = (7.0, -11.0, 2.5);
        let eps = 0.01;
        let p = |x0: f32, z0: f32| Vec3::new(x0, 0.0, z0) + field.displacement(x0, z0, t);
        let dx = p(x + eps, z) - p(x - eps, z);
        let dz = p(x, z + eps) - p(x, z - eps);
        let numeric = dz.cross(dx).normalize();
        let analytic = field.normal(x, z, t);
        assert!(
            numeric.dot(analytic) > 0.999,
            "numeric {:?} vs analytic {:?}",
            numeric,
            analytic
        );
    }

    #[test]
    fn test_nonpositive_wavelength_is_clamped() {
        let field = WaveField::new(vec![WaveComponent::new(Vec2::X, 0.5, -4.0)]);
        let w = field.resolved()[0];
        assert!((w.k - TAU / MIN_WAVELENGTH_M).abs() < 1e-2);
        assert!(field.height(1.0, 2.0, 3.0).is_finite());
    }

    #[test]
    fn test_amplitude_clamped_to_steepness_budget() {
        let field = WaveField::new(vec![
            WaveComponent::new(Vec2::X, 1.0, 10.0).with_amplitude(50.0),
            WaveComponent::new(Vec2::Y, 1.0, 10.0),
        ]);
        let budget: f32 = field
            .resolved()
            .iter()
            .map(|w| w.steepness * w.k * w.amplitude)
            .sum();
        assert!(budget <= 1.0 + 1e-5, "crest fold budget {}", budget);
    }

    #[test]
    fn test_zero_direction_falls_back_to_x() {
        let field = WaveField::new(vec![WaveComponent::new(Vec2::ZERO, 0.2, 20.0)]);
        assert_eq!(field.resolved()[0].direction, Vec2::X);
    }

    #[test]
    fn test_advance_ignores_negative_and_nan() {
        let mut field = WaveField::flat();
        field.advance(0.5);
        field.advance(-1.0);
        field.advance(f32::NAN);
        field.advance(0.0);
        assert_eq!(field.time(), 0.5);
    }

    #[test]
    fn test_set_component_reresolves() {
        let mut field = single_wave();
        field.set_component(0, WaveComponent::new(Vec2::Y, 0.1, 30.0).with_amplitude(2.0));
        assert_eq!(field.resolved()[0].direction, Vec2::Y);
        assert_eq!(field.resolved()[0].amplitude, 2.0);

        // Unknown index leaves the field alone
        field.set_component(5, WaveComponent::new(Vec2::X, 0.1, 30.0));
        assert_eq!(field.resolved().len(), 1);
    }

    #[test]
    fn test_surface_height_on_flat_is_zero() {
        let field = WaveField::flat();
        assert_eq!(field.surface_height(10.0, -10.0, 1.0), 0.0);
    }

    #[test]
    fn test_surface_height_tracks_displaced_vertex() {
        let field = WaveField::default();
        let (x0, z0, t) = (20.0, 5.0, 4.0);
        let d = field.displacement(x0, z0, t);
        let world = Vec2::new(x0 + d.x, z0 + d.z);
        let h = field.surface_height(world.x, world.y, t);
        assert!((h - d.y).abs() < 0.05, "surface {} vs vertex {}", h, d.y);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn any_coord() -> impl Strategy<Value = f32> {
            -1.0e4_f32..1.0e4
        }

        fn any_time() -> impl Strategy<Value = f32> {
            0.0_f32..1.0e3
        }

        proptest! {
            #[test]
            fn height_is_finite_and_bounded(x in any_coord(), z in any_coord(), t in any_time()) {
                let field = WaveField::default();
                let h = field.height(x, z, t);
                prop_assert!(h.is_finite());
                prop_assert!(h.abs() <= field.max_height() + 1e-4);
            }

            #[test]
            fn normal_has_unit_length(x in any_coord(), z in any_coord(), t in any_time()) {
                let field = WaveField::default();
                let n = field.normal(x, z, t);
                prop_assert!((n.length() - 1.0).abs() < 1e-5);
                prop_assert!(n.y > 0.0);
            }

            #[test]
            fn clamped_fields_never_fold(
                steepness in 0.0_f32..1.0,
                wavelength in -10.0_f32..200.0,
                amplitude in 0.0_f32..100.0,
            ) {
                let field = WaveField::new(vec![
                    WaveComponent::new(Vec2::X, steepness, wavelength).with_amplitude(amplitude),
                    WaveComponent::new(Vec2::new(0.6, 0.8), steepness, wavelength * 0.5),
                ]);
                let fold: f32 = field
                    .resolved()
                    .iter()
                    .map(|w| w.steepness * w.k * w.amplitude)
                    .sum();
                prop_assert!(fold <= 1.0 + 1e-4);
            }
        }
    }
}
