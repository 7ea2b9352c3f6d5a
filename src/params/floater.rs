//! Floating body configuration.

/// Built-in hull shapes delivered by the asset loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HullShape {
    /// 5 x 5 x 15 m box
    #[default]
    Crate,
    /// Tapered boat prism, 15 m long
    Skiff,
}

impl HullShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crate => "crate",
            Self::Skiff => "skiff",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "crate" | "box" => Some(Self::Crate),
            "skiff" | "boat" => Some(Self::Skiff),
            _ => None,
        }
    }
}

/// Buoyancy tuning for a floating body
#[derive(Debug, Clone)]
pub struct FloaterConfig {
    /// Approach rate toward the target height (1/s).
    /// Smoothing per step is `1 - exp(-rate * dt)`, so the settle time is
    /// independent of frame rate.
    pub buoyancy_strength: f32,

    /// Approach rate toward the target orientation (1/s)
    pub orientation_strength: f32,

    /// Vertical offset of the body origin above the mean sampled surface (meters).
    /// Negative values sink the hull (draft).
    pub rest_offset_m: f32,

    /// Fraction of the bounding box half-extent used for footprint corners (0..1].
    /// Sampling slightly inside the hull keeps corners from reading a crest
    /// the hull doesn't actually cover.
    pub footprint_inset: f32,

    /// Uniform scale applied to the hull geometry
    pub hull_scale: f32,
}

impl Default for FloaterConfig {
    fn default() -> Self {
        Self {
            buoyancy_strength: 3.0,
            orientation_strength: 2.0,
            rest_offset_m: 0.0,
            footprint_inset: 0.9,
            hull_scale: 1.0,
        }
    }
}
