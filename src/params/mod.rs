//! Parameter definitions with physical units and documented semantics.
//!
//! All tunable numbers live here with:
//! - Physical units (meters, seconds, degrees, etc.)
//! - Documented ranges and meanings
//! - Defaults tuned for a low-sun ocean scene

mod camera;
mod floater;
mod ocean;
mod render;
mod sky;

// Re-export all types
pub use camera::OrbitCameraConfig;
pub use floater::{FloaterConfig, HullShape};
pub use ocean::{OceanConfig, WavePreset, MAX_GRID_SIZE};
pub use render::RenderConfig;
pub use sky::{SkyParameters, SunParameters, WaterAppearance};
