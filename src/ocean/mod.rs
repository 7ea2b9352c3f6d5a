//! Ocean surface: analytic Gerstner wave field and the grid it displaces.

mod mesh;
mod wave;

// Re-export public types
pub use mesh::{OceanGrid, Vertex};
pub use wave::{ResolvedWave, WaveComponent, WaveField, GRAVITY, MIN_WAVELENGTH_M};
