//! Sun placement, analytic sky radiance, and SH ambient.

mod irradiance;
mod model;
mod sun;

pub use irradiance::{Sh9Irradiance, Sh9Uniform};
pub use model::{SkyEnvironment, SkyUniform};
pub use sun::sun_direction;
