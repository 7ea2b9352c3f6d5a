//! Footprint sampling under a floating body.

use glam::{Quat, Vec3};

use super::hull::Aabb;
use crate::ocean::WaveField;

/// Four object-local sample points on the bottom of a hull.
///
/// Corner order: `(-x,-z)`, `(+x,-z)`, `(+x,+z)`, `(-x,+z)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub corners: [Vec3; 4],
}

/// What the water under a footprint looks like right now
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Support {
    /// Mean sampled surface height (meters)
    pub mean_height: f32,
    /// Unit up vector of the plane through the samples (y >= 0)
    pub up: Vec3,
}

impl Footprint {
    /// Bottom corners of `bounds`, pulled toward its center by `inset`.
    pub fn from_bounds(bounds: &Aabb, inset: f32) -> Self {
        let inset = if inset.is_finite() && inset > 0.0 {
            inset.min(1.0)
        } else {
            log::warn!("Footprint inset {} out of (0, 1], using 1.0", inset);
            1.0
        };
        let center = bounds.center();
        let half = bounds.size() * 0.5 * inset;
        let y = bounds.min.y;
        let corner = |sx: f32, sz: f32| Vec3::new(center.x + sx * half.x, y, center.z + sz * half.z);
        Self {
            corners: [
                corner(-1.0, -1.0),
                corner(1.0, -1.0),
                corner(1.0, 1.0),
                corner(-1.0, 1.0),
            ],
        }
    }

    /// World-space surface points under each corner.
    ///
    /// Corners follow the body's heading only; tilt is what we are solving
    /// for, so it is not applied.
    pub fn sample(&self, position: Vec3, heading: Quat, field: &WaveField, time: f32) -> [Vec3; 4] {
        self.corners.map(|c| {
            let offset = heading * Vec3::new(c.x, 0.0, c.z);
            let x = position.x + offset.x;
            let z = position.z + offset.z;
            Vec3::new(x, field.surface_height(x, z, time), z)
        })
    }
}

/// Mean height and plane normal from four footprint samples.
pub fn support(points: &[Vec3; 4]) -> Support {
    let mean_height = points.iter().map(|p| p.y).sum::<f32>() / 4.0;

    // Diagonals span the quad even when it is twisted
    let d1 = points[2] - points[0];
    let d2 = points[1] - points[3];
    let up = match d1.cross(d2).try_normalize() {
        Some(n) if n.y < 0.0 => -n,
        Some(n) => n,
        None => Vec3::Y,
    };

    Support { mean_height, up }
}
