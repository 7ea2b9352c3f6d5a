//! Hull geometry for floating bodies and the background loader that
//! delivers it.

use glam::Vec3;
use std::sync::mpsc;
use std::thread;

use crate::params::HullShape;

/// Flat-shaded hull vertex
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct HullVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Axis-aligned bounding box in object space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Triangle mesh of one hull, centered on its origin.
#[derive(Debug, Clone, Default)]
pub struct HullGeometry {
    pub vertices: Vec<HullVertex>,
    pub indices: Vec<u32>,
}

impl HullGeometry {
    /// Build one of the stock shapes, uniformly scaled.
    pub fn build(shape: HullShape, scale: f32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            log::warn!("Hull scale {} is not positive, using 1.0", scale);
            1.0
        };

        let faces: Vec<Vec<Vec3>> = match shape {
            HullShape::Crate => crate_faces(Vec3::new(5.0, 5.0, 15.0)),
            HullShape::Skiff => skiff_faces(),
        };

        let mut geometry = Self::default();
        for face in &faces {
            let scaled: Vec<Vec3> = face.iter().map(|p| *p * scale).collect();
            geometry.push_face(&scaled);
        }
        geometry
    }

    /// Bounds of all vertices (zero box when empty)
    pub fn bounds(&self) -> Aabb {
        let mut iter = self.vertices.iter().map(|v| Vec3::from_array(v.position));
        let Some(first) = iter.next() else {
            return Aabb {
                min: Vec3::ZERO,
                max: Vec3::ZERO,
            };
        };
        iter.fold(
            Aabb {
                min: first,
                max: first,
            },
            |b, p| Aabb {
                min: b.min.min(p),
                max: b.max.max(p),
            },
        )
    }

    /// Fan-triangulate a convex planar polygon with an outward flat normal.
    ///
    /// Shapes here are convex and contain the origin, so "outward" is away
    /// from the origin.
    fn push_face(&mut self, polygon: &[Vec3]) {
        if polygon.len() < 3 {
            return;
        }
        let centroid = polygon.iter().copied().sum::<Vec3>() / polygon.len() as f32;
        let mut normal = (polygon[1] - polygon[0])
            .cross(polygon[2] - polygon[0])
            .normalize_or_zero();
        let flip = normal.dot(centroid) < 0.0;
        if flip {
            normal = -normal;
        }

        for i in 1..polygon.len() - 1 {
            let (b, c) = if flip {
                (polygon[i + 1], polygon[i])
            } else {
                (polygon[i], polygon[i + 1])
            };
            for p in [polygon[0], b, c] {
                self.indices.push(self.vertices.len() as u32);
                self.vertices.push(HullVertex {
                    position: p.to_array(),
                    normal: normal.to_array(),
                });
            }
        }
    }
}

/// Six faces of a box with the given full extents
fn crate_faces(size: Vec3) -> Vec<Vec<Vec3>> {
    let h = size * 0.5;
    let corner = |sx: f32, sy: f32, sz: f32| Vec3::new(sx * h.x, sy * h.y, sz * h.z);
    vec![
        vec![corner(1., -1., -1.), corner(1., 1., -1.), corner(1., 1., 1.), corner(1., -1., 1.)],
        vec![corner(-1., -1., -1.), corner(-1., -1., 1.), corner(-1., 1., 1.), corner(-1., 1., -1.)],
        vec![corner(-1., 1., -1.), corner(-1., 1., 1.), corner(1., 1., 1.), corner(1., 1., -1.)],
        vec![corner(-1., -1., -1.), corner(1., -1., -1.), corner(1., -1., 1.), corner(-1., -1., 1.)],
        vec![corner(-1., -1., 1.), corner(1., -1., 1.), corner(1., 1., 1.), corner(-1., 1., 1.)],
        vec![corner(-1., -1., -1.), corner(-1., 1., -1.), corner(1., 1., -1.), corner(1., -1., -1.)],
    ]
}

/// Boat prism: 5 m beam, 15 m long, pointed bow toward +Z, narrower flat
/// bottom
fn skiff_faces() -> Vec<Vec<Vec3>> {
    let deck = [
        Vec3::new(-2.5, 1.0, -7.5),
        Vec3::new(2.5, 1.0, -7.5),
        Vec3::new(2.5, 1.0, 2.5),
        Vec3::new(0.0, 1.0, 7.5),
        Vec3::new(-2.5, 1.0, 2.5),
    ];
    let bottom = [
        Vec3::new(-1.2, -1.5, -7.5),
        Vec3::new(1.2, -1.5, -7.5),
        Vec3::new(1.2, -1.5, 2.5),
        Vec3::new(0.0, -1.5, 6.0),
        Vec3::new(-1.2, -1.5, 2.5),
    ];

    let mut faces = vec![deck.to_vec(), bottom.to_vec()];
    for i in 0..deck.len() {
        let j = (i + 1) % deck.len();
        // Sides taper, so split each into planar triangles
        faces.push(vec![deck[i], deck[j], bottom[j]]);
        faces.push(vec![deck[i], bottom[j], bottom[i]]);
    }
    faces
}

/// Builds hull geometry off the main thread.
///
/// Floaters stay pending until [`AssetLoader::poll`] hands the geometry over.
pub struct AssetLoader {
    rx: Option<mpsc::Receiver<HullGeometry>>,
}

impl AssetLoader {
    pub fn spawn(shape: HullShape, scale: f32) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let geometry = HullGeometry::build(shape, scale);
            log::info!(
                "Loaded {} hull ({} triangles)",
                shape.as_str(),
                geometry.indices.len() / 3
            );
            let _ = tx.send(geometry);
        });
        Self { rx: Some(rx) }
    }

    /// Geometry, once. Returns `None` while loading and after delivery.
    pub fn poll(&mut self) -> Option<HullGeometry> {
        let rx = self.rx.as_ref()?;
        match rx.try_recv() {
            Ok(geometry) => {
                self.rx = None;
                Some(geometry)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                log::error!("Hull loader exited without delivering geometry");
                self.rx = None;
                None
            }
        }
    }

    /// True while a delivery is still outstanding
    pub fn is_pending(&self) -> bool {
        self.rx.is_some()
    }
}
