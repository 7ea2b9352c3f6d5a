//! Ocean render grid displaced by the wave field every frame.

use bytemuck::{Pod, Zeroable};

use super::WaveField;
use crate::params::{OceanConfig, MAX_GRID_SIZE};

/// Vertex data for ocean mesh (displaced position + normal + UV)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Ocean grid mesh centred on the origin
pub struct OceanGrid {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Undisplaced XZ lattice positions, one per vertex
    rest_positions: Vec<[f32; 2]>,
    grid_size: usize,
}

impl OceanGrid {
    /// Create a flat grid with the configured resolution and spacing
    pub fn new(config: &OceanConfig) -> Self {
        let grid_size = config.grid_size.clamp(1, MAX_GRID_SIZE);
        let grid_spacing = config.grid_spacing_m;
        let half_size = (grid_size as f32 * grid_spacing) / 2.0;

        let mut vertices = Vec::with_capacity((grid_size + 1).pow(2));
        let mut rest_positions = Vec::with_capacity((grid_size + 1).pow(2));
        let mut indices = Vec::with_capacity(grid_size.pow(2) * 6);

        // Generate flat XZ plane grid
        for z in 0..=grid_size {
            for x in 0..=grid_size {
                let x_pos = x as f32 * grid_spacing - half_size;
                let z_pos = z as f32 * grid_spacing - half_size;

                rest_positions.push([x_pos, z_pos]);
                vertices.push(Vertex {
                    position: [x_pos, 0.0, z_pos],
                    normal: [0.0, 1.0, 0.0],
                    uv: [x as f32 / grid_size as f32, z as f32 / grid_size as f32],
                });
            }
        }

        // Generate triangle indices (counter-clockwise winding seen from +Y)
        for z in 0..grid_size {
            for x in 0..grid_size {
                let top_left = (z * (grid_size + 1) + x) as u32;
                let top_right = top_left + 1;
                let bottom_left = ((z + 1) * (grid_size + 1) + x) as u32;
                let bottom_right = bottom_left + 1;

                indices.extend_from_slice(&[
                    top_left,
                    bottom_left,
                    top_right,
                    top_right,
                    bottom_left,
                    bottom_right,
                ]);
            }
        }

        Self {
            vertices,
            indices,
            rest_positions,
            grid_size,
        }
    }

    /// Quads per side
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Move every vertex to its Gerstner-displaced position at time `t`
    /// and refresh its analytic normal.
    pub fn displace(&mut self, field: &WaveField, t: f32) {
        for (vertex, rest) in self.vertices.iter_mut().zip(&self.rest_positions) {
            let [x, z] = *rest;
            let d = field.displacement(x, z, t);
            vertex.position = [x + d.x, d.y, z + d.z];
            vertex.normal = field.normal(x, z, t).to_array();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> OceanConfig {
        OceanConfig {
            grid_size: 16,
            grid_spacing_m: 2.0,
            ..OceanConfig::default()
        }
    }

    #[test]
    fn test_ocean_grid_creation() {
        let config = small_config();
        let grid = OceanGrid::new(&config);

        // Check vertex count: (grid_size + 1)^2
        assert_eq!(grid.vertices.len(), (config.grid_size + 1).pow(2));

        // Check triangle count: grid_size^2 * 2 triangles * 3 indices
        assert_eq!(grid.indices.len(), config.grid_size.pow(2) * 6);
    }

    #[test]
    fn test_grid_is_centred() {
        let grid = OceanGrid::new(&small_config());
        let first = grid.vertices.first().map(|v| v.position);
        let last = grid.vertices.last().map(|v| v.position);
        assert_eq!(first, Some([-16.0, 0.0, -16.0]));
        assert_eq!(last, Some([16.0, 0.0, 16.0]));
    }

    #[test]
    fn test_displace_matches_field() {
        let config = small_config();
        let field = WaveField::new(config.waves.clone());
        let mut grid = OceanGrid::new(&config);
        grid.displace(&field, 3.0);

        let index = 5 * (config.grid_size + 1) + 7;
        let [x, z] = grid.rest_positions[index];
        let d = field.displacement(x, z, 3.0);
        let v = grid.vertices[index];
        assert!((v.position[1] - d.y).abs() < 1e-6);
        assert!((v.position[0] - (x + d.x)).abs() < 1e-5);
        let n = glam::Vec3::from_array(v.normal);
        assert!((n.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_displace_is_repeatable() {
        let config = small_config();
        let field = WaveField::new(config.waves.clone());
        let mut grid = OceanGrid::new(&config);
        grid.displace(&field, 1.0);
        let once: Vec<[f32; 3]> = grid.vertices.iter().map(|v| v.position).collect();
        grid.displace(&field, 1.0);
        let twice: Vec<[f32; 3]> = grid.vertices.iter().map(|v| v.position).collect();
        assert_eq!(once, twice);
    }
}
