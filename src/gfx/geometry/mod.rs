//! # Procedural Geometry Generation
//!
//! Every mesh in the diorama is procedural: boxes for the wall and graves, a
//! four-sided cone for the roof, planes for the floor and door, and spheres for
//! the bushes and light helpers. No model files are involved.
//!
//! ## Usage
//!
//! ```rust
//! use haunted_house::gfx::geometry::{generate_box, generate_cone, generate_plane};
//!
//! let wall = generate_box(5.0, 4.0, 5.0);
//! let roof = generate_cone(4.0, 2.0, 4);
//! let door = generate_plane(2.5, 2.5, 200, 200);
//! assert_eq!(door.vertex_count(), 201 * 201);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v), v pointing up the image
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaves positions, normals and UVs into the renderer's vertex format
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        (0..self.vertices.len())
            .map(|i| Vertex3D {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                tex_coords: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect()
    }
}
