//! # Procedural Geometry Generation
//!
//! Pure functions that produce the vertex arrays of the viewer's built-in
//! shapes, ready to be handed to an [`Actor`](crate::gfx::scene::Actor) for
//! upload.
//!
//! ## Supported Primitives
//!
//! - **Cube**: 36 vertices with face normals
//! - **Cone** / **Cylinder**: sides plus triangulated caps
//! - **Icosahedron**: subdivided sphere approximation, indexed
//! - **Grid** / **Floor**: line strips drawn with a multi-draw
//! - **Axis**: coloured x and z lines
//! - **Background**: full-screen gradient in clip space
//!
//! ## Usage
//!
//! ```rust
//! use viewer3d::gfx::geometry::{generate_cube, generate_grid};
//!
//! let cube = generate_cube(1.0);
//! assert_eq!(cube.vertex_count(), 36);
//!
//! let grid = generate_grid(10.0, 10.0, 4, 4);
//! assert_eq!(grid.draw_ranges.len(), 10);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::gpu::Topology;

/// A contiguous run of vertices drawn with one topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRange {
    pub topology: Topology,
    pub first: u32,
    pub count: u32,
}

impl DrawRange {
    pub fn new(topology: Topology, first: u32, count: u32) -> Self {
        Self {
            topology,
            first,
            count,
        }
    }
}

/// Represents generated geometry data ready for GPU upload
///
/// Optional attributes are left empty when a shape does not provide them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Vertex colours (r, g, b)
    pub colors: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
    /// How non-indexed vertices are drawn
    pub draw_ranges: Vec<DrawRange>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    /// Appends vertices drawn as one range
    pub fn push_range(&mut self, topology: Topology, vertices: &[[f32; 3]], normals: &[[f32; 3]]) {
        let first = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.normals.extend_from_slice(normals);
        self.draw_ranges
            .push(DrawRange::new(topology, first, vertices.len() as u32));
    }

    /// Topology of the first range, or triangles for indexed geometry
    pub fn primary_topology(&self) -> Topology {
        if self.is_indexed() {
            return Topology::Triangles;
        }
        self.draw_ranges
            .first()
            .map(|range| range.topology)
            .unwrap_or(Topology::Triangles)
    }
}
