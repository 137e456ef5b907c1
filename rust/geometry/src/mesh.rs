// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shadow mesh buffers

use nalgebra::Point2;

/// Triangle mesh with 2D positions and optional texture coordinates
///
/// `tex_coords` is either empty (untextured mesh) or holds one `(u, v)` pair
/// per vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadowMesh {
    /// Vertex positions (x, y)
    pub positions: Vec<f32>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl ShadowMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 2),
            tex_coords: Vec::new(),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Add an untextured vertex, returning its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point2<f64>) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        index
    }

    /// Add a vertex with texture coordinate, returning its index
    #[inline]
    pub fn add_textured_vertex(&mut self, position: Point2<f64>, tex: Point2<f64>) -> u32 {
        let index = self.add_vertex(position);
        self.tex_coords.push(tex.x as f32);
        self.tex_coords.push(tex.y as f32);
        index
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Append triangle indices that are local to a block of vertices starting at `base`
    #[inline]
    pub fn add_indices(&mut self, base: u32, local: &[usize]) {
        self.indices.extend(local.iter().map(|&i| base + i as u32));
    }

    /// Merge another mesh into this one, offsetting its indices
    #[inline]
    pub fn merge(&mut self, other: &ShadowMesh) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = self.vertex_count() as u32;

        self.positions.reserve(other.positions.len());
        self.tex_coords.reserve(other.tex_coords.len());
        self.indices.reserve(other.indices.len());

        self.positions.extend_from_slice(&other.positions);
        self.tex_coords.extend_from_slice(&other.tex_coords);
        self.indices
            .extend(other.indices.iter().map(|&i| i + vertex_offset));
    }

    /// Position of vertex `index`
    #[inline]
    pub fn position(&self, index: usize) -> Point2<f32> {
        Point2::new(self.positions[index * 2], self.positions[index * 2 + 1])
    }

    /// Texture coordinate of vertex `index`, if the mesh is textured
    #[inline]
    pub fn tex_coord(&self, index: usize) -> Option<Point2<f32>> {
        if self.tex_coords.len() < (index + 1) * 2 {
            return None;
        }
        Some(Point2::new(
            self.tex_coords[index * 2],
            self.tex_coords[index * 2 + 1],
        ))
    }

    /// Iterate over all vertex positions
    pub fn iter_positions(&self) -> impl Iterator<Item = Point2<f32>> + '_ {
        self.positions
            .chunks_exact(2)
            .map(|c| Point2::new(c[0], c[1]))
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 2
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Textured meshes carry one texture coordinate per vertex
    #[inline]
    pub fn is_textured(&self) -> bool {
        !self.tex_coords.is_empty()
    }

    /// Calculate bounds (min, max)
    pub fn bounds(&self) -> (Point2<f32>, Point2<f32>) {
        if self.is_empty() {
            return (Point2::origin(), Point2::origin());
        }

        let mut min = Point2::new(f32::MAX, f32::MAX);
        let mut max = Point2::new(f32::MIN, f32::MIN);

        self.positions.chunks_exact(2).for_each(|chunk| {
            min.x = min.x.min(chunk[0]);
            min.y = min.y.min(chunk[1]);
            max.x = max.x.max(chunk[0]);
            max.y = max.y.max(chunk[1]);
        });

        (min, max)
    }

    /// Clear the mesh, keeping allocations
    #[inline]
    pub fn clear(&mut self) {
        self.positions.clear();
        self.tex_coords.clear();
        self.indices.clear();
    }
}
