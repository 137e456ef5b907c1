// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hull model: a polygon occluder with a local point set, a world transform
//! and cached world-space data (points, apex normals, bounds, fill indices).
//!
//! Points are normalized to counter-clockwise winding at construction. A
//! mirroring transform would flip the world winding, so the cache reverses
//! the world order in that case and remaps the fill indices accordingly;
//! consumers always see counter-clockwise world points.

use crate::bool2d::{compute_signed_area, MIN_AREA_THRESHOLD};
use crate::bounds::Aabb2;
use crate::error::{Error, Result};
use crate::primitives::{normalize_or_none, EPSILON};
use crate::triangulation::{is_convex, triangulate_polygon};
use nalgebra::{Matrix3, Point2, Vector2};

/// Position, rotation and scale applied to a hull's local points
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HullTransform {
    /// World translation
    pub position: Vector2<f64>,
    /// Rotation in radians, counter-clockwise
    pub rotation: f64,
    /// Non-uniform scale
    pub scale: Vector2<f64>,
    /// Local pivot point for rotation and scale
    pub origin: Point2<f64>,
}

impl Default for HullTransform {
    fn default() -> Self {
        Self {
            position: Vector2::zeros(),
            rotation: 0.0,
            scale: Vector2::new(1.0, 1.0),
            origin: Point2::origin(),
        }
    }
}

impl HullTransform {
    /// Homogeneous local-to-world matrix: translate * rotate * scale * (-origin)
    pub fn to_matrix(&self) -> Matrix3<f64> {
        Matrix3::new_translation(&self.position)
            * Matrix3::new_rotation(self.rotation)
            * Matrix3::new_nonuniform_scaling(&self.scale)
            * Matrix3::new_translation(&-self.origin.coords)
    }

    /// A transform with negative determinant mirrors the point set
    #[inline]
    pub fn is_mirroring(&self) -> bool {
        self.scale.x * self.scale.y < 0.0
    }
}

/// The two outward edge normals meeting at a hull vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApexNormals {
    /// Normal of the edge arriving at the vertex (previous -> vertex)
    pub incoming: Vector2<f64>,
    /// Normal of the edge leaving the vertex (vertex -> next)
    pub outgoing: Vector2<f64>,
}

/// Comparable state of a hull, used to decide whether shadows must be rebuilt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullSnapshot {
    pub transform: HullTransform,
    pub enabled: bool,
    pub revision: u64,
}

/// Outward normal of the CCW edge `a -> b`
#[inline]
pub fn edge_normal(a: &Point2<f64>, b: &Point2<f64>) -> Vector2<f64> {
    let d = b - a;
    normalize_or_none(&Vector2::new(d.y, -d.x)).unwrap_or_else(Vector2::zeros)
}

/// Convex or concave occluder polygon
#[derive(Debug, Clone)]
pub struct Hull {
    local_points: Vec<Point2<f64>>,
    local_indices: Vec<u32>,
    transform: HullTransform,
    enabled: bool,
    convex: bool,
    revision: u64,
    dirty: bool,
    world_points: Vec<Point2<f64>>,
    world_indices: Vec<u32>,
    normals: Vec<ApexNormals>,
    bounds: Aabb2,
}

impl Hull {
    /// Create a hull from local points (either winding)
    ///
    /// Consecutive duplicate points are dropped. Fails for fewer than 3
    /// distinct points, non-finite coordinates or a zero-area polygon.
    pub fn new(points: impl Into<Vec<Point2<f64>>>) -> Result<Self> {
        let (local_points, local_indices, convex) = Self::prepare(points.into())?;
        let mut hull = Self {
            bounds: Aabb2::new(local_points[0], local_points[0]),
            local_points,
            local_indices,
            transform: HullTransform::default(),
            enabled: true,
            convex,
            revision: 0,
            dirty: true,
            world_points: Vec::new(),
            world_indices: Vec::new(),
            normals: Vec::new(),
        };
        hull.refresh();
        Ok(hull)
    }

    /// Axis-aligned rectangle centered on the local origin
    pub fn rectangle(width: f64, height: f64) -> Result<Self> {
        let (hw, hh) = (width * 0.5, height * 0.5);
        Self::new(vec![
            Point2::new(-hw, -hh),
            Point2::new(hw, -hh),
            Point2::new(hw, hh),
            Point2::new(-hw, hh),
        ])
    }

    fn prepare(points: Vec<Point2<f64>>) -> Result<(Vec<Point2<f64>>, Vec<u32>, bool)> {
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(Error::hull("Hull points must be finite"));
        }

        let mut deduped: Vec<Point2<f64>> = Vec::with_capacity(points.len());
        for p in points {
            if deduped.last().map_or(true, |last| (p - last).norm() > EPSILON) {
                deduped.push(p);
            }
        }
        while deduped.len() > 1 && (deduped[0] - deduped[deduped.len() - 1]).norm() <= EPSILON {
            deduped.pop();
        }

        if deduped.len() < 3 {
            return Err(Error::hull(format!(
                "Hull needs at least 3 distinct points, got {}",
                deduped.len()
            )));
        }

        let area = compute_signed_area(&deduped);
        if area.abs() <= MIN_AREA_THRESHOLD {
            return Err(Error::hull("Hull has zero area"));
        }
        if area < 0.0 {
            deduped.reverse();
        }

        let indices = triangulate_polygon(&deduped)?
            .into_iter()
            .map(|i| i as u32)
            .collect();
        let convex = is_convex(&deduped);

        Ok((deduped, indices, convex))
    }

    /// Replace the local point set (rare; bumps the revision)
    pub fn set_points(&mut self, points: impl Into<Vec<Point2<f64>>>) -> Result<()> {
        let (local_points, local_indices, convex) = Self::prepare(points.into())?;
        self.local_points = local_points;
        self.local_indices = local_indices;
        self.convex = convex;
        self.revision += 1;
        self.dirty = true;
        Ok(())
    }

    pub fn transform(&self) -> &HullTransform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: HullTransform) {
        if self.transform != transform {
            self.transform = transform;
            self.dirty = true;
        }
    }

    pub fn set_position(&mut self, position: Vector2<f64>) {
        self.set_transform(HullTransform {
            position,
            ..self.transform
        });
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.set_transform(HullTransform {
            rotation,
            ..self.transform
        });
    }

    pub fn set_scale(&mut self, scale: Vector2<f64>) {
        self.set_transform(HullTransform {
            scale,
            ..self.transform
        });
    }

    pub fn set_origin(&mut self, origin: Point2<f64>) {
        self.set_transform(HullTransform {
            origin,
            ..self.transform
        });
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// True when the local point set passes the convexity test
    pub fn is_convex(&self) -> bool {
        self.convex
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True when the world cache is stale and `refresh` must run
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn snapshot(&self) -> HullSnapshot {
        HullSnapshot {
            transform: self.transform,
            enabled: self.enabled,
            revision: self.revision,
        }
    }

    /// Recompute world points, apex normals, bounds and fill indices if dirty
    pub fn refresh(&mut self) {
        if !self.dirty {
            return;
        }

        let matrix = self.transform.to_matrix();
        let n = self.local_points.len();

        self.world_points.clear();
        self.world_points
            .extend(self.local_points.iter().map(|p| matrix.transform_point(p)));

        self.world_indices.clear();
        if self.transform.is_mirroring() {
            // Mirrored: restore CCW order, index i now lives at n - 1 - i
            self.world_points.reverse();
            let last = (n - 1) as u32;
            for tri in self.local_indices.chunks_exact(3) {
                self.world_indices
                    .extend_from_slice(&[last - tri[2], last - tri[1], last - tri[0]]);
            }
        } else {
            self.world_indices.extend_from_slice(&self.local_indices);
        }

        self.normals.clear();
        for i in 0..n {
            let prev = &self.world_points[(i + n - 1) % n];
            let curr = &self.world_points[i];
            let next = &self.world_points[(i + 1) % n];
            self.normals.push(ApexNormals {
                incoming: edge_normal(prev, curr),
                outgoing: edge_normal(curr, next),
            });
        }

        if let Some(bounds) = Aabb2::from_points(&self.world_points) {
            self.bounds = bounds;
        }
        self.dirty = false;
    }

    pub fn local_points(&self) -> &[Point2<f64>] {
        &self.local_points
    }

    /// World-space points in counter-clockwise order (as of the last `refresh`)
    pub fn world_points(&self) -> &[Point2<f64>] {
        &self.world_points
    }

    /// Apex normals matching `world_points`
    pub fn apex_normals(&self) -> &[ApexNormals] {
        &self.normals
    }

    /// Fill triangulation indices into `world_points`
    pub fn fill_indices(&self) -> &[u32] {
        &self.world_indices
    }

    pub fn bounds(&self) -> &Aabb2 {
        &self.bounds
    }

    pub fn len(&self) -> usize {
        self.local_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local_points.is_empty()
    }
}
