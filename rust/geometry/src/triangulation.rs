// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Fan triangulation for convex polygons, earcutr for everything else.

use crate::bool2d::compute_signed_area;
use crate::{Error, Point2, Result};

/// Check if a polygon is convex (all non-degenerate cross products have same sign)
#[inline]
pub fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        // Cross product of edges
        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false; // Sign changed - not convex
            }
        }
    }

    true
}

/// Fan triangulation of an `n`-gon around vertex 0
#[inline]
pub fn fan_triangulate(n: usize) -> Vec<usize> {
    if n < 3 {
        return Vec::new();
    }
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Triangulate a simple polygon (no holes)
/// Returns triangle indices into the input points
///
/// Convex polygons are fanned from vertex 0, which keeps the first vertex
/// shared by every triangle.
#[inline]
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    // FAST PATH: Triangle - no triangulation needed
    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }

    // FAST PATH: Convex polygon - use fan triangulation
    if n <= 8 && is_convex(points) {
        return Ok(fan_triangulate(n));
    }

    // Flatten points for earcutr
    let mut vertices = Vec::with_capacity(n * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    let mut indices = earcutr::earcut(&vertices, &[], 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))?;

    // earcutr emits clockwise triangles; follow the input winding instead
    let ccw = compute_signed_area(points) > 0.0;
    for tri in indices.chunks_exact_mut(3) {
        let (a, b, c) = (&points[tri[0]], &points[tri[1]], &points[tri[2]]);
        let cross = (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y);
        if (cross > 0.0) != ccw {
            tri.swap(1, 2);
        }
    }

    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangulate_square() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];

        let indices = triangulate_polygon(&points).unwrap();

        // Square should be fanned from vertex 0 into 2 triangles
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_triangulate_triangle() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.5, 1.0),
        ];

        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len(), 3);
    }

    #[test]
    fn test_triangulate_insufficient_points() {
        let points = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];

        let result = triangulate_polygon(&points);
        assert!(result.is_err());
    }

    #[test]
    fn test_triangulate_concave_quad() {
        // Dart shape: fanning from vertex 0 would cover area outside the polygon
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 2.0),
            Point2::new(0.0, 4.0),
            Point2::new(1.0, 2.0),
        ];
        assert!(!is_convex(&points));

        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len(), 6);

        // Triangles keep the counter-clockwise winding of the input
        for tri in indices.chunks_exact(3) {
            let (a, b, c) = (points[tri[0]], points[tri[1]], points[tri[2]]);
            let cross = (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y);
            assert!(cross > 0.0);
        }
    }

    #[test]
    fn test_is_convex_ignores_colinear_points() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        assert!(is_convex(&points));
    }
}
