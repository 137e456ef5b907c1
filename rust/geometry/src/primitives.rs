// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric primitives: vector helpers, line/ray/segment intersection tests
//! and barycentric interpolation.
//!
//! All functions are pure. Degenerate input (zero-length directions, parallel
//! lines) yields `None` instead of panicking, so callers can fall back to a
//! non-intersecting code path.

use nalgebra::{Point2, Vector2, Vector3};

/// Epsilon used for magnitude and cross-product degeneracy checks
pub const EPSILON: f64 = 1e-9;

/// 2D cross product (z component of the 3D cross product)
#[inline]
pub fn cross2(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Rotate a vector by 90 degrees clockwise
#[inline]
pub fn perp_cw(v: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(v.y, -v.x)
}

/// Rotate a vector by 90 degrees counter-clockwise
#[inline]
pub fn perp_ccw(v: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-v.y, v.x)
}

/// Rotate a vector counter-clockwise by `angle` radians
#[inline]
pub fn rotate(v: &Vector2<f64>, angle: f64) -> Vector2<f64> {
    let (sin, cos) = angle.sin_cos();
    Vector2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Normalize a vector, returning `None` for (near) zero length input
#[inline]
pub fn normalize_or_none(v: &Vector2<f64>) -> Option<Vector2<f64>> {
    let len = v.norm();
    if len > EPSILON && len.is_finite() {
        Some(v / len)
    } else {
        None
    }
}

/// Result of intersecting two parametric lines `a + t * da` and `b + u * db`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Intersection point
    pub point: Point2<f64>,
    /// Parameter along the first line
    pub t: f64,
    /// Parameter along the second line
    pub u: f64,
}

/// Intersect two infinite lines given by a point and a direction
///
/// Directions do not need to be normalized; the returned parameters are
/// expressed in units of the given direction vectors.
#[inline]
pub fn line_intersection(
    a: &Point2<f64>,
    da: &Vector2<f64>,
    b: &Point2<f64>,
    db: &Vector2<f64>,
) -> Option<Intersection> {
    let denom = cross2(da, db);
    let scale = da.norm() * db.norm();
    if denom.abs() <= EPSILON * scale.max(1.0) {
        return None;
    }

    let ab = b - a;
    let t = cross2(&ab, db) / denom;
    let u = cross2(&ab, da) / denom;

    Some(Intersection {
        point: a + da * t,
        t,
        u,
    })
}

/// Intersect two rays; both parameters must be non-negative
#[inline]
pub fn ray_intersection(
    a: &Point2<f64>,
    da: &Vector2<f64>,
    b: &Point2<f64>,
    db: &Vector2<f64>,
) -> Option<Intersection> {
    line_intersection(a, da, b, db).filter(|hit| hit.t >= -EPSILON && hit.u >= -EPSILON)
}

/// Intersect two segments `a0-a1` and `b0-b1`
///
/// Parameters of the returned intersection are in `[0, 1]` along each segment.
#[inline]
pub fn segment_intersection(
    a0: &Point2<f64>,
    a1: &Point2<f64>,
    b0: &Point2<f64>,
    b1: &Point2<f64>,
) -> Option<Intersection> {
    let range = -EPSILON..=1.0 + EPSILON;
    line_intersection(a0, &(a1 - a0), b0, &(b1 - b0))
        .filter(|hit| range.contains(&hit.t) && range.contains(&hit.u))
}

/// Intersect a ray `origin + t * dir` with the segment `s0-s1`
///
/// `u` of the returned intersection is the parameter along the segment.
#[inline]
pub fn ray_segment_intersection(
    origin: &Point2<f64>,
    dir: &Vector2<f64>,
    s0: &Point2<f64>,
    s1: &Point2<f64>,
) -> Option<Intersection> {
    line_intersection(origin, dir, s0, &(s1 - s0))
        .filter(|hit| hit.t >= -EPSILON && hit.u >= -EPSILON && hit.u <= 1.0 + EPSILON)
}

/// Check whether a ray leaving `from` runs along the segment `from-to`
///
/// True when the direction is colinear with the segment (within `tolerance`
/// of the sine of the angle between them) and points towards `to`.
#[inline]
pub fn ray_grazes_segment(
    from: &Point2<f64>,
    dir: &Vector2<f64>,
    to: &Point2<f64>,
    tolerance: f64,
) -> bool {
    let Some(edge) = normalize_or_none(&(to - from)) else {
        return false;
    };
    let Some(dir) = normalize_or_none(dir) else {
        return false;
    };
    cross2(&dir, &edge).abs() <= tolerance && dir.dot(&edge) > 0.0
}

/// Barycentric weights of `p` with respect to triangle `(a, b, c)`
///
/// Returns `None` for a degenerate (zero area) triangle.
#[inline]
pub fn barycentric(
    p: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
) -> Option<Vector3<f64>> {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;

    let denom = cross2(&v0, &v1);
    if denom.abs() <= EPSILON {
        return None;
    }

    let v = cross2(&v2, &v1) / denom;
    let w = cross2(&v0, &v2) / denom;
    Some(Vector3::new(1.0 - v - w, v, w))
}

/// Interpolate per-corner attributes with barycentric weights
#[inline]
pub fn interpolate(weights: &Vector3<f64>, attributes: &[Point2<f64>; 3]) -> Point2<f64> {
    Point2::new(
        weights.x * attributes[0].x + weights.y * attributes[1].x + weights.z * attributes[2].x,
        weights.x * attributes[0].y + weights.y * attributes[1].y + weights.z * attributes[2].y,
    )
}

/// Shortest distance from `p` to the segment `a-b`
#[inline]
pub fn distance_to_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= EPSILON * EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Check if a point lies inside (or on the boundary of) a convex CCW polygon
pub fn point_in_convex_polygon(p: &Point2<f64>, polygon: &[Point2<f64>]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let n = polygon.len();
    (0..n).all(|i| {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % n];
        cross2(&(b - a), &(p - a)) >= -EPSILON
    })
}
