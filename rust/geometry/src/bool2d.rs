// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D polygon clipping and boolean helpers
//!
//! Sutherland–Hodgman clipping for convex clip regions, plus polygon
//! difference through the i_overlay crate for the cases where the result is
//! not convex (a shadow fin minus the hull it grazes).

use crate::error::{Error, Result};
use crate::primitives::{cross2, EPSILON};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::{Point2, Vector2};
use smallvec::SmallVec;

/// Minimum area threshold - polygons smaller than this are considered degenerate
pub const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// Stack-allocated polygon for the small shapes produced while clipping fins
pub type SmallPolygon = SmallVec<[Point2<f64>; 8]>;

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn compute_signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = contour.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

/// Ensure contour has counter-clockwise winding (positive area)
pub fn ensure_ccw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let area = compute_signed_area(contour);
    if area < 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Clip a polygon against the half-plane to the left of the directed line `a -> b`
///
/// Points exactly on the line are kept.
pub fn clip_half_plane(polygon: &[Point2<f64>], a: &Point2<f64>, b: &Point2<f64>) -> SmallPolygon {
    let mut out = SmallPolygon::new();
    let n = polygon.len();
    if n == 0 {
        return out;
    }

    let edge: Vector2<f64> = b - a;
    let side = |p: &Point2<f64>| cross2(&edge, &(p - a));

    for i in 0..n {
        let curr = &polygon[i];
        let next = &polygon[(i + 1) % n];
        let d_curr = side(curr);
        let d_next = side(next);

        if d_curr >= -EPSILON {
            out.push(*curr);
        }
        if (d_curr >= -EPSILON) != (d_next >= -EPSILON) {
            // Edge crosses the clip line - compute intersection
            let denom = d_curr - d_next;
            if denom.abs() > EPSILON {
                let t = d_curr / denom;
                out.push(curr + (next - curr) * t);
            }
        }
    }

    out
}

/// Sutherland–Hodgman clip of `subject` against a convex counter-clockwise polygon
///
/// Returns the intersection of both polygons; empty when they do not overlap.
pub fn convex_clip(subject: &[Point2<f64>], clip: &[Point2<f64>]) -> SmallPolygon {
    let mut polygon: SmallPolygon = subject.iter().copied().collect();
    let n = clip.len();

    for i in 0..n {
        if polygon.len() < 3 {
            return SmallPolygon::new();
        }
        polygon = clip_half_plane(&polygon, &clip[i], &clip[(i + 1) % n]);
    }

    if polygon.len() < 3 {
        SmallPolygon::new()
    } else {
        polygon
    }
}

/// Area shared by `subject` and a convex counter-clockwise polygon
pub fn convex_overlap_area(subject: &[Point2<f64>], clip: &[Point2<f64>]) -> f64 {
    compute_signed_area(&convex_clip(subject, clip)).abs()
}

/// Perform 2D boolean difference: subject - clip
///
/// Returns the outer contour of the largest resulting shape, counter-clockwise.
/// `Ok(None)` means the clip swallowed the subject entirely.
pub fn subtract_polygon(
    subject: &[Point2<f64>],
    clip: &[Point2<f64>],
) -> Result<Option<Vec<Point2<f64>>>> {
    if subject.len() < 3 || clip.len() < 3 {
        return Err(Error::Boolean(
            "Difference operands need at least 3 vertices".to_string(),
        ));
    }

    let subject_paths = vec![contour_to_path(&ensure_ccw(subject))];
    let clip_paths = vec![contour_to_path(&ensure_ccw(clip))];

    // Result is Vec<Vec<Vec<[f64; 2]>>> - Vec of shapes, each shape is Vec of contours
    let shapes = subject_paths.overlay(&clip_paths, OverlayRule::Difference, FillRule::EvenOdd);

    let mut best: Option<(f64, Vec<Point2<f64>>)> = None;
    for shape in &shapes {
        let Some(outer) = shape.first() else {
            continue;
        };
        let contour: Vec<Point2<f64>> = outer.iter().map(|p| Point2::new(p[0], p[1])).collect();
        let area = compute_signed_area(&contour).abs();
        if area <= MIN_AREA_THRESHOLD {
            continue;
        }
        if best.as_ref().map_or(true, |(best_area, _)| area > *best_area) {
            best = Some((area, contour));
        }
    }

    Ok(best.map(|(_, contour)| ensure_ccw(&contour)))
}

/// Replace vertices lying within `tolerance` of a reference point by that exact point
///
/// Boolean operations quantize coordinates; snapping restores vertices that
/// must stay bit-identical to points shared with other meshes.
pub fn snap_to(contour: &mut [Point2<f64>], references: &[Point2<f64>], tolerance: f64) {
    for p in contour.iter_mut() {
        if let Some(r) = references
            .iter()
            .find(|r| (*p - **r).norm_squared() <= tolerance * tolerance)
        {
            *p = *r;
        }
    }
}

/// Rotate a contour so the vertex closest to `front` comes first
///
/// Winding order is preserved. Returns the index that was moved to the front.
pub fn rotate_to_front(contour: &mut [Point2<f64>], front: &Point2<f64>) -> Option<usize> {
    let index = contour
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (*a - front)
                .norm_squared()
                .total_cmp(&(*b - front).norm_squared())
        })
        .map(|(i, _)| i)?;
    contour.rotate_left(index);
    Some(index)
}

/// Check if a point is inside a contour using ray casting (any winding, convex or not)
pub fn point_in_contour(point: &Point2<f64>, contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = contour.len();

    let mut j = n - 1;
    for i in 0..n {
        let pi = &contour[i];
        let pj = &contour[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Convert a Point2 contour to i_overlay path format
fn contour_to_path(contour: &[Point2<f64>]) -> Vec<[f64; 2]> {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(min: f64, max: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(min, min),
            Point2::new(max, min),
            Point2::new(max, max),
            Point2::new(min, max),
        ]
    }

    #[test]
    fn test_compute_signed_area() {
        let ccw = square(0.0, 1.0);
        assert_relative_eq!(compute_signed_area(&ccw), 1.0);

        let cw: Vec<_> = ccw.iter().rev().cloned().collect();
        assert_relative_eq!(compute_signed_area(&cw), -1.0);
        assert_relative_eq!(compute_signed_area(&ensure_ccw(&cw)), 1.0);
    }

    #[test]
    fn test_clip_half_plane() {
        // Keep the part of the unit square left of the line x = 0.5 going up
        let clipped = clip_half_plane(
            &square(0.0, 1.0),
            &Point2::new(0.5, 0.0),
            &Point2::new(0.5, 1.0),
        );
        assert_eq!(clipped.len(), 4);
        assert_relative_eq!(compute_signed_area(&clipped), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_convex_clip_overlap() {
        let a = square(0.0, 2.0);
        let b = square(1.0, 3.0);
        let overlap = convex_clip(&a, &b);
        assert_relative_eq!(compute_signed_area(&overlap), 1.0, epsilon = 1e-12);
        assert_relative_eq!(convex_overlap_area(&a, &b), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_convex_clip_disjoint() {
        let a = square(0.0, 1.0);
        let b = square(5.0, 6.0);
        assert!(convex_clip(&a, &b).is_empty());
        assert_eq!(convex_overlap_area(&a, &b), 0.0);
    }

    #[test]
    fn test_subtract_polygon() {
        let a = square(0.0, 2.0);
        let b = square(1.0, 3.0);
        let result = subtract_polygon(&a, &b).unwrap().unwrap();
        assert_relative_eq!(compute_signed_area(&result), 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_subtract_polygon_swallowed() {
        let a = square(1.0, 2.0);
        let b = square(0.0, 3.0);
        assert!(subtract_polygon(&a, &b).unwrap().is_none());
    }

    #[test]
    fn test_point_in_contour_concave() {
        let dart = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 2.0),
            Point2::new(0.0, 4.0),
            Point2::new(1.0, 2.0),
        ];
        assert!(point_in_contour(&Point2::new(2.0, 2.0), &dart));
        assert!(!point_in_contour(&Point2::new(0.5, 2.0), &dart));
    }

    #[test]
    fn test_snap_and_rotate() {
        let exact = Point2::new(1.0 / 3.0, 2.0 / 3.0);
        let mut contour = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(exact.x + 1e-9, exact.y - 1e-9),
        ];
        snap_to(&mut contour, &[exact], 1e-6);
        assert_eq!(contour[2], exact);

        let moved = rotate_to_front(&mut contour, &exact).unwrap();
        assert_eq!(moved, 2);
        assert_eq!(contour[0], exact);
        assert_eq!(contour[1], Point2::new(0.0, 0.0));
    }
}
