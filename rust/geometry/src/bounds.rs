// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes

use nalgebra::{Point2, Vector2};

/// Axis-aligned 2D bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2 {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl Aabb2 {
    /// Create a box from its corners
    #[inline]
    pub fn new(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self { min, max }
    }

    /// Create a box from a center point and half extents
    #[inline]
    pub fn from_center(center: Point2<f64>, half_extents: Vector2<f64>) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Compute the bounds of a point set, `None` when empty
    pub fn from_points(points: &[Point2<f64>]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;

        for p in points.iter().skip(1) {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        Some(Self { min, max })
    }

    /// Check if two boxes overlap (touching counts as overlap)
    #[inline]
    pub fn intersects(&self, other: &Aabb2) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Check if a point lies inside the box
    #[inline]
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Smallest box containing both boxes
    #[inline]
    pub fn union(&self, other: &Aabb2) -> Aabb2 {
        Aabb2 {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Grow the box by `margin` on every side
    #[inline]
    pub fn expand(&self, margin: f64) -> Aabb2 {
        let m = Vector2::new(margin, margin);
        Aabb2 {
            min: self.min - m,
            max: self.max + m,
        }
    }

    #[inline]
    pub fn center(&self) -> Point2<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    #[inline]
    pub fn size(&self) -> Vector2<f64> {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let bounds = Aabb2::from_points(&[
            Point2::new(1.0, -2.0),
            Point2::new(-3.0, 4.0),
            Point2::new(0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(bounds.min, Point2::new(-3.0, -2.0));
        assert_eq!(bounds.max, Point2::new(1.0, 4.0));
        assert!(Aabb2::from_points(&[]).is_none());
    }

    #[test]
    fn test_intersects() {
        let a = Aabb2::from_center(Point2::origin(), Vector2::new(1.0, 1.0));
        let b = Aabb2::from_center(Point2::new(1.5, 0.0), Vector2::new(1.0, 1.0));
        let c = Aabb2::from_center(Point2::new(5.0, 0.0), Vector2::new(1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.union(&c).intersects(&b));
    }

    #[test]
    fn test_contains_and_expand() {
        let a = Aabb2::new(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0));
        assert!(a.contains(&Point2::new(1.0, 1.0)));
        assert!(!a.contains(&Point2::new(2.5, 1.0)));
        assert!(a.expand(1.0).contains(&Point2::new(2.5, 1.0)));
        assert_eq!(a.center(), Point2::new(1.0, 1.0));
        assert_eq!(a.size(), Vector2::new(2.0, 2.0));
    }
}
