// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-vertex classification of a hull against a light.
//!
//! Every hull vertex is looked at from three places: the light center and the
//! two tangent points of the light disk. From each, the direction to the
//! vertex is dotted with the vertex's two outward edge normals and the sign
//! pair decides the [`Side`]:
//!
//! | incoming · dir | outgoing · dir | side       |
//! |----------------|----------------|------------|
//! | >= 0           | < 0            | `Left`     |
//! | < 0            | >= 0           | `Right`    |
//! | >= 0           | >= 0           | `Backward` |
//! | < 0            | < 0            | `Forward`  |
//!
//! `Left`/`Right` vertices are silhouette vertices. `Backward` vertices sit on
//! the far side of the hull (both adjacent edges turned away from the light),
//! `Forward` vertices on the near side. A zero dot product counts as `>= 0`.

use crate::light::Light;
use nalgebra::{Point2, Vector2};
use umbra2d_geometry::primitives::normalize_or_none;
use umbra2d_geometry::{ApexNormals, Hull};

/// Position of a hull vertex relative to the silhouette seen from a light point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Backward,
    Forward,
}

impl Side {
    /// Classify a vertex from the dot products of the view direction with its
    /// incoming and outgoing edge normals
    #[inline]
    pub fn from_dots(dots: &SideDots) -> Side {
        match (dots.incoming >= 0.0, dots.outgoing >= 0.0) {
            (true, false) => Side::Left,
            (false, true) => Side::Right,
            (true, true) => Side::Backward,
            (false, false) => Side::Forward,
        }
    }

    #[inline]
    pub fn is_silhouette(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }
}

/// Dot products of a view direction with a vertex's two edge normals
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SideDots {
    pub incoming: f64,
    pub outgoing: f64,
}

impl SideDots {
    #[inline]
    pub fn new(direction: &Vector2<f64>, normals: &ApexNormals) -> Self {
        Self {
            incoming: direction.dot(&normals.incoming),
            outgoing: direction.dot(&normals.outgoing),
        }
    }
}

/// Relationship of one hull vertex to the light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullPointContext {
    /// Index into the hull's world points
    pub index: usize,
    pub position: Point2<f64>,
    pub normals: ApexNormals,

    pub light_to_point_dir: Vector2<f64>,
    pub light_right: Point2<f64>,
    pub light_left: Point2<f64>,
    pub light_right_to_point_dir: Vector2<f64>,
    pub light_left_to_point_dir: Vector2<f64>,

    pub dots: SideDots,
    pub right_dots: SideDots,
    pub left_dots: SideDots,

    /// Classification seen from the light center
    pub side: Side,
    /// Classification seen from the right tangent point
    pub right_side: Side,
    /// Classification seen from the left tangent point
    pub left_side: Side,

    /// The vertex coincides with the light center; it takes no part in building
    pub degenerate: bool,
}

impl HullPointContext {
    /// Classify a single vertex
    pub fn new(light: &Light, index: usize, position: Point2<f64>, normals: ApexNormals) -> Self {
        let Some(tangents) = light.tangent_points(&position) else {
            return Self::degenerate(light, index, position, normals);
        };

        let dir = tangents.direction;
        let right_dir = normalize_or_none(&(position - tangents.right)).unwrap_or(dir);
        let left_dir = normalize_or_none(&(position - tangents.left)).unwrap_or(dir);

        let dots = SideDots::new(&dir, &normals);
        let right_dots = SideDots::new(&right_dir, &normals);
        let left_dots = SideDots::new(&left_dir, &normals);

        Self {
            index,
            position,
            normals,
            light_to_point_dir: dir,
            light_right: tangents.right,
            light_left: tangents.left,
            light_right_to_point_dir: right_dir,
            light_left_to_point_dir: left_dir,
            dots,
            right_dots,
            left_dots,
            side: Side::from_dots(&dots),
            right_side: Side::from_dots(&right_dots),
            left_side: Side::from_dots(&left_dots),
            degenerate: false,
        }
    }

    fn degenerate(light: &Light, index: usize, position: Point2<f64>, normals: ApexNormals) -> Self {
        Self {
            index,
            position,
            normals,
            light_to_point_dir: Vector2::zeros(),
            light_right: light.position(),
            light_left: light.position(),
            light_right_to_point_dir: Vector2::zeros(),
            light_left_to_point_dir: Vector2::zeros(),
            dots: SideDots::default(),
            right_dots: SideDots::default(),
            left_dots: SideDots::default(),
            side: Side::Forward,
            right_side: Side::Forward,
            left_side: Side::Forward,
            degenerate: true,
        }
    }
}

/// All vertex classifications of one hull for one light
#[derive(Debug, Clone, Default)]
pub struct HullContext {
    pub points: Vec<HullPointContext>,
    pub is_convex: bool,
}

impl HullContext {
    pub fn new(light: &Light, hull: &Hull) -> Self {
        let mut context = Self::default();
        context.classify(light, hull);
        context
    }

    /// Reclassify in place, reusing the point buffer
    pub fn classify(&mut self, light: &Light, hull: &Hull) {
        self.points.clear();
        self.points.extend(
            hull.world_points()
                .iter()
                .zip(hull.apex_normals())
                .enumerate()
                .map(|(i, (p, normals))| HullPointContext::new(light, i, *p, *normals)),
        );
        self.is_convex = hull.is_convex();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Classify every world point of `hull` against `light`
pub fn classify_hull(light: &Light, hull: &Hull) -> HullContext {
    HullContext::new(light, hull)
}
