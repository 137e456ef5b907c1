// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light model: a disk-shaped light source with a shadow-casting range.
//!
//! Light flavours (point, spot, textured) only differ in how the renderer
//! shades them, so they are a tagged [`LightKind`] rather than separate types;
//! shadow geometry is built the same way for all of them.

use crate::error::{Error, Result};
use nalgebra::{Point2, Vector2};
use umbra2d_geometry::bool2d::point_in_contour;
use umbra2d_geometry::primitives::{
    distance_to_segment, normalize_or_none, perp_cw, point_in_convex_polygon, EPSILON,
};
use umbra2d_geometry::{Aabb2, Hull};

/// Which shadow regions a light produces and how hulls themselves are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShadowType {
    /// Hulls are lit; shadows start behind their silhouette
    #[default]
    Illuminated,
    /// Hulls are drawn as opaque solids on top of their shadows
    Solid,
    /// Hulls are in shadow themselves; fins are clipped off the hull body
    Occluded,
}

impl ShadowType {
    /// The solid region carries the hulls' fill geometry
    #[inline]
    pub fn draws_hulls(self) -> bool {
        !matches!(self, ShadowType::Illuminated)
    }

    /// The umbra closes along the silhouette chord instead of the hull's back chain
    #[inline]
    pub fn uses_chord(self) -> bool {
        !matches!(self, ShadowType::Illuminated)
    }

    #[inline]
    pub fn clips_fins(self) -> bool {
        matches!(self, ShadowType::Occluded)
    }
}

/// Shading flavour of a light
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LightKind {
    #[default]
    Point,
    Spot {
        /// Facing direction in radians
        rotation: f64,
        /// Falloff exponent towards the cone edge
        cone_decay: f64,
    },
    Textured {
        rotation: f64,
        scale: Vector2<f64>,
    },
}

/// The two points on the light disk perpendicular to the direction towards a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentPoints {
    /// Unit direction from the light center to the point
    pub direction: Vector2<f64>,
    /// Disk point to the right when looking from the light towards the point
    pub right: Point2<f64>,
    /// Disk point to the left when looking from the light towards the point
    pub left: Point2<f64>,
}

/// Comparable state of a light, used to decide whether shadows must be rebuilt
///
/// `kind` is deliberately absent: it does not influence shadow geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSnapshot {
    pub position: Point2<f64>,
    pub radius: f64,
    pub range: f64,
    pub shadow_type: ShadowType,
    pub enabled: bool,
    pub casts_shadows: bool,
}

/// Disk light source
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    position: Point2<f64>,
    radius: f64,
    range: f64,
    shadow_type: ShadowType,
    kind: LightKind,
    enabled: bool,
    casts_shadows: bool,
}

impl Light {
    /// Create a light; the radius is clamped to at least `EPSILON`
    ///
    /// Fails for a non-finite position or radius and a non-positive range.
    pub fn new(position: Point2<f64>, radius: f64, range: f64) -> Result<Self> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return Err(Error::InvalidLight("position must be finite".to_string()));
        }
        let mut light = Self {
            position,
            radius: EPSILON,
            range: 1.0,
            shadow_type: ShadowType::default(),
            kind: LightKind::default(),
            enabled: true,
            casts_shadows: true,
        };
        light.set_radius(radius)?;
        light.set_range(range)?;
        Ok(light)
    }

    pub fn with_shadow_type(mut self, shadow_type: ShadowType) -> Self {
        self.shadow_type = shadow_type;
        self
    }

    pub fn with_kind(mut self, kind: LightKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn position(&self) -> Point2<f64> {
        self.position
    }

    pub fn set_position(&mut self, position: Point2<f64>) {
        self.position = position;
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<()> {
        if !radius.is_finite() {
            return Err(Error::InvalidLight(format!("radius must be finite, got {radius}")));
        }
        self.radius = radius.max(EPSILON);
        Ok(())
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn set_range(&mut self, range: f64) -> Result<()> {
        if !range.is_finite() || range <= 0.0 {
            return Err(Error::InvalidLight(format!(
                "range must be positive and finite, got {range}"
            )));
        }
        self.range = range;
        Ok(())
    }

    pub fn shadow_type(&self) -> ShadowType {
        self.shadow_type
    }

    pub fn set_shadow_type(&mut self, shadow_type: ShadowType) {
        self.shadow_type = shadow_type;
    }

    pub fn kind(&self) -> &LightKind {
        &self.kind
    }

    pub fn set_kind(&mut self, kind: LightKind) {
        self.kind = kind;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn casts_shadows(&self) -> bool {
        self.casts_shadows
    }

    pub fn set_casts_shadows(&mut self, casts_shadows: bool) {
        self.casts_shadows = casts_shadows;
    }

    pub fn snapshot(&self) -> LightSnapshot {
        LightSnapshot {
            position: self.position,
            radius: self.radius,
            range: self.range,
            shadow_type: self.shadow_type,
            enabled: self.enabled,
            casts_shadows: self.casts_shadows,
        }
    }

    /// Square covering everything within `range` of the light
    pub fn bounds(&self) -> Aabb2 {
        Aabb2::from_center(self.position, Vector2::new(self.range, self.range))
    }

    /// Tangent points of the light disk as seen from `point`
    ///
    /// `None` when the point coincides with the light center.
    pub fn tangent_points(&self, point: &Point2<f64>) -> Option<TangentPoints> {
        let direction = normalize_or_none(&(point - self.position))?;
        let offset = perp_cw(&direction) * self.radius;
        Some(TangentPoints {
            direction,
            right: self.position + offset,
            left: self.position - offset,
        })
    }

    /// Check whether a hull lies (at least partially) within the light's range
    ///
    /// Bounding boxes are compared first; survivors get an exact distance test.
    pub fn intersects_hull(&self, hull: &Hull) -> bool {
        if !self.bounds().intersects(hull.bounds()) {
            return false;
        }

        let points = hull.world_points();
        if self.is_inside_hull(hull) {
            return true;
        }

        let n = points.len();
        (0..n).any(|i| distance_to_segment(&self.position, &points[i], &points[(i + 1) % n]) <= self.range)
    }

    /// Check whether the light center lies inside a hull
    pub fn is_inside_hull(&self, hull: &Hull) -> bool {
        if !hull.bounds().contains(&self.position) {
            return false;
        }
        if hull.is_convex() {
            point_in_convex_polygon(&self.position, hull.world_points())
        } else {
            point_in_contour(&self.position, hull.world_points())
        }
    }
}
