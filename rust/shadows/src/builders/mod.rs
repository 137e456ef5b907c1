// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shadow mesh builders
//!
//! One build pass per light runs every builder through the same three steps:
//!
//! 1. `pre_process` once, to reset transient buffers
//! 2. `process_hull` for every hull intersecting the light, in scene order
//! 3. `build` once, to flush the accumulated mesh into the light's output
//!
//! Builders talk to each other only through [`BuildState`]: the umbra builder
//! publishes the current hull's [`UmbraSegment`]s and the pass-wide list of
//! [`UmbraIntersectionContext`]s, which the penumbra and antumbra builders
//! consume. The pipeline therefore runs umbra, penumbra, antumbra and solid in
//! that order.

pub mod antumbra;
pub mod penumbra;
pub mod solid;
pub mod umbra;

pub use antumbra::AntumbraBuilder;
pub use penumbra::PenumbraBuilder;
pub use solid::SolidBuilder;
pub use umbra::UmbraBuilder;

use crate::buffers::LightShadows;
use crate::classify::HullContext;
use crate::config::ShadowConfig;
use crate::light::{Light, LightSnapshot};
use nalgebra::{Point2, Vector2};
use smallvec::SmallVec;
use umbra2d_geometry::Hull;

/// A penumbra vertex emitted exactly on a point shared with the umbra
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeamVertex {
    /// Index into the penumbra mesh
    pub index: u32,
    pub position: Point2<f64>,
    pub tex_coord: Point2<f64>,
}

/// Crossing of a segment's two inner rays within their projection extent
#[derive(Debug, Clone, PartialEq)]
pub struct UmbraIntersectionContext {
    /// Where the umbra ends and the antumbra begins
    pub apex: Point2<f64>,
    /// Far point of the right inner ray (beyond the apex)
    pub right_far: Point2<f64>,
    /// Far point of the left inner ray (beyond the apex)
    pub left_far: Point2<f64>,
    /// Penumbra vertices of the right fin lying on `apex` or `right_far`
    pub right_vertices: SmallVec<[SeamVertex; 4]>,
    /// Penumbra vertices of the left fin lying on `apex` or `left_far`
    pub left_vertices: SmallVec<[SeamVertex; 4]>,
}

impl UmbraIntersectionContext {
    pub fn new(apex: Point2<f64>, right_far: Point2<f64>, left_far: Point2<f64>) -> Self {
        Self {
            apex,
            right_far,
            left_far,
            right_vertices: SmallVec::new(),
            left_vertices: SmallVec::new(),
        }
    }
}

/// One boundary of an umbra segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentBoundary {
    /// Hull index of the vertex the inner ray leaves from
    pub anchor: usize,
    pub position: Point2<f64>,
    /// Unit direction from the light center to the anchor
    pub light_dir: Vector2<f64>,
    /// Unit direction of the inner (umbra side) ray, seam rotation applied
    pub inner_dir: Vector2<f64>,
    /// Inner ray projected to the light's range
    pub inner_far: Point2<f64>,
    /// Hull index of the vertex the outer (lit side) ray leaves from
    ///
    /// This is the silhouette vertex seen from the opposite tangent point.
    /// It equals `anchor` for small lights and lies towards the lit side of
    /// the hull once the tangent silhouettes drift apart.
    pub outer_anchor: usize,
    pub outer_position: Point2<f64>,
    /// Unit direction of the outer ray, from the opposite tangent point
    pub outer_dir: Vector2<f64>,
    /// Outer ray projected to the light's range
    pub outer_far: Point2<f64>,
}

/// A run of hull vertices from a right silhouette vertex to a left one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UmbraSegment {
    /// Hull index of the center-classified right silhouette vertex
    pub start: usize,
    /// Hull index of the center-classified left silhouette vertex
    pub end: usize,
    pub right: SegmentBoundary,
    pub left: SegmentBoundary,
    /// Index into [`BuildState::intersections`] when the inner rays cross
    pub intersection: Option<usize>,
}

impl UmbraSegment {
    /// True when both boundaries collapsed onto the same vertex
    #[inline]
    pub fn is_collapsed(&self) -> bool {
        self.right.anchor == self.left.anchor
    }
}

/// Data shared between the builders during one light's build pass
#[derive(Debug, Clone)]
pub struct BuildState {
    pub light: LightSnapshot,
    pub config: ShadowConfig,
    /// Segments of the hull currently being processed
    pub segments: Vec<UmbraSegment>,
    /// Apex contexts of every hull processed so far in this pass
    pub intersections: Vec<UmbraIntersectionContext>,
}

impl BuildState {
    pub fn new(light: &Light, config: ShadowConfig) -> Self {
        Self {
            light: light.snapshot(),
            config,
            segments: Vec::new(),
            intersections: Vec::new(),
        }
    }

    /// Start a new pass for `light`, keeping allocations
    pub fn reset(&mut self, light: &Light) {
        self.light = light.snapshot();
        self.segments.clear();
        self.intersections.clear();
    }

    /// Length of a ray leaving a point seen along `light_dir` so that it
    /// advances `range` along the light direction
    #[inline]
    pub fn projection_length(&self, light_dir: &Vector2<f64>, dir: &Vector2<f64>) -> f64 {
        self.light.range / light_dir.dot(dir).max(self.config.min_projection_dot)
    }

    /// Project a ray from `from` to the light's range
    #[inline]
    pub fn project(
        &self,
        from: &Point2<f64>,
        light_dir: &Vector2<f64>,
        dir: &Vector2<f64>,
    ) -> Point2<f64> {
        from + dir * self.projection_length(light_dir, dir)
    }
}

/// A stage of the shadow build pass
pub trait ShadowBuilder {
    /// Reset transient buffers before a pass
    fn pre_process(&mut self, state: &BuildState);

    /// Accumulate geometry for one hull intersecting the light
    fn process_hull(&mut self, state: &mut BuildState, hull: &Hull, context: &HullContext);

    /// Flush the accumulated geometry into the light's output
    fn build(&mut self, state: &mut BuildState, output: &mut LightShadows);
}
