// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Umbra builder: full shadow behind each silhouette segment
//!
//! A segment runs from a center-classified `Right` vertex over the hull's far
//! side to the next `Left` vertex. Its boundaries are the vertices where the
//! tangent rays of the light disk leave the hull; the inner ray of each
//! boundary bounds the umbra. Crossing inner rays end the umbra at an apex,
//! published as an [`UmbraIntersectionContext`] for the penumbra and antumbra
//! builders.

use super::{
    BuildState, SegmentBoundary, ShadowBuilder, UmbraIntersectionContext, UmbraSegment,
};
use crate::buffers::{LightShadows, ShadowRegion};
use crate::classify::{HullContext, HullPointContext, Side};
use crate::light::ShadowType;
use nalgebra::{Point2, Vector2};
use umbra2d_geometry::primitives::{ray_grazes_segment, ray_intersection, rotate};
use umbra2d_geometry::{triangulate_polygon, Hull, ShadowMesh};

/// Emits the umbra mesh and the segment/apex data the other builders share
#[derive(Debug, Default)]
pub struct UmbraBuilder {
    mesh: ShadowMesh,
    polygon: Vec<Point2<f64>>,
}

impl UmbraBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the silhouette segments of a hull and resolve their boundaries
    pub fn find_segments(state: &BuildState, context: &HullContext, out: &mut Vec<UmbraSegment>) {
        let n = context.len();
        for start in 0..n {
            let first = &context.points[start];
            if first.degenerate || first.side != Side::Right {
                continue;
            }

            let Some(length) = Self::walk_to_left(context, start) else {
                tracing::warn!(start, points = n, "Silhouette segment does not close, skipping");
                continue;
            };

            out.push(Self::resolve_segment(state, context, start, length));
        }
    }

    /// Number of edges from `start` to the closing `Left` vertex
    fn walk_to_left(context: &HullContext, start: usize) -> Option<usize> {
        let n = context.len();
        for step in 1..n {
            let point = &context.points[(start + step) % n];
            match point.side {
                Side::Backward if !point.degenerate => continue,
                Side::Left if !point.degenerate => return Some(step),
                _ => return None,
            }
        }
        None
    }

    fn resolve_segment(
        state: &BuildState,
        context: &HullContext,
        start: usize,
        length: usize,
    ) -> UmbraSegment {
        let n = context.len();
        let at = |offset: usize| &context.points[(start + offset) % n];
        let tolerance = state.config.colinear_tolerance;

        // Right boundary: first vertex the right tangent sees as silhouette,
        // skipping vertices the tangent ray runs along
        let mut right = 0;
        while right < length {
            let point = at(right);
            let grazes = ray_grazes_segment(
                &point.position,
                &point.light_right_to_point_dir,
                &at(right + 1).position,
                tolerance,
            );
            if point.right_side == Side::Right && !grazes {
                break;
            }
            right += 1;
        }

        let mut left = length;
        while left > 0 {
            let point = at(left);
            let grazes = ray_grazes_segment(
                &point.position,
                &point.light_left_to_point_dir,
                &at(left - 1).position,
                tolerance,
            );
            if point.left_side == Side::Left && !grazes {
                break;
            }
            left -= 1;
        }

        if right > left {
            let middle = (right + left) / 2;
            right = middle;
            left = middle;
        }

        // Outer silhouettes sit on the lit side of the segment: walk back from
        // the start for the right one and on from the end for the left one
        let front = n - length;
        let right_outer = (0..front)
            .map(|k| &context.points[(start + n - k) % n])
            .find(|p| !p.degenerate && p.left_side == Side::Right)
            .unwrap_or(at(0));
        let left_outer = (0..front)
            .map(|k| at(length + k))
            .find(|p| !p.degenerate && p.right_side == Side::Left)
            .unwrap_or(at(length));

        let seam = state.config.seam_overlap_radians();
        UmbraSegment {
            start,
            end: (start + length) % n,
            // Inner rays are turned towards the umbra: counter-clockwise on the right
            right: Self::boundary(
                state,
                at(right),
                rotate(&at(right).light_right_to_point_dir, seam),
                right_outer,
                right_outer.light_left_to_point_dir,
            ),
            left: Self::boundary(
                state,
                at(left),
                rotate(&at(left).light_left_to_point_dir, -seam),
                left_outer,
                left_outer.light_right_to_point_dir,
            ),
            intersection: None,
        }
    }

    fn boundary(
        state: &BuildState,
        point: &HullPointContext,
        inner_dir: Vector2<f64>,
        outer: &HullPointContext,
        outer_dir: Vector2<f64>,
    ) -> SegmentBoundary {
        SegmentBoundary {
            anchor: point.index,
            position: point.position,
            light_dir: point.light_to_point_dir,
            inner_dir,
            inner_far: state.project(&point.position, &point.light_to_point_dir, &inner_dir),
            outer_anchor: outer.index,
            outer_position: outer.position,
            outer_dir,
            outer_far: state.project(&outer.position, &outer.light_to_point_dir, &outer_dir),
        }
    }

    /// Crossing of the inner rays within both projection extents
    fn find_apex(state: &BuildState, segment: &UmbraSegment) -> Option<Point2<f64>> {
        let (right, left) = (&segment.right, &segment.left);
        let right_extent = state.projection_length(&right.light_dir, &right.inner_dir);
        let left_extent = state.projection_length(&left.light_dir, &left.inner_dir);

        ray_intersection(&right.position, &right.inner_dir, &left.position, &left.inner_dir)
            .filter(|hit| hit.t <= right_extent && hit.u <= left_extent)
            .map(|hit| hit.point)
    }

    /// Umbra outline in counter-clockwise order
    fn outline(
        &mut self,
        shadow_type: ShadowType,
        context: &HullContext,
        segment: &UmbraSegment,
        apex: Option<Point2<f64>>,
    ) {
        let n = context.len();
        self.polygon.clear();
        self.polygon.push(segment.right.position);
        match apex {
            Some(apex) => self.polygon.push(apex),
            None => {
                self.polygon.push(segment.right.inner_far);
                self.polygon.push(segment.left.inner_far);
            }
        }

        if shadow_type.uses_chord() {
            // The hull body behind the silhouette is covered as well
            self.polygon.push(segment.left.position);
        } else {
            // Back chain from the left anchor down to just past the right anchor
            let mut i = segment.left.anchor;
            while i != segment.right.anchor {
                self.polygon.push(context.points[i].position);
                i = (i + n - 1) % n;
            }
        }
    }

    fn emit(&mut self) {
        match triangulate_polygon(&self.polygon) {
            Ok(indices) => {
                let base = self.mesh.vertex_count() as u32;
                for p in &self.polygon {
                    self.mesh.add_vertex(*p);
                }
                self.mesh.add_indices(base, &indices);
            }
            Err(error) => {
                tracing::warn!(%error, points = self.polygon.len(), "Skipping umbra polygon");
            }
        }
    }
}

impl ShadowBuilder for UmbraBuilder {
    fn pre_process(&mut self, _state: &BuildState) {
        self.mesh.clear();
    }

    fn process_hull(&mut self, state: &mut BuildState, _hull: &Hull, context: &HullContext) {
        let mut segments = std::mem::take(&mut state.segments);
        segments.clear();
        Self::find_segments(state, context, &mut segments);

        for segment in segments.iter_mut() {
            let apex = Self::find_apex(state, segment);
            if let Some(apex) = apex {
                segment.intersection = Some(state.intersections.len());
                state.intersections.push(UmbraIntersectionContext::new(
                    apex,
                    segment.right.inner_far,
                    segment.left.inner_far,
                ));
            }

            if segment.is_collapsed() {
                // No umbra between the boundaries; the apex sits on the anchor
                continue;
            }
            self.outline(state.light.shadow_type, context, segment, apex);
            self.emit();
        }

        tracing::trace!(segments = segments.len(), "Umbra segments resolved");
        state.segments = segments;
    }

    fn build(&mut self, _state: &mut BuildState, output: &mut LightShadows) {
        output.store(ShadowRegion::Umbra, &mut self.mesh);
    }
}
