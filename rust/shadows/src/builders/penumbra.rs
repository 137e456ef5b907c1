// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Penumbra builder: one soft-shadow fin per segment boundary
//!
//! A fin's inner edge is the boundary's inner ray, shared with the umbra. Its
//! outer edge is the ray from the opposite tangent point through the vertex
//! that point sees as silhouette. For small lights both rays leave the same
//! vertex and the fin is a triangle; for large lights the outer ray starts
//! further towards the lit side and the hull chain between the two vertices
//! closes the fin.
//!
//! Texture coordinates are barycentric in the fin triangle spanned by the
//! crossing of both ray lines, the outer far corner and the inner far corner,
//! which map to `(0, 1)`, `(0, 0)` and `(1, 0)`.

use super::{BuildState, SeamVertex, ShadowBuilder, UmbraIntersectionContext, UmbraSegment};
use crate::buffers::{LightShadows, ShadowRegion};
use crate::classify::HullContext;
use nalgebra::Point2;
use smallvec::SmallVec;
use umbra2d_geometry::bool2d::{convex_overlap_area, rotate_to_front, snap_to, subtract_polygon};
use umbra2d_geometry::primitives::{barycentric, interpolate, line_intersection};
use umbra2d_geometry::triangulation::fan_triangulate;
use umbra2d_geometry::{triangulate_polygon, Hull, ShadowMesh};

/// Snap distance for boolean results, relative to the light range
const SNAP_RELATIVE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FinSide {
    Right,
    Left,
}

/// Fin of one segment boundary
#[derive(Debug, Clone)]
struct Fin {
    side: FinSide,
    /// Where the inner ray leaves the hull
    anchor: Point2<f64>,
    /// Where the outer ray leaves the hull
    outer_anchor: Point2<f64>,
    /// Hull vertices strictly between the anchors, in outline order
    chain: SmallVec<[Point2<f64>; 4]>,
    /// Crossing of the inner and outer ray lines, the texture origin
    origin: Point2<f64>,
    outer_far: Point2<f64>,
    inner_far: Point2<f64>,
    /// Umbra apex on the inner edge, when the inner rays cross
    apex: Option<Point2<f64>>,
}

impl Fin {
    fn new(state: &BuildState, context: &HullContext, segment: &UmbraSegment, side: FinSide) -> Self {
        let boundary = match side {
            FinSide::Right => &segment.right,
            FinSide::Left => &segment.left,
        };

        // The outline walks the hull backwards between the anchors
        let n = context.len();
        let (from, to) = match side {
            FinSide::Right => (boundary.anchor, boundary.outer_anchor),
            FinSide::Left => (boundary.outer_anchor, boundary.anchor),
        };
        let mut chain = SmallVec::new();
        if from != to {
            let mut i = (from + n - 1) % n;
            while i != to {
                chain.push(context.points[i].position);
                i = (i + n - 1) % n;
            }
        }

        let origin = if boundary.outer_anchor == boundary.anchor {
            boundary.position
        } else {
            line_intersection(
                &boundary.outer_position,
                &boundary.outer_dir,
                &boundary.position,
                &boundary.inner_dir,
            )
            .map_or(boundary.position, |hit| hit.point)
        };

        Self {
            side,
            anchor: boundary.position,
            outer_anchor: boundary.outer_position,
            chain,
            origin,
            outer_far: boundary.outer_far,
            inner_far: boundary.inner_far,
            apex: segment
                .intersection
                .map(|i| state.intersections[i].apex)
                .filter(|apex| *apex != boundary.position),
        }
    }

    /// Single-vertex fin with no hull chain
    #[cfg(test)]
    fn triangle(
        side: FinSide,
        anchor: Point2<f64>,
        outer_far: Point2<f64>,
        inner_far: Point2<f64>,
    ) -> Self {
        Self {
            side,
            anchor,
            outer_anchor: anchor,
            chain: SmallVec::new(),
            origin: anchor,
            outer_far,
            inner_far,
            apex: None,
        }
    }

    fn corners(&self) -> [Point2<f64>; 3] {
        [self.origin, self.outer_far, self.inner_far]
    }

    /// Counter-clockwise outline; a spliced apex comes first, the inner
    /// anchor first otherwise
    fn outline(&self, out: &mut Vec<Point2<f64>>) {
        out.clear();
        let outer_anchor = (self.outer_anchor != self.anchor).then_some(self.outer_anchor);
        match self.side {
            FinSide::Right => {
                out.extend(self.apex);
                out.push(self.anchor);
                out.extend(self.chain.iter().copied());
                out.extend(outer_anchor);
                out.extend([self.outer_far, self.inner_far]);
            }
            FinSide::Left => {
                out.push(self.apex.unwrap_or(self.anchor));
                out.extend([self.inner_far, self.outer_far]);
                out.extend(outer_anchor);
                out.extend(self.chain.iter().copied());
                if self.apex.is_some() {
                    out.push(self.anchor);
                }
            }
        }
    }

    /// Triangulate this fin's outline as written by [`Fin::outline`]
    ///
    /// The far part between the two rays is convex and fanned from its first
    /// vertex, so a spliced apex is shared by every far triangle. The filler
    /// between the hull chain and the diagonal from the inner anchor to the
    /// outer far corner goes through the general triangulator.
    fn triangulate(&self, outline: &[Point2<f64>]) -> umbra2d_geometry::Result<Vec<usize>> {
        let len = outline.len();
        let has_filler = self.outer_anchor != self.anchor;
        let apex = self.apex.is_some();

        let (far, filler) = match self.side {
            FinSide::Right => {
                // [apex?, anchor, chain.., outer anchor?, outer far, inner far]
                let anchor = usize::from(apex);
                let (outer_far, inner_far) = (len - 2, len - 1);
                let mut far: SmallVec<[usize; 4]> = SmallVec::new();
                far.extend(apex.then_some(0));
                far.extend([anchor, outer_far, inner_far]);
                let filler: SmallVec<[usize; 8]> = if has_filler {
                    (anchor..=outer_far).collect()
                } else {
                    SmallVec::new()
                };
                (far, filler)
            }
            FinSide::Left => {
                // [apex or anchor, inner far, outer far, outer anchor?, chain.., anchor?]
                let anchor = if apex { len - 1 } else { 0 };
                let mut far: SmallVec<[usize; 4]> = SmallVec::from_slice(&[0, 1, 2]);
                far.extend(apex.then_some(anchor));
                let mut filler: SmallVec<[usize; 8]> = SmallVec::new();
                if has_filler {
                    filler.extend(2..len);
                    filler.extend((!apex).then_some(anchor));
                }
                (far, filler)
            }
        };

        let mut indices: Vec<usize> = fan_triangulate(far.len())
            .into_iter()
            .map(|i| far[i])
            .collect();
        if filler.len() >= 3 {
            let points: SmallVec<[Point2<f64>; 8]> = filler.iter().map(|&i| outline[i]).collect();
            let local = triangulate_polygon(&points)?;
            indices.extend(local.into_iter().map(|i| filler[i]));
        }
        Ok(indices)
    }

    /// Exact fin points clipping results are snapped back onto
    fn references(&self) -> SmallVec<[Point2<f64>; 8]> {
        let mut references: SmallVec<[Point2<f64>; 8]> =
            SmallVec::from_slice(&[self.anchor, self.outer_anchor, self.outer_far, self.inner_far]);
        references.extend(self.apex);
        references.extend(self.chain.iter().copied());
        references
    }

    fn tex_coord(&self, p: &Point2<f64>) -> Point2<f64> {
        let corners = self.corners();
        let tex = corner_tex_coords();
        if let Some(i) = corners.iter().position(|c| c == p) {
            return tex[i];
        }
        match barycentric(p, &corners[0], &corners[1], &corners[2]) {
            Some(weights) => interpolate(&weights, &tex),
            None => tex[0],
        }
    }
}

fn corner_tex_coords() -> [Point2<f64>; 3] {
    [
        Point2::new(0.0, 1.0),
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 0.0),
    ]
}

/// Emits penumbra fins and records their seam vertices on apex contexts
#[derive(Debug, Default)]
pub struct PenumbraBuilder {
    mesh: ShadowMesh,
    polygon: Vec<Point2<f64>>,
    /// Mesh index of `polygon[0]` for the most recent fin
    polygon_base: u32,
}

impl PenumbraBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn emit_fin(&mut self, state: &BuildState, hull: &Hull, fin: &Fin) {
        fin.outline(&mut self.polygon);

        let clipped = state.light.shadow_type.clips_fins()
            && convex_overlap_area(&self.polygon, hull.world_points())
                > state.config.clip_area_threshold;

        let indices = if clipped {
            self.clip_against(state, hull, fin)
        } else {
            match fin.triangulate(&self.polygon) {
                Ok(indices) => Some(indices),
                Err(error) => {
                    tracing::warn!(%error, points = self.polygon.len(), "Skipping penumbra fin");
                    None
                }
            }
        };
        let Some(indices) = indices else {
            self.polygon.clear();
            return;
        };

        self.polygon_base = self.mesh.vertex_count() as u32;
        for p in &self.polygon {
            self.mesh.add_textured_vertex(*p, fin.tex_coord(p));
        }
        self.mesh.add_indices(self.polygon_base, &indices);
    }

    /// Replace the outline by fin minus hull; `None` drops the fin
    fn clip_against(&mut self, state: &BuildState, hull: &Hull, fin: &Fin) -> Option<Vec<usize>> {
        let mut contour = match subtract_polygon(&self.polygon, hull.world_points()) {
            Ok(Some(contour)) => contour,
            // The hull covers the whole fin
            Ok(None) => return None,
            Err(error) => {
                tracing::warn!(%error, "Fin clipping failed, keeping unclipped fin");
                return fin.triangulate(&self.polygon).ok();
            }
        };

        let tolerance = state.light.range.max(1.0) * SNAP_RELATIVE_TOLERANCE;
        snap_to(&mut contour, &fin.references(), tolerance);
        rotate_to_front(&mut contour, &fin.anchor);

        match triangulate_polygon(&contour) {
            Ok(indices) => {
                self.polygon = contour;
                Some(indices)
            }
            Err(error) => {
                tracing::warn!(%error, "Clipped fin could not be triangulated, dropping it");
                None
            }
        }
    }

    /// Remember which vertices of the last fin sit on points shared with the umbra
    fn record_seam(&self, context: &mut UmbraIntersectionContext, fin: &Fin) {
        let (far, vertices) = match fin.side {
            FinSide::Right => (context.right_far, &mut context.right_vertices),
            FinSide::Left => (context.left_far, &mut context.left_vertices),
        };
        let apex = context.apex;

        for (k, p) in self.polygon.iter().enumerate() {
            if *p == apex || *p == far {
                vertices.push(SeamVertex {
                    index: self.polygon_base + k as u32,
                    position: *p,
                    tex_coord: fin.tex_coord(p),
                });
            }
        }
    }
}

impl ShadowBuilder for PenumbraBuilder {
    fn pre_process(&mut self, _state: &BuildState) {
        self.mesh.clear();
    }

    fn process_hull(&mut self, state: &mut BuildState, hull: &Hull, context: &HullContext) {
        let segments = std::mem::take(&mut state.segments);

        for segment in &segments {
            for side in [FinSide::Right, FinSide::Left] {
                let fin = Fin::new(state, context, segment, side);
                self.emit_fin(state, hull, &fin);
                if let Some(i) = segment.intersection {
                    self.record_seam(&mut state.intersections[i], &fin);
                }
            }
        }

        state.segments = segments;
    }

    fn build(&mut self, _state: &mut BuildState, output: &mut LightShadows) {
        output.store(ShadowRegion::Penumbra, &mut self.mesh);
    }
}
