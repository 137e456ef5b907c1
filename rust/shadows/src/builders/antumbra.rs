// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Antumbra builder: the region past an umbra apex

use super::{BuildState, ShadowBuilder};
use crate::buffers::{LightShadows, ShadowRegion};
use crate::classify::HullContext;
use nalgebra::Point2;
use umbra2d_geometry::{Hull, ShadowMesh};

/// Emits one triangle per apex context: apex, right far point, left far point
///
/// The far points are the exact points the umbra and penumbra builders
/// already used, so the triangle closes the gap between both fins.
#[derive(Debug, Default)]
pub struct AntumbraBuilder {
    mesh: ShadowMesh,
}

impl AntumbraBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShadowBuilder for AntumbraBuilder {
    fn pre_process(&mut self, _state: &BuildState) {
        self.mesh.clear();
    }

    fn process_hull(&mut self, _state: &mut BuildState, _hull: &Hull, _context: &HullContext) {}

    fn build(&mut self, state: &mut BuildState, output: &mut LightShadows) {
        for context in &state.intersections {
            let apex = self
                .mesh
                .add_textured_vertex(context.apex, Point2::new(0.5, 1.0));
            let right = self
                .mesh
                .add_textured_vertex(context.right_far, Point2::new(0.0, 0.0));
            let left = self
                .mesh
                .add_textured_vertex(context.left_far, Point2::new(1.0, 0.0));
            // Past the apex the inner rays have swapped sides
            self.mesh.add_triangle(apex, left, right);
        }

        tracing::trace!(triangles = self.mesh.triangle_count(), "Antumbra built");
        output.store(ShadowRegion::Antumbra, &mut self.mesh);
    }
}
