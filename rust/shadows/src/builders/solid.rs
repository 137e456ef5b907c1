// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solid builder: the hulls' own fill geometry

use super::{BuildState, ShadowBuilder};
use crate::buffers::{LightShadows, ShadowRegion};
use crate::classify::HullContext;
use umbra2d_geometry::{Hull, ShadowMesh};

/// Concatenates the fill triangulation of every processed hull
///
/// Indices are offset by the number of vertices already in the mesh.
#[derive(Debug, Default)]
pub struct SolidBuilder {
    mesh: ShadowMesh,
}

impl SolidBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one hull's world points and fill indices
    pub fn append_hull(&mut self, hull: &Hull) {
        let offset = self.mesh.vertex_count() as u32;
        for p in hull.world_points() {
            self.mesh.add_vertex(*p);
        }
        self.mesh
            .indices
            .extend(hull.fill_indices().iter().map(|&i| i + offset));
    }
}

impl ShadowBuilder for SolidBuilder {
    fn pre_process(&mut self, _state: &BuildState) {
        self.mesh.clear();
    }

    fn process_hull(&mut self, _state: &mut BuildState, hull: &Hull, _context: &HullContext) {
        self.append_hull(hull);
    }

    fn build(&mut self, _state: &mut BuildState, output: &mut LightShadows) {
        output.store(ShadowRegion::Solid, &mut self.mesh);
    }
}
