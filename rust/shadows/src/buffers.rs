// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-light output buffers

use umbra2d_geometry::ShadowMesh;

/// The four meshes a light's build pass produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowRegion {
    Penumbra,
    Umbra,
    Antumbra,
    Solid,
}

impl ShadowRegion {
    pub const ALL: [ShadowRegion; 4] = [
        ShadowRegion::Penumbra,
        ShadowRegion::Umbra,
        ShadowRegion::Antumbra,
        ShadowRegion::Solid,
    ];
}

/// Shadow geometry of one light
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightShadows {
    pub penumbra: ShadowMesh,
    pub umbra: ShadowMesh,
    pub antumbra: ShadowMesh,
    pub solid: ShadowMesh,
    /// The light sits inside a hull and contributes no light at all
    pub light_obstructed: bool,
}

impl LightShadows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&self, region: ShadowRegion) -> &ShadowMesh {
        match region {
            ShadowRegion::Penumbra => &self.penumbra,
            ShadowRegion::Umbra => &self.umbra,
            ShadowRegion::Antumbra => &self.antumbra,
            ShadowRegion::Solid => &self.solid,
        }
    }

    pub fn mesh_mut(&mut self, region: ShadowRegion) -> &mut ShadowMesh {
        match region {
            ShadowRegion::Penumbra => &mut self.penumbra,
            ShadowRegion::Umbra => &mut self.umbra,
            ShadowRegion::Antumbra => &mut self.antumbra,
            ShadowRegion::Solid => &mut self.solid,
        }
    }

    /// Move `mesh` into `region`; `mesh` is left holding the previous
    /// region buffer, cleared, so its allocation is reused next pass
    pub fn store(&mut self, region: ShadowRegion, mesh: &mut ShadowMesh) {
        let target = self.mesh_mut(region);
        std::mem::swap(target, mesh);
        mesh.clear();
    }

    /// Whether `region` has anything to draw
    #[inline]
    pub fn has(&self, region: ShadowRegion) -> bool {
        !self.mesh(region).is_empty()
    }

    #[inline]
    pub fn has_penumbra(&self) -> bool {
        self.has(ShadowRegion::Penumbra)
    }

    #[inline]
    pub fn has_umbra(&self) -> bool {
        self.has(ShadowRegion::Umbra)
    }

    #[inline]
    pub fn has_antumbra(&self) -> bool {
        self.has(ShadowRegion::Antumbra)
    }

    #[inline]
    pub fn has_solid(&self) -> bool {
        self.has(ShadowRegion::Solid)
    }

    /// Empty every mesh, keeping allocations
    pub fn clear(&mut self) {
        for region in ShadowRegion::ALL {
            self.mesh_mut(region).clear();
        }
        self.light_obstructed = false;
    }
}

/// Front/back buffer pair: readers see `front` while `back` is rebuilt
#[derive(Debug, Clone, Default)]
pub struct DoubleBuffered<T> {
    front: T,
    back: T,
}

impl<T> DoubleBuffered<T> {
    pub fn new(front: T, back: T) -> Self {
        Self { front, back }
    }

    #[inline]
    pub fn front(&self) -> &T {
        &self.front
    }

    #[inline]
    pub fn back_mut(&mut self) -> &mut T {
        &mut self.back
    }

    /// Publish the back buffer
    #[inline]
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
    }
}
