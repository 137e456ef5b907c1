// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene of lights and hulls with per-light cached shadow geometry
//!
//! Nothing is rebuilt from setters. [`ShadowScene::update`] compares, for
//! every light, a snapshot of the light and of the hulls it reaches against
//! the snapshot its cached geometry was built from, and rebuilds only the
//! lights whose snapshot changed.

use crate::buffers::{DoubleBuffered, LightShadows};
use crate::config::ShadowConfig;
use crate::error::{Error, Result};
use crate::light::{Light, LightSnapshot};
use crate::pipeline::ShadowPipeline;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use umbra2d_geometry::{Hull, HullSnapshot};

new_key_type! {
    /// Handle of a light in a [`ShadowScene`]
    pub struct LightKey;
    /// Handle of a hull in a [`ShadowScene`]
    pub struct HullKey;
}

/// Everything a light's shadow geometry depends on
#[derive(Debug, Clone, PartialEq)]
struct BuildSnapshot {
    light: LightSnapshot,
    hulls: Vec<(HullKey, HullSnapshot)>,
}

#[derive(Debug, Default)]
struct LightCache {
    /// `None` until the first build
    built_from: Option<BuildSnapshot>,
    buffers: DoubleBuffered<LightShadows>,
}

/// Lights, hulls and the shadow geometry cached per light
#[derive(Debug)]
pub struct ShadowScene {
    config: ShadowConfig,
    lights: SlotMap<LightKey, Light>,
    hulls: SlotMap<HullKey, Hull>,
    cache: FxHashMap<LightKey, LightCache>,
    pipeline: ShadowPipeline,
}

impl Default for ShadowScene {
    fn default() -> Self {
        Self::new(ShadowConfig::default())
    }
}

impl ShadowScene {
    pub fn new(config: ShadowConfig) -> Self {
        Self {
            pipeline: ShadowPipeline::new(config.clone()),
            config,
            lights: SlotMap::with_key(),
            hulls: SlotMap::with_key(),
            cache: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    pub fn add_light(&mut self, light: Light) -> LightKey {
        let key = self.lights.insert(light);
        self.cache.insert(key, LightCache::default());
        key
    }

    pub fn remove_light(&mut self, key: LightKey) -> Option<Light> {
        self.cache.remove(&key);
        self.lights.remove(key)
    }

    pub fn add_hull(&mut self, hull: Hull) -> HullKey {
        self.hulls.insert(hull)
    }

    pub fn remove_hull(&mut self, key: HullKey) -> Option<Hull> {
        self.hulls.remove(key)
    }

    pub fn light(&self, key: LightKey) -> Option<&Light> {
        self.lights.get(key)
    }

    pub fn light_mut(&mut self, key: LightKey) -> Option<&mut Light> {
        self.lights.get_mut(key)
    }

    pub fn hull(&self, key: HullKey) -> Option<&Hull> {
        self.hulls.get(key)
    }

    pub fn hull_mut(&mut self, key: HullKey) -> Option<&mut Hull> {
        self.hulls.get_mut(key)
    }

    /// Apply `f` to a light, failing for a stale key
    pub fn edit_light<R>(&mut self, key: LightKey, f: impl FnOnce(&mut Light) -> R) -> Result<R> {
        self.lights.get_mut(key).map(f).ok_or(Error::UnknownLight)
    }

    /// Apply `f` to a hull, failing for a stale key
    pub fn edit_hull<R>(&mut self, key: HullKey, f: impl FnOnce(&mut Hull) -> R) -> Result<R> {
        self.hulls.get_mut(key).map(f).ok_or(Error::UnknownHull)
    }

    pub fn lights(&self) -> impl Iterator<Item = (LightKey, &Light)> {
        self.lights.iter()
    }

    pub fn hulls(&self) -> impl Iterator<Item = (HullKey, &Hull)> {
        self.hulls.iter()
    }

    /// Published shadow geometry of a light
    ///
    /// Stable between `update` calls; empty before the light's first build.
    pub fn shadows(&self, key: LightKey) -> Option<&LightShadows> {
        self.cache.get(&key).map(|cache| cache.buffers.front())
    }

    /// Whether the next `update` would rebuild this light
    ///
    /// Hull bounds are taken as of their last refresh.
    pub fn needs_rebuild(&self, key: LightKey) -> Result<bool> {
        let light = self.lights.get(key).ok_or(Error::UnknownLight)?;
        let cache = self.cache.get(&key).ok_or(Error::UnknownLight)?;
        Ok(cache.built_from.as_ref() != Some(&snapshot(light, &self.hulls)))
    }

    /// Refresh hull caches and rebuild every light whose inputs changed
    ///
    /// Returns the keys of the rebuilt lights.
    pub fn update(&mut self) -> Vec<LightKey> {
        for hull in self.hulls.values_mut() {
            hull.refresh();
        }

        let Self {
            config,
            lights,
            hulls,
            cache,
            pipeline,
        } = self;

        let mut dirty: Vec<(LightKey, BuildSnapshot, LightShadows)> = Vec::new();
        for (key, light) in lights.iter() {
            let current = snapshot(light, hulls);
            let Some(entry) = cache.get_mut(&key) else {
                continue;
            };
            if entry.built_from.as_ref() != Some(&current) {
                let back = std::mem::take(entry.buffers.back_mut());
                dirty.push((key, current, back));
            }
        }

        if dirty.is_empty() {
            return Vec::new();
        }

        let config = &*config;
        let lights = &*lights;
        let hulls = &*hulls;
        if config.parallel && dirty.len() > 1 {
            dirty.par_iter_mut().for_each_init(
                || ShadowPipeline::new(config.clone()),
                |pipeline, (key, _, output)| {
                    if let Some(light) = lights.get(*key) {
                        pipeline.build(light, hulls.values(), output);
                    }
                },
            );
        } else {
            for (key, _, output) in dirty.iter_mut() {
                if let Some(light) = lights.get(*key) {
                    pipeline.build(light, hulls.values(), output);
                }
            }
        }

        tracing::debug!(rebuilt = dirty.len(), lights = lights.len(), "Shadow scene updated");

        dirty
            .into_iter()
            .filter_map(|(key, current, output)| {
                let entry = cache.get_mut(&key)?;
                *entry.buffers.back_mut() = output;
                entry.buffers.swap();
                entry.built_from = Some(current);
                Some(key)
            })
            .collect()
    }
}

fn snapshot(light: &Light, hulls: &SlotMap<HullKey, Hull>) -> BuildSnapshot {
    BuildSnapshot {
        light: light.snapshot(),
        hulls: hulls
            .iter()
            .filter(|(_, hull)| ShadowPipeline::affects(light, hull))
            .map(|(key, hull)| (key, hull.snapshot()))
            .collect(),
    }
}
