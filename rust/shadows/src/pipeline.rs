// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Build pass for one light
//!
//! A [`ShadowPipeline`] owns the builders and every transient buffer of a
//! pass. Reusing one pipeline for many lights keeps allocations warm; the
//! scene keeps one pipeline per rayon worker.

use crate::buffers::LightShadows;
use crate::builders::{
    AntumbraBuilder, BuildState, PenumbraBuilder, ShadowBuilder, SolidBuilder, UmbraBuilder,
};
use crate::classify::HullContext;
use crate::config::ShadowConfig;
use crate::light::Light;
use umbra2d_geometry::Hull;

/// Classification and builders for one light at a time
#[derive(Debug)]
pub struct ShadowPipeline {
    config: ShadowConfig,
    state: Option<BuildState>,
    context: HullContext,
    umbra: UmbraBuilder,
    penumbra: PenumbraBuilder,
    antumbra: AntumbraBuilder,
    solid: SolidBuilder,
}

impl Default for ShadowPipeline {
    fn default() -> Self {
        Self::new(ShadowConfig::default())
    }
}

impl ShadowPipeline {
    pub fn new(config: ShadowConfig) -> Self {
        Self {
            config,
            state: None,
            context: HullContext::default(),
            umbra: UmbraBuilder::new(),
            penumbra: PenumbraBuilder::new(),
            antumbra: AntumbraBuilder::new(),
            solid: SolidBuilder::new(),
        }
    }

    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    /// Whether `hull` takes part in `light`'s build pass
    pub fn affects(light: &Light, hull: &Hull) -> bool {
        hull.is_enabled() && light.intersects_hull(hull)
    }

    /// Rebuild `output` for `light`
    ///
    /// Hulls must have refreshed world caches. The solid region is filled only
    /// for shadow types that draw hulls. Disabled hulls and hulls out of
    /// the light's range are skipped. A disabled or non-casting light leaves
    /// `output` empty; a light inside a hull leaves it empty with
    /// `light_obstructed` set.
    pub fn build<'h>(
        &mut self,
        light: &Light,
        hulls: impl IntoIterator<Item = &'h Hull>,
        output: &mut LightShadows,
    ) {
        output.clear();
        if !light.is_enabled() || !light.casts_shadows() {
            return;
        }

        let Self {
            config,
            state,
            context,
            umbra,
            penumbra,
            antumbra,
            solid,
        } = self;

        let state = state.get_or_insert_with(|| BuildState::new(light, config.clone()));
        state.reset(light);

        let mut shaped: [&mut dyn ShadowBuilder; 3] = [umbra, penumbra, antumbra];
        for builder in shaped.iter_mut() {
            builder.pre_process(state);
        }
        solid.pre_process(state);

        let draws_hulls = light.shadow_type().draws_hulls();
        let mut processed = 0usize;
        for hull in hulls {
            if !Self::affects(light, hull) {
                continue;
            }
            if hull.is_dirty() {
                tracing::warn!("Hull world cache is stale; refresh hulls before building");
            }
            if light.is_inside_hull(hull) {
                tracing::debug!("Light is inside a hull, no shadows to build");
                output.clear();
                output.light_obstructed = true;
                return;
            }

            context.classify(light, hull);
            if draws_hulls {
                solid.process_hull(state, hull, context);
            }
            processed += 1;

            if !context.is_convex {
                tracing::warn!(points = hull.len(), "Skipping non-convex hull");
                continue;
            }
            for builder in shaped.iter_mut() {
                builder.process_hull(state, hull, context);
            }
            tracing::trace!(
                points = context.len(),
                segments = state.segments.len(),
                "Hull processed"
            );
        }

        for builder in shaped.iter_mut() {
            builder.build(state, output);
        }
        solid.build(state, output);

        tracing::debug!(
            hulls = processed,
            penumbra_triangles = output.penumbra.triangle_count(),
            umbra_triangles = output.umbra.triangle_count(),
            antumbra_triangles = output.antumbra.triangle_count(),
            "Light shadows built"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::ShadowType;
    use nalgebra::{Point2, Vector2};

    fn square_at(x: f64, y: f64, size: f64) -> Hull {
        let mut hull = Hull::rectangle(size, size).unwrap();
        hull.set_position(Vector2::new(x, y));
        hull.refresh();
        hull
    }

    #[test]
    fn test_builds_every_region() {
        let light = Light::new(Point2::new(-100.0, 0.0), 45.0, 300.0)
            .unwrap()
            .with_shadow_type(ShadowType::Solid);
        let hulls = [square_at(0.0, 0.0, 50.0)];
        let mut pipeline = ShadowPipeline::default();
        let mut output = LightShadows::new();

        pipeline.build(&light, &hulls, &mut output);
        assert!(output.has_penumbra());
        assert!(output.has_umbra());
        assert!(output.has_antumbra());
        assert!(output.has_solid());
        assert!(!output.light_obstructed);
    }

    #[test]
    fn test_illuminated_light_leaves_hulls_out_of_solid() {
        let hulls = [square_at(0.0, 0.0, 50.0)];
        let mut pipeline = ShadowPipeline::default();

        let mut outputs = Vec::new();
        for shadow_type in [ShadowType::Illuminated, ShadowType::Solid, ShadowType::Occluded] {
            let light = Light::new(Point2::new(-100.0, 0.0), 20.0, 300.0)
                .unwrap()
                .with_shadow_type(shadow_type);
            let mut output = LightShadows::new();
            pipeline.build(&light, &hulls, &mut output);
            outputs.push(output);
        }

        assert!(!outputs[0].has_solid());
        assert!(outputs[1].has_solid());
        assert!(outputs[2].has_solid());
        assert_eq!(outputs[1].solid, outputs[2].solid);
        // Solid closes the umbra along the chord, Illuminated around the back
        assert_ne!(outputs[0].umbra, outputs[1].umbra);
        assert_eq!(outputs[1].umbra, outputs[2].umbra);
    }

    #[test]
    fn test_disabled_light_builds_nothing() {
        let mut light = Light::new(Point2::new(-100.0, 0.0), 20.0, 300.0).unwrap();
        light.set_enabled(false);
        let hulls = [square_at(0.0, 0.0, 50.0)];
        let mut pipeline = ShadowPipeline::default();
        let mut output = LightShadows::new();

        pipeline.build(&light, &hulls, &mut output);
        assert_eq!(output, LightShadows::default());
    }

    #[test]
    fn test_light_inside_hull_is_obstructed() {
        let light = Light::new(Point2::new(0.0, 0.0), 5.0, 300.0).unwrap();
        let hulls = [square_at(100.0, 0.0, 20.0), square_at(0.0, 0.0, 50.0)];
        let mut pipeline = ShadowPipeline::default();
        let mut output = LightShadows::new();

        pipeline.build(&light, &hulls, &mut output);
        assert!(output.light_obstructed);
        assert!(!output.has_penumbra());
        assert!(!output.has_solid());
    }

    #[test]
    fn test_disabled_and_distant_hulls_are_skipped() {
        let light = Light::new(Point2::new(0.0, 0.0), 5.0, 100.0).unwrap();
        let mut disabled = square_at(50.0, 0.0, 10.0);
        disabled.set_enabled(false);
        let hulls = [disabled, square_at(500.0, 0.0, 10.0)];
        let mut pipeline = ShadowPipeline::default();
        let mut output = LightShadows::new();

        pipeline.build(&light, &hulls, &mut output);
        assert_eq!(output, LightShadows::default());
    }

    #[test]
    fn test_non_convex_hull_only_gets_solid() {
        let light = Light::new(Point2::new(-100.0, 0.0), 10.0, 300.0)
            .unwrap()
            .with_shadow_type(ShadowType::Solid);
        let dart = Hull::new(vec![
            Point2::new(0.0, -20.0),
            Point2::new(40.0, 0.0),
            Point2::new(0.0, 20.0),
            Point2::new(10.0, 0.0),
        ])
        .unwrap();
        assert!(!dart.is_convex());

        let mut pipeline = ShadowPipeline::default();
        let mut output = LightShadows::new();
        pipeline.build(&light, [&dart], &mut output);
        assert!(output.has_solid());
        assert!(!output.has_umbra());
        assert!(!output.has_penumbra());
    }

    #[test]
    fn test_pipeline_reuse_does_not_leak_between_lights() {
        let hulls = [square_at(0.0, 0.0, 50.0)];
        let mut pipeline = ShadowPipeline::default();

        let big = Light::new(Point2::new(-100.0, 0.0), 45.0, 300.0).unwrap();
        let small = Light::new(Point2::new(-100.0, 0.0), 20.0, 300.0).unwrap();
        let mut first = LightShadows::new();
        let mut second = LightShadows::new();
        pipeline.build(&big, &hulls, &mut first);
        pipeline.build(&small, &hulls, &mut second);

        assert!(first.has_antumbra());
        assert!(!second.has_antumbra());

        let mut fresh = LightShadows::new();
        ShadowPipeline::default().build(&small, &hulls, &mut fresh);
        assert_eq!(second, fresh);
    }
}
