// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end shadow builds for a light left of a 50x50 square at the origin.

use umbra2d_geometry::primitives::segment_intersection;
use umbra2d_shadows::{
    Hull, Light, LightShadows, Point2, ShadowConfig, ShadowMesh, ShadowPipeline, ShadowScene,
    ShadowType, Vector2,
};

fn square(center: Vector2<f64>, size: f64) -> Hull {
    let mut hull = Hull::rectangle(1.0, 1.0).unwrap();
    hull.set_scale(Vector2::new(size, size));
    hull.set_position(center);
    hull.refresh();
    hull
}

fn build_with(config: ShadowConfig, light: &Light, hulls: &[Hull]) -> LightShadows {
    let mut pipeline = ShadowPipeline::new(config);
    let mut output = LightShadows::new();
    pipeline.build(light, hulls, &mut output);
    output
}

fn build_square(radius: f64, shadow_type: ShadowType) -> LightShadows {
    let light = Light::new(Point2::new(-100.0, 0.0), radius, 300.0)
        .unwrap()
        .with_shadow_type(shadow_type);
    build_with(
        ShadowConfig::default(),
        &light,
        &[square(Vector2::zeros(), 50.0)],
    )
}

fn contains_exact(mesh: &ShadowMesh, p: Point2<f32>) -> bool {
    mesh.iter_positions()
        .any(|q| q.x.to_bits() == p.x.to_bits() && q.y.to_bits() == p.y.to_bits())
}

fn mesh_covers(mesh: &ShadowMesh, p: &Point2<f64>) -> bool {
    let p = Point2::new(p.x as f32, p.y as f32);
    mesh.indices.chunks_exact(3).any(|tri| {
        let [a, b, c] = [0, 1, 2].map(|k| mesh.position(tri[k] as usize));
        let side = |u: Point2<f32>, v: Point2<f32>| {
            (v.x - u.x) * (p.y - u.y) - (p.x - u.x) * (v.y - u.y) >= -1e-3
        };
        side(a, b) && side(b, c) && side(c, a)
    })
}

/// Share of the light's diameter facing `p` that the hull hides from `p`
fn blocked_fraction(light: &Light, hull: &Hull, p: &Point2<f64>) -> f64 {
    const SAMPLES: usize = 201;
    let center = light.position();
    let dir = (*p - center).normalize();
    let across = Vector2::new(dir.y, -dir.x);
    let points = hull.world_points();

    let blocked = (0..SAMPLES)
        .filter(|&i| {
            let offset = (i as f64 / (SAMPLES - 1) as f64 * 2.0 - 1.0) * light.radius();
            let source = center + across * offset;
            (0..points.len()).any(|k| {
                let (a, b) = (points[k], points[(k + 1) % points.len()]);
                segment_intersection(&source, p, &a, &b).is_some()
            })
        })
        .count();
    blocked as f64 / SAMPLES as f64
}

/// How far past the square's bottom right corner, along the light direction,
/// the umbra boundaries of a disk at (-100, 0) meet
///
/// Holds once the corner is the bottom tangent point's silhouette vertex.
fn apex_advance(radius: f64) -> f64 {
    let center = Point2::new(-100.0, 0.0);
    let corner = Point2::new(25.0, -25.0);
    let dir: Vector2<f64> = (corner - center).normalize();
    let tangent = center + Vector2::new(dir.y, -dir.x) * radius;
    let ray = (corner - tangent).normalize();
    if ray.y <= 0.0 {
        return f64::INFINITY;
    }
    // Both boundaries meet on the x axis by symmetry
    let t = -corner.y / ray.y;
    t * ray.dot(&dir)
}

#[test]
fn test_small_light_square_scenario() {
    let shadows = build_square(20.0, ShadowType::Illuminated);

    assert!(shadows.has_penumbra());
    assert!(shadows.has_umbra());
    assert!(!shadows.has_antumbra());
    // Illuminated hulls are lit, so nothing is drawn over them
    assert!(!shadows.has_solid());
    assert!(!shadows.light_obstructed);

    // Umbra boundary rays diverge, so the umbra reaches out to the range
    let (_, max) = shadows.umbra.bounds();
    assert!(max.x > 250.0);
}

#[test]
fn test_large_light_square_scenario_has_antumbra() {
    let shadows = build_square(45.0, ShadowType::Illuminated);

    assert!(shadows.has_penumbra());
    assert!(shadows.has_umbra());
    assert!(shadows.has_antumbra());
    assert_eq!(shadows.antumbra.triangle_count(), 1);

    // The umbra ends at the apex, well before the range
    let (_, max) = shadows.umbra.bounds();
    assert!(max.x < 200.0);
}

#[test]
fn test_antumbra_appears_once_apex_is_within_range() {
    let config = ShadowConfig {
        seam_overlap_degrees: 0.0,
        ..ShadowConfig::default()
    };
    let hulls = [square(Vector2::zeros(), 50.0)];
    let build = |radius: f64| {
        let light = Light::new(Point2::new(-100.0, 0.0), radius, 300.0).unwrap();
        build_with(config.clone(), &light, &hulls)
    };

    let (mut lo, mut hi) = (30.0, 45.0);
    for _ in 0..60 {
        let mid = 0.5 * (lo + hi);
        if apex_advance(mid) > 300.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let threshold = 0.5 * (lo + hi);
    assert!(threshold > 35.0 && threshold < 38.0, "threshold {threshold}");

    assert!(!build(threshold * 0.99).has_antumbra());
    assert!(build(threshold * 1.01).has_antumbra());

    for radius in 1..=60 {
        let expected = radius as f64 > threshold;
        assert_eq!(build(radius as f64).has_antumbra(), expected, "radius {radius}");
    }
}

#[test]
fn test_partly_hidden_points_are_covered() {
    let hull = square(Vector2::zeros(), 50.0);
    for radius in [20.0, 45.0] {
        let light = Light::new(Point2::new(-100.0, 0.0), radius, 300.0).unwrap();
        let shadows = build_with(ShadowConfig::default(), &light, std::slice::from_ref(&hull));

        for x in (0..=240).step_by(10) {
            for y in (-150..=150).step_by(10) {
                let p = Point2::new(x as f64, y as f64);
                let inside_hull = p.x.abs() <= 26.0 && p.y.abs() <= 26.0;
                if inside_hull || (p - light.position()).norm() > 250.0 {
                    continue;
                }
                if blocked_fraction(&light, &hull, &p) < 0.15 {
                    continue;
                }
                let covered = mesh_covers(&shadows.penumbra, &p)
                    || mesh_covers(&shadows.umbra, &p)
                    || mesh_covers(&shadows.antumbra, &p);
                assert!(covered, "radius {radius}: {p} is in shadow but not covered");
            }
        }
    }
}

#[test]
fn test_umbra_and_penumbra_share_far_points_bit_for_bit() {
    let shadows = build_square(20.0, ShadowType::Illuminated);

    // Umbra vertices beyond the hull are the two inner far points
    let far: Vec<_> = shadows
        .umbra
        .iter_positions()
        .filter(|p| p.x > 25.0)
        .collect();
    assert_eq!(far.len(), 2);
    for p in far {
        assert!(contains_exact(&shadows.penumbra, p), "seam vertex {p} missing");
    }
}

#[test]
fn test_apex_seams_are_shared_by_all_regions() {
    let shadows = build_square(45.0, ShadowType::Illuminated);
    let antumbra = &shadows.antumbra;

    let apex = antumbra.position(0);
    assert!(contains_exact(&shadows.umbra, apex));
    assert!(contains_exact(&shadows.penumbra, apex));

    for i in 1..3 {
        assert!(contains_exact(&shadows.penumbra, antumbra.position(i)));
    }
}

#[test]
fn test_hull_outside_light_bounds_produces_nothing() {
    let light = Light::new(Point2::new(-100.0, 0.0), 20.0, 300.0).unwrap();
    let hulls = [square(Vector2::new(1000.0, 1000.0), 50.0)];
    let shadows = build_with(ShadowConfig::default(), &light, &hulls);

    assert_eq!(shadows, LightShadows::default());
}

#[test]
fn test_solid_is_concatenation_of_hulls() {
    let light = Light::new(Point2::new(-100.0, 0.0), 10.0, 400.0)
        .unwrap()
        .with_shadow_type(ShadowType::Solid);
    let triangle = Hull::new(vec![
        Point2::new(0.0, 60.0),
        Point2::new(30.0, 60.0),
        Point2::new(10.0, 90.0),
    ])
    .unwrap();
    let hulls = [
        square(Vector2::zeros(), 50.0),
        square(Vector2::new(0.0, -80.0), 20.0),
        triangle,
    ];
    let shadows = build_with(ShadowConfig::default(), &light, &hulls);

    let vertices: usize = hulls.iter().map(|h| h.len()).sum();
    let indices: usize = hulls.iter().map(|h| h.fill_indices().len()).sum();
    assert_eq!(shadows.solid.vertex_count(), vertices);
    assert_eq!(shadows.solid.indices.len(), indices);
    assert!(shadows.solid.indices.iter().all(|&i| (i as usize) < vertices));
}

#[test]
fn test_fin_width_vanishes_with_light_radius() {
    let config = ShadowConfig {
        seam_overlap_degrees: 0.0,
        ..ShadowConfig::default()
    };
    let hulls = [square(Vector2::zeros(), 50.0)];

    let fin_width = |radius: f64| {
        let light = Light::new(Point2::new(-100.0, 0.0), radius, 300.0).unwrap();
        let shadows = build_with(config.clone(), &light, &hulls);
        // Right fin: anchor, outer far, inner far
        let outer = shadows.penumbra.position(1);
        let inner = shadows.penumbra.position(2);
        (outer - inner).norm()
    };

    let wide = fin_width(10.0);
    let narrow = fin_width(1.0);
    let hard = fin_width(1e-6);
    assert!(wide > narrow);
    assert!(narrow > hard);
    assert!(hard < 1e-2, "fin width {hard} at a point light");
}

#[test]
fn test_occluded_umbra_spans_silhouette_chord() {
    let shadows = build_square(20.0, ShadowType::Occluded);

    // Right anchor, two far points, left anchor
    assert_eq!(shadows.umbra.vertex_count(), 4);
    assert!(contains_exact(&shadows.umbra, Point2::new(-25.0, -25.0)));
    assert!(contains_exact(&shadows.umbra, Point2::new(-25.0, 25.0)));
    assert!(!contains_exact(&shadows.umbra, Point2::new(25.0, 25.0)));
    assert!(shadows.has_penumbra());
}

#[test]
fn test_light_inside_hull_is_obstructed() {
    let mut scene = ShadowScene::default();
    let light = scene.add_light(Light::new(Point2::new(5.0, 5.0), 2.0, 300.0).unwrap());
    scene.add_hull(square(Vector2::zeros(), 50.0));
    scene.add_hull(square(Vector2::new(100.0, 0.0), 20.0));

    scene.update();
    let shadows = scene.shadows(light).unwrap();
    assert!(shadows.light_obstructed);
    assert!(!shadows.has_penumbra());
    assert!(!shadows.has_umbra());
    assert!(!shadows.has_solid());
}

#[test]
fn test_scene_rebuilds_only_lights_reaching_a_moved_hull() {
    let mut scene = ShadowScene::default();
    let near = scene.add_light(Light::new(Point2::new(-100.0, 0.0), 20.0, 300.0).unwrap());
    let far = scene.add_light(Light::new(Point2::new(5000.0, 0.0), 20.0, 300.0).unwrap());
    let hull = scene.add_hull(square(Vector2::zeros(), 50.0));

    let mut rebuilt = scene.update();
    rebuilt.sort();
    let mut expected = vec![near, far];
    expected.sort();
    assert_eq!(rebuilt, expected);

    scene.hull_mut(hull).unwrap().set_rotation(0.3);
    assert_eq!(scene.update(), vec![near]);
    assert!(scene.update().is_empty());
}
