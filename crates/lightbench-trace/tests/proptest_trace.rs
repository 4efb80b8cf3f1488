//! Property-based tests for the bounce loop.
//!
//! Random scenes of lenses, conic mirrors and sensors are traced and the
//! per-ray invariants checked on every result.
//!
//! Run with: cargo test -p lightbench-trace -- proptest

use lightbench_math::{Point2, Pose2};
use lightbench_trace::{
    trace_scene, ConicMirror, Lens, LensModel, LineSensor, Scene, Settings, Source,
};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_pose() -> impl Strategy<Value = Pose2> {
    (-2.0..2.0f64, -2.0..2.0f64, -3.2..3.2f64)
        .prop_map(|(x, y, theta)| Pose2::new(Point2::new(x, y), theta))
}

fn arb_focal() -> impl Strategy<Value = f64> {
    prop_oneof![0.1..2.0f64, -2.0..-0.1f64]
}

fn arb_lens() -> impl Strategy<Value = Lens> {
    (arb_pose(), arb_focal(), 0.1..1.5f64, any::<bool>(), 1.0..1.8f64).prop_map(
        |(pose, f, aperture, facet, n2)| Lens {
            id: String::new(),
            pose,
            f,
            aperture,
            model: if facet {
                LensModel::FresnelFacet { n1: 1.0, n2 }
            } else {
                LensModel::FresnelThin
            },
        },
    )
}

fn arb_mirror() -> impl Strategy<Value = ConicMirror> {
    (arb_pose(), prop_oneof![0.2..2.0f64, -2.0..-0.2f64], -3.0..1.0f64, 0.1..1.5f64).prop_map(
        |(pose, r, kappa, aperture)| ConicMirror {
            id: String::new(),
            pose,
            r,
            kappa,
            aperture,
        },
    )
}

fn arb_sensor() -> impl Strategy<Value = LineSensor> {
    (arb_pose(), 0.1..2.0f64).prop_map(|(pose, length)| LineSensor {
        id: String::new(),
        pose,
        length,
    })
}

fn arb_scene() -> impl Strategy<Value = Scene> {
    (
        prop::collection::vec(arb_lens(), 0..4),
        prop::collection::vec(arb_mirror(), 0..4),
        prop::collection::vec(arb_sensor(), 0..3),
        0u32..8,
        0.5..10.0f64,
        1u32..24,
    )
        .prop_map(|(lenses, mirrors, sensors, max_bounces, max_distance, ray_count)| {
            let name = |prefix: &str, i: usize| format!("{prefix}{i}");
            Scene {
                sources: vec![Source::Point {
                    id: "src".into(),
                    position: Point2::new(0.05, -0.03),
                    power: 1.0,
                    ray_count,
                }],
                lenses: lenses
                    .into_iter()
                    .enumerate()
                    .map(|(i, l)| Lens { id: name("l", i), ..l })
                    .collect(),
                mirrors: mirrors
                    .into_iter()
                    .enumerate()
                    .map(|(i, m)| ConicMirror { id: name("m", i), ..m })
                    .collect(),
                sensors: sensors
                    .into_iter()
                    .enumerate()
                    .map(|(i, s)| LineSensor { id: name("d", i), ..s })
                    .collect(),
                settings: Settings {
                    max_bounces,
                    max_distance,
                    ..Settings::default()
                },
            }
        })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn proptest_directions_stay_unit(scene in arb_scene()) {
        let out = trace_scene(&scene);
        for traced in &out.rays {
            let norm = traced.ray.direction.norm();
            prop_assert!((norm - 1.0).abs() < 1e-9, "direction norm {}", norm);
        }
    }

    #[test]
    fn proptest_polyline_bounded(scene in arb_scene()) {
        let out = trace_scene(&scene);
        let limit = scene.settings.max_bounces as usize + 2;
        for traced in &out.rays {
            let ray = &traced.ray;
            prop_assert!(ray.is_terminated());
            prop_assert!(ray.bounce_count <= scene.settings.max_bounces);
            prop_assert!(ray.polyline.len() <= limit);
            prop_assert!(ray.traveled_distance <= scene.settings.max_distance + 1e-9);
        }
    }

    #[test]
    fn proptest_polyline_length_matches_distance(scene in arb_scene()) {
        let out = trace_scene(&scene);
        for traced in &out.rays {
            let walked: f64 = traced
                .ray
                .polyline
                .windows(2)
                .map(|w| (w[1] - w[0]).norm())
                .sum();
            prop_assert!((walked - traced.ray.traveled_distance).abs() < 1e-6);
        }
    }

    #[test]
    fn proptest_sensor_counts_match_hits(scene in arb_scene()) {
        let out = trace_scene(&scene);
        prop_assert_eq!(out.sensor_counts.len(), scene.sensors.len());
        let total: u64 = out.sensor_counts.iter().sum();
        let per_ray: usize = out.rays.iter().map(|r| r.sensor_hits.len()).sum();
        prop_assert_eq!(total, per_ray as u64);
        prop_assert_eq!(out.emitted, scene.total_rays());
    }
}
