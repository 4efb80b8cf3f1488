//! Ray generation from sources.

use std::f64::consts::TAU;

use lightbench_math::{dir_from_angle, perp, Point2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ray::Ray;
use crate::scene::{Scene, Settings, Source};

/// Generate the initial rays for every source, in source declaration order.
///
/// Emission is deterministic: with zero jitter the result depends only on the
/// scene, and with jitter each ray draws from its own generator seeded by
/// `settings.seed` and the ray's global index.
pub fn emit_rays(scene: &Scene) -> Vec<Ray> {
    let mut rays = Vec::with_capacity(scene.total_rays() as usize);
    for source in &scene.sources {
        let first_index = rays.len() as u64;
        rays.extend(emit_source(source, &scene.settings, first_index));
    }
    rays
}

/// Generate the rays of a single source.
///
/// `first_index` is the global index of the source's first ray, used to seed
/// per-ray jitter.
pub fn emit_source(source: &Source, settings: &Settings, first_index: u64) -> Vec<Ray> {
    let n = source.ray_count();
    match source {
        Source::Point {
            position, power, ..
        } => (0..n)
            .map(|i| {
                let angle = TAU * (f64::from(i) / f64::from(n));
                let angle = angle + jitter(settings, first_index + u64::from(i));
                Ray::new(*position, dir_from_angle(angle).into_inner(), power / f64::from(n))
            })
            .collect(),
        Source::Collimated {
            position,
            theta,
            width,
            power,
            ..
        } => {
            let across = perp(&dir_from_angle(*theta));
            let denom = f64::from(n.max(2) - 1);
            (0..n)
                .map(|i| {
                    let offset = if n == 1 {
                        0.0
                    } else {
                        -0.5 * width + width * (f64::from(i) / denom)
                    };
                    let origin: Point2 = position + across * offset;
                    let angle = theta + jitter(settings, first_index + u64::from(i));
                    Ray::new(origin, dir_from_angle(angle).into_inner(), power / f64::from(n))
                })
                .collect()
        }
    }
}

fn jitter(settings: &Settings, ray_index: u64) -> f64 {
    let half_width = settings.angular_jitter;
    if half_width <= 0.0 {
        return 0.0;
    }
    let seed = settings.seed.unwrap_or(0) ^ ray_index.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut rng = StdRng::seed_from_u64(seed);
    rng.gen_range(-half_width..=half_width)
}
