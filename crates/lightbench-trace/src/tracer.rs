//! The bounce loop, modeled as an explicit state machine.
//!
//! A ray is `Traveling` until one transition decides it is `Terminated`.
//! [`step`] performs exactly one transition; [`trace_ray`] runs it to
//! completion. Termination checks run in a fixed order on every step:
//!
//! 1. `MaxBounces`: the bounce count reached the limit.
//! 2. `MaxDistance`: no budget left, or the next surface lies past it.
//! 3. `NoIntersection`: nothing blocking ahead.
//!
//! A ray outside every element's aperture simply finds no hit and ends as
//! `NoIntersection`. Terminal rays are extended to the budget boundary so the
//! final segment carries the outgoing direction. A ray out of bounces stops
//! short at the next lens or mirror instead.

use lightbench_math::Tolerance;
use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::emit::emit_rays;
use crate::interact::resolve;
use crate::intersect::{cast, ElementRef, Intersection, Lookahead};
use crate::ray::{Ray, TerminalReason};
use crate::scene::Scene;

/// State of the bounce loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceState {
    /// The ray interacted with a surface and keeps going.
    Traveling,
    /// The ray stopped.
    Terminated(TerminalReason),
}

/// Per-ray sensor crossing record (sensor indices, in crossing order).
pub type SensorHits = Vec<usize>;

/// A ray after termination together with the sensors it crossed.
#[derive(Debug, Clone, PartialEq)]
pub struct TracedRay {
    /// The terminated ray, including its polyline.
    pub ray: Ray,
    /// Sensor indices crossed, one entry per crossing event.
    pub sensor_hits: SensorHits,
}

/// Everything the tracer produced for a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceOutput {
    /// Traced rays in emission order.
    pub rays: Vec<TracedRay>,
    /// Total crossings per sensor, indexed like [`Scene::sensors`].
    pub sensor_counts: Vec<u64>,
    /// Number of rays emitted.
    pub emitted: u64,
}

/// Record the sensors crossed by the current segment.
fn record_sensors(hits: &mut SensorHits, crossings: &[Intersection]) {
    hits.extend(crossings.iter().filter_map(|c| match c.element {
        ElementRef::Sensor(i) => Some(i),
        _ => None,
    }));
}

/// Perform one transition of the bounce loop.
///
/// A ray that is already terminated is left untouched.
pub fn step(ray: &mut Ray, scene: &Scene, hits: &mut SensorHits, tol: &Tolerance) -> TraceState {
    if let Some(reason) = ray.terminal_reason {
        return TraceState::Terminated(reason);
    }

    let settings = &scene.settings;
    let remaining = ray.remaining(settings.max_distance);

    if ray.bounce_count >= settings.max_bounces {
        // The final segment still stops at the next blocking surface.
        let length = if remaining > 0.0 {
            let probe = cast(ray, scene, remaining, tol);
            record_sensors(hits, &probe.sensor_crossings);
            probe.segment_length(remaining)
        } else {
            remaining
        };
        ray.terminate_after(length, TerminalReason::MaxBounces);
        return TraceState::Terminated(TerminalReason::MaxBounces);
    }

    if remaining <= 0.0 {
        ray.terminate_after(0.0, TerminalReason::MaxDistance);
        return TraceState::Terminated(TerminalReason::MaxDistance);
    }

    let probe = cast(ray, scene, remaining, tol);
    record_sensors(hits, &probe.sensor_crossings);

    match probe.lookahead {
        Lookahead::Hit(hit) => {
            let outgoing = resolve(scene, &hit, ray.direction.as_ref());
            ray.advance_to(hit.t, hit.global_point, outgoing);
            ray.bounce_count += 1;
            TraceState::Traveling
        }
        Lookahead::BeyondBudget(_) => {
            ray.terminate_after(remaining, TerminalReason::MaxDistance);
            TraceState::Terminated(TerminalReason::MaxDistance)
        }
        Lookahead::Miss => {
            ray.terminate_after(remaining, TerminalReason::NoIntersection);
            TraceState::Terminated(TerminalReason::NoIntersection)
        }
    }
}

/// Trace a single ray to termination.
pub fn trace_ray(mut ray: Ray, scene: &Scene) -> TracedRay {
    let tol = Tolerance::DEFAULT;
    let mut sensor_hits = SensorHits::new();
    loop {
        match step(&mut ray, scene, &mut sensor_hits, &tol) {
            TraceState::Traveling => continue,
            TraceState::Terminated(reason) => {
                trace!(
                    ?reason,
                    bounces = ray.bounce_count,
                    distance = ray.traveled_distance,
                    "ray terminated"
                );
                break;
            }
        }
    }
    TracedRay { ray, sensor_hits }
}

/// Emit and trace every ray in the scene.
///
/// Rays are traced in parallel; each owns its state, and per-sensor totals
/// are summed after collection, so the output does not depend on scheduling.
pub fn trace_scene(scene: &Scene) -> TraceOutput {
    let initial = emit_rays(scene);
    let emitted = initial.len() as u64;

    info!(
        rays = emitted,
        lenses = scene.lenses.len(),
        mirrors = scene.mirrors.len(),
        sensors = scene.sensors.len(),
        "Tracing scene"
    );

    let rays: Vec<TracedRay> = initial
        .into_par_iter()
        .map(|ray| trace_ray(ray, scene))
        .collect();

    let mut sensor_counts = vec![0u64; scene.sensors.len()];
    for traced in &rays {
        for &i in &traced.sensor_hits {
            sensor_counts[i] += 1;
        }
    }

    debug!(
        max_bounces = rays.iter().map(|r| r.ray.bounce_count).max().unwrap_or(0),
        sensor_crossings = sensor_counts.iter().sum::<u64>(),
        "Tracing complete"
    );

    TraceOutput {
        rays,
        sensor_counts,
        emitted,
    }
}
