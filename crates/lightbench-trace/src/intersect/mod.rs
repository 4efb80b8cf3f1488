//! Ray-element intersection.
//!
//! Each element is solved in its own local frame: the ray is rotated by
//! `-theta` and translated by `-pos`, intersected with the canonical geometry,
//! and the hit mapped back. Poses are rigid, so `t` is the same in both frames.
//!
//! Lenses and mirrors block; sensors only record crossings. Among blocking
//! candidates the smallest `t` wins. Candidates within [`Tolerance::tie`] of
//! the current best keep the earlier one, and lenses are visited before
//! mirrors, so ties resolve by declaration order.

mod conic;
mod plane;

pub use conic::{conic_gradient, conic_value, intersect_conic};
pub use plane::intersect_segment;

use lightbench_math::{Point2, Pose2, Tolerance, Vec2};

use crate::ray::Ray;
use crate::scene::Scene;

/// Reference to a scene element by section and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRef {
    /// Index into [`Scene::lenses`].
    Lens(usize),
    /// Index into [`Scene::mirrors`].
    Mirror(usize),
    /// Index into [`Scene::sensors`].
    Sensor(usize),
}

/// A valid ray-element hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Ray parameter (distance along the ray), always positive.
    pub t: f64,
    /// Element that was hit.
    pub element: ElementRef,
    /// Hit point in the element's local frame.
    pub local_point: Point2,
    /// Hit point in world coordinates.
    pub global_point: Point2,
}

/// What lies ahead of a ray along its current segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookahead {
    /// Nearest blocking hit, within the budget.
    Hit(Intersection),
    /// Nearest blocking hit exists but lies past the budget.
    BeyondBudget(Intersection),
    /// Nothing blocking anywhere ahead.
    Miss,
}

/// Result of probing one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Cast {
    /// Blocking outcome.
    pub lookahead: Lookahead,
    /// Sensor crossings before the blocking hit (or within the budget when
    /// the segment is not blocked), sorted by `t`.
    pub sensor_crossings: Vec<Intersection>,
}

impl Cast {
    /// Length of the segment actually travelled: up to the hit, or the full
    /// budget otherwise.
    pub fn segment_length(&self, budget: f64) -> f64 {
        match self.lookahead {
            Lookahead::Hit(hit) => hit.t,
            Lookahead::BeyondBudget(_) | Lookahead::Miss => budget.max(0.0),
        }
    }
}

/// Ray expressed in an element's local frame.
struct LocalRay {
    origin: Point2,
    dir: Vec2,
}

impl LocalRay {
    fn new(ray: &Ray, pose: &Pose2) -> Self {
        Self {
            origin: pose.world_to_local(&ray.origin),
            dir: pose.dir_world_to_local(ray.direction.as_ref()),
        }
    }
}

fn hit(
    element: ElementRef,
    pose: &Pose2,
    found: Option<(f64, Point2)>,
) -> Option<Intersection> {
    found.map(|(t, local_point)| Intersection {
        t,
        element,
        local_point,
        global_point: pose.local_to_world(&local_point),
    })
}

/// Nearest blocking hit along the ray, ignoring any budget.
pub fn nearest_blocking(ray: &Ray, scene: &Scene, tol: &Tolerance) -> Option<Intersection> {
    let lenses = scene.lenses.iter().enumerate().filter_map(|(i, lens)| {
        let local = LocalRay::new(ray, &lens.pose);
        let found = intersect_segment(&local.origin, &local.dir, lens.aperture / 2.0, tol);
        hit(ElementRef::Lens(i), &lens.pose, found)
    });
    let mirrors = scene.mirrors.iter().enumerate().filter_map(|(i, mirror)| {
        let local = LocalRay::new(ray, &mirror.pose);
        let found = intersect_conic(
            &local.origin,
            &local.dir,
            mirror.r,
            mirror.kappa,
            mirror.aperture / 2.0,
            tol,
        );
        hit(ElementRef::Mirror(i), &mirror.pose, found)
    });

    let mut best: Option<Intersection> = None;
    for candidate in lenses.chain(mirrors) {
        match best {
            Some(b) if !tol.closer(candidate.t, b.t) => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// All sensor crossings along the ray with `t <= limit`, sorted by `t` then
/// declaration order.
pub fn sensor_crossings(ray: &Ray, scene: &Scene, limit: f64, tol: &Tolerance) -> Vec<Intersection> {
    let mut crossings: Vec<Intersection> = scene
        .sensors
        .iter()
        .enumerate()
        .filter_map(|(i, sensor)| {
            let local = LocalRay::new(ray, &sensor.pose);
            let found = intersect_segment(&local.origin, &local.dir, sensor.length / 2.0, tol);
            hit(ElementRef::Sensor(i), &sensor.pose, found)
        })
        .filter(|c| c.t <= limit)
        .collect();
    // Stable sort keeps declaration order among equal t.
    crossings.sort_by(|a, b| a.t.total_cmp(&b.t));
    crossings
}

/// Probe the ray's current segment against the scene.
///
/// Sensor crossings strictly before a blocking hit are reported; when the
/// segment is unblocked within `budget`, crossings up to and including the
/// budget boundary are reported.
pub fn cast(ray: &Ray, scene: &Scene, budget: f64, tol: &Tolerance) -> Cast {
    let lookahead = match nearest_blocking(ray, scene, tol) {
        Some(hit) if hit.t <= budget => Lookahead::Hit(hit),
        Some(hit) => Lookahead::BeyondBudget(hit),
        None => Lookahead::Miss,
    };

    let mut sensor_crossings = sensor_crossings(ray, scene, budget, tol);
    if let Lookahead::Hit(hit) = lookahead {
        sensor_crossings.retain(|c| c.t < hit.t);
    }

    Cast {
        lookahead,
        sensor_crossings,
    }
}

/// Nearest blocking intersection within `budget`, or `None`.
pub fn nearest_intersection(ray: &Ray, scene: &Scene, budget: f64) -> Option<Intersection> {
    match nearest_blocking(ray, scene, &Tolerance::DEFAULT) {
        Some(hit) if hit.t <= budget => Some(hit),
        _ => None,
    }
}
