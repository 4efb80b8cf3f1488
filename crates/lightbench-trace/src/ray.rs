//! Runtime ray state.

use lightbench_math::{Dir2, Point2, Vec2};

/// Why a ray stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalReason {
    /// `bounce_count` reached `max_bounces`.
    MaxBounces,
    /// The path-length budget ran out (before or at the next surface).
    MaxDistance,
    /// Nothing blocking lies ahead of the ray.
    NoIntersection,
}

/// A ray being traced.
///
/// `origin` is the start of the current segment: the emission point at first,
/// then the most recent surface hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    /// Start of the current segment.
    pub origin: Point2,
    /// Unit propagation direction.
    pub direction: Dir2,
    /// Share of the source power carried by this ray.
    pub power: f64,
    /// Number of surface interactions so far.
    pub bounce_count: u32,
    /// Path length accumulated so far.
    pub traveled_distance: f64,
    /// Emission point, every hit point, then the terminal point.
    pub polyline: Vec<Point2>,
    /// Set once the ray terminates.
    pub terminal_reason: Option<TerminalReason>,
}

impl Ray {
    /// Create a fresh ray. The direction is normalized.
    pub fn new(origin: Point2, direction: Vec2, power: f64) -> Self {
        Self {
            origin,
            direction: Dir2::new_normalize(direction),
            power,
            bounce_count: 0,
            traveled_distance: 0.0,
            polyline: vec![origin],
            terminal_reason: None,
        }
    }

    /// Evaluate the current segment at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point2 {
        self.origin + self.direction.as_ref() * t
    }

    /// Path length left before `max_distance` is reached.
    #[inline]
    pub fn remaining(&self, max_distance: f64) -> f64 {
        max_distance - self.traveled_distance
    }

    /// Whether the ray has terminated.
    pub fn is_terminated(&self) -> bool {
        self.terminal_reason.is_some()
    }

    /// Move the segment start to `point` at parameter `t` and set a new
    /// direction. Records the point in the polyline.
    pub(crate) fn advance_to(&mut self, t: f64, point: Point2, direction: Vec2) {
        self.polyline.push(point);
        self.traveled_distance += t;
        self.origin = point;
        self.direction = Dir2::new_normalize(direction);
    }

    /// Extend the current segment by `length` and stop.
    pub(crate) fn terminate_after(&mut self, length: f64, reason: TerminalReason) {
        if length > 0.0 {
            let end = self.at(length);
            self.polyline.push(end);
            self.traveled_distance += length;
        }
        self.terminal_reason = Some(reason);
    }

    /// The final segment as a line (start point and unit direction), if the
    /// polyline has a non-degenerate last segment.
    pub fn terminal_segment(&self) -> Option<(Point2, Dir2)> {
        let n = self.polyline.len();
        if n < 2 {
            return None;
        }
        let start = self.polyline[n - 2];
        let delta = self.polyline[n - 1] - start;
        Dir2::try_new(delta, 1e-15).map(|dir| (start, dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Point2::new(1.0, 1.0), Vec2::new(2.0, 0.0), 1.0);
        let p = ray.at(5.0);
        assert!((p.x - 6.0).abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
        assert!((ray.direction.norm() - 1.0).abs() < 1e-12);
        assert_eq!(ray.polyline, vec![Point2::new(1.0, 1.0)]);
    }

    #[test]
    fn test_terminate_extends_polyline() {
        let mut ray = Ray::new(Point2::origin(), Vec2::new(0.0, 1.0), 1.0);
        ray.terminate_after(2.5, TerminalReason::NoIntersection);
        assert_eq!(ray.polyline.len(), 2);
        assert!((ray.polyline[1].y - 2.5).abs() < 1e-12);
        assert!((ray.traveled_distance - 2.5).abs() < 1e-12);
        assert_eq!(ray.terminal_reason, Some(TerminalReason::NoIntersection));
    }

    #[test]
    fn test_terminal_segment() {
        let mut ray = Ray::new(Point2::origin(), Vec2::new(1.0, 0.0), 1.0);
        assert!(ray.terminal_segment().is_none());
        ray.advance_to(1.0, Point2::new(1.0, 0.0), Vec2::new(0.0, 1.0));
        ray.terminate_after(2.0, TerminalReason::MaxDistance);
        let (start, dir) = ray.terminal_segment().unwrap();
        assert!((start.x - 1.0).abs() < 1e-12);
        assert!((dir.y - 1.0).abs() < 1e-12);
    }
}
