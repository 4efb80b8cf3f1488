//! Terminal ray lines.

use lightbench_math::{Dir2, Point2, Vec2};

/// Rays with `|dx|` below this never cross a detector plane.
const PARALLEL_DX: f64 = 1e-12;

/// The last segment of a traced ray, extended to an infinite line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayLine {
    /// Start of the final segment.
    pub point: Point2,
    /// Unit direction of the final segment.
    pub dir: Dir2,
}

impl RayLine {
    /// Create a line from a point and direction (normalized here).
    pub fn new(point: Point2, dir: Vec2) -> Self {
        Self {
            point,
            dir: Dir2::new_normalize(dir),
        }
    }

    /// Build the line through the last two polyline points.
    ///
    /// Returns `None` for polylines shorter than two points or a zero-length
    /// final segment.
    pub fn from_polyline(points: &[Point2]) -> Option<Self> {
        let [.., start, end] = points else {
            return None;
        };
        Dir2::try_new(end - start, 1e-15).map(|dir| Self { point: *start, dir })
    }

    /// Height at which the line crosses the plane `x = x`, looking forward
    /// along the direction only.
    pub fn y_at_x(&self, x: f64) -> Option<f64> {
        let dx = self.dir.x;
        if dx.abs() < PARALLEL_DX {
            return None;
        }
        let t = (x - self.point.x) / dx;
        if t <= 0.0 {
            return None;
        }
        Some(self.point.y + t * self.dir.y)
    }
}

/// Heights of the forward crossings of `lines` with the plane `x = x`.
pub fn ys_at_x(lines: &[RayLine], x: f64) -> Vec<f64> {
    lines.iter().filter_map(|line| line.y_at_x(x)).collect()
}
