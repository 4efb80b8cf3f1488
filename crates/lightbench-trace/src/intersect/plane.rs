//! Ray intersection with a bounded segment on local `x = 0`.
//!
//! Shared by lenses (blocking) and line sensors (passive).

use lightbench_math::{Point2, Tolerance, Vec2};

/// Intersect a local-frame ray with the segment `x = 0, |y| <= half_height`.
///
/// Returns the ray parameter and local hit point, or `None` if the ray is
/// parallel to the segment, the crossing lies at or behind
/// `tol.surface`, or it falls outside the segment. The segment ends are
/// inclusive.
pub fn intersect_segment(
    origin: &Point2,
    dir: &Vec2,
    half_height: f64,
    tol: &Tolerance,
) -> Option<(f64, Point2)> {
    if tol.is_zero(dir.x) {
        return None;
    }

    let t = -origin.x / dir.x;
    if !tol.is_ahead(t) {
        return None;
    }

    let y = origin.y + t * dir.y;
    if y.abs() > half_height {
        return None;
    }

    Some((t, Point2::new(0.0, y)))
}
