//! Least-squares focus and spot size.

use lightbench_math::{Point2, Vec2};
use nalgebra::Matrix2;

use crate::line::RayLine;

/// A focus point with the RMS spot size of the bundle around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusEstimate {
    /// Focus point.
    pub point: Point2,
    /// Spot size at `point` (meters).
    pub rms: f64,
}

/// Projector onto the normal of a unit direction: `I - d dᵀ`.
#[inline]
fn normal_projector(line: &RayLine) -> Matrix2<f64> {
    let d = line.dir.as_ref();
    Matrix2::identity() - d * d.transpose()
}

/// Point minimizing the summed squared perpendicular distance to `lines`.
///
/// Solves `M x = b` with `M = Σ(I - d dᵀ)` and `b = Σ(I - d dᵀ) p`. Returns
/// `None` with fewer than two lines or when `|det M| < singular_tolerance`
/// (all lines parallel).
pub fn least_squares_point(lines: &[RayLine], singular_tolerance: f64) -> Option<Point2> {
    if lines.len() < 2 {
        return None;
    }

    let (m, b) = lines.iter().fold(
        (Matrix2::<f64>::zeros(), Vec2::zeros()),
        |(m, b), line| {
            let p = normal_projector(line);
            (m + p, b + p * line.point.coords)
        },
    );

    let det = m.determinant();
    if det.abs() < singular_tolerance {
        return None;
    }

    // Cramer's rule for the 2x2 system.
    let x = (b.x * m[(1, 1)] - m[(0, 1)] * b.y) / det;
    let y = (m[(0, 0)] * b.y - b.x * m[(1, 0)]) / det;
    Some(Point2::new(x, y))
}

/// RMS perpendicular distance from `point` to each line.
///
/// Returns 0 for an empty bundle.
pub fn spot_rms(lines: &[RayLine], point: &Point2) -> f64 {
    if lines.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = lines
        .iter()
        .map(|line| {
            let v = point - line.point;
            let along = v.dot(line.dir.as_ref());
            (v - line.dir.as_ref() * along).norm_squared()
        })
        .sum();
    (sum_sq / lines.len() as f64).sqrt()
}

/// Least-squares focus together with its spot size.
pub fn estimate_focus(lines: &[RayLine], singular_tolerance: f64) -> Option<FocusEstimate> {
    least_squares_point(lines, singular_tolerance).map(|point| FocusEstimate {
        point,
        rms: spot_rms(lines, &point),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SINGULAR: f64 = 1e-12;

    fn aimed_at(target: Point2, from: &[Point2]) -> Vec<RayLine> {
        from.iter()
            .map(|p| RayLine::new(*p, target - p))
            .collect()
    }

    #[test]
    fn test_exact_crossing() {
        let target = Point2::new(0.85, 0.0);
        let lines = aimed_at(
            target,
            &[
                Point2::new(1.2, 0.2),
                Point2::new(1.2, -0.2),
                Point2::new(1.1, 0.05),
            ],
        );
        let focus = estimate_focus(&lines, SINGULAR).unwrap();
        assert_relative_eq!(focus.point.x, 0.85, epsilon = 1e-12);
        assert_relative_eq!(focus.point.y, 0.0, epsilon = 1e-12);
        assert!(focus.rms < 1e-12);
    }

    #[test]
    fn test_two_perpendicular_lines() {
        let lines = vec![
            RayLine::new(Point2::new(0.0, 1.0), Vec2::new(1.0, 0.0)),
            RayLine::new(Point2::new(3.0, 0.0), Vec2::new(0.0, 1.0)),
        ];
        let p = least_squares_point(&lines, SINGULAR).unwrap();
        assert_relative_eq!(p.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_lines_singular() {
        let lines = vec![
            RayLine::new(Point2::new(0.0, 0.0), Vec2::new(1.0, 0.0)),
            RayLine::new(Point2::new(0.0, 1.0), Vec2::new(1.0, 0.0)),
            RayLine::new(Point2::new(0.0, 2.0), Vec2::new(-1.0, 0.0)),
        ];
        assert!(estimate_focus(&lines, SINGULAR).is_none());
    }

    #[test]
    fn test_single_line_has_no_focus() {
        let lines = vec![RayLine::new(Point2::origin(), Vec2::new(1.0, 1.0))];
        assert!(estimate_focus(&lines, SINGULAR).is_none());
    }

    #[test]
    fn test_spot_rms_perpendicular_distance() {
        // Horizontal lines at y = ±1: distance 1 from the origin each.
        let lines = vec![
            RayLine::new(Point2::new(-5.0, 1.0), Vec2::new(1.0, 0.0)),
            RayLine::new(Point2::new(2.0, -1.0), Vec2::new(-1.0, 0.0)),
        ];
        assert_relative_eq!(spot_rms(&lines, &Point2::origin()), 1.0, epsilon = 1e-12);
        assert_eq!(spot_rms(&[], &Point2::origin()), 0.0);
    }
}
