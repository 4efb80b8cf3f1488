//! Ray-conic intersection (quadratic equation).

use lightbench_math::{Point2, Tolerance, Vec2};

/// Implicit conic `F(x, y) = y² - 2Rx + (1+κ)x²`.
#[inline]
pub fn conic_value(r: f64, kappa: f64, p: &Point2) -> f64 {
    p.y * p.y - 2.0 * r * p.x + (1.0 + kappa) * p.x * p.x
}

/// Gradient of [`conic_value`]: `(-2R + 2(1+κ)x, 2y)`.
#[inline]
pub fn conic_gradient(r: f64, kappa: f64, p: &Point2) -> Vec2 {
    Vec2::new(-2.0 * r + 2.0 * (1.0 + kappa) * p.x, 2.0 * p.y)
}

/// Whether a point on the conic lies on the branch through the vertex.
///
/// Ellipses close on themselves and hyperbolas have a second branch; only
/// the vertex branch is mirrored. The test is `R(1+κ)x <= R²`, which holds
/// for every point of a parabola.
#[inline]
fn on_vertex_branch(r: f64, kappa: f64, p: &Point2, tol: &Tolerance) -> bool {
    r * (1.0 + kappa) * p.x <= r * r + tol.surface
}

/// Intersect a local-frame ray with the conic mirror profile.
///
/// Substituting `x = x0 + t dx`, `y = y0 + t dy` into `F = 0` gives
/// `A t² + B t + C = 0`, which falls back to the linear case when `A` is
/// numerically zero (a parabola hit parallel to its axis). Roots must satisfy
/// `t > tol.surface`, `|y| <= half_aperture`, and lie on the vertex branch;
/// the smallest such root is returned with its local point.
pub fn intersect_conic(
    origin: &Point2,
    dir: &Vec2,
    r: f64,
    kappa: f64,
    half_aperture: f64,
    tol: &Tolerance,
) -> Option<(f64, Point2)> {
    let (x0, y0) = (origin.x, origin.y);
    let (dx, dy) = (dir.x, dir.y);
    let e = 1.0 + kappa;

    let a = dy * dy + e * dx * dx;
    let b = 2.0 * y0 * dy - 2.0 * r * dx + 2.0 * e * x0 * dx;
    let c = conic_value(r, kappa, origin);

    let roots: [Option<f64>; 2] = if tol.is_zero(a) {
        if tol.is_zero(b) {
            return None;
        }
        [Some(-c / b), None]
    } else {
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_disc = discriminant.sqrt();
        [
            Some((-b - sqrt_disc) / (2.0 * a)),
            Some((-b + sqrt_disc) / (2.0 * a)),
        ]
    };

    roots
        .into_iter()
        .flatten()
        .filter(|&t| tol.is_ahead(t))
        .map(|t| (t, Point2::new(x0 + t * dx, y0 + t * dy)))
        .filter(|(_, p)| p.y.abs() <= half_aperture && on_vertex_branch(r, kappa, p, tol))
        .min_by(|a, b| a.0.total_cmp(&b.0))
}
