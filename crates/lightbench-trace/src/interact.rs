//! Surface physics: what happens to a ray at a hit.
//!
//! All element rules work in the element's local frame (optical axis along
//! local x). [`resolve`] maps the incoming world direction in, applies the
//! rule, and maps the outgoing direction back.

use lightbench_math::{reflect, Point2, Tolerance, Vec2};

use crate::intersect::{conic_gradient, ElementRef, Intersection};
use crate::scene::{ConicMirror, Lens, LensModel, Scene};

/// Directions shorter than this cannot be normalized.
const DEGENERATE_NORM: f64 = 1e-15;

/// Outcome of refraction at a single interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Refraction {
    /// Ray crossed the interface.
    Transmitted(Vec2),
    /// Ray was reflected back because `cos²θ₂ < 0`.
    TotalInternalReflection(Vec2),
}

impl Refraction {
    /// Outgoing direction regardless of outcome.
    pub fn direction(&self) -> Vec2 {
        match *self {
            Refraction::Transmitted(d) | Refraction::TotalInternalReflection(d) => d,
        }
    }

    /// Whether the ray was reflected.
    pub fn is_reflection(&self) -> bool {
        matches!(self, Refraction::TotalInternalReflection(_))
    }
}

/// Flip `n` so it faces against `d`.
#[inline]
fn against(n: Vec2, d: &Vec2) -> Vec2 {
    if d.dot(&n) > 0.0 {
        -n
    } else {
        n
    }
}

#[inline]
fn travel_sign(d: &Vec2) -> f64 {
    if d.x >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Vector form of Snell's law.
///
/// `incident` and `normal` must be unit length; `normal` may face either way.
/// `eta` is the index ratio `n_incident / n_transmitted`.
pub fn snell(incident: &Vec2, normal: &Vec2, eta: f64) -> Refraction {
    let n = against(*normal, incident);
    let cos1 = -n.dot(incident);
    let cos2_sq = 1.0 - eta * eta * (1.0 - cos1 * cos1);
    if cos2_sq < 0.0 {
        return Refraction::TotalInternalReflection(reflect(incident, &n).normalize());
    }
    let v = incident * eta + n * (eta * cos1 - cos2_sq.sqrt());
    Refraction::Transmitted(v.normalize())
}

/// Reflect a local direction off the conic at a local hit point.
pub fn reflect_conic(mirror: &ConicMirror, local_point: &Point2, local_dir: &Vec2) -> Vec2 {
    let gradient = conic_gradient(mirror.r, mirror.kappa, local_point);
    if gradient.norm() < DEGENERATE_NORM {
        return -local_dir;
    }
    let n = against(gradient.normalize(), local_dir);
    reflect(local_dir, &n).normalize()
}

/// Paraxial slope kick for a thin lens.
///
/// For a ray travelling along +x with slope `m = dy/dx` at height `y`, the
/// outgoing slope is `m - y/f`. Rays travelling along -x see the mirrored
/// lens, so the same focal length converges them as well. The sign of travel
/// along x is preserved.
pub fn refract_thin(f: f64, local_point: &Point2, local_dir: &Vec2) -> Vec2 {
    let sign = travel_sign(local_dir);
    let tol = Tolerance::DEFAULT;
    let dx = if tol.is_zero(local_dir.x) {
        tol.parallel * sign
    } else {
        local_dir.x
    };
    let m = local_dir.y / dx;
    let m2 = m - sign * local_point.y / f;
    Vec2::new(sign, sign * m2).normalize()
}

/// Normal of the focusing facet at height `y`.
///
/// A ray parallel to the axis enters the flat face undeviated; the facet is
/// tilted so that this ray leaves aimed at the focal point `(±f, 0)`. With
/// the inside direction `I`, the target `T` and indices `n2` (glass) and `n1`
/// (outside), Snell's law requires the normal to be parallel to
/// `n2·I - n1·T`.
pub fn facet_normal(f: f64, n1: f64, n2: f64, y: f64, sign: f64) -> Vec2 {
    let axis = Vec2::new(sign, 0.0);
    let target = Vec2::new(sign * f.abs(), -y * f.signum()).normalize();
    let n = axis * n2 - target * n1;
    if n.norm() < DEGENERATE_NORM {
        axis
    } else {
        n.normalize()
    }
}

/// Facet lens: Snell refraction at the flat entry face (normal along the
/// axis, ratio `n1/n2`), then at the focusing facet (ratio `n2/n1`).
///
/// Total internal reflection at either interface reflects the ray about that
/// interface's normal and ends the refraction there.
pub fn refract_facet(f: f64, n1: f64, n2: f64, local_point: &Point2, local_dir: &Vec2) -> Refraction {
    let sign = travel_sign(local_dir);
    let entry = snell(local_dir, &Vec2::new(1.0, 0.0), n1 / n2);
    let inside = match entry {
        Refraction::Transmitted(d) => d,
        tir => return tir,
    };
    let facet = facet_normal(f, n1, n2, local_point.y, sign);
    snell(&inside, &facet, n2 / n1)
}

fn resolve_lens(lens: &Lens, local_point: &Point2, local_dir: &Vec2) -> Vec2 {
    match lens.model {
        LensModel::FresnelThin => refract_thin(lens.f, local_point, local_dir),
        LensModel::FresnelFacet { n1, n2 } => {
            refract_facet(lens.f, n1, n2, local_point, local_dir).direction()
        }
    }
}

/// Outgoing world direction for a ray arriving with `direction` at `hit`.
///
/// Sensors leave the direction unchanged.
pub fn resolve(scene: &Scene, hit: &Intersection, direction: &Vec2) -> Vec2 {
    match hit.element {
        ElementRef::Lens(i) => {
            let lens = &scene.lenses[i];
            let local_dir = lens.pose.dir_world_to_local(direction);
            let out = resolve_lens(lens, &hit.local_point, &local_dir);
            lens.pose.dir_local_to_world(&out).normalize()
        }
        ElementRef::Mirror(i) => {
            let mirror = &scene.mirrors[i];
            let local_dir = mirror.pose.dir_world_to_local(direction);
            let out = reflect_conic(mirror, &hit.local_point, &local_dir);
            mirror.pose.dir_local_to_world(&out).normalize()
        }
        ElementRef::Sensor(_) => *direction,
    }
}
