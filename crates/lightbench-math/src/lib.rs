#![warn(missing_docs)]

//! Math types for the lightbench 2D optics engine.
//!
//! Thin wrappers around nalgebra providing the planar types used by the
//! tracer: points, vectors, unit directions, rigid 2D poses, and the
//! tolerance constants shared by the intersection and analysis code.

use nalgebra::{Rotation2, Unit, Vector2};

/// A point in the scene plane (meters).
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in the scene plane.
pub type Vec2 = Vector2<f64>;

/// A unit (normalized) direction vector in the scene plane.
pub type Dir2 = Unit<Vector2<f64>>;

/// Unit direction for an angle measured counter-clockwise from +x.
pub fn dir_from_angle(theta: f64) -> Dir2 {
    let (s, c) = theta.sin_cos();
    Dir2::new_unchecked(Vec2::new(c, s))
}

/// Rotate `v` counter-clockwise by `theta` radians.
pub fn rotate(v: &Vec2, theta: f64) -> Vec2 {
    Rotation2::new(theta) * v
}

/// Counter-clockwise perpendicular of `v`.
#[inline]
pub fn perp(v: &Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Mirror `d` about the line with unit normal `n`: `d - 2 (d·n) n`.
#[inline]
pub fn reflect(d: &Vec2, n: &Vec2) -> Vec2 {
    d - n * (2.0 * d.dot(n))
}

/// A rigid 2D placement: rotation by `theta` followed by translation to
/// `position`.
///
/// Every lens, mirror and sensor carries one. Element geometry is written in
/// the local frame (optical axis along local +x, aperture along local y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2 {
    /// Origin of the local frame in world coordinates.
    pub position: Point2,
    /// Rotation of the local frame in radians.
    pub theta: f64,
    rotation: Rotation2<f64>,
}

impl Pose2 {
    /// Create a pose from a world position and rotation angle.
    pub fn new(position: Point2, theta: f64) -> Self {
        Self {
            position,
            theta,
            rotation: Rotation2::new(theta),
        }
    }

    /// Identity pose (local frame equals world frame).
    pub fn identity() -> Self {
        Self::new(Point2::origin(), 0.0)
    }

    /// Map a world point into the local frame.
    pub fn world_to_local(&self, p: &Point2) -> Point2 {
        Point2::from(self.rotation.inverse() * (p - self.position))
    }

    /// Map a local point into the world frame.
    pub fn local_to_world(&self, p: &Point2) -> Point2 {
        self.position + self.rotation * p.coords
    }

    /// Rotate a world direction into the local frame (no translation).
    pub fn dir_world_to_local(&self, d: &Vec2) -> Vec2 {
        self.rotation.inverse() * d
    }

    /// Rotate a local direction into the world frame (no translation).
    pub fn dir_local_to_world(&self, d: &Vec2) -> Vec2 {
        self.rotation * d
    }
}

impl Default for Pose2 {
    fn default() -> Self {
        Self::identity()
    }
}

/// Tolerance constants for the tracer and the analysis code.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Minimum ray parameter for a valid hit (meters). Rejects the surface a
    /// ray was just emitted from.
    pub surface: f64,
    /// Two hits closer than this along the ray are treated as tied.
    pub tie: f64,
    /// Denominators below this are treated as zero (parallel rays,
    /// degenerate quadratics).
    pub parallel: f64,
    /// Determinants below this make a least-squares system singular.
    pub singular: f64,
}

impl Tolerance {
    /// Default tolerances.
    pub const DEFAULT: Self = Self {
        surface: 1e-9,
        tie: 1e-12,
        parallel: 1e-12,
        singular: 1e-12,
    };

    /// Check if a denominator is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.parallel
    }

    /// Check if a ray parameter lies far enough ahead to count as a hit.
    pub fn is_ahead(&self, t: f64) -> bool {
        t > self.surface
    }

    /// Check whether `candidate` beats `best`, keeping `best` on a tie.
    pub fn closer(&self, candidate: f64, best: f64) -> bool {
        candidate < best - self.tie
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
