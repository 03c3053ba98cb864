// ─────────────────────────────────────────────────────────────────────
// PRad Trace — 3D Vector Algebra
// Charged-particle tracing for synthetic proton radiography.
// License: MIT
// ─────────────────────────────────────────────────────────────────────
//! Minimal Cartesian 3-vector used throughout the tracer.
//!
//! Positions carry length units, velocities length/time; the type itself
//! is unit-agnostic and expects one consistent convention.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3(pub [f64; 3]);

impl Vec3 {
    pub const ZERO: Vec3 = Vec3([0.0, 0.0, 0.0]);

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3([x, y, z])
    }

    pub fn x(&self) -> f64 {
        self.0[0]
    }

    pub fn y(&self) -> f64 {
        self.0[1]
    }

    pub fn z(&self) -> f64 {
        self.0[2]
    }

    pub fn dot(&self, other: Vec3) -> f64 {
        self.0[0] * other.0[0] + self.0[1] * other.0[1] + self.0[2] * other.0[2]
    }

    pub fn cross(&self, other: Vec3) -> Vec3 {
        Vec3([
            self.0[1] * other.0[2] - self.0[2] * other.0[1],
            self.0[2] * other.0[0] - self.0[0] * other.0[2],
            self.0[0] * other.0[1] - self.0[1] * other.0[0],
        ])
    }

    pub fn norm_sq(&self) -> f64 {
        self.dot(*self)
    }

    pub fn norm(&self) -> f64 {
        self.norm_sq().sqrt()
    }

    /// Unit vector in the same direction, or `None` for a (near-)zero vector.
    pub fn normalized(&self) -> Option<Vec3> {
        let n = self.norm();
        if n > 0.0 && n.is_finite() {
            Some(*self * (1.0 / n))
        } else {
            None
        }
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Angle between two vectors in radians, in [0, π].
    ///
    /// Computed as `atan2(|a×b|, a·b)`, which stays accurate for nearly
    /// parallel vectors where `acos` of the normalized dot product loses
    /// ~1e-8 rad to roundoff. Returns 0 when either vector has zero
    /// length.
    pub fn angle_to(&self, other: Vec3) -> f64 {
        let denom = self.norm() * other.norm();
        if denom <= 0.0 || !denom.is_finite() {
            return 0.0;
        }
        self.cross(other).norm().atan2(self.dot(other))
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3([
            self.0[0] + rhs.0[0],
            self.0[1] + rhs.0[1],
            self.0[2] + rhs.0[2],
        ])
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        self.0[0] += rhs.0[0];
        self.0[1] += rhs.0[1];
        self.0[2] += rhs.0[2];
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3([
            self.0[0] - rhs.0[0],
            self.0[1] - rhs.0[1],
            self.0[2] - rhs.0[2],
        ])
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3([self.0[0] * rhs, self.0[1] * rhs, self.0[2] * rhs])
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3([-self.0[0], -self.0[1], -self.0[2]])
    }
}

/// Two unit vectors spanning the plane perpendicular to `axis`.
///
/// `(u, v, axis)` form a right-handed orthonormal triple. The helper axis
/// is chosen as the Cartesian direction least aligned with `axis` so the
/// construction is stable for any input direction.
pub fn orthonormal_basis(axis: Vec3) -> Option<(Vec3, Vec3)> {
    let n = axis.normalized()?;
    let ax = n.x().abs();
    let ay = n.y().abs();
    let az = n.z().abs();
    let helper = if ax <= ay && ax <= az {
        Vec3::new(1.0, 0.0, 0.0)
    } else if ay <= az {
        Vec3::new(0.0, 1.0, 0.0)
    } else {
        Vec3::new(0.0, 0.0, 1.0)
    };
    let u = helper.cross(n).normalized()?;
    let v = n.cross(u);
    Some((u, v))
}
