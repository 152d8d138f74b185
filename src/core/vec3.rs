//! 3D Vector
//!
//! Minimal float vector for body positions and velocities.
//! The simulation only moves on the horizontal plane; `y` is the
//! gravity axis and is carried through untouched by steering.

use std::fmt;
use std::ops::{Add, Mul, Sub};
use serde::{Deserialize, Serialize};

/// 3D vector with `f32` components. `y` points up.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f32,
    /// Y component (up)
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vec3 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    /// Unit vector pointing up (+Y)
    pub const UP: Self = Self { x: 0.0, y: 1.0, z: 0.0 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Forward direction of a body rotated `yaw_deg` degrees about +Y.
    ///
    /// Yaw 0 faces +Z, yaw 90 faces +X, yaw 180 faces -Z.
    #[inline]
    pub fn from_yaw_degrees(yaw_deg: f32) -> Self {
        let rad = yaw_deg.to_radians();
        Self { x: rad.sin(), y: 0.0, z: rad.cos() }
    }

    /// Scale by a scalar.
    #[inline]
    pub fn scale(self, s: f32) -> Self {
        Self { x: self.x * s, y: self.y * s, z: self.z * s }
    }

    /// Same vector with `y` replaced.
    #[inline]
    pub fn with_y(self, y: f32) -> Self {
        Self { y, ..self }
    }

    /// Horizontal part (y zeroed).
    #[inline]
    pub fn horizontal(self) -> Self {
        self.with_y(0.0)
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Squared length.
    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length (magnitude).
    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z }
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y, z: self.z - rhs.z }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        self.scale(rhs)
    }
}

impl fmt::Debug for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec3({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::approx_eq;

    #[test]
    fn test_yaw_directions() {
        let fwd = Vec3::from_yaw_degrees(0.0);
        assert!(approx_eq(fwd.z, 1.0));

        let back = Vec3::from_yaw_degrees(180.0);
        assert!(approx_eq(back.x, 0.0));
        assert!(approx_eq(back.z, -1.0));

        let right = Vec3::from_yaw_degrees(90.0);
        assert!(approx_eq(right.x, 1.0));
        assert!(approx_eq(right.z, 0.0));
    }

    #[test]
    fn test_with_y_preserves_horizontal() {
        let v = Vec3::new(1.0, 2.0, 3.0).with_y(-9.0);
        assert_eq!(v, Vec3::new(1.0, -9.0, 3.0));
        assert_eq!(v.horizontal(), Vec3::new(1.0, 0.0, 3.0));
    }

    #[test]
    fn test_length() {
        let v = Vec3::new(3.0, 0.0, 4.0);
        assert!(approx_eq(v.length(), 5.0));
        assert!(approx_eq((v * 2.0).length(), 10.0));
    }
}
