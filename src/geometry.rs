//! Geometry Primitives
//!
//! Plotter-native 2D vectors and tenth-of-a-degree angles.
//! Device units: 20 units = 1 mm, +x points away from the plotter, +y right.

use serde::Serialize;
use std::f64::consts::PI;
use std::ops::{Add, Mul};

/// A point or offset in plotter device units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Componentwise sum
    pub fn add(self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y)
    }

    /// Componentwise product with a scalar
    pub fn scale(self, scalar: f64) -> Vector {
        Vector::new(self.x * scalar, self.y * scalar)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, other: Vector) -> Vector {
        Vector::add(self, other)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, scalar: f64) -> Vector {
        self.scale(scalar)
    }
}

/// An angle in tenths of a degree, exactly as GPGL transmits it.
///
/// Values are never normalized: `opposite` keeps adding 1800 and
/// `degree_delta` may exceed 360.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Angle(i64);

impl Angle {
    pub fn new(tenths: i64) -> Self {
        Self(tenths)
    }

    /// Raw value in tenths of a degree
    pub fn value(self) -> i64 {
        self.0
    }

    pub fn as_radians(self) -> f64 {
        self.0 as f64 * PI / 1800.0
    }

    /// `(cos, sin)` of this angle
    pub fn unit_vector(self) -> Vector {
        let (sin, cos) = self.as_radians().sin_cos();
        Vector::new(cos, sin)
    }

    /// Saturates at `i64::MAX`
    pub fn opposite(self) -> Angle {
        Angle(self.0.saturating_add(1800))
    }

    /// Unsigned difference in whole or fractional degrees
    pub fn degree_delta(self, other: Angle) -> f64 {
        self.0.abs_diff(other.0) as f64 / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Vector, b: Vector) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_vector_add_and_scale() {
        let v = Vector::new(1.0, 2.0).add(Vector::new(3.0, -4.0));
        assert_eq!(v, Vector::new(4.0, -2.0));
        assert_eq!(v.scale(0.5), Vector::new(2.0, -1.0));
        assert_eq!(Vector::new(1.0, 1.0) + Vector::new(2.0, 3.0) * 2.0, Vector::new(5.0, 7.0));
    }

    #[test]
    fn test_unit_vector_quadrants() {
        assert!(approx_eq(Angle::new(0).unit_vector(), Vector::new(1.0, 0.0)));
        assert!(approx_eq(Angle::new(900).unit_vector(), Vector::new(0.0, 1.0)));
        assert!(approx_eq(Angle::new(1800).unit_vector(), Vector::new(-1.0, 0.0)));
        assert!(approx_eq(Angle::new(-900).unit_vector(), Vector::new(0.0, -1.0)));
    }

    #[test]
    fn test_opposite_accumulates_without_wrapping() {
        let a = Angle::new(2700);
        assert_eq!(a.opposite().value(), 4500);
        assert_eq!(a.opposite().opposite().value(), 6300);
    }

    #[test]
    fn test_degree_delta() {
        let a = Angle::new(450);
        assert_eq!(a.degree_delta(a.opposite()), 180.0);
        assert_eq!(Angle::new(3600).degree_delta(Angle::new(0)), 360.0);
        assert_eq!(Angle::new(0).degree_delta(Angle::new(7205)), 720.5);
    }

    #[test]
    fn test_extreme_angles_do_not_overflow() {
        assert_eq!(Angle::new(i64::MAX).opposite().value(), i64::MAX);
        assert_eq!(Angle::new(i64::MIN).opposite().value(), i64::MIN + 1800);

        let delta = Angle::new(i64::MAX).degree_delta(Angle::new(i64::MIN));
        assert_eq!(delta, u64::MAX as f64 / 10.0);
    }
}
