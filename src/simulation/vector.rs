//! 2D vector type for the kernel
//!
//! `Vector2` is nalgebra's `Vector2<f64>`, so the arithmetic comes for free:
//! - `a + b`, `a - b`, `a * k` (pure)
//! - `a += b`, `a *= k` / `scale_mut` (in place, for hot loops)
//! - `dot`, `magnitude` / `norm`
//!
//! nalgebra's own `normalize` yields NaN for a zero vector, so the kernel
//! goes through [`VectorExt`] instead.

use crate::error::{Error, Result};

pub type Vector2 = nalgebra::Vector2<f64>;

/// Separations shorter than this are treated as zero
pub const EPSILON: f64 = 1e-9;

pub trait VectorExt {
    /// Unit vector in the same direction, or the zero vector for a zero-length input
    fn normalise(&self) -> Vector2;

    /// Unit vector in the same direction; fails on a (near) zero-length input
    fn direction(&self) -> Result<Vector2>;

    /// Both components finite
    fn all_finite(&self) -> bool;
}

impl VectorExt for Vector2 {
    fn normalise(&self) -> Vector2 {
        let length = self.norm();
        if length == 0.0 || !length.is_finite() {
            return Vector2::zeros();
        }
        *self / length
    }

    fn direction(&self) -> Result<Vector2> {
        let length = self.norm();
        if length < EPSILON || !length.is_finite() {
            return Err(Error::DegenerateGeometry("zero-length direction"));
        }
        Ok(*self / length)
    }

    fn all_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalise_zero_is_zero() {
        let n = Vector2::zeros().normalise();
        assert_eq!(n, Vector2::zeros());
        assert!(n.all_finite());
    }

    #[test]
    fn normalise_has_unit_length() {
        let n = Vector2::new(3.0, 4.0).normalise();
        assert!((n.norm() - 1.0).abs() < 1e-12);
        assert!((n.x - 0.6).abs() < 1e-12);
    }

    #[test]
    fn direction_rejects_zero() {
        assert!(Vector2::new(0.0, 0.0).direction().is_err());
        assert!(Vector2::new(0.0, 2.0).direction().is_ok());
    }
}
