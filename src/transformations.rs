use nalgebra::{Matrix2, Vector2 as Vector2d};
use crate::Vector2;

/// An affine map `m * p + b` between point spaces, in double precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointTransformationAffine {
    pub m: Matrix2<f64>,
    pub b: Vector2d<f64>
}

impl PointTransformationAffine {
    pub fn new(m: Matrix2<f64>, b: Vector2d<f64>) -> Self {
        Self {
            m, b
        }
    }

    /// Widens `p` before mapping it, so products like `0.7 * 640` don't round up past an integer.
    pub fn mul(&self, p: Vector2) -> Vector2d<f64> {
        self.m * Vector2d::new(f64::from(p.x), f64::from(p.y)) + self.b
    }

    /// Map the unit square onto a `width` x `height` frame.
    ///
    /// Landmarks from a face mesh are normalised to [0, 1] on both axes; this takes them to pixels.
    pub fn unnormalising(width: u32, height: u32) -> Self {
        Self::new(
            Matrix2::new(f64::from(width), 0.0, 0.0, f64::from(height)),
            Vector2d::new(0.0, 0.0)
        )
    }
}

impl Default for PointTransformationAffine {
    fn default() -> Self {
        Self {
            m: Matrix2::identity(),
            b: Vector2d::new(0.0, 0.0)
        }
    }
}
