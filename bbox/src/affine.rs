use crate::common::*;

/// A 2-D affine map on points in `[y, x]` order.
///
/// The matrix is stored row-major as the top two rows of the homogeneous
/// 3x3 matrix, so a point maps to
/// `y' = m[0][0] * y + m[0][1] * x + m[0][2]` and
/// `x' = m[1][0] * y + m[1][1] * x + m[1][2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine<T> {
    pub m: [[T; 3]; 2],
}

impl<T> Affine<T>
where
    T: Float,
{
    pub fn identity() -> Self {
        let zero = T::zero();
        let one = T::one();
        Self {
            m: [[one, zero, zero], [zero, one, zero]],
        }
    }

    pub fn translate(dy: T, dx: T) -> Self {
        let zero = T::zero();
        let one = T::one();
        Self {
            m: [[one, zero, dy], [zero, one, dx]],
        }
    }

    pub fn scale(sy: T, sx: T) -> Self {
        let zero = T::zero();
        Self {
            m: [[sy, zero, zero], [zero, sx, zero]],
        }
    }

    /// Rotation about the origin. Positive angles turn counter-clockwise as
    /// seen on an image whose y axis points down.
    pub fn rotate(radians: T) -> Self {
        let zero = T::zero();
        let (sin, cos) = radians.sin_cos();
        Self {
            m: [[cos, -sin, zero], [sin, cos, zero]],
        }
    }

    pub fn rotate_degrees(degrees: T) -> Self {
        Self::rotate(degrees.to_radians())
    }

    /// Mirror along the vertical axis of an image `width` wide.
    pub fn hflip(width: T) -> Self {
        let zero = T::zero();
        let one = T::one();
        Self {
            m: [[one, zero, zero], [zero, -one, width]],
        }
    }

    /// Mirror along the horizontal axis of an image `height` tall.
    pub fn vflip(height: T) -> Self {
        let zero = T::zero();
        let one = T::one();
        Self {
            m: [[-one, zero, height], [zero, one, zero]],
        }
    }

    /// Conjugates `self` so that it acts around the point `[cy, cx]` instead of the origin.
    pub fn about(&self, cy: T, cx: T) -> Self {
        Self::translate(-cy, -cx)
            .then(self)
            .then(&Self::translate(cy, cx))
    }

    /// Composition that applies `self` first and `next` afterwards.
    pub fn then(&self, next: &Self) -> Self {
        let a = &next.m;
        let b = &self.m;
        let row = |i: usize| {
            [
                a[i][0] * b[0][0] + a[i][1] * b[1][0],
                a[i][0] * b[0][1] + a[i][1] * b[1][1],
                a[i][0] * b[0][2] + a[i][1] * b[1][2] + a[i][2],
            ]
        };
        Self {
            m: [row(0), row(1)],
        }
    }

    pub fn apply(&self, point: [T; 2]) -> [T; 2] {
        let [y, x] = point;
        let m = &self.m;
        [
            m[0][0] * y + m[0][1] * x + m[0][2],
            m[1][0] * y + m[1][1] * x + m[1][2],
        ]
    }

    pub fn determinant(&self) -> T {
        let m = &self.m;
        m[0][0] * m[1][1] - m[0][1] * m[1][0]
    }

    pub fn inverse(&self) -> Result<Self> {
        let det = self.determinant();
        ensure!(
            det.abs() > T::epsilon(),
            "the affine transform is not invertible"
        );
        let [[a, b, ty], [c, d, tx]] = self.m;
        let ia = d / det;
        let ib = -b / det;
        let ic = -c / det;
        let id = a / det;
        Ok(Self {
            m: [
                [ia, ib, -(ia * ty + ib * tx)],
                [ic, id, -(ic * ty + id * tx)],
            ],
        })
    }
}

impl<T> Default for Affine<T>
where
    T: Float,
{
    fn default() -> Self {
        Self::identity()
    }
}
