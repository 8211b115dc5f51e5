//! Object labels and the YOLO text format they are stored in.

mod codec;
mod error;

pub use codec::*;
pub use error::*;

use bbox::{Affine, CyCxHW, TLBR};
use num_traits::Float;
use std::ops::Mul;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label<R, C> {
    pub rect: R,
    pub class: C,
}

/// One object instance in normalized coordinates with a class index.
pub type YoloLabel = Label<CyCxHW<f64>, usize>;

/// A label produced by a detector, along with its confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionLabel {
    pub label: YoloLabel,
    pub confidence: f64,
}

impl<'a, T, C> Mul<&'a Label<TLBR<T>, C>> for &'a Affine<T>
where
    T: Float,
    C: Copy,
{
    type Output = Label<TLBR<T>, C>;

    fn mul(self, rhs: &'a Label<TLBR<T>, C>) -> Self::Output {
        Label {
            rect: self * &rhs.rect,
            class: rhs.class,
        }
    }
}

impl<'a, T, C> Mul<&'a Label<CyCxHW<T>, C>> for &'a Affine<T>
where
    T: Float,
    C: Copy,
{
    type Output = Label<CyCxHW<T>, C>;

    fn mul(self, rhs: &'a Label<CyCxHW<T>, C>) -> Self::Output {
        Label {
            rect: self * &rhs.rect,
            class: rhs.class,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use bbox::prelude::*;

    #[test]
    fn affine_keeps_class() {
        let label = Label {
            rect: CyCxHW::try_from_cycxhw([0.5, 0.2, 0.2, 0.1]).unwrap(),
            class: 7usize,
        };
        let flipped = &Affine::hflip(1.0) * &label;
        assert_eq!(flipped.class, 7);
        assert_abs_diff_eq!(flipped.rect.cx(), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(flipped.rect.cy(), 0.5, epsilon = 1e-12);
    }
}
