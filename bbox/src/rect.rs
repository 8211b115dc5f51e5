use super::{CyCxHW, TLBR};
use crate::common::*;

/// Accessors shared by the box representations.
///
/// Coordinates are given in `y` before `x` order.
pub trait Rect {
    type Type;

    fn t(&self) -> Self::Type;
    fn l(&self) -> Self::Type;
    fn b(&self) -> Self::Type;
    fn r(&self) -> Self::Type;
    fn cy(&self) -> Self::Type;
    fn cx(&self) -> Self::Type;
    fn h(&self) -> Self::Type;
    fn w(&self) -> Self::Type;

    fn try_from_tlbr(tlbr: [Self::Type; 4]) -> Result<Self>
    where
        Self: Sized;

    fn try_from_cycxhw(cycxhw: [Self::Type; 4]) -> Result<Self>
    where
        Self: Sized;
}

/// Conversions available for numeric boxes.
pub trait RectNum: Rect
where
    Self::Type: Num + PartialOrd + Copy,
{
    fn cycxhw(&self) -> [Self::Type; 4] {
        [self.cy(), self.cx(), self.h(), self.w()]
    }

    fn tlbr(&self) -> [Self::Type; 4] {
        [self.t(), self.l(), self.b(), self.r()]
    }

    /// Corner points in `[y, x]` order: top-left, top-right, bottom-left, bottom-right.
    fn corners(&self) -> [[Self::Type; 2]; 4] {
        let [t, l, b, r] = self.tlbr();
        [[t, l], [t, r], [b, l], [b, r]]
    }

    fn to_cycxhw(&self) -> CyCxHW<Self::Type> {
        let [cy, cx, h, w] = self.cycxhw();
        CyCxHW { cy, cx, h, w }
    }

    fn to_tlbr(&self) -> TLBR<Self::Type> {
        let [t, l, b, r] = self.tlbr();
        TLBR { t, l, b, r }
    }

    fn area(&self) -> Self::Type {
        self.h() * self.w()
    }
}

impl<R> RectNum for R
where
    R: Rect,
    R::Type: Num + PartialOrd + Copy,
{
}

pub(crate) fn half<T>(value: T) -> T
where
    T: Num,
{
    value / (T::one() + T::one())
}

pub(crate) fn ensure_size<T>(h: T, w: T) -> Result<()>
where
    T: Num + PartialOrd,
{
    ensure!(
        h >= T::zero() && w >= T::zero(),
        "box height and width must be non-negative"
    );
    Ok(())
}
