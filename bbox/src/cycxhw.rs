use crate::{
    common::*,
    rect::{ensure_size, half},
    Affine, Rect, RectNum, TLBR,
};

/// A box given by its center and size.
///
/// YOLO labels are kept in this form, normalized to the image size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CyCxHW<T> {
    pub(crate) cy: T,
    pub(crate) cx: T,
    pub(crate) h: T,
    pub(crate) w: T,
}

impl<T> CyCxHW<T>
where
    T: Float,
{
    /// Maps the box through `affine` and returns the axis-aligned box enclosing
    /// the four transformed corners.
    pub fn transform(&self, affine: &Affine<T>) -> Self {
        self.to_tlbr().transform(affine).into()
    }
}

impl<T> Rect for CyCxHW<T>
where
    T: Copy + Num + PartialOrd,
{
    type Type = T;

    fn t(&self) -> T {
        self.cy - half(self.h)
    }

    fn l(&self) -> T {
        self.cx - half(self.w)
    }

    fn b(&self) -> T {
        self.cy + half(self.h)
    }

    fn r(&self) -> T {
        self.cx + half(self.w)
    }

    fn cy(&self) -> T {
        self.cy
    }

    fn cx(&self) -> T {
        self.cx
    }

    fn h(&self) -> T {
        self.h
    }

    fn w(&self) -> T {
        self.w
    }

    fn try_from_tlbr(tlbr: [T; 4]) -> Result<Self> {
        Ok(TLBR::try_from_tlbr(tlbr)?.into())
    }

    fn try_from_cycxhw([cy, cx, h, w]: [T; 4]) -> Result<Self> {
        ensure_size(h, w)?;
        Ok(Self { cy, cx, h, w })
    }
}

impl<T> From<TLBR<T>> for CyCxHW<T>
where
    T: Copy + Num + PartialOrd,
{
    fn from(rect: TLBR<T>) -> Self {
        rect.to_cycxhw()
    }
}

impl<T> From<&TLBR<T>> for CyCxHW<T>
where
    T: Copy + Num + PartialOrd,
{
    fn from(rect: &TLBR<T>) -> Self {
        rect.to_cycxhw()
    }
}

impl<T> Mul<&CyCxHW<T>> for &Affine<T>
where
    T: Float,
{
    type Output = CyCxHW<T>;

    fn mul(self, rhs: &CyCxHW<T>) -> Self::Output {
        rhs.transform(self)
    }
}
