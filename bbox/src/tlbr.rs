use crate::{
    common::*,
    rect::{ensure_size, half},
    Affine, CyCxHW, Rect, RectNum,
};

/// A box given by its top, left, bottom and right edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TLBR<T> {
    pub(crate) t: T,
    pub(crate) l: T,
    pub(crate) b: T,
    pub(crate) r: T,
}

impl<T> TLBR<T>
where
    T: Float,
{
    /// Maps the four corners through `affine` and returns their enclosing box.
    pub fn transform(&self, affine: &Affine<T>) -> Self {
        let [[y, x], rest @ ..] = self.corners().map(|point| affine.apply(point));
        let init = Self {
            t: y,
            l: x,
            b: y,
            r: x,
        };

        rest.iter().fold(init, |rect, &[y, x]| Self {
            t: rect.t.min(y),
            l: rect.l.min(x),
            b: rect.b.max(y),
            r: rect.r.max(x),
        })
    }

    /// Clamps the box into `[0, height] x [0, width]`.
    ///
    /// Returns `None` if nothing of the box is left inside the bounds.
    pub fn clip(&self, height: T, width: T) -> Option<Self> {
        let zero = T::zero();
        let clamp_y = |y: T| y.max(zero).min(height);
        let clamp_x = |x: T| x.max(zero).min(width);

        let rect = Self {
            t: clamp_y(self.t),
            l: clamp_x(self.l),
            b: clamp_y(self.b),
            r: clamp_x(self.r),
        };
        (rect.b > rect.t && rect.r > rect.l).then(|| rect)
    }

    /// Clamps the box into the unit square of normalized coordinates.
    pub fn clip_unit(&self) -> Option<Self> {
        self.clip(T::one(), T::one())
    }
}

impl<T> Rect for TLBR<T>
where
    T: Copy + Num + PartialOrd,
{
    type Type = T;

    fn t(&self) -> T {
        self.t
    }

    fn l(&self) -> T {
        self.l
    }

    fn b(&self) -> T {
        self.b
    }

    fn r(&self) -> T {
        self.r
    }

    fn cy(&self) -> T {
        half(self.t + self.b)
    }

    fn cx(&self) -> T {
        half(self.l + self.r)
    }

    fn h(&self) -> T {
        self.b - self.t
    }

    fn w(&self) -> T {
        self.r - self.l
    }

    fn try_from_tlbr([t, l, b, r]: [T; 4]) -> Result<Self> {
        ensure!(b >= t && r >= l, "bottom and right edges must not precede top and left");
        Ok(Self { t, l, b, r })
    }

    fn try_from_cycxhw(cycxhw: [T; 4]) -> Result<Self> {
        let [cy, cx, h, w] = cycxhw;
        ensure_size(h, w)?;
        let (dy, dx) = (half(h), half(w));
        Ok(Self {
            t: cy - dy,
            l: cx - dx,
            b: cy + dy,
            r: cx + dx,
        })
    }
}

impl<T> From<CyCxHW<T>> for TLBR<T>
where
    T: Copy + Num + PartialOrd,
{
    fn from(rect: CyCxHW<T>) -> Self {
        rect.to_tlbr()
    }
}

impl<T> From<&CyCxHW<T>> for TLBR<T>
where
    T: Copy + Num + PartialOrd,
{
    fn from(rect: &CyCxHW<T>) -> Self {
        rect.to_tlbr()
    }
}

impl<T> Mul<&TLBR<T>> for &Affine<T>
where
    T: Float,
{
    type Output = TLBR<T>;

    fn mul(self, rhs: &TLBR<T>) -> Self::Output {
        rhs.transform(self)
    }
}
