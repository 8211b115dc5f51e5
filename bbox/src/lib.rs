//! Safe bounding box types and functions.

mod common;

pub use affine::*;
mod affine;

pub use rect::*;
pub mod rect;

pub use tlbr::*;
pub mod tlbr;

pub use cycxhw::*;
pub mod cycxhw;

pub mod prelude {
    pub use crate::rect::{Rect, RectNum};
}
