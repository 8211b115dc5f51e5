//! Offline data augmentation for YOLO-labeled image sets.

mod common;
pub mod blur;
pub mod color_jitter;
pub mod driver;
pub mod pipeline;
pub mod random_affine;
pub mod sample;
pub mod warp;

pub use blur::*;
pub use color_jitter::*;
pub use driver::*;
pub use pipeline::*;
pub use random_affine::*;
pub use sample::*;
