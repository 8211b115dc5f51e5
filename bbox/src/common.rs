pub use anyhow::{ensure, Result};
pub use num_traits::{Float, Num};
pub use std::ops::Mul;
