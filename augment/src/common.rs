pub use anyhow::{ensure, format_err, Context as _, Result};
pub use bbox::{prelude::*, Affine, CyCxHW};
pub use image::{imageops, Rgb, RgbImage};
pub use itertools::Itertools as _;
pub use label::YoloLabel;
pub use log::{debug, info, warn};
pub use noisy_float::prelude::*;
pub use rand::{prelude::*, rngs::StdRng};
pub use std::{
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
};
