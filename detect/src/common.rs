pub use anyhow::{bail, ensure, format_err, Context as _, Result};
pub use bbox::{prelude::*, CyCxHW};
pub use label::DetectionLabel;
pub use log::info;
pub use noisy_float::prelude::*;
pub use settings::Settings;
pub use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};
