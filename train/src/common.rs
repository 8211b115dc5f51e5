//! Common imports from external crates.

pub use anyhow::{ensure, Context as _, Result};
pub use chrono::{DateTime, Local};
pub use indexmap::IndexMap;
pub use log::{info, warn};
pub use serde::{Deserialize, Serialize};
pub use settings::Settings;
pub use std::{
    env,
    ffi::OsStr,
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    process::Command,
};
