pub use anyhow::{ensure, Context as _, Result};
pub use indexmap::IndexMap;
pub use noisy_float::prelude::*;
pub use serde::{Deserialize, Deserializer, Serialize, Serializer};
pub use std::{
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};
