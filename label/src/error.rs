use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("failed to access label file '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}:{}: {}", .path.display(), .line, .reason)]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl LabelError {
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
