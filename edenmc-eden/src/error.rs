use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EdenError {
    #[error("cannot open world file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("world header is truncated ({len} of {expected} bytes)")]
    Header { len: usize, expected: usize },

    #[error("column ({x}, {z}) could not be read: {source}")]
    Column {
        x: i32,
        z: i32,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl EdenError {
    /// Errors after which no further column can be read.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, EdenError::Column { .. })
    }
}
