use std::path::PathBuf;

use thiserror::Error;

/// Failures of the region layer.
///
/// Only [`RegionError::Create`] is fatal for a conversion run; every
/// other variant concerns a single chunk and the caller moves on.
#[derive(Debug, Error)]
pub enum RegionError {
    #[error("cannot create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("region write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("local chunk ({x}, {z}) outside of 0..32")]
    LocalOutOfBounds { x: u8, z: u8 },
    #[error("chunk needs {sectors} sectors, a location entry holds at most 255")]
    ChunkTooLarge { sectors: usize },
    #[error("sector allocation of {sectors} sector(s) is invalid")]
    InvalidAllocation { sectors: usize },
    #[error("sector offset {offset} does not fit in 24 bits")]
    SectorOverflow { offset: usize },
}

impl RegionError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, RegionError::Create { .. })
    }
}
