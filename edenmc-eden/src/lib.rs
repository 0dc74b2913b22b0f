//! Reader for Eden world files.
//!
//! Layout (little-endian):
//! - Header: 192 bytes, see [`header`]
//! - Columns: 4 sub-chunks each, every sub-chunk is 4096 block bytes
//!   followed by 4096 color bytes
//! - Directory: from `directory_offset` to EOF, 16-byte records

pub mod error;
pub mod header;
pub mod world;

pub use error::EdenError;
pub use header::{Vec3, WorldHeader};
pub use world::{ColumnIndex, ColumnScratch, EdenWorld};

/// Edge length of a sub-chunk.
pub const CHUNK_SIZE: usize = 16;

/// Sub-chunks stacked in one column.
pub const SUBCHUNKS: usize = 4;

pub const SUBCHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

pub const COLUMN_HEIGHT: usize = SUBCHUNKS * CHUNK_SIZE;
