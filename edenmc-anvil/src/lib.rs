//! Minecraft Anvil region file format (.mca) writer.
//!
//! Region files contain 32x32 chunks in a specific binary format:
//! - Bytes 0-4095: Location table (1024 entries × 4 bytes)
//! - Bytes 4096-8191: Timestamp table (1024 entries × 4 bytes)
//! - Bytes 8192+: Chunk data (4096-byte sectors)

pub mod compression;
pub mod directory;
pub mod document;
pub mod error;
pub mod header;
pub mod nbt;
pub mod region;
pub mod sectors;

pub use compression::{Compressor, ZlibCompressor};
pub use directory::RegionDirectory;
pub use error::RegionError;
pub use header::{ChunkLocation, RegionHeader};
pub use region::{RegionFile, RegionWriter};
pub use sectors::SectorMap;

/// Size of one sector in bytes (4 KB).
pub const SECTOR_SIZE: usize = 4096;

/// Total header size (location table + timestamp table).
pub const HEADER_SIZE: usize = SECTOR_SIZE * 2; // 8192 bytes

/// Sectors taken by the header; payloads start after them.
pub const HEADER_SECTORS: u32 = 2;

/// Number of chunks per region dimension.
pub const REGION_SIZE: i32 = 32;

/// Number of chunk slots in one region file.
pub const REGION_CHUNKS: usize = (REGION_SIZE * REGION_SIZE) as usize;

/// Largest run a location entry can describe (8-bit sector count).
pub const MAX_CHUNK_SECTORS: usize = u8::MAX as usize;

/// Convert chunk coordinates to local region coordinates (0-31).
#[inline]
pub fn chunk_to_local(chunk_coord: i32) -> i32 {
    chunk_coord.rem_euclid(REGION_SIZE)
}

/// Convert chunk coordinates to region coordinates.
#[inline]
pub fn chunk_to_region(chunk_coord: i32) -> i32 {
    chunk_coord.div_euclid(REGION_SIZE)
}

/// Calculate linear index for a chunk within a region (0-1023).
#[inline]
pub fn local_to_index(local_x: u8, local_z: u8) -> usize {
    local_x as usize + local_z as usize * REGION_SIZE as usize
}

/// Calculate file offset for a chunk given its sector number.
#[inline]
pub fn sector_to_offset(sector: u32) -> u64 {
    sector as u64 * SECTOR_SIZE as u64
}

/// Region file coordinates (as in "r.0.-1.mca").
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct RegionPos {
    pub x: i32,
    pub z: i32,
}

impl RegionPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Region holding the chunk at world chunk coordinates.
    pub fn of_chunk(chunk_x: i32, chunk_z: i32) -> Self {
        Self {
            x: chunk_to_region(chunk_x),
            z: chunk_to_region(chunk_z),
        }
    }

    pub fn filename(&self) -> String {
        format!("r.{}.{}.mca", self.x, self.z)
    }
}
