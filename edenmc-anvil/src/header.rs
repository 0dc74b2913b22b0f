//! Region file header.
//!
//! The header consists of two tables:
//! - Location table: where each chunk is stored
//! - Timestamp table: when each chunk was last saved

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{HEADER_SIZE, REGION_CHUNKS, SECTOR_SIZE};

/// Packed location entry: 24-bit sector offset, 8-bit sector count.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct ChunkLocation(u32);

impl ChunkLocation {
    pub fn from_parts(offset: u32, sectors: u8) -> Self {
        ChunkLocation((offset << 8) | sectors as u32)
    }

    /// Returns `None` for the "chunk absent" value 0.
    pub fn new(raw: u32) -> Option<Self> {
        if raw == 0 { None } else { Some(ChunkLocation(raw)) }
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    /// Offset in sectors from the start of the file.
    pub fn offset(&self) -> u32 {
        self.0 >> 8
    }

    /// Size of the chunk in sectors.
    pub fn sectors(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub fn offset_bytes(&self) -> u64 {
        self.offset() as u64 * SECTOR_SIZE as u64
    }

    /// First sector after this run.
    pub fn end(&self) -> u32 {
        self.offset() + self.sectors() as u32
    }

    pub fn overlaps(&self, other: &ChunkLocation) -> bool {
        self.offset() < other.end() && other.offset() < self.end()
    }
}

impl fmt::Debug for ChunkLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ChunkLocation {{ offset: {}, sectors: {} }}", self.offset(), self.sectors())
    }
}

impl fmt::Display for ChunkLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "at sector {}, {} sector(s)", self.offset(), self.sectors())
    }
}

/// Current Unix time in seconds, saturated to the 32-bit table width.
pub fn unix_timestamp() -> u32 {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    seconds.min(u32::MAX as u64) as u32
}

/// In-memory copy of the 8KB header (location table + timestamp table).
#[derive(Clone)]
pub struct RegionHeader {
    bytes: Box<[u8; HEADER_SIZE]>,
}

impl RegionHeader {
    pub fn new() -> Self {
        Self {
            bytes: Box::new([0u8; HEADER_SIZE]),
        }
    }

    pub fn as_bytes(&self) -> &[u8; HEADER_SIZE] {
        &self.bytes
    }

    /// Location of the chunk at linear index `index`, if present.
    ///
    /// # Panics
    /// If `index` is 1024 or more.
    pub fn location(&self, index: usize) -> Option<ChunkLocation> {
        ChunkLocation::new(self.read_u32(location_offset(index)))
    }

    pub fn set_location(&mut self, index: usize, location: ChunkLocation) {
        self.write_u32(location_offset(index), location.raw());
    }

    pub fn timestamp(&self, index: usize) -> u32 {
        self.read_u32(location_offset(index) + SECTOR_SIZE)
    }

    pub fn set_timestamp(&mut self, index: usize, seconds: u32) {
        self.write_u32(location_offset(index) + SECTOR_SIZE, seconds);
    }

    /// All present locations with their linear index.
    pub fn locations(&self) -> impl Iterator<Item = (usize, ChunkLocation)> + '_ {
        (0..REGION_CHUNKS).filter_map(|index| self.location(index).map(|loc| (index, loc)))
    }

    fn read_u32(&self, at: usize) -> u32 {
        u32::from_be_bytes([self.bytes[at], self.bytes[at + 1], self.bytes[at + 2], self.bytes[at + 3]])
    }

    fn write_u32(&mut self, at: usize, value: u32) {
        self.bytes[at..at + 4].copy_from_slice(&value.to_be_bytes());
    }
}

impl Default for RegionHeader {
    fn default() -> Self {
        Self::new()
    }
}

fn location_offset(index: usize) -> usize {
    assert!(index < REGION_CHUNKS, "Chunk index out of bounds in region header: {}", index);
    index * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size() {
        let header = RegionHeader::new();
        assert_eq!(header.as_bytes().len(), 8192);
        assert_eq!(header.locations().count(), 0);
    }

    #[test]
    fn test_location_entry_layout() {
        let mut header = RegionHeader::new();
        header.set_location(1, ChunkLocation::from_parts(0x0A0B0C, 3));

        assert_eq!(&header.as_bytes()[4..8], &[0x0A, 0x0B, 0x0C, 3]);
        let loc = header.location(1).unwrap();
        assert_eq!(loc.offset(), 0x0A0B0C);
        assert_eq!(loc.sectors(), 3);
        assert_eq!(loc.offset_bytes(), 0x0A0B0C * 4096);
        assert_eq!(header.location(0), None);
    }

    #[test]
    fn test_timestamp_table_is_second_sector() {
        let mut header = RegionHeader::new();
        header.set_timestamp(2, 0x01020304);

        assert_eq!(&header.as_bytes()[4096 + 8..4096 + 12], &[1, 2, 3, 4]);
        assert_eq!(header.timestamp(2), 0x01020304);
        assert_eq!(header.location(2), None);
    }

    #[test]
    fn test_overlap() {
        let a = ChunkLocation::from_parts(2, 2);
        let b = ChunkLocation::from_parts(4, 1);
        let c = ChunkLocation::from_parts(3, 5);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }
}
