//! Sector usage map for one region file.
//!
//! Sectors 0 and 1 hold the header and are marked used from the start.
//! Allocation is first-fit from sector 2 and never frees anything: a
//! rewritten chunk gets fresh sectors and its old run stays used.

use crate::error::RegionError;
use crate::{HEADER_SECTORS, MAX_CHUNK_SECTORS};

/// Largest sector offset a location entry can hold.
const MAX_SECTOR_OFFSET: usize = (1 << 24) - 1;

#[derive(Debug, Clone)]
pub struct SectorMap {
    used: Vec<bool>,
}

impl SectorMap {
    pub fn new() -> Self {
        Self {
            used: vec![true; HEADER_SECTORS as usize],
        }
    }

    /// Number of sectors tracked so far (used or free).
    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    pub fn is_used(&self, sector: usize) -> bool {
        self.used.get(sector).copied().unwrap_or(false)
    }

    /// Finds the first run of `count` free sectors starting at sector 2,
    /// growing the map as needed, and marks it used.
    pub fn allocate(&mut self, count: usize) -> Result<u32, RegionError> {
        if count == 0 {
            return Err(RegionError::InvalidAllocation { sectors: count });
        }
        if count > MAX_CHUNK_SECTORS {
            return Err(RegionError::ChunkTooLarge { sectors: count });
        }

        let mut run = 0;
        let mut sector = HEADER_SECTORS as usize;
        let start = loop {
            if sector >= self.used.len() {
                self.used.push(false);
            }
            if self.used[sector] {
                run = 0;
            } else {
                run += 1;
                if run == count {
                    break sector + 1 - count;
                }
            }
            sector += 1;
        };

        if start > MAX_SECTOR_OFFSET {
            return Err(RegionError::SectorOverflow { offset: start });
        }

        self.used[start..start + count].fill(true);
        Ok(start as u32)
    }
}

impl Default for SectorMap {
    fn default() -> Self {
        Self::new()
    }
}
