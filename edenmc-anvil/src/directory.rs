//! Lazily opened region files of one output world.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RegionError;
use crate::header::ChunkLocation;
use crate::region::RegionFile;
use crate::{RegionPos, chunk_to_local};

/// Region files under `<world>/region/`, keyed by region position.
pub struct RegionDirectory {
    region_dir: PathBuf,
    regions: HashMap<RegionPos, RegionFile>,
}

impl RegionDirectory {
    /// Creates `<world>` and `<world>/region` if they are missing.
    pub fn create(world_dir: &Path) -> Result<Self, RegionError> {
        let region_dir = world_dir.join("region");
        fs::create_dir_all(&region_dir).map_err(|source| RegionError::Create {
            path: region_dir.clone(),
            source,
        })?;

        Ok(Self {
            region_dir,
            regions: HashMap::new(),
        })
    }

    /// Number of region files opened so far.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn contains(&self, pos: RegionPos) -> bool {
        self.regions.contains_key(&pos)
    }

    /// The region at `pos`, created on first use.
    pub fn region(&mut self, pos: RegionPos) -> Result<&mut RegionFile, RegionError> {
        match self.regions.entry(pos) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let path = self.region_dir.join(pos.filename());
                log::info!("Creating region file {}", path.display());
                Ok(entry.insert(RegionFile::create(&path)?))
            }
        }
    }

    /// Stores a compressed chunk at world chunk coordinates.
    pub fn write_chunk(
        &mut self,
        chunk_x: i32,
        chunk_z: i32,
        compressed: &[u8],
    ) -> Result<Option<ChunkLocation>, RegionError> {
        let pos = RegionPos::of_chunk(chunk_x, chunk_z);
        let local_x = chunk_to_local(chunk_x) as u8;
        let local_z = chunk_to_local(chunk_z) as u8;

        log::trace!(
            "Chunk ({}, {}) -> {} local ({}, {})",
            chunk_x, chunk_z, pos.filename(), local_x, local_z
        );

        self.region(pos)?.write_chunk(local_x, local_z, compressed)
    }

    /// Closes every region. Keeps going past failures and returns the first one.
    pub fn close(self) -> Result<(), RegionError> {
        let mut first_error = None;
        for (pos, region) in self.regions {
            if let Err(e) = region.close() {
                log::error!("Failed to close region {}: {}", pos.filename(), e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HEADER_SIZE;

    #[test]
    fn test_lazy_creation_and_reuse() {
        let dir = tempfile::tempdir().unwrap();
        let mut regions = RegionDirectory::create(dir.path()).unwrap();
        assert!(regions.is_empty());

        regions.write_chunk(0, 0, &[1]).unwrap();
        regions.write_chunk(31, 31, &[1]).unwrap();
        assert_eq!(regions.len(), 1);

        regions.write_chunk(-1, 0, &[1]).unwrap();
        assert_eq!(regions.len(), 2);
        assert!(regions.contains(RegionPos::new(-1, 0)));

        regions.close().unwrap();
        assert!(dir.path().join("region/r.0.0.mca").exists());
        assert!(dir.path().join("region/r.-1.0.mca").exists());
    }

    #[test]
    fn test_negative_chunk_lands_in_last_slot() {
        let dir = tempfile::tempdir().unwrap();
        let mut regions = RegionDirectory::create(dir.path()).unwrap();
        let loc = regions.write_chunk(-1, -1, &[5; 8]).unwrap().unwrap();
        regions.close().unwrap();

        let bytes = std::fs::read(dir.path().join("region/r.-1.-1.mca")).unwrap();
        let index = 31 + 31 * 32;
        assert_eq!(&bytes[index * 4..index * 4 + 4], &loc.raw().to_be_bytes());
        assert_eq!(bytes.len(), HEADER_SIZE + 4096);
    }

    #[test]
    fn test_empty_payload_creates_region_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut regions = RegionDirectory::create(dir.path()).unwrap();
        assert_eq!(regions.write_chunk(3, 4, &[]).unwrap(), None);
        regions.close().unwrap();

        let bytes = std::fs::read(dir.path().join("region/r.0.0.mca")).unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert!(bytes.iter().all(|&b| b == 0));
    }
}
