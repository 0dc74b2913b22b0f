//! One open region file.
//!
//! The file is created with a zeroed header. Every chunk write allocates
//! sectors, writes the padded payload and then rewrites the whole header,
//! so the file on disk is consistent after each call. Closing consumes
//! the writer; nothing can be written to a closed region.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::compression::wrap_payload;
use crate::error::RegionError;
use crate::header::{ChunkLocation, RegionHeader, unix_timestamp};
use crate::sectors::SectorMap;
use crate::{REGION_SIZE, SECTOR_SIZE, local_to_index, sector_to_offset};

/// A region backed by a file on disk.
pub type RegionFile = RegionWriter<File>;

pub struct RegionWriter<S: Write + Seek> {
    out: S,
    header: RegionHeader,
    sectors: SectorMap,
}

impl RegionWriter<File> {
    /// Creates (or truncates) the region file at `path`.
    pub fn create(path: &Path) -> Result<Self, RegionError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|source| create_error(path, source))?;

        Self::start(file).map_err(|e| match e {
            RegionError::Io(source) => create_error(path, source),
            other => other,
        })
    }
}

fn create_error(path: &Path, source: std::io::Error) -> RegionError {
    RegionError::Create {
        path: PathBuf::from(path),
        source,
    }
}

impl<S: Write + Seek> RegionWriter<S> {
    /// Writes a zeroed header to `out` and starts tracking sectors.
    pub fn start(mut out: S) -> Result<Self, RegionError> {
        let header = RegionHeader::new();
        write_header(&mut out, &header)?;

        Ok(Self {
            out,
            header,
            sectors: SectorMap::new(),
        })
    }

    pub fn header(&self) -> &RegionHeader {
        &self.header
    }

    pub fn sectors(&self) -> &SectorMap {
        &self.sectors
    }

    /// Stores one compressed chunk at local position (`local_x`, `local_z`).
    ///
    /// Returns `Ok(None)` without touching the file when `compressed` is
    /// empty (compression failed upstream).
    pub fn write_chunk(
        &mut self,
        local_x: u8,
        local_z: u8,
        compressed: &[u8],
    ) -> Result<Option<ChunkLocation>, RegionError> {
        if local_x as i32 >= REGION_SIZE || local_z as i32 >= REGION_SIZE {
            return Err(RegionError::LocalOutOfBounds { x: local_x, z: local_z });
        }
        if compressed.is_empty() {
            log::debug!("Empty payload for local chunk ({}, {}), nothing written", local_x, local_z);
            return Ok(None);
        }

        let mut payload = wrap_payload(compressed);
        let sectors_needed = payload.len().div_ceil(SECTOR_SIZE);
        let offset = self.sectors.allocate(sectors_needed)?;

        // Pad to whole sectors
        payload.resize(sectors_needed * SECTOR_SIZE, 0);

        self.out.seek(SeekFrom::Start(sector_to_offset(offset)))?;
        self.out.write_all(&payload)?;
        self.out.flush()?;

        // The in-memory header only changes once the new one is on disk
        let index = local_to_index(local_x, local_z);
        let location = ChunkLocation::from_parts(offset, sectors_needed as u8);
        let mut updated = self.header.clone();
        updated.set_location(index, location);
        updated.set_timestamp(index, unix_timestamp());
        write_header(&mut self.out, &updated)?;
        self.header = updated;

        log::debug!("Local chunk ({}, {}) stored {}", local_x, local_z, location);
        Ok(Some(location))
    }

    /// Flushes the header one last time and hands back the underlying output.
    pub fn close(mut self) -> Result<S, RegionError> {
        write_header(&mut self.out, &self.header)?;
        Ok(self.out)
    }
}

fn write_header<S: Write + Seek>(out: &mut S, header: &RegionHeader) -> Result<(), RegionError> {
    out.seek(SeekFrom::Start(0))?;
    out.write_all(header.as_bytes())?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HEADER_SIZE;
    use crate::compression::unwrap_and_decompress_chunk;
    use std::io::{self, Cursor};

    fn region() -> RegionWriter<Cursor<Vec<u8>>> {
        RegionWriter::start(Cursor::new(Vec::new())).unwrap()
    }

    /// In-memory output whose header writes can be made to fail.
    struct HeaderFailure {
        inner: Cursor<Vec<u8>>,
        fail_header: bool,
    }

    impl Write for HeaderFailure {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_header && self.inner.position() == 0 {
                return Err(io::Error::other("header write refused"));
            }
            self.inner.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.inner.flush()
        }
    }

    impl Seek for HeaderFailure {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn test_start_writes_zeroed_header() {
        let out = region().close().unwrap().into_inner();
        assert_eq!(out.len(), HEADER_SIZE);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_single_chunk_layout() {
        let mut region = region();
        let loc = region.write_chunk(1, 2, &[0xAA; 10]).unwrap().unwrap();
        assert_eq!(loc.offset(), 2);
        assert_eq!(loc.sectors(), 1);

        let out = region.close().unwrap().into_inner();
        assert_eq!(out.len(), 3 * SECTOR_SIZE);

        let index = 1 + 2 * 32;
        assert_eq!(&out[index * 4..index * 4 + 4], &[0, 0, 2, 1]);
        assert_ne!(&out[4096 + index * 4..4096 + index * 4 + 4], &[0, 0, 0, 0]);

        let payload = &out[8192..];
        assert_eq!(&payload[..5], &[0, 0, 0, 11, 2]);
        assert_eq!(&payload[5..15], &[0xAA; 10]);
        assert!(payload[15..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_multi_sector_payload() {
        let mut region = region();
        // 5 header bytes push this just over one sector
        let loc = region.write_chunk(0, 0, &vec![1u8; SECTOR_SIZE - 4]).unwrap().unwrap();
        assert_eq!(loc.sectors(), 2);
        let next = region.write_chunk(1, 0, &[1u8; SECTOR_SIZE - 5]).unwrap().unwrap();
        assert_eq!((next.offset(), next.sectors()), (4, 1));
    }

    #[test]
    fn test_rewrite_takes_new_sectors() {
        let mut region = region();
        let first = region.write_chunk(3, 3, &[1; 100]).unwrap().unwrap();
        let other = region.write_chunk(4, 3, &[2; 100]).unwrap().unwrap();
        let second = region.write_chunk(3, 3, &[3; 100]).unwrap().unwrap();

        assert_eq!(first.offset(), 2);
        assert_eq!(other.offset(), 3);
        assert_eq!(second.offset(), 4);
        assert!(region.sectors().is_used(2));
        assert_eq!(region.header().location(3 + 3 * 32), Some(second));

        let out = region.close().unwrap().into_inner();
        let stored = &out[second.offset_bytes() as usize..];
        assert_eq!(&stored[..6], &[0, 0, 0, 101, 2, 3]);
    }

    #[test]
    fn test_failed_header_write_leaves_location_unset() {
        let out = HeaderFailure {
            inner: Cursor::new(Vec::new()),
            fail_header: false,
        };
        let mut region = RegionWriter::start(out).unwrap();
        let kept = region.write_chunk(0, 0, &[1; 10]).unwrap().unwrap();

        region.out.fail_header = true;
        let err = region.write_chunk(1, 0, &[2; 10]).err().unwrap();
        assert!(!err.is_fatal());
        assert_eq!(region.header().location(1), None);
        assert_eq!(region.header().timestamp(1), 0);
        assert_eq!(region.header().location(0), Some(kept));

        region.out.fail_header = false;
        let out = region.close().unwrap().inner.into_inner();
        assert_eq!(&out[4..8], &[0, 0, 0, 0]);
        assert_eq!(&out[4096 + 4..4096 + 8], &[0, 0, 0, 0]);
        assert_eq!(&out[0..4], &kept.raw().to_be_bytes());
    }

    #[test]
    fn test_empty_payload_is_a_no_op() {
        let mut region = region();
        assert_eq!(region.write_chunk(0, 0, &[]).unwrap(), None);
        assert_eq!(region.header().locations().count(), 0);
        assert_eq!(region.sectors().len(), 2);
    }

    #[test]
    fn test_out_of_bounds_local() {
        let mut region = region();
        assert!(matches!(
            region.write_chunk(32, 0, &[1]),
            Err(RegionError::LocalOutOfBounds { x: 32, z: 0 })
        ));
    }

    #[test]
    fn test_allocations_never_overlap_or_touch_header() {
        let mut region = region();
        let sizes = [10usize, 5000, 9000, 1, 4091, 4092, 20000, 3];
        let mut runs = Vec::new();
        for (i, size) in sizes.iter().enumerate() {
            let loc = region.write_chunk((i % 2) as u8, 0, &vec![7u8; *size]).unwrap().unwrap();
            runs.push(loc);
        }

        for (i, a) in runs.iter().enumerate() {
            assert!(a.offset() >= 2);
            for b in &runs[i + 1..] {
                assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
        for (_, loc) in region.header().locations() {
            assert!(loc.offset() >= 2);
        }
        // latest write per local index wins
        assert_eq!(region.header().location(0), Some(runs[6]));
        assert_eq!(region.header().location(1), Some(runs[7]));
    }

    #[test]
    fn test_payload_reads_back() {
        let data = b"payload bytes".to_vec();
        let compressed = crate::Compressor::compress(&crate::ZlibCompressor::default(), &data);
        let mut region = region();
        let loc = region.write_chunk(5, 6, &compressed).unwrap().unwrap();
        let out = region.close().unwrap().into_inner();

        let start = loc.offset_bytes() as usize;
        let end = start + loc.sectors() as usize * SECTOR_SIZE;
        assert_eq!(unwrap_and_decompress_chunk(&out[start..end]).unwrap(), data);
    }

    #[test]
    fn test_create_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.0.0.mca");
        let mut region = RegionFile::create(&path).unwrap();
        region.write_chunk(0, 0, &[1, 2, 3]).unwrap();
        region.close().unwrap();

        let len = std::fs::metadata(&path).unwrap().len();
        assert_eq!(len, 3 * SECTOR_SIZE as u64);
    }

    #[test]
    fn test_create_in_missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("r.0.0.mca");
        let err = RegionFile::create(&path).err().unwrap();
        assert!(err.is_fatal());
    }
}
