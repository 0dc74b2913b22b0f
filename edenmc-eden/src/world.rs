use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::EdenError;
use crate::header::{HEADER_LEN, WorldHeader};
use crate::{COLUMN_HEIGHT, SUBCHUNKS, SUBCHUNK_VOLUME};

/// Bytes per directory record: x (i32), z (i32), offset (u64).
pub const INDEX_RECORD_LEN: usize = 16;

/// One directory record: where column (x, z) starts in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub x: i32,
    pub z: i32,
    pub offset: u64,
}

impl ColumnIndex {
    fn parse(record: &[u8]) -> Self {
        let mut offset = [0u8; 8];
        offset.copy_from_slice(&record[8..16]);
        Self {
            x: i32::from_le_bytes([record[0], record[1], record[2], record[3]]),
            z: i32::from_le_bytes([record[4], record[5], record[6], record[7]]),
            offset: u64::from_le_bytes(offset),
        }
    }

    pub fn to_bytes(&self) -> [u8; INDEX_RECORD_LEN] {
        let mut bytes = [0u8; INDEX_RECORD_LEN];
        bytes[0..4].copy_from_slice(&self.x.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.z.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.offset.to_le_bytes());
        bytes
    }
}

/// Reusable buffer for one column: 4 stacked 16³ sub-chunks of block
/// types and colors.
pub struct ColumnScratch {
    blocks: Vec<u8>,
    colors: Vec<u8>,
}

impl ColumnScratch {
    pub fn new() -> Self {
        Self {
            blocks: vec![0; SUBCHUNKS * SUBCHUNK_VOLUME],
            colors: vec![0; SUBCHUNKS * SUBCHUNK_VOLUME],
        }
    }

    /// Position of (x, y, z) in the buffers; y spans the whole column.
    pub fn index(x: usize, y: usize, z: usize) -> usize {
        (y / 16) * SUBCHUNK_VOLUME + x * 256 + z * 16 + (y % 16)
    }

    /// Block type at column-local (x, y, z). Zero or negative means empty.
    pub fn block(&self, x: usize, y: usize, z: usize) -> i8 {
        self.blocks[Self::index(x, y, z)] as i8
    }

    pub fn color(&self, x: usize, y: usize, z: usize) -> u8 {
        self.colors[Self::index(x, y, z)]
    }

    /// Visits every voxel with a positive block type.
    pub fn for_each_solid<F>(&self, mut visit: F)
    where
        F: FnMut(usize, usize, usize, i8, u8),
    {
        for y in 0..COLUMN_HEIGHT {
            for z in 0..16 {
                for x in 0..16 {
                    let index = Self::index(x, y, z);
                    let block = self.blocks[index] as i8;
                    if block > 0 {
                        visit(x, y, z, block, self.colors[index]);
                    }
                }
            }
        }
    }

    fn subchunk_mut(&mut self, s: usize) -> (&mut [u8], &mut [u8]) {
        let range = s * SUBCHUNK_VOLUME..(s + 1) * SUBCHUNK_VOLUME;
        (&mut self.blocks[range.clone()], &mut self.colors[range])
    }
}

impl Default for ColumnScratch {
    fn default() -> Self {
        Self::new()
    }
}

/// An open Eden world: header plus column directory.
pub struct EdenWorld<R: Read + Seek> {
    reader: R,
    header: WorldHeader,
    directory: Vec<ColumnIndex>,
}

impl EdenWorld<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, EdenError> {
        let file = File::open(path).map_err(|source| EdenError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> EdenWorld<R> {
    pub fn from_reader(mut reader: R) -> Result<Self, EdenError> {
        reader.seek(SeekFrom::Start(0))?;
        let mut raw = Vec::with_capacity(HEADER_LEN);
        reader.by_ref().take(HEADER_LEN as u64).read_to_end(&mut raw)?;
        let header = WorldHeader::parse(&raw)?;

        let directory = Self::read_directory(&mut reader, header.directory_offset)?;
        log::info!(
            "World '{}' (version {}): {} columns, directory at {}",
            header.name,
            header.version,
            directory.len(),
            header.directory_offset
        );

        Ok(Self {
            reader,
            header,
            directory,
        })
    }

    fn read_directory(reader: &mut R, offset: u64) -> Result<Vec<ColumnIndex>, EdenError> {
        reader.seek(SeekFrom::Start(offset))?;
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;

        let records = raw.chunks_exact(INDEX_RECORD_LEN);
        if !records.remainder().is_empty() {
            log::warn!(
                "Ignoring {} trailing bytes after the column directory",
                records.remainder().len()
            );
        }
        Ok(records.map(ColumnIndex::parse).collect())
    }

    pub fn header(&self) -> &WorldHeader {
        &self.header
    }

    /// Directory entries in file order. Duplicates are kept.
    pub fn directory(&self) -> &[ColumnIndex] {
        &self.directory
    }

    /// Last directory entry for column (x, z).
    pub fn find_column(&self, x: i32, z: i32) -> Option<ColumnIndex> {
        self.directory.iter().rev().find(|c| c.x == x && c.z == z).copied()
    }

    pub fn player_chunk(&self) -> (i32, i32) {
        self.header.player_chunk()
    }

    /// Reads the column at `entry` into `scratch`. On error the scratch
    /// holds partial data and must not be used.
    pub fn read_column(&mut self, entry: &ColumnIndex, scratch: &mut ColumnScratch) -> Result<(), EdenError> {
        let column_error = |source| EdenError::Column {
            x: entry.x,
            z: entry.z,
            source,
        };

        self.reader.seek(SeekFrom::Start(entry.offset)).map_err(column_error)?;
        for s in 0..SUBCHUNKS {
            let (blocks, colors) = scratch.subchunk_mut(s);
            self.reader.read_exact(blocks).map_err(column_error)?;
            self.reader.read_exact(colors).map_err(column_error)?;
        }
        Ok(())
    }
}
