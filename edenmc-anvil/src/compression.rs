//! Chunk payload compression and the on-disk payload framing.
//!
//! A stored chunk is `[length: 4][type: 1][data: length - 1]`, big-endian,
//! followed by zero padding up to the next sector boundary.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::write::ZlibEncoder;

/// Compression types used in the Anvil format.
pub mod compression_type {
    pub const GZIP: u8 = 1;
    pub const ZLIB: u8 = 2;
    pub const NONE: u8 = 3;
}

/// Bytes in front of the compressed data: length (4) + type (1).
pub const PAYLOAD_HEADER_BYTES: usize = 5;

/// Compresses a serialized chunk. An empty result means compression failed.
pub trait Compressor {
    fn compress(&self, data: &[u8]) -> Vec<u8>;
}

/// zlib (type 2) compressor.
#[derive(Debug, Clone, Copy)]
pub struct ZlibCompressor {
    level: Compression,
}

impl ZlibCompressor {
    /// `level` is clamped to 0..=9.
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }

    pub fn fast() -> Self {
        Self { level: Compression::fast() }
    }
}

impl Default for ZlibCompressor {
    fn default() -> Self {
        Self::fast()
    }
}

impl Compressor for ZlibCompressor {
    fn compress(&self, data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 4), self.level);
        if let Err(e) = encoder.write_all(data) {
            log::warn!("zlib compression failed: {}", e);
            return Vec::new();
        }
        match encoder.finish() {
            Ok(compressed) => compressed,
            Err(e) => {
                log::warn!("zlib compression failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Frames zlib-compressed bytes as a stored payload: [Length: 4][Type: 1][Data...].
pub fn wrap_payload(compressed: &[u8]) -> Vec<u8> {
    let total_len = (compressed.len() + 1) as u32; // +1 byte for Type
    let mut blob = Vec::with_capacity(PAYLOAD_HEADER_BYTES + compressed.len());
    blob.extend_from_slice(&total_len.to_be_bytes());
    blob.push(compression_type::ZLIB);
    blob.extend_from_slice(compressed);
    blob
}

/// Unwrap and decompress a stored payload (trailing padding is ignored).
/// Supports GZip (1), ZLib (2) and None (3).
pub fn unwrap_and_decompress_chunk(chunk_blob: &[u8]) -> anyhow::Result<Vec<u8>> {
    if chunk_blob.len() < PAYLOAD_HEADER_BYTES {
        anyhow::bail!("Chunk blob too short");
    }

    let length = u32::from_be_bytes([chunk_blob[0], chunk_blob[1], chunk_blob[2], chunk_blob[3]]) as usize;
    if length == 0 || PAYLOAD_HEADER_BYTES - 1 + length > chunk_blob.len() {
        anyhow::bail!("Chunk length {} does not fit in {} stored bytes", length, chunk_blob.len());
    }

    let compression = chunk_blob[4];
    let data = &chunk_blob[PAYLOAD_HEADER_BYTES..PAYLOAD_HEADER_BYTES - 1 + length];

    let mut decompressed = Vec::new();
    match compression {
        compression_type::ZLIB => {
            flate2::read::ZlibDecoder::new(data).read_to_end(&mut decompressed)?;
        }
        compression_type::GZIP => {
            flate2::read::GzDecoder::new(data).read_to_end(&mut decompressed)?;
        }
        compression_type::NONE => decompressed.extend_from_slice(data),
        _ => anyhow::bail!("Unknown compression type: {}", compression),
    }
    Ok(decompressed)
}
