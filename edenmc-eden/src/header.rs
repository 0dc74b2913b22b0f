//! The fixed 192-byte world header (little-endian).
//!
//! | offset | field              |
//! |--------|--------------------|
//! | 0      | level_seed: i32    |
//! | 4      | pos: 3 x f32       |
//! | 16     | home: 3 x f32      |
//! | 28     | yaw: f32           |
//! | 32     | directory_offset: u64 |
//! | 40     | name: [u8; 50]     |
//! | 92     | version: i32       |
//! | 96     | hash: [u8; 36]     |
//! | 132    | skycolors: [u8; 16]|
//! | 148    | goldencubes: i32   |
//! | 152    | reserved           |

use crate::CHUNK_SIZE;
use crate::error::EdenError;

pub const HEADER_LEN: usize = 192;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldHeader {
    pub level_seed: i32,
    pub pos: Vec3,
    pub home: Vec3,
    pub yaw: f32,
    pub directory_offset: u64,
    pub name: String,
    pub version: i32,
    pub hash: [u8; 36],
    pub skycolors: [u8; 16],
    pub goldencubes: i32,
}

fn i32_at(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn f32_at(bytes: &[u8], at: usize) -> f32 {
    f32::from_bits(i32_at(bytes, at) as u32)
}

fn vec3_at(bytes: &[u8], at: usize) -> Vec3 {
    Vec3 {
        x: f32_at(bytes, at),
        y: f32_at(bytes, at + 4),
        z: f32_at(bytes, at + 8),
    }
}

fn u64_at(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

impl WorldHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self, EdenError> {
        if bytes.len() < HEADER_LEN {
            return Err(EdenError::Header {
                len: bytes.len(),
                expected: HEADER_LEN,
            });
        }

        // NUL-terminated
        let raw_name = &bytes[40..90];
        let end = raw_name.iter().position(|&b| b == 0).unwrap_or(raw_name.len());
        let name = String::from_utf8_lossy(&raw_name[..end]).into_owned();

        let mut hash = [0u8; 36];
        hash.copy_from_slice(&bytes[96..132]);
        let mut skycolors = [0u8; 16];
        skycolors.copy_from_slice(&bytes[132..148]);

        Ok(Self {
            level_seed: i32_at(bytes, 0),
            pos: vec3_at(bytes, 4),
            home: vec3_at(bytes, 16),
            yaw: f32_at(bytes, 28),
            directory_offset: u64_at(bytes, 32),
            name,
            version: i32_at(bytes, 92),
            hash,
            skycolors,
            goldencubes: i32_at(bytes, 148),
        })
    }

    /// Encodes the header back into its 192-byte form.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&self.level_seed.to_le_bytes());
        for (at, v) in [(4, self.pos), (16, self.home)] {
            bytes[at..at + 4].copy_from_slice(&v.x.to_le_bytes());
            bytes[at + 4..at + 8].copy_from_slice(&v.y.to_le_bytes());
            bytes[at + 8..at + 12].copy_from_slice(&v.z.to_le_bytes());
        }
        bytes[28..32].copy_from_slice(&self.yaw.to_le_bytes());
        bytes[32..40].copy_from_slice(&self.directory_offset.to_le_bytes());
        // keep at least one NUL
        let name = self.name.as_bytes();
        let len = name.len().min(49);
        bytes[40..40 + len].copy_from_slice(&name[..len]);
        bytes[92..96].copy_from_slice(&self.version.to_le_bytes());
        bytes[96..132].copy_from_slice(&self.hash);
        bytes[132..148].copy_from_slice(&self.skycolors);
        bytes[148..152].copy_from_slice(&self.goldencubes.to_le_bytes());
        bytes
    }

    /// Chunk column the player stands in. Truncates toward zero.
    pub fn player_chunk(&self) -> (i32, i32) {
        let size = CHUNK_SIZE as f32;
        ((self.pos.x / size) as i32, (self.pos.z / size) as i32)
    }
}
