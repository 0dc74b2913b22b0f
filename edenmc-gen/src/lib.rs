//! Chunk assembly for legacy (numeric id) Minecraft chunks.
//!
//! - `blocks`: Eden block type -> Minecraft id/meta
//! - `nibbles`: packed 4-bit metadata arrays
//! - `builder`: per-column block storage, height map and NBT document

pub mod blocks;
pub mod builder;
pub mod nibbles;

pub use blocks::{TargetBlock, translate};
pub use builder::ChunkBuilder;
pub use nibbles::NibbleArray;

/// Sections in a converted Eden column (64 blocks tall).
pub const EDEN_SECTIONS: usize = 4;
