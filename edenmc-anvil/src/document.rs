//! Read-back view of a legacy (numeric block id) chunk document.
//!
//! These structures are deserialized with fastnbt. They are used to check
//! written chunks, not to produce them.

use fastnbt::{ByteArray, IntArray};
use serde::Deserialize;

/// Root of a chunk document: `{ Level: { ... } }`.
#[derive(Debug, Deserialize)]
pub struct ChunkDocument {
    #[serde(rename = "Level")]
    pub level: Level,
}

#[derive(Debug, Deserialize)]
pub struct Level {
    #[serde(rename = "xPos")]
    pub x_pos: i32,
    #[serde(rename = "zPos")]
    pub z_pos: i32,

    #[serde(rename = "LastUpdate")]
    pub last_update: i64,
    #[serde(rename = "InhabitedTime")]
    pub inhabited_time: i64,

    #[serde(rename = "TerrainPopulated")]
    pub terrain_populated: i8,
    #[serde(rename = "LightPopulated")]
    pub light_populated: i8,

    #[serde(rename = "Biomes")]
    pub biomes: ByteArray,
    #[serde(rename = "HeightMap")]
    pub height_map: IntArray,

    #[serde(rename = "Sections")]
    pub sections: Vec<Section>,
}

// --- Section (16x16x16 Cube) ---
#[derive(Debug, Deserialize)]
pub struct Section {
    #[serde(rename = "Y")]
    pub y: i8,
    #[serde(rename = "Blocks")]
    pub blocks: ByteArray,
    #[serde(rename = "Data")]
    pub data: ByteArray,
    #[serde(rename = "SkyLight")]
    pub sky_light: ByteArray,
    #[serde(rename = "BlockLight")]
    pub block_light: ByteArray,
}

impl Section {
    /// Block ids as unsigned bytes.
    pub fn block_ids(&self) -> Vec<u8> {
        self.blocks.iter().map(|&b| b as u8).collect()
    }

    /// Packed metadata nibbles as unsigned bytes.
    pub fn data_bytes(&self) -> Vec<u8> {
        self.data.iter().map(|&b| b as u8).collect()
    }
}

pub fn parse_chunk(nbt_data: &[u8]) -> anyhow::Result<ChunkDocument> {
    Ok(fastnbt::from_bytes(nbt_data)?)
}

/// Checks that a serialized chunk carries the expected coordinates in
/// `Level.xPos` / `Level.zPos`.
pub fn verify_chunk_coords(nbt_data: &[u8], expected_x: i32, expected_z: i32) -> anyhow::Result<()> {
    let nbt: fastnbt::Value = fastnbt::from_bytes(nbt_data)?;

    let fastnbt::Value::Compound(root) = nbt else {
        anyhow::bail!("NBT Root is not a Compound");
    };
    let Some(fastnbt::Value::Compound(level)) = root.get("Level") else {
        anyhow::bail!("No Level compound in NBT root. Keys: {:?}", root.keys());
    };
    let (Some(x_tag), Some(z_tag)) = (level.get("xPos"), level.get("zPos")) else {
        anyhow::bail!("Could not find xPos/zPos in Level compound. Keys: {:?}", level.keys());
    };

    let x = x_tag.as_i64().ok_or_else(|| anyhow::anyhow!("Level.xPos is not an int"))? as i32;
    let z = z_tag.as_i64().ok_or_else(|| anyhow::anyhow!("Level.zPos is not an int"))? as i32;

    if x != expected_x || z != expected_z {
        anyhow::bail!(
            "NBT Coords mismatch! Expected ({}, {}), Found ({}, {})",
            expected_x, expected_z, x, z
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nbt::write_document;

    fn level(x: i32, z: i32) -> Vec<u8> {
        write_document(64, |w| {
            w.compound("Level", |w| {
                w.int("xPos", x)?.int("zPos", z)?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn test_verify_matching_coords() {
        assert!(verify_chunk_coords(&level(32, -13), 32, -13).is_ok());
    }

    #[test]
    fn test_verify_mismatch() {
        let err = verify_chunk_coords(&level(37, 28), 32, 13).unwrap_err();
        assert!(err.to_string().contains("mismatch"));
    }

    #[test]
    fn test_verify_missing_level() {
        let bytes = write_document(16, |w| {
            w.int("xPos", 0)?;
            Ok(())
        })
        .unwrap();
        assert!(verify_chunk_coords(&bytes, 0, 0).is_err());
    }
}
