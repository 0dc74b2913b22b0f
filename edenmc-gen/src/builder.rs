use edenmc_anvil::nbt::{NbtError, NbtWriter};

use crate::blocks::TargetBlock;
use crate::nibbles::NibbleArray;

/// Voxels per section (16x16x16).
pub const SECTION_VOLUME: usize = 4096;

/// Index of (x, y, z) inside a section: YZX order.
pub fn section_index(x: usize, y: usize, z: usize) -> usize {
    (y * 16 + z) * 16 + x
}

#[derive(Clone)]
struct Section {
    blocks: Box<[u8; SECTION_VOLUME]>,
    data: NibbleArray,
}

impl Section {
    fn new() -> Self {
        Self {
            blocks: Box::new([0; SECTION_VOLUME]),
            data: NibbleArray::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.blocks.iter().all(|&b| b == 0)
    }
}

/// Collects block ids and metadata for one chunk column and serializes
/// it as a legacy chunk document.
///
/// Sections are stacked from Y = 0 upward. A section whose block ids are
/// all zero is left out of the document.
#[derive(Clone)]
pub struct ChunkBuilder {
    sections: Vec<Section>,
}

impl ChunkBuilder {
    pub fn new(section_count: usize) -> Self {
        Self {
            sections: vec![Section::new(); section_count],
        }
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Height in blocks (section_count * 16).
    pub fn height(&self) -> usize {
        self.sections.len() * 16
    }

    /// Resets every block to air so the builder can be reused.
    pub fn clear(&mut self) {
        for section in &mut self.sections {
            section.blocks.fill(0);
            section.data.clear();
        }
    }

    /// Set a single block at chunk-local coordinates (x, z: 0..15, y: 0..height).
    /// Out-of-range coordinates are ignored.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, id: u8, meta: u8) {
        if x >= 16 || z >= 16 || y >= self.height() {
            return;
        }
        let section = &mut self.sections[y / 16];
        let index = section_index(x, y % 16, z);
        section.blocks[index] = id;
        section.data.set(index, meta);
    }

    pub fn set(&mut self, x: usize, y: usize, z: usize, block: TargetBlock) {
        self.set_block(x, y, z, block.id, block.meta);
    }

    /// Block id and metadata at chunk-local coordinates; air outside the chunk.
    pub fn get_block(&self, x: usize, y: usize, z: usize) -> (u8, u8) {
        if x >= 16 || z >= 16 || y >= self.height() {
            return (0, 0);
        }
        let section = &self.sections[y / 16];
        let index = section_index(x, y % 16, z);
        (section.blocks[index], section.data.get(index))
    }

    pub fn is_section_empty(&self, section: usize) -> bool {
        self.sections.get(section).is_none_or(Section::is_empty)
    }

    /// Number of sections that will be written.
    pub fn populated_sections(&self) -> usize {
        self.sections.iter().filter(|s| !s.is_empty()).count()
    }

    /// For each (x, z), one above the topmost non-air block, or 0 if the
    /// column is empty. Entries are ordered `z * 16 + x`.
    pub fn height_map(&self) -> Vec<i32> {
        let mut heights = vec![0i32; 256];
        for z in 0..16 {
            for x in 0..16 {
                heights[z * 16 + x] = self.column_height(x, z);
            }
        }
        heights
    }

    fn column_height(&self, x: usize, z: usize) -> i32 {
        for (s, section) in self.sections.iter().enumerate().rev() {
            for y in (0..16).rev() {
                if section.blocks[section_index(x, y, z)] != 0 {
                    return (s * 16 + y + 1) as i32;
                }
            }
        }
        0
    }

    /// Serializes the chunk at chunk coordinates (`chunk_x`, `chunk_z`).
    pub fn build(&self, chunk_x: i32, chunk_z: i32) -> Result<Vec<u8>, NbtError> {
        let populated: Vec<(usize, &Section)> = self
            .sections
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_empty())
            .collect();

        // ~10 KB per populated section plus the fixed level fields
        let capacity = 2048 + populated.len() * 10_300;
        let mut writer = NbtWriter::with_capacity(capacity);
        let height_map = self.height_map();

        writer.compound("", |w| {
            w.compound("Level", |w| {
                w.int("xPos", chunk_x)?
                    .int("zPos", chunk_z)?
                    .long("LastUpdate", 0)?
                    .long("InhabitedTime", 0)?
                    .bool("TerrainPopulated", true)?
                    .bool("LightPopulated", true)?
                    .byte_array("Biomes", &[1; 256])? // plains
                    .int_array("HeightMap", &height_map)?
                    .compound_list("Entities", 0, |_, _| Ok(()))?
                    .compound_list("TileEntities", 0, |_, _| Ok(()))?
                    .compound_list("Sections", populated.len(), |w, i| {
                        let (y, section) = populated[i];
                        w.byte("Y", y as i8)?
                            .byte_array("Blocks", &section.blocks[..])?
                            .byte_array("Data", section.data.as_bytes())?
                            .byte_array("SkyLight", &[0xFF; NibbleArray::BYTES])?
                            .byte_array("BlockLight", &[0; NibbleArray::BYTES])?;
                        Ok(())
                    })?;
                Ok(())
            })?;
            Ok(())
        })?;

        let bytes = writer.finish()?;
        log::trace!(
            "Chunk ({}, {}) serialized: {} sections, {} bytes",
            chunk_x, chunk_z, populated.len(), bytes.len()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edenmc_anvil::document::parse_chunk;

    #[test]
    fn test_empty_chunk_has_no_sections() {
        let builder = ChunkBuilder::new(4);
        let doc = parse_chunk(&builder.build(3, -4).unwrap()).unwrap();
        assert_eq!(doc.level.x_pos, 3);
        assert_eq!(doc.level.z_pos, -4);
        assert!(doc.level.sections.is_empty());
        assert!(doc.level.height_map.iter().all(|&h| h == 0));
        assert_eq!(doc.level.height_map.len(), 256);
    }

    #[test]
    fn test_height_map_single_voxel() {
        let mut builder = ChunkBuilder::new(4);
        builder.set_block(2, 5, 7, 1, 0);
        let heights = builder.height_map();
        assert_eq!(heights[7 * 16 + 2], 6);
        assert_eq!(heights.iter().filter(|&&h| h != 0).count(), 1);
    }

    #[test]
    fn test_height_map_takes_topmost() {
        let mut builder = ChunkBuilder::new(4);
        builder.set_block(0, 3, 0, 1, 0);
        builder.set_block(0, 40, 0, 2, 0);
        builder.set_block(15, 63, 15, 4, 0);
        let heights = builder.height_map();
        assert_eq!(heights[0], 41);
        assert_eq!(heights[255], 64);
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let mut builder = ChunkBuilder::new(4);
        builder.set_block(1, 35, 1, 5, 3);
        assert!(builder.is_section_empty(0));
        assert!(!builder.is_section_empty(2));
        assert!(builder.is_section_empty(9));
        assert_eq!(builder.populated_sections(), 1);

        let doc = parse_chunk(&builder.build(0, 0).unwrap()).unwrap();
        assert_eq!(doc.level.sections.len(), 1);

        let section = &doc.level.sections[0];
        assert_eq!(section.y, 2);
        let index = section_index(1, 3, 1);
        let blocks = section.block_ids();
        assert_eq!(blocks[index], 5);
        assert_eq!(blocks.iter().filter(|&&b| b != 0).count(), 1);
        // odd index, high nibble
        assert_eq!(index % 2, 1);
        assert_eq!(section.data_bytes()[index / 2], 0x30);
        assert!(section.sky_light.iter().all(|&b| b == -1));
        assert!(section.block_light.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_sections_decode_to_same_voxels() {
        let mut builder = ChunkBuilder::new(4);
        for y in [0usize, 17, 18, 63] {
            for z in 0..16 {
                for x in 0..16 {
                    let id = ((x + z * 3 + y) % 250 + 1) as u8;
                    builder.set_block(x, y, z, id, ((x ^ z) & 0xF) as u8);
                }
            }
        }

        let doc = parse_chunk(&builder.build(0, 0).unwrap()).unwrap();
        let ys: Vec<i8> = doc.level.sections.iter().map(|s| s.y).collect();
        assert_eq!(ys, vec![0, 1, 3]);

        for section in &doc.level.sections {
            let base = section.y as usize * 16;
            let blocks = section.block_ids();
            let data = section.data_bytes();
            for y in 0..16 {
                for z in 0..16 {
                    for x in 0..16 {
                        let index = section_index(x, y, z);
                        let nibble = if index % 2 == 0 { data[index / 2] & 0x0F } else { data[index / 2] >> 4 };
                        assert_eq!((blocks[index], nibble), builder.get_block(x, base + y, z));
                    }
                }
            }
        }
    }

    #[test]
    fn test_level_fields() {
        let mut builder = ChunkBuilder::new(1);
        builder.set_block(0, 0, 0, 7, 0);
        let doc = parse_chunk(&builder.build(-1, 31).unwrap()).unwrap();
        assert_eq!(doc.level.last_update, 0);
        assert_eq!(doc.level.inhabited_time, 0);
        assert_eq!(doc.level.terrain_populated, 1);
        assert_eq!(doc.level.light_populated, 1);
        assert_eq!(doc.level.biomes.len(), 256);
        assert!(doc.level.biomes.iter().all(|&b| b == 1));
    }

    #[test]
    fn test_entity_lists_are_empty_compound_lists() {
        let builder = ChunkBuilder::new(1);
        let bytes = builder.build(0, 0).unwrap();
        let needle = b"Entities";
        let at = bytes.windows(needle.len()).position(|w| w == needle).unwrap();
        // name, then element type Compound (10) and a zero count
        assert_eq!(&bytes[at + needle.len()..at + needle.len() + 5], &[10, 0, 0, 0, 0]);
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut builder = ChunkBuilder::new(2);
        builder.set_block(16, 0, 0, 1, 0);
        builder.set_block(0, 32, 0, 1, 0);
        assert_eq!(builder.populated_sections(), 0);
        builder.set_block(15, 31, 15, 9, 2);
        assert_eq!(builder.get_block(15, 31, 15), (9, 2));
        builder.clear();
        assert_eq!(builder.get_block(15, 31, 15), (0, 0));
    }
}
