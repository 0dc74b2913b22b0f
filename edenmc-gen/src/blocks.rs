//! Eden block types to legacy Minecraft (1.12) block ids and metadata.
//!
//! Eden voxels carry a signed type byte and a paint color. The type is
//! looked up in a fixed table; color has no legacy counterpart and is
//! dropped. Anything the table doesn't know becomes stone.

/// A legacy block: numeric id plus 4-bit metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetBlock {
    pub id: u8,
    pub meta: u8,
}

impl TargetBlock {
    pub const fn new(id: u8, meta: u8) -> Self {
        Self { id, meta }
    }
}

pub const MC_STONE: TargetBlock = TargetBlock::new(1, 0);
pub const MC_BEDROCK: TargetBlock = TargetBlock::new(7, 0);
pub const MC_DIRT: TargetBlock = TargetBlock::new(3, 0);

/// Eden block type ordinals.
pub mod eden {
    pub const NONE: i8 = 0;
    pub const BEDROCK: i8 = 1;
    pub const STONE: i8 = 2;
    pub const DIRT: i8 = 3;
    pub const SAND: i8 = 4;
    pub const LEAVES: i8 = 5;
    pub const TREE: i8 = 6;
    pub const WOOD: i8 = 7;
    pub const GRASS: i8 = 8;
    pub const TNT: i8 = 9;
    pub const DARK_STONE: i8 = 10;
    pub const WEAVE: i8 = 11;
    pub const LINEN: i8 = 12;
    pub const BRICK: i8 = 13;
    pub const GRASS2: i8 = 14;
    pub const GRASS3: i8 = 15;
    pub const COBBLESTONE: i8 = 16;
    pub const GLASS: i8 = 17;
    pub const ICE: i8 = 18;
    pub const CRYSTAL: i8 = 19;
    pub const TRAMPOLINE: i8 = 20;
    pub const LADDER: i8 = 21;
    pub const CLOUD: i8 = 22;
    pub const WATER: i8 = 23;
    pub const VINE: i8 = 24;
    pub const LAVA: i8 = 25;
    pub const STONE_RAMP1: i8 = 26;
    pub const WOOD_RAMP1: i8 = 30;
    pub const SHINGLE_RAMP1: i8 = 34;
    pub const ICE_RAMP1: i8 = 38;
    pub const STONE_SIDE1: i8 = 42;
    pub const WOOD_SIDE1: i8 = 46;
    pub const SHINGLE_SIDE1: i8 = 50;
    pub const ICE_SIDE1: i8 = 54;
    pub const SHINGLE: i8 = 58;
    pub const GRADIENT: i8 = 59;
    pub const WATER3: i8 = 60;
    pub const WATER2: i8 = 61;
    pub const WATER1: i8 = 62;
    pub const LAVA3: i8 = 63;
    pub const LAVA2: i8 = 64;
    pub const LAVA1: i8 = 65;
    pub const DOOR1: i8 = 66;
    pub const LIGHTBOX: i8 = 70;
    pub const FLOWER: i8 = 71;
    pub const STEEL: i8 = 72;
}

/// Stair facing for ramp variants 1..=4.
const RAMP_META: [u8; 4] = [1, 0, 3, 2];

/// Named legacy blocks. The names match the in-game names.
const NAMED: &[(&str, TargetBlock)] = &[
    ("Stone Block", TargetBlock::new(1, 0)),
    ("Smooth Sandstone", TargetBlock::new(24, 2)),
    ("Glass", TargetBlock::new(20, 0)),
    ("Oak Leaves", TargetBlock::new(18, 0)),
    ("Oak Log", TargetBlock::new(17, 0)),
    ("Oak Planks", TargetBlock::new(5, 0)),
    ("Grass Block", TargetBlock::new(2, 0)),
    ("TNT", TargetBlock::new(46, 0)),
    ("Cobblestone", TargetBlock::new(4, 0)),
    ("Bricks", TargetBlock::new(45, 0)),
    ("Stone Bricks", TargetBlock::new(98, 0)),
    ("Andesite", TargetBlock::new(1, 5)),
    ("Chiseled Quartz Block", TargetBlock::new(155, 1)),
    ("Coal Block", TargetBlock::new(173, 0)),
    ("Jungle Planks", TargetBlock::new(5, 3)),
    ("White Wool", TargetBlock::new(35, 0)),
    ("Water", TargetBlock::new(9, 0)),
    ("Oak Fence", TargetBlock::new(85, 0)),
    ("Mossy Cobblestone", TargetBlock::new(48, 0)),
    ("Glowstone", TargetBlock::new(89, 0)),
    ("Cobblestone Stairs", TargetBlock::new(67, 0)),
    ("Oak Stairs", TargetBlock::new(53, 0)),
    ("Nether Brick Stairs", TargetBlock::new(114, 0)),
    ("Quartz Stairs", TargetBlock::new(156, 0)),
    ("Cobblestone Wall", TargetBlock::new(139, 0)),
    ("Nether Brick", TargetBlock::new(112, 0)),
    ("Block of Quartz", TargetBlock::new(155, 0)),
    ("Oak Door", TargetBlock::new(64, 0)),
    ("Sea Lantern", TargetBlock::new(169, 0)),
    ("Poppy", TargetBlock::new(38, 0)),
    ("Block of Iron", TargetBlock::new(42, 0)),
];

/// Looks up a legacy block by its in-game name.
pub fn by_name(name: &str) -> Option<TargetBlock> {
    NAMED.iter().find(|(n, _)| *n == name).map(|(_, b)| *b)
}

/// In-game name an Eden type maps to, if it has one.
pub fn eden_name(source_id: i8) -> Option<&'static str> {
    use eden::*;

    let name = match source_id {
        STONE => "Stone Block",
        SAND => "Smooth Sandstone",
        GLASS => "Glass",
        LEAVES => "Oak Leaves",
        TREE => "Oak Log",
        WOOD => "Oak Planks",
        GRASS | GRASS2 | GRASS3 => "Grass Block",
        TNT => "TNT",
        DARK_STONE => "Cobblestone",
        BRICK => "Bricks",
        COBBLESTONE => "Stone Bricks",
        ICE => "Andesite",
        CRYSTAL => "Chiseled Quartz Block",
        TRAMPOLINE => "Coal Block",
        LADDER => "Jungle Planks",
        CLOUD => "White Wool",
        WATER | WATER1 | WATER2 | WATER3 => "Water",
        WEAVE => "Oak Fence",
        VINE => "Mossy Cobblestone",
        LAVA | LAVA1 | LAVA2 | LAVA3 => "Glowstone",
        id if ramp_variant(id, STONE_RAMP1).is_some() => "Cobblestone Stairs",
        id if ramp_variant(id, WOOD_RAMP1).is_some() => "Oak Stairs",
        id if ramp_variant(id, SHINGLE_RAMP1).is_some() => "Nether Brick Stairs",
        id if ramp_variant(id, ICE_RAMP1).is_some() => "Quartz Stairs",
        id if ramp_variant(id, WOOD_SIDE1).is_some() => "Oak Fence",
        id if ramp_variant(id, STONE_SIDE1).is_some()
            || ramp_variant(id, SHINGLE_SIDE1).is_some()
            || ramp_variant(id, ICE_SIDE1).is_some() =>
        {
            "Cobblestone Wall"
        }
        SHINGLE => "Nether Brick",
        GRADIENT => "Block of Quartz",
        id if ramp_variant(id, DOOR1).is_some() => "Oak Door",
        LIGHTBOX => "Sea Lantern",
        FLOWER => "Poppy",
        STEEL => "Block of Iron",
        _ => return None,
    };
    Some(name)
}

/// Variant index 0..4 when `id` is one of the four types starting at `first`.
fn ramp_variant(id: i8, first: i8) -> Option<usize> {
    (first..first + 4).contains(&id).then(|| (id - first) as usize)
}

fn stair_variant(id: i8) -> Option<usize> {
    use eden::*;
    [STONE_RAMP1, WOOD_RAMP1, SHINGLE_RAMP1, ICE_RAMP1]
        .into_iter()
        .find_map(|first| ramp_variant(id, first))
}

/// Translates one Eden voxel. `None` is air.
pub fn translate(source_id: i8, _color: u8) -> Option<TargetBlock> {
    if source_id <= eden::NONE {
        return None;
    }

    if let Some(mut block) = eden_name(source_id).and_then(by_name) {
        if let Some(variant) = stair_variant(source_id) {
            block.meta = RAMP_META[variant];
        }
        return Some(block);
    }

    Some(match source_id {
        eden::BEDROCK => MC_BEDROCK,
        eden::DIRT => MC_DIRT,
        _ => MC_STONE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air() {
        assert_eq!(translate(0, 0), None);
        assert_eq!(translate(-5, 3), None);
        assert_eq!(translate(i8::MIN, 0), None);
    }

    #[test]
    fn test_fixed_fallbacks() {
        assert_eq!(translate(eden::BEDROCK, 0), Some(TargetBlock::new(7, 0)));
        assert_eq!(translate(eden::DIRT, 0), Some(TargetBlock::new(3, 0)));
        assert_eq!(translate(eden::LINEN, 0), Some(MC_STONE));
        assert_eq!(translate(100, 0), Some(MC_STONE));
        assert_eq!(translate(i8::MAX, 0), Some(MC_STONE));
    }

    #[test]
    fn test_named_blocks() {
        assert_eq!(translate(eden::STONE, 0), Some(TargetBlock::new(1, 0)));
        assert_eq!(translate(eden::SAND, 0), Some(TargetBlock::new(24, 2)));
        assert_eq!(translate(eden::ICE, 0), Some(TargetBlock::new(1, 5)));
        assert_eq!(translate(eden::CRYSTAL, 0), Some(TargetBlock::new(155, 1)));
        assert_eq!(translate(eden::LADDER, 0), Some(TargetBlock::new(5, 3)));
        assert_eq!(translate(eden::WATER2, 0), Some(TargetBlock::new(9, 0)));
        assert_eq!(translate(eden::LAVA1, 0), Some(TargetBlock::new(89, 0)));
        assert_eq!(translate(eden::DOOR1 + 3, 0), Some(TargetBlock::new(64, 0)));
        assert_eq!(translate(eden::STEEL, 0), Some(TargetBlock::new(42, 0)));
    }

    #[test]
    fn test_color_is_ignored() {
        for color in [0u8, 7, 255] {
            assert_eq!(translate(eden::GRASS, color), Some(TargetBlock::new(2, 0)));
        }
    }

    #[test]
    fn test_stair_facing() {
        for first in [eden::STONE_RAMP1, eden::WOOD_RAMP1, eden::SHINGLE_RAMP1, eden::ICE_RAMP1] {
            let metas: Vec<u8> = (0..4).map(|v| translate(first + v, 0).unwrap().meta).collect();
            assert_eq!(metas, vec![1, 0, 3, 2]);
        }
        assert_eq!(translate(eden::ICE_RAMP1 + 2, 0), Some(TargetBlock::new(156, 3)));
    }

    #[test]
    fn test_sides() {
        assert_eq!(translate(eden::WOOD_SIDE1 + 1, 0), Some(TargetBlock::new(85, 0)));
        for first in [eden::STONE_SIDE1, eden::SHINGLE_SIDE1, eden::ICE_SIDE1] {
            assert_eq!(translate(first + 3, 0), Some(TargetBlock::new(139, 0)));
        }
    }

    #[test]
    fn test_every_name_resolves() {
        for id in 1..=eden::STEEL {
            if let Some(name) = eden_name(id) {
                assert!(by_name(name).is_some(), "{} has no block", name);
            }
        }
    }
}
