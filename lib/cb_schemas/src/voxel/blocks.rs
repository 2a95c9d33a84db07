//! The block type bytes used by world generation.
//!
//! Block types travel as raw protocol bytes; only the ids the generator places are named here.

/// A block type byte as stored in chunk data and the map transfer protocol.
pub type BlockTypeId = u8;

/// Air
pub const AIR: BlockTypeId = 0;
/// Stone
pub const STONE: BlockTypeId = 1;
/// Grass-covered dirt
pub const GRASS: BlockTypeId = 2;
/// Dirt
pub const DIRT: BlockTypeId = 3;
/// Bedrock
pub const BEDROCK: BlockTypeId = 7;
/// Still water
pub const WATER: BlockTypeId = 9;
/// Sand
pub const SAND: BlockTypeId = 12;
/// Gravel
pub const GRAVEL: BlockTypeId = 13;
/// Gold ore
pub const GOLD_ORE: BlockTypeId = 14;
/// Iron ore
pub const IRON_ORE: BlockTypeId = 15;
/// Coal ore
pub const COAL_ORE: BlockTypeId = 16;
/// Tree log
pub const LOG: BlockTypeId = 17;
/// Tree leaves
pub const LEAVES: BlockTypeId = 18;
/// Lapis lazuli ore
pub const LAPIS_ORE: BlockTypeId = 21;
/// Tall grass plant (the meta nibble selects the variant)
pub const TALL_GRASS: BlockTypeId = 31;
/// Diamond ore
pub const DIAMOND_ORE: BlockTypeId = 56;
/// Redstone ore
pub const REDSTONE_ORE: BlockTypeId = 73;
/// Thin snow layer
pub const SNOW_LAYER: BlockTypeId = 78;
/// Ice
pub const ICE: BlockTypeId = 79;

/// Looks up a block type by its case-insensitive configuration identifier.
pub fn by_name(name: &str) -> Option<BlockTypeId> {
    let id = match name.to_ascii_lowercase().as_str() {
        "air" => AIR,
        "stone" => STONE,
        "grass" => GRASS,
        "dirt" => DIRT,
        "bedrock" => BEDROCK,
        "water" => WATER,
        "sand" => SAND,
        "gravel" => GRAVEL,
        _ => return None,
    };
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        assert_eq!(by_name("stone"), Some(STONE));
        assert_eq!(by_name("Sand"), Some(SAND));
        assert_eq!(by_name("unobtainium"), None);
    }
}
