//! Builtin terrain composition generators.

use cb_schemas::coordinates::{AbsChunkPos, CHUNK_DIM};
use cb_schemas::voxel::biome::BiomeMap;
use cb_schemas::voxel::blocks::{self, BlockTypeId};
use cb_schemas::voxel::chunk::{BlockNibbles, BlockTypes, HeightMap};
use cb_schemas::voxel::entity::{BlockEntityList, EntityList};

use super::pipeline::{BiomeGen, TerrainCompositionGen, TerrainHeightGen};
use crate::config::{InvalidConfig, Selector};
use crate::prelude::*;

/// The water surface level of the world, in blocks.
pub const SEA_LEVEL: i32 = 62;

/// Depth of the dirt bed beneath the surface block, in blocks.
const DIRT_DEPTH: i32 = 4;

/// Depth of the sand cover in sandy biomes, in blocks.
const SAND_DEPTH: i32 = 3;

/// Fills every cell up to the surface with one block type, for pipeline debugging.
/// Selector: `debug[:<block>]`, default stone.
pub struct DebugCompositionGen {
    block: BlockTypeId,
}

impl DebugCompositionGen {
    /// Constructs a generator filling terrain with the given block.
    pub fn new(block: BlockTypeId) -> Self {
        Self { block }
    }

    pub(crate) fn from_selector(selector: &Selector) -> Result<Self, InvalidConfig> {
        let block = match &selector.arg {
            Some(arg) => blocks::by_name(arg).ok_or_else(|| InvalidConfig::BadSelectorArgument {
                selector: selector.to_string(),
                reason: format!("{arg:?} is not a block name"),
            })?,
            None => blocks::STONE,
        };
        Ok(Self::new(block))
    }
}

impl TerrainCompositionGen for DebugCompositionGen {
    fn compose_terrain(
        &self,
        _pos: AbsChunkPos,
        heights: &HeightMap,
        _biome_gen: &dyn BiomeGen,
        _height_gen: &dyn TerrainHeightGen,
        blocks: &mut BlockTypes,
        _metas: &mut BlockNibbles,
        _entities: &mut EntityList,
        _block_entities: &mut BlockEntityList,
    ) -> Result<()> {
        for z in 0..CHUNK_DIM {
            for x in 0..CHUNK_DIM {
                let surface = heights.get(x, z) as i32;
                for y in 0..=surface {
                    blocks.set(x, y, z, self.block);
                }
            }
        }
        Ok(())
    }
}

/// The classic composition: a bedrock floor, a stone body, a bed of dirt under a per-biome
/// surface block (grass on land, sand in sandy biomes, gravel under water), with water filling
/// columns up to sea level and ice sealing it in frozen biomes. Selector: `classic`.
pub struct ClassicCompositionGen;

impl ClassicCompositionGen {
    /// Constructs the classic composition.
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClassicCompositionGen {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainCompositionGen for ClassicCompositionGen {
    fn compose_terrain(
        &self,
        pos: AbsChunkPos,
        heights: &HeightMap,
        biome_gen: &dyn BiomeGen,
        _height_gen: &dyn TerrainHeightGen,
        blocks: &mut BlockTypes,
        _metas: &mut BlockNibbles,
        _entities: &mut EntityList,
        _block_entities: &mut BlockEntityList,
    ) -> Result<()> {
        let mut biomes = BiomeMap::default();
        biome_gen.gen_biomes(pos, &mut biomes)?;

        for z in 0..CHUNK_DIM {
            for x in 0..CHUNK_DIM {
                let biome = biomes.get(x, z);
                let surface = heights.get(x, z) as i32;

                for y in 1..surface {
                    blocks.set(x, y, z, blocks::STONE);
                }
                for y in (surface - DIRT_DEPTH).max(1)..surface {
                    blocks.set(x, y, z, blocks::DIRT);
                }
                if biome.is_sandy() {
                    for y in (surface - SAND_DEPTH + 1).max(1)..=surface {
                        blocks.set(x, y, z, blocks::SAND);
                    }
                } else if surface < SEA_LEVEL {
                    blocks.set(x, surface, z, blocks::GRAVEL);
                } else {
                    blocks.set(x, surface, z, blocks::GRASS);
                }
                blocks.set(x, 0, z, blocks::BEDROCK);

                if surface < SEA_LEVEL {
                    for y in (surface + 1)..=SEA_LEVEL {
                        blocks.set(x, y, z, blocks::WATER);
                    }
                    if biome.is_frozen() {
                        blocks.set(x, SEA_LEVEL, z, blocks::ICE);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cb_schemas::coordinates::CHUNK_HEIGHT;
    use cb_schemas::voxel::biome::Biome;

    use super::super::biome::ConstantBiomeGen;
    use super::super::height::FlatHeightGen;
    use super::*;

    fn compose(biome: Biome, surface: i16) -> BlockTypes {
        let biome_gen = ConstantBiomeGen::new(biome);
        let height_gen = FlatHeightGen::new(surface);
        let heights = HeightMap::filled(surface);
        let mut blocks = BlockTypes::default();
        let mut metas = BlockNibbles::default();
        let mut entities = EntityList::new();
        let mut block_entities = BlockEntityList::new();
        ClassicCompositionGen::new()
            .compose_terrain(
                AbsChunkPos::ZERO,
                &heights,
                &biome_gen,
                &height_gen,
                &mut blocks,
                &mut metas,
                &mut entities,
                &mut block_entities,
            )
            .unwrap();
        blocks
    }

    #[test]
    fn dry_plains_column() {
        let chunk = compose(Biome::Plains, 64);
        assert_eq!(chunk.get(0, 0, 0), blocks::BEDROCK);
        assert_eq!(chunk.get(0, 1, 0), blocks::STONE);
        assert_eq!(chunk.get(0, 59, 0), blocks::STONE);
        for y in 60..64 {
            assert_eq!(chunk.get(0, y, 0), blocks::DIRT, "y={y}");
        }
        assert_eq!(chunk.get(0, 64, 0), blocks::GRASS);
        assert_eq!(chunk.get(0, 65, 0), blocks::AIR);
        assert_eq!(chunk.get(0, CHUNK_HEIGHT - 1, 0), blocks::AIR);
    }

    #[test]
    fn ocean_column_fills_with_water() {
        let chunk = compose(Biome::Ocean, 40);
        assert_eq!(chunk.get(3, 35, 3), blocks::STONE);
        for y in 36..40 {
            assert_eq!(chunk.get(3, y, 3), blocks::DIRT, "y={y}");
        }
        assert_eq!(chunk.get(3, 40, 3), blocks::GRAVEL);
        for y in 41..=SEA_LEVEL {
            assert_eq!(chunk.get(3, y, 3), blocks::WATER, "y={y}");
        }
        assert_eq!(chunk.get(3, SEA_LEVEL + 1, 3), blocks::AIR);
    }

    #[test]
    fn frozen_ocean_is_capped_with_ice() {
        let chunk = compose(Biome::FrozenOcean, 40);
        assert_eq!(chunk.get(8, SEA_LEVEL, 8), blocks::ICE);
        assert_eq!(chunk.get(8, SEA_LEVEL - 1, 8), blocks::WATER);
    }

    #[test]
    fn desert_surface_is_sand() {
        let chunk = compose(Biome::Desert, 70);
        for y in 68..=70 {
            assert_eq!(chunk.get(5, y, 5), blocks::SAND, "y={y}");
        }
        for y in 66..68 {
            assert_eq!(chunk.get(5, y, 5), blocks::DIRT, "y={y}");
        }
        assert_eq!(chunk.get(5, 65, 5), blocks::STONE);
        assert_eq!(chunk.get(5, 71, 5), blocks::AIR);
    }

    #[test]
    fn bedrock_floors_every_column() {
        for biome in [Biome::Plains, Biome::Ocean, Biome::Desert, Biome::FrozenOcean] {
            let chunk = compose(biome, 64);
            for z in 0..CHUNK_DIM {
                for x in 0..CHUNK_DIM {
                    assert_eq!(chunk.get(x, 0, z), blocks::BEDROCK, "{biome} ({x}, 0, {z})");
                }
            }
        }
    }

    #[test]
    fn debug_selector_parses_block_names() {
        assert!(DebugCompositionGen::from_selector(&Selector::parse("debug:sand")).is_ok());
        assert!(DebugCompositionGen::from_selector(&Selector::parse("debug:kryptonite")).is_err());
    }
}
