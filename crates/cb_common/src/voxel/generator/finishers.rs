//! Builtin finish generators for small cosmetic surface touches.

use cb_schemas::coordinates::{AbsChunkPos, CHUNK_DIM, CHUNK_HEIGHT};
use cb_schemas::voxel::biome::{Biome, BiomeMap};
use cb_schemas::voxel::blocks;
use cb_schemas::voxel::chunk::{BlockNibbles, BlockTypes, HeightMap};
use cb_schemas::voxel::entity::{BlockEntityList, EntityList};
use cb_schemas::voxel::generation::PositionalRandomFactory;
use rand::Rng;

use super::composition::SEA_LEVEL;
use super::pipeline::FinishGen;
use crate::prelude::*;

const TALL_GRASS_SALT: u64 = 0x4752_4153;

/// The meta nibble of the grassy tall grass variant.
const TALL_GRASS_META: u8 = 1;

/// Covers dry surfaces of frozen biomes with a thin snow layer. Selector: `snow`.
pub struct SnowFinisher;

impl SnowFinisher {
    /// Constructs the finisher.
    pub fn new() -> Self {
        Self
    }
}

impl Default for SnowFinisher {
    fn default() -> Self {
        Self::new()
    }
}

impl FinishGen for SnowFinisher {
    fn gen_finish(
        &self,
        _pos: AbsChunkPos,
        blocks: &mut BlockTypes,
        _metas: &mut BlockNibbles,
        heights: &mut HeightMap,
        biomes: &BiomeMap,
        _entities: &mut EntityList,
        _block_entities: &mut BlockEntityList,
    ) -> Result<()> {
        for z in 0..CHUNK_DIM {
            for x in 0..CHUNK_DIM {
                if !biomes.get(x, z).is_frozen() {
                    continue;
                }
                let surface = heights.get(x, z) as i32;
                if surface < SEA_LEVEL || surface + 1 >= CHUNK_HEIGHT {
                    continue;
                }
                let top = blocks.get(x, surface, z);
                if top == blocks::WATER || top == blocks::AIR {
                    continue;
                }
                if blocks.get(x, surface + 1, z) == blocks::AIR {
                    blocks.set(x, surface + 1, z, blocks::SNOW_LAYER);
                    heights.raise_to(x, z, (surface + 1) as i16);
                }
            }
        }
        Ok(())
    }
}

/// Scatters tall grass over grassy surfaces. Selector: `tallgrass`.
pub struct TallGrassFinisher {
    rand: PositionalRandomFactory,
}

impl TallGrassFinisher {
    /// Constructs the finisher for the given world seed.
    pub fn new(seed: i32) -> Self {
        Self {
            rand: PositionalRandomFactory::new(seed, TALL_GRASS_SALT),
        }
    }

    fn grows_in(biome: Biome) -> bool {
        matches!(
            biome,
            Biome::Plains
                | Biome::Forest
                | Biome::ForestHills
                | Biome::Swampland
                | Biome::Jungle
                | Biome::JungleHills
        )
    }
}

impl FinishGen for TallGrassFinisher {
    fn gen_finish(
        &self,
        pos: AbsChunkPos,
        blocks: &mut BlockTypes,
        metas: &mut BlockNibbles,
        heights: &mut HeightMap,
        biomes: &BiomeMap,
        _entities: &mut EntityList,
        _block_entities: &mut BlockEntityList,
    ) -> Result<()> {
        for z in 0..CHUNK_DIM {
            for x in 0..CHUNK_DIM {
                if !Self::grows_in(biomes.get(x, z)) {
                    continue;
                }
                let mut rng = self
                    .rand
                    .get_at_pos_i(pos.base_block_x() + x, 0, pos.base_block_z() + z);
                if !rng.gen_ratio(1, 8) {
                    continue;
                }
                let surface = heights.get(x, z) as i32;
                if surface + 1 >= CHUNK_HEIGHT || blocks.get(x, surface, z) != blocks::GRASS {
                    continue;
                }
                if blocks.get(x, surface + 1, z) == blocks::AIR {
                    blocks.set(x, surface + 1, z, blocks::TALL_GRASS);
                    metas.set(x, surface + 1, z, TALL_GRASS_META);
                    heights.raise_to(x, z, (surface + 1) as i16);
                }
            }
        }
        Ok(())
    }
}
