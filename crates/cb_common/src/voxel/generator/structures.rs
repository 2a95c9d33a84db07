//! Builtin structure generators: ore nests and trees.

use cb_schemas::coordinates::{AbsChunkPos, CHUNK_DIM, CHUNK_HEIGHT};
use cb_schemas::voxel::blocks::{self, BlockTypeId};
use cb_schemas::voxel::chunk::{BlockNibbles, BlockTypes, HeightMap};
use cb_schemas::voxel::entity::{BlockEntityList, EntityList};
use cb_schemas::voxel::generation::PositionalRandomFactory;
use itertools::iproduct;
use rand::Rng;
use smallvec::SmallVec;

use super::composition::SEA_LEVEL;
use super::pipeline::StructureGen;
use crate::prelude::*;

const ORE_SALT: u64 = 0x4F52_4553;
const TREE_SALT: u64 = 0x5452_4545;

/// Placement parameters of one ore kind.
struct OreKind {
    block: BlockTypeId,
    nests_per_chunk: i32,
    nest_size: i32,
    max_height: i32,
}

/// Nest counts, sizes and depth limits per ore kind.
const ORE_TABLE: &[OreKind] = &[
    OreKind { block: blocks::COAL_ORE, nests_per_chunk: 20, nest_size: 16, max_height: 128 },
    OreKind { block: blocks::IRON_ORE, nests_per_chunk: 20, nest_size: 8, max_height: 64 },
    OreKind { block: blocks::GOLD_ORE, nests_per_chunk: 2, nest_size: 8, max_height: 32 },
    OreKind { block: blocks::REDSTONE_ORE, nests_per_chunk: 8, nest_size: 7, max_height: 16 },
    OreKind { block: blocks::DIAMOND_ORE, nests_per_chunk: 1, nest_size: 7, max_height: 16 },
    OreKind { block: blocks::LAPIS_ORE, nests_per_chunk: 1, nest_size: 6, max_height: 32 },
];

/// Seeds ore nests into the stone body of a chunk. Selector: `orenests`.
///
/// Each nest is a short random walk that converts stone cells to the ore, so nests never bleed
/// into caves, water or the surface cover.
pub struct OreNestGen {
    rand: PositionalRandomFactory,
}

impl OreNestGen {
    /// Constructs the generator for the given world seed.
    pub fn new(seed: i32) -> Self {
        Self {
            rand: PositionalRandomFactory::new(seed, ORE_SALT),
        }
    }
}

impl StructureGen for OreNestGen {
    fn gen_structures(
        &self,
        pos: AbsChunkPos,
        blocks: &mut BlockTypes,
        _metas: &mut BlockNibbles,
        _heights: &mut HeightMap,
        _entities: &mut EntityList,
        _block_entities: &mut BlockEntityList,
    ) -> Result<()> {
        for ore in ORE_TABLE {
            // one random stream per (chunk, ore kind)
            let mut rng = self.rand.get_at_pos_i(pos.x, ore.block as i32, pos.z);
            for _ in 0..ore.nests_per_chunk {
                let mut x = rng.gen_range(0..CHUNK_DIM);
                let mut z = rng.gen_range(0..CHUNK_DIM);
                let mut y = rng.gen_range(1..ore.max_height);
                for _ in 0..ore.nest_size {
                    if blocks.get(x, y, z) == blocks::STONE {
                        blocks.set(x, y, z, ore.block);
                    }
                    match rng.gen_range(0..6) {
                        0 => x = (x + 1).min(CHUNK_DIM - 1),
                        1 => x = (x - 1).max(0),
                        2 => y = (y + 1).min(CHUNK_HEIGHT - 1),
                        3 => y = (y - 1).max(1),
                        4 => z = (z + 1).min(CHUNK_DIM - 1),
                        _ => z = (z - 1).max(0),
                    }
                }
            }
        }
        Ok(())
    }
}

/// Grows simple log-and-leaves trees on grassy surfaces. Selector: `trees`.
pub struct TreeGen {
    rand: PositionalRandomFactory,
}

impl TreeGen {
    /// Constructs the generator for the given world seed.
    pub fn new(seed: i32) -> Self {
        Self {
            rand: PositionalRandomFactory::new(seed, TREE_SALT),
        }
    }
}

impl StructureGen for TreeGen {
    fn gen_structures(
        &self,
        pos: AbsChunkPos,
        blocks: &mut BlockTypes,
        _metas: &mut BlockNibbles,
        heights: &mut HeightMap,
        _entities: &mut EntityList,
        _block_entities: &mut BlockEntityList,
    ) -> Result<()> {
        let mut rng = self.rand.get_at_chunk(pos);
        let tree_count = rng.gen_range(1..=2);

        let mut spots: SmallVec<[(i32, i32); 4]> = SmallVec::new();
        for _ in 0..tree_count {
            spots.push((rng.gen_range(0..CHUNK_DIM), rng.gen_range(0..CHUNK_DIM)));
        }

        for (x, z) in spots {
            let surface = heights.get(x, z) as i32;
            if blocks.get(x, surface, z) != blocks::GRASS || surface < SEA_LEVEL {
                continue;
            }
            let trunk_height = rng.gen_range(4..=6);
            if surface + trunk_height + 2 >= CHUNK_HEIGHT {
                continue;
            }

            for y in (surface + 1)..=(surface + trunk_height) {
                blocks.set(x, y, z, blocks::LOG);
                heights.raise_to(x, z, y as i16);
            }

            let canopy_y = surface + trunk_height;
            for (dx, dy, dz) in iproduct!(-2..=2, -1..=2, -2..=2) {
                if dx * dx + dy * dy + dz * dz > 5 {
                    continue;
                }
                let (lx, ly, lz) = (x + dx, canopy_y + dy, z + dz);
                if lx < 0 || lx >= CHUNK_DIM || lz < 0 || lz >= CHUNK_DIM || ly >= CHUNK_HEIGHT {
                    continue;
                }
                if blocks.get(lx, ly, lz) != blocks::AIR {
                    continue;
                }
                blocks.set(lx, ly, lz, blocks::LEAVES);
                heights.raise_to(lx, lz, ly as i16);
            }
        }
        Ok(())
    }
}
