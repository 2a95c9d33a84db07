//! Builtin terrain height generators.

use cb_schemas::coordinates::{AbsChunkPos, CHUNK_DIM, CHUNK_HEIGHT};
use cb_schemas::voxel::biome::{Biome, BiomeMap};
use cb_schemas::voxel::chunk::HeightMap;
use noise::{Fbm, MultiFractal, NoiseFn, OpenSimplex};

use super::pipeline::{BiomeGen, TerrainHeightGen};
use crate::config::{InvalidConfig, Selector};
use crate::prelude::*;

/// Radius, in columns, of the biome window averaged into each column's terrain shape.
const AVERAGING_RADIUS: i32 = 4;

/// Produces the same surface height everywhere. Selector: `flat[:<height>]`, default 64.
pub struct FlatHeightGen {
    height: i16,
}

impl FlatHeightGen {
    /// Constructs a generator producing the given uniform height.
    pub fn new(height: i16) -> Self {
        Self { height }
    }

    pub(crate) fn from_selector(selector: &Selector) -> Result<Self, InvalidConfig> {
        let height = match &selector.arg {
            Some(arg) => arg
                .parse::<i16>()
                .ok()
                .filter(|h| (0..CHUNK_HEIGHT as i16).contains(h))
                .ok_or_else(|| InvalidConfig::BadSelectorArgument {
                    selector: selector.to_string(),
                    reason: format!("{arg:?} is not a height in 0..{CHUNK_HEIGHT}"),
                })?,
            None => 64,
        };
        Ok(Self::new(height))
    }
}

impl TerrainHeightGen for FlatHeightGen {
    fn gen_height_map(&self, _pos: AbsChunkPos, _biome_gen: &dyn BiomeGen, heights: &mut HeightMap) -> Result<()> {
        *heights = HeightMap::filled(self.height);
        Ok(())
    }
}

/// Biome-shaped noise heights. Selector: `noise`.
///
/// Each column's base level and amplitude come from its biome, averaged over a window that may
/// reach into the neighboring chunks' biome maps, so heights blend smoothly across biome borders
/// and chunk seams.
pub struct NoiseHeightGen {
    terrain_noise: Fbm<OpenSimplex>,
}

impl NoiseHeightGen {
    /// Constructs the terrain noise field from the world seed.
    pub fn new(seed: i32) -> Self {
        let terrain_noise = Fbm::<OpenSimplex>::new(seed as u32)
            .set_octaves(4)
            .set_frequency(1.0 / 128.0);
        Self { terrain_noise }
    }

    /// Base surface level and noise amplitude of a biome, in blocks.
    fn biome_shape(biome: Biome) -> (f64, f64) {
        match biome {
            Biome::Ocean | Biome::FrozenOcean => (46.0, 6.0),
            Biome::River | Biome::FrozenRiver => (58.0, 2.0),
            Biome::Beach | Biome::MushroomShore => (63.0, 2.0),
            Biome::Swampland => (62.0, 3.0),
            Biome::Plains | Biome::IcePlains => (66.0, 5.0),
            Biome::Desert => (68.0, 6.0),
            Biome::MushroomIsland => (66.0, 6.0),
            Biome::Forest | Biome::Taiga => (70.0, 9.0),
            Biome::Jungle => (72.0, 10.0),
            Biome::DesertHills | Biome::ForestHills | Biome::TaigaHills | Biome::JungleHills => (80.0, 22.0),
            Biome::ExtremeHillsEdge => (82.0, 26.0),
            Biome::IceMountains => (86.0, 30.0),
            Biome::ExtremeHills => (92.0, 38.0),
        }
    }
}

impl TerrainHeightGen for NoiseHeightGen {
    fn gen_height_map(&self, pos: AbsChunkPos, biome_gen: &dyn BiomeGen, heights: &mut HeightMap) -> Result<()> {
        // Biome maps of the 3x3 chunk neighborhood; the averaging window below never reaches
        // further than one chunk out.
        let mut neighborhood: Vec<BiomeMap> = Vec::with_capacity(9);
        for dz in -1..=1 {
            for dx in -1..=1 {
                let mut map = BiomeMap::default();
                biome_gen.gen_biomes(AbsChunkPos::new(pos.x + dx, pos.z + dz), &mut map)?;
                neighborhood.push(map);
            }
        }
        let biome_at = |local_x: i32, local_z: i32| -> Biome {
            let cx = local_x.div_euclid(CHUNK_DIM);
            let cz = local_z.div_euclid(CHUNK_DIM);
            let map = &neighborhood[((cz + 1) * 3 + (cx + 1)) as usize];
            map.get(local_x.rem_euclid(CHUNK_DIM), local_z.rem_euclid(CHUNK_DIM))
        };

        for z in 0..CHUNK_DIM {
            for x in 0..CHUNK_DIM {
                let mut base = 0.0;
                let mut amplitude = 0.0;
                for wz in -AVERAGING_RADIUS..=AVERAGING_RADIUS {
                    for wx in -AVERAGING_RADIUS..=AVERAGING_RADIUS {
                        let (b, a) = Self::biome_shape(biome_at(x + wx, z + wz));
                        base += b;
                        amplitude += a;
                    }
                }
                let window = (2 * AVERAGING_RADIUS + 1).pow(2) as f64;
                base /= window;
                amplitude /= window;

                let point = [
                    (pos.base_block_x() + x) as f64,
                    (pos.base_block_z() + z) as f64,
                ];
                let height = base + amplitude * self.terrain_noise.get(point);
                let height = (height.round() as i32).clamp(1, CHUNK_HEIGHT - 1);
                heights.set(x, z, height as i16);
            }
        }
        Ok(())
    }
}
