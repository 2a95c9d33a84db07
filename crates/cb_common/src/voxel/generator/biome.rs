//! Builtin biome generators.

use bevy_math::DVec2;
use cb_schemas::coordinates::{AbsChunkPos, CHUNK_DIM};
use cb_schemas::voxel::biome::{Biome, BiomeMap};
use noise::{NoiseFn, OpenSimplex};

use super::pipeline::BiomeGen;
use crate::config::{InvalidConfig, Selector};
use crate::prelude::*;

/// Block-scale divisor applied to world coordinates before climate noise sampling.
const CLIMATE_NOISE_SCALE: f64 = 256.0;

/// Assigns one fixed biome to every column. Selector: `constant[:<biome>]`, default plains.
pub struct ConstantBiomeGen {
    biome: Biome,
}

impl ConstantBiomeGen {
    /// Constructs a generator producing only the given biome.
    pub fn new(biome: Biome) -> Self {
        Self { biome }
    }

    pub(crate) fn from_selector(selector: &Selector) -> Result<Self, InvalidConfig> {
        let biome = match &selector.arg {
            Some(arg) => arg.parse().map_err(|_| InvalidConfig::BadSelectorArgument {
                selector: selector.to_string(),
                reason: format!("{arg:?} is not a biome name"),
            })?,
            None => Biome::Plains,
        };
        Ok(Self::new(biome))
    }
}

impl BiomeGen for ConstantBiomeGen {
    fn gen_biomes(&self, _pos: AbsChunkPos, biomes: &mut BiomeMap) -> Result<()> {
        biomes.fill(self.biome);
        Ok(())
    }
}

/// Alternating ocean/plains squares of whole chunks, useful for debugging the later stages.
/// Selector: `checkerboard[:<square size in chunks>]`, default 4.
pub struct CheckerboardBiomeGen {
    size: i32,
}

impl CheckerboardBiomeGen {
    /// Constructs a generator with the given square size, in chunks.
    pub fn new(size: i32) -> Self {
        Self { size }
    }

    pub(crate) fn from_selector(selector: &Selector) -> Result<Self, InvalidConfig> {
        let size = match &selector.arg {
            Some(arg) => arg.parse().ok().filter(|size| *size > 0).ok_or_else(|| {
                InvalidConfig::BadSelectorArgument {
                    selector: selector.to_string(),
                    reason: format!("{arg:?} is not a positive square size"),
                }
            })?,
            None => 4,
        };
        Ok(Self::new(size))
    }
}

impl BiomeGen for CheckerboardBiomeGen {
    fn gen_biomes(&self, pos: AbsChunkPos, biomes: &mut BiomeMap) -> Result<()> {
        let cell = pos.x.div_euclid(self.size) + pos.z.div_euclid(self.size);
        let biome = if cell.rem_euclid(2) == 0 {
            Biome::Ocean
        } else {
            Biome::Plains
        };
        biomes.fill(biome);
        Ok(())
    }
}

/// Climate-noise biome generator: seeded elevation, temperature and moisture fields sampled per
/// column and classified into the biome table. Selector: `multinoise`.
pub struct MultiNoiseBiomeGen {
    elevation: OpenSimplex,
    temperature: OpenSimplex,
    moisture: OpenSimplex,
}

impl MultiNoiseBiomeGen {
    /// Constructs the climate fields from the world seed.
    pub fn new(seed: i32) -> Self {
        let seed = seed as u32;
        Self {
            elevation: OpenSimplex::new(seed),
            temperature: OpenSimplex::new(seed.wrapping_pow(2349).wrapping_add(1)),
            moisture: OpenSimplex::new(seed.wrapping_pow(3243).wrapping_add(2)),
        }
    }

    fn classify(elevation: f64, temperature: f64, moisture: f64) -> Biome {
        if elevation < -0.25 {
            return if temperature < -0.2 {
                Biome::FrozenOcean
            } else {
                Biome::Ocean
            };
        }
        if elevation < -0.2 {
            return Biome::Beach;
        }
        let hilly = elevation > 0.25;
        if temperature < -0.25 {
            return if hilly { Biome::IceMountains } else { Biome::IcePlains };
        }
        if temperature < -0.1 {
            return if hilly { Biome::TaigaHills } else { Biome::Taiga };
        }
        if temperature > 0.25 && moisture < -0.1 {
            return if hilly { Biome::DesertHills } else { Biome::Desert };
        }
        if temperature > 0.2 && moisture > 0.2 {
            return if hilly { Biome::JungleHills } else { Biome::Jungle };
        }
        if moisture > 0.1 {
            return if hilly { Biome::ForestHills } else { Biome::Forest };
        }
        if elevation > 0.35 {
            Biome::ExtremeHills
        } else if moisture > 0.0 && elevation < -0.1 {
            Biome::Swampland
        } else {
            Biome::Plains
        }
    }
}

impl BiomeGen for MultiNoiseBiomeGen {
    fn gen_biomes(&self, pos: AbsChunkPos, biomes: &mut BiomeMap) -> Result<()> {
        for z in 0..CHUNK_DIM {
            for x in 0..CHUNK_DIM {
                let point = DVec2::new(
                    (pos.base_block_x() + x) as f64,
                    (pos.base_block_z() + z) as f64,
                ) / CLIMATE_NOISE_SCALE;
                let elevation = self.elevation.get([point.x, point.y]);
                let temperature = self.temperature.get([point.x, point.y]);
                let moisture = self.moisture.get([point.x, point.y]);
                biomes.set(x, z, Self::classify(elevation, temperature, moisture));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_fills_uniformly() {
        let gen = ConstantBiomeGen::new(Biome::Taiga);
        let mut biomes = BiomeMap::default();
        gen.gen_biomes(AbsChunkPos::new(-3, 9), &mut biomes).unwrap();
        assert!(biomes.as_slice().iter().all(|&b| b == Biome::Taiga));
    }

    #[test]
    fn checkerboard_alternates_squares() {
        let gen = CheckerboardBiomeGen::new(2);
        let sample = |x, z| {
            let mut biomes = BiomeMap::default();
            gen.gen_biomes(AbsChunkPos::new(x, z), &mut biomes).unwrap();
            biomes.get(0, 0)
        };
        assert_eq!(sample(0, 0), sample(1, 1));
        assert_ne!(sample(0, 0), sample(2, 0));
        assert_ne!(sample(0, 0), sample(0, 2));
        // squares stay aligned across the origin
        assert_ne!(sample(0, 0), sample(-1, 0));
    }

    #[test]
    fn multinoise_is_deterministic_per_seed() {
        let gen = MultiNoiseBiomeGen::new(77);
        let again = MultiNoiseBiomeGen::new(77);
        let mut first = BiomeMap::default();
        let mut second = BiomeMap::default();
        gen.gen_biomes(AbsChunkPos::new(5, -11), &mut first).unwrap();
        again.gen_biomes(AbsChunkPos::new(5, -11), &mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn multinoise_varies_across_the_world() {
        // one chunk is usually uniform; a far-apart sample should eventually differ
        let gen = MultiNoiseBiomeGen::new(1);
        let mut seen = HashSet::new();
        for i in 0..64 {
            let mut biomes = BiomeMap::default();
            gen.gen_biomes(AbsChunkPos::new(i * 97, -i * 53), &mut biomes).unwrap();
            seen.insert(biomes.get(0, 0));
        }
        assert!(seen.len() > 1, "climate noise produced a single biome everywhere");
    }
}
