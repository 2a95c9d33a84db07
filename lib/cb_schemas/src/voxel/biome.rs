//! The stable biome tag vocabulary and the per-chunk biome map.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinates::{column_index, CHUNK_AREAZ};

/// An ecological tag assigned to every block column, influencing terrain shape and composition.
///
/// The numeric codes are stable and match the biome codes of the map transfer protocol.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Biome {
    Ocean = 0,
    #[default]
    Plains = 1,
    Desert = 2,
    ExtremeHills = 3,
    Forest = 4,
    Taiga = 5,
    Swampland = 6,
    River = 7,
    FrozenOcean = 10,
    FrozenRiver = 11,
    IcePlains = 12,
    IceMountains = 13,
    MushroomIsland = 14,
    MushroomShore = 15,
    Beach = 16,
    DesertHills = 17,
    ForestHills = 18,
    TaigaHills = 19,
    ExtremeHillsEdge = 20,
    Jungle = 21,
    JungleHills = 22,
}

impl Biome {
    /// The stable protocol code of this biome.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Whether water surfaces freeze and snow settles in this biome.
    pub const fn is_frozen(self) -> bool {
        matches!(
            self,
            Biome::FrozenOcean | Biome::FrozenRiver | Biome::IcePlains | Biome::IceMountains
        )
    }

    /// Whether the surface cover is sand instead of grass.
    pub const fn is_sandy(self) -> bool {
        matches!(self, Biome::Desert | Biome::DesertHills | Biome::Beach)
    }

    /// The canonical lowercase identifier used in configuration selectors.
    pub const fn name(self) -> &'static str {
        match self {
            Biome::Ocean => "ocean",
            Biome::Plains => "plains",
            Biome::Desert => "desert",
            Biome::ExtremeHills => "extremehills",
            Biome::Forest => "forest",
            Biome::Taiga => "taiga",
            Biome::Swampland => "swampland",
            Biome::River => "river",
            Biome::FrozenOcean => "frozenocean",
            Biome::FrozenRiver => "frozenriver",
            Biome::IcePlains => "iceplains",
            Biome::IceMountains => "icemountains",
            Biome::MushroomIsland => "mushroomisland",
            Biome::MushroomShore => "mushroomshore",
            Biome::Beach => "beach",
            Biome::DesertHills => "deserthills",
            Biome::ForestHills => "foresthills",
            Biome::TaigaHills => "taigahills",
            Biome::ExtremeHillsEdge => "extremehillsedge",
            Biome::Jungle => "jungle",
            Biome::JungleHills => "junglehills",
        }
    }
}

impl Display for Biome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a biome identifier in a configuration value is not recognized.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("Unknown biome name: {0:?}")]
pub struct UnknownBiomeError(pub String);

impl FromStr for Biome {
    type Err = UnknownBiomeError;

    /// Parses a case-insensitive biome identifier, with or without underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let biome = match folded.as_str() {
            "ocean" => Biome::Ocean,
            "plains" => Biome::Plains,
            "desert" => Biome::Desert,
            "extremehills" => Biome::ExtremeHills,
            "forest" => Biome::Forest,
            "taiga" => Biome::Taiga,
            "swampland" => Biome::Swampland,
            "river" => Biome::River,
            "frozenocean" => Biome::FrozenOcean,
            "frozenriver" => Biome::FrozenRiver,
            "iceplains" => Biome::IcePlains,
            "icemountains" => Biome::IceMountains,
            "mushroomisland" => Biome::MushroomIsland,
            "mushroomshore" => Biome::MushroomShore,
            "beach" => Biome::Beach,
            "deserthills" => Biome::DesertHills,
            "foresthills" => Biome::ForestHills,
            "taigahills" => Biome::TaigaHills,
            "extremehillsedge" => Biome::ExtremeHillsEdge,
            "jungle" => Biome::Jungle,
            "junglehills" => Biome::JungleHills,
            _ => return Err(UnknownBiomeError(s.to_string())),
        };
        Ok(biome)
    }
}

/// One biome tag per block column of a chunk, in the canonical column ordering.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct BiomeMap([Biome; CHUNK_AREAZ]);

impl Default for BiomeMap {
    fn default() -> Self {
        Self([Biome::default(); CHUNK_AREAZ])
    }
}

impl BiomeMap {
    /// Constructs a map with every column set to the given biome.
    pub fn filled(biome: Biome) -> Self {
        Self([biome; CHUNK_AREAZ])
    }

    /// Returns the biome of the given in-chunk column.
    pub fn get(&self, x: i32, z: i32) -> Biome {
        self.0[column_index(x, z)]
    }

    /// Sets the biome of the given in-chunk column.
    pub fn set(&mut self, x: i32, z: i32, biome: Biome) {
        self.0[column_index(x, z)] = biome;
    }

    /// Overwrites every column with the given biome.
    pub fn fill(&mut self, biome: Biome) {
        self.0.fill(biome);
    }

    /// The raw column-ordered data.
    pub fn as_slice(&self) -> &[Biome] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("plains".parse::<Biome>(), Ok(Biome::Plains));
        assert_eq!("Plains".parse::<Biome>(), Ok(Biome::Plains));
        assert_eq!("ICE_PLAINS".parse::<Biome>(), Ok(Biome::IcePlains));
        assert_eq!("extreme_hills".parse::<Biome>(), Ok(Biome::ExtremeHills));
        assert!("atlantis".parse::<Biome>().is_err());
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(Biome::Ocean.code(), 0);
        assert_eq!(Biome::Plains.code(), 1);
        assert_eq!(Biome::JungleHills.code(), 22);
    }

    #[test]
    fn map_roundtrip() {
        let mut map = BiomeMap::default();
        assert_eq!(map.get(3, 7), Biome::Plains);
        map.set(3, 7, Biome::Desert);
        assert_eq!(map.get(3, 7), Biome::Desert);
        assert_eq!(map.get(7, 3), Biome::Plains);
    }
}
