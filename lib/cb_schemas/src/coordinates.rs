//! Strongly typed chunk coordinates, the chunk dimension constants and the canonical cell
//! ordering shared by the map data and the network protocol.

use std::fmt::{Display, Formatter};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the X and Z sides of a chunk column, in blocks
pub const CHUNK_DIM: i32 = 16;
/// Length of the X and Z sides of a chunk column, in blocks
pub const CHUNK_DIMZ: usize = CHUNK_DIM as usize;
/// Height of a chunk column, in blocks
pub const CHUNK_HEIGHT: i32 = 256;
/// Height of a chunk column, in blocks
pub const CHUNK_HEIGHTZ: usize = CHUNK_HEIGHT as usize;
/// Number of block columns on the face of a chunk
pub const CHUNK_AREA: i32 = CHUNK_DIM * CHUNK_DIM;
/// Number of block columns on the face of a chunk
pub const CHUNK_AREAZ: usize = (CHUNK_DIM * CHUNK_DIM) as usize;
/// Number of blocks in the volume of a chunk
pub const CHUNK_VOLUME: i32 = CHUNK_AREA * CHUNK_HEIGHT;
/// Number of blocks in the volume of a chunk
pub const CHUNK_VOLUMEZ: usize = (CHUNK_AREA * CHUNK_HEIGHT) as usize;

// Nibble arrays store two cells per byte.
static_assertions::const_assert_eq!(CHUNK_VOLUMEZ % 2, 0);
static_assertions::const_assert!(CHUNK_HEIGHT <= i16::MAX as i32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[error("Given coordinates were outside of chunk boundaries: ({0}, {1}, {2})")]
/// Error when the given block coordinates are outside of the chunk boundary.
pub struct InChunkBoundsError(pub i32, pub i32, pub i32);

/// An absolute chunk column position in a voxel world.
///
/// Chunks are columnar: the pair addresses the full vertical extent of the world.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct AbsChunkPos {
    /// The chunk X coordinate
    pub x: i32,
    /// The chunk Z coordinate
    pub z: i32,
}

impl AbsChunkPos {
    /// (0, 0)
    pub const ZERO: Self = Self::new(0, 0);

    /// Constructs a new [`Self`] from the given chunk coordinates.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts absolute block coordinates to the position of the chunk owning that block.
    /// Correctly rounds towards negative infinity for negative coordinates.
    pub const fn from_block_coords(block_x: i32, block_z: i32) -> Self {
        Self::new(block_x.div_euclid(CHUNK_DIM), block_z.div_euclid(CHUNK_DIM))
    }

    /// The world block X coordinate of this chunk's (0, _, 0) corner.
    pub const fn base_block_x(&self) -> i32 {
        self.x * CHUNK_DIM
    }

    /// The world block Z coordinate of this chunk's (0, _, 0) corner.
    pub const fn base_block_z(&self) -> i32 {
        self.z * CHUNK_DIM
    }
}

impl Display for AbsChunkPos {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// The canonical column index inside a chunk, shared by the biome map, the height map and the
/// per-column block data ordering of the map transfer protocol.
pub const fn column_index(x: i32, z: i32) -> usize {
    (z as usize) * CHUNK_DIMZ + (x as usize)
}

/// Bounds-checked variant of [`column_index`].
pub const fn try_column_index(x: i32, z: i32) -> Result<usize, InChunkBoundsError> {
    if x < 0 || x >= CHUNK_DIM || z < 0 || z >= CHUNK_DIM {
        return Err(InChunkBoundsError(x, 0, z));
    }
    Ok(column_index(x, z))
}

/// The canonical dense cell index inside a chunk (X fastest, then Z, then Y).
pub const fn block_index(x: i32, y: i32, z: i32) -> usize {
    (y as usize) * CHUNK_AREAZ + (z as usize) * CHUNK_DIMZ + (x as usize)
}

/// Bounds-checked variant of [`block_index`].
pub const fn try_block_index(x: i32, y: i32, z: i32) -> Result<usize, InChunkBoundsError> {
    if x < 0 || x >= CHUNK_DIM || y < 0 || y >= CHUNK_HEIGHT || z < 0 || z >= CHUNK_DIM {
        return Err(InChunkBoundsError(x, y, z));
    }
    Ok(block_index(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_to_chunk_rounds_towards_negative_infinity() {
        assert_eq!(AbsChunkPos::from_block_coords(0, 0), AbsChunkPos::new(0, 0));
        assert_eq!(AbsChunkPos::from_block_coords(15, 15), AbsChunkPos::new(0, 0));
        assert_eq!(AbsChunkPos::from_block_coords(16, 31), AbsChunkPos::new(1, 1));
        assert_eq!(AbsChunkPos::from_block_coords(-1, -16), AbsChunkPos::new(-1, -1));
        assert_eq!(AbsChunkPos::from_block_coords(-17, -33), AbsChunkPos::new(-2, -3));
    }

    #[test]
    fn cell_ordering_is_x_fastest() {
        assert_eq!(column_index(0, 0), 0);
        assert_eq!(column_index(1, 0), 1);
        assert_eq!(column_index(0, 1), CHUNK_DIMZ);
        assert_eq!(block_index(0, 0, 0), 0);
        assert_eq!(block_index(1, 0, 0), 1);
        assert_eq!(block_index(0, 0, 1), CHUNK_DIMZ);
        assert_eq!(block_index(0, 1, 0), CHUNK_AREAZ);
        assert_eq!(block_index(15, 255, 15), CHUNK_VOLUMEZ - 1);
    }

    #[test]
    fn bounds_checks() {
        assert!(try_column_index(16, 0).is_err());
        assert!(try_column_index(0, -1).is_err());
        assert!(try_block_index(0, 256, 0).is_err());
        assert_eq!(try_block_index(3, 7, 9), Ok(block_index(3, 7, 9)));
    }
}
