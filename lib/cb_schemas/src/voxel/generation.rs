//! Deterministic world generation randomness helpers.

use bevy_math::IVec3;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use crate::coordinates::AbsChunkPos;

/// Derives position-keyed random generators from a world seed and a per-user salt.
///
/// Every generator produced is a pure function of `(seed, salt, position)`, so stages sharing a
/// world seed stay decorrelated and repeated generation of a chunk replays identical decisions.
#[derive(Copy, Clone, Debug)]
pub struct PositionalRandomFactory {
    seed: u64,
    salt: u64,
}

impl PositionalRandomFactory {
    /// Constructs a factory for the given world seed and stage salt.
    pub const fn new(seed: i32, salt: u64) -> Self {
        Self {
            seed: seed as u64,
            salt,
        }
    }

    /// Get a new random from this position.
    pub fn get_at_pos(&self, pos: IVec3) -> Xoshiro256StarStar {
        let mut state = self.seed ^ self.salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        state = state
            .wrapping_mul(0x517C_C1B7_2722_0A95)
            .wrapping_add((pos.x as u64).wrapping_mul(0xA076_1D64_78BD_642F));
        state = state
            .wrapping_mul(0x2545_F491_4F6C_DD1D)
            .wrapping_add((pos.y as u64).wrapping_mul(0xE703_7ED1_A0B4_28DB));
        state = state
            .wrapping_mul(0x8CB9_2BA7_2F3D_8DD7)
            .wrapping_add((pos.z as u64).wrapping_mul(0xD6E8_FEB8_6659_FD93));
        Xoshiro256StarStar::seed_from_u64(state)
    }

    /// Get a new random from this position.
    pub fn get_at_pos_i(&self, x: i32, y: i32, z: i32) -> Xoshiro256StarStar {
        self.get_at_pos(IVec3::new(x, y, z))
    }

    /// Get a new random keyed on a whole chunk column.
    pub fn get_at_chunk(&self, pos: AbsChunkPos) -> Xoshiro256StarStar {
        self.get_at_pos(IVec3::new(pos.x, 0, pos.z))
    }
}
