#![warn(missing_docs)]
#![deny(clippy::disallowed_types)]

//! A library crate of the in-memory representations of the game's core world data.

pub mod coordinates;
pub mod voxel;

/// Re-exported dependencies used in API types
pub mod dependencies {
    pub use bevy_math;
    pub use bytemuck;
    pub use rand;
    pub use rand_xoshiro;
    pub use serde;
    pub use thiserror;
}
