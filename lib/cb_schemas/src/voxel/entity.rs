//! Entity and block entity records produced alongside generated terrain.

use bevy_math::IVec3;
use serde::{Deserialize, Serialize};

/// A mob or item spawned together with generated terrain.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct EntityRecord {
    /// The entity kind identifier.
    pub kind: String,
    /// The absolute block position the entity spawns at.
    pub position: IVec3,
}

/// A voxel with associated structured data (a chest, a furnace, ...).
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct BlockEntityRecord {
    /// The block entity kind identifier.
    pub kind: String,
    /// The absolute block position of the owning voxel.
    pub position: IVec3,
}

/// An ordered, mutable sequence of entity records; stages may append or remove entries.
pub type EntityList = Vec<EntityRecord>;

/// An ordered, mutable sequence of block entity records; stages may append or remove entries.
pub type BlockEntityList = Vec<BlockEntityRecord>;
