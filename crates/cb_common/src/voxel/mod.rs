//! Voxel world engine subsystems.

pub mod generator;
