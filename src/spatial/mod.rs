//! Spatial primitives for the storage grid
//!
//! This module contains spatial-related functionality including:
//! - Tile coordinates and their persisted key encoding
//! - The eight-cell neighbourhood probe used after tile removal

/// Tile positions and the coordinate key codec
pub mod key;
/// Local connectivity heuristic around a removed tile
pub mod neighborhood;

pub use key::{TileKey, TilePos};
