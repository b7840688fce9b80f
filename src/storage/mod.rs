//! Patches, surfaces and the topology engine that keeps them partitioned

/// Item counts with a cached total
pub mod inventory;
/// Connected tile regions with inventory, limits and connectors
pub mod patch;
/// Process-wide state and host event handlers
pub mod store;
/// Per-surface patch table and tile lookup
pub mod surface;
/// Tile placement, removal, merging and splitting
pub mod topology;

pub use patch::{Patch, PatchId};
pub use store::Store;
pub use surface::Surface;
