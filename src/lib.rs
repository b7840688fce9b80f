//! Incremental partition of a sparse tile grid into connected storage patches
//!
//! Each patch is a capacity-limited item reservoir spanning a 4-connected
//! region of storage tiles. Patches merge when a placed tile bridges them and
//! split when a removed tile disconnects them, carrying their inventory and
//! connectors along. A per-tick pass moves items between patches and the
//! loaders, chests and scanners standing on them.

#![forbid(unsafe_code)]

/// Connector classification and bookkeeping
pub mod connector;
/// Host simulation interface and an in-memory implementation
pub mod host;
/// Input/output operations, configuration and error handling
pub mod io;
/// Tile coordinates, the key codec and neighbourhood probing
pub mod spatial;
/// Patches, surfaces and the topology engine
pub mod storage;
/// Per-tick transfer engine
pub mod tick;

pub use io::error::{Result, StorageError};
