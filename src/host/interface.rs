//! Capability contracts consumed from the host simulation
//!
//! Storage never owns host entities. It holds [`EntityHandle`]s and asks the
//! host through these traits every time it needs one, so a handle whose
//! entity was destroyed behind our back simply stops resolving.

use crate::spatial::key::TilePos;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an independent coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

/// Non-owning reference to a host entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle(pub u64);

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Name of an item kind as the host reports it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKind(pub String);

impl ItemKind {
    /// Create an item kind from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The item name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A quantity of one item kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item kind
    pub kind: ItemKind,
    /// Number of items
    pub count: u32,
}

impl ItemStack {
    /// Create a stack
    pub fn new(kind: impl Into<String>, count: u32) -> Self {
        Self {
            kind: ItemKind::new(kind),
            count,
        }
    }
}

/// Which way a loader moves items relative to the storage tile it sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderDirection {
    /// Items flow from the belt into storage
    Input,
    /// Items flow from storage onto the belt
    Output,
}

/// One of the two independent lanes of a transport line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    /// Left lane in the direction of travel
    Left,
    /// Right lane in the direction of travel
    Right,
}

impl Lane {
    /// Both lanes, left first
    pub const BOTH: [Self; 2] = [Self::Left, Self::Right];
}

/// Circuit signal identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalId {
    /// Signal named after an item
    Item(ItemKind),
    /// Host-defined virtual signal
    Virtual(String),
}

/// A signal value on a scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// What the value refers to
    pub id: SignalId,
    /// Signal value, may be negative
    pub count: i64,
}

impl Signal {
    /// Signal carrying an item count
    pub fn item(kind: ItemKind, count: i64) -> Self {
        Self {
            id: SignalId::Item(kind),
            count,
        }
    }

    /// Virtual signal
    pub fn virtual_signal(name: &str, count: i64) -> Self {
        Self {
            id: SignalId::Virtual(name.to_string()),
            count,
        }
    }
}

/// Properties of an entity that decide its connector role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityInfo {
    /// Host prototype name, matched against the connector registry
    pub name: String,
    /// Cell the entity occupies
    pub position: TilePos,
    /// Loader orientation, `None` for other entity types
    pub loader_direction: Option<LoaderDirection>,
}

/// Belt-side primitives of a loader
pub trait TransportLine {
    /// Item at the front of a lane, if any
    fn peek_front(&self, lane: Lane) -> Option<ItemKind>;

    /// Remove one item of `kind` from a lane, returning whether it was taken
    fn remove_item(&mut self, lane: Lane, kind: &ItemKind) -> bool;

    /// Append one item of `kind` to a lane, returning whether there was room
    fn insert_at_back(&mut self, lane: Lane, kind: &ItemKind) -> bool;

    /// Item kinds the loader is restricted to, empty when unfiltered
    fn filters(&self) -> Vec<ItemKind>;
}

/// Inventory primitives of a chest connector
pub trait ChestInventory {
    /// Snapshot of everything the chest holds
    fn contents(&self) -> Vec<ItemStack>;

    /// Insert up to `count` items, returning how many were accepted
    fn insert(&mut self, kind: &ItemKind, count: u32) -> u32;

    /// Remove up to `count` items, returning how many were taken
    fn remove(&mut self, kind: &ItemKind, count: u32) -> u32;

    /// Per-slot request descriptors (kind and wanted total)
    fn requests(&self) -> Vec<ItemStack>;
}

/// Signal and control primitives of a scanner
pub trait ScannerControl {
    /// Enabled scanners report, disabled ones configure limits
    fn is_enabled(&self) -> bool;

    /// Signals currently set on the scanner
    fn signals(&self) -> Vec<Signal>;

    /// Replace the scanner's output signals
    fn set_signals(&mut self, signals: Vec<Signal>);

    /// Maximum number of signals the scanner can hold
    fn slot_count(&self) -> usize;
}

/// Everything storage asks of the host simulation
pub trait Host {
    /// Whether the tile at `pos` is a storage tile
    fn is_storage_tile(&self, surface: SurfaceId, pos: TilePos) -> bool;

    /// Entities whose footprint covers the cell at `pos`
    fn entities_in_cell(&self, surface: SurfaceId, pos: TilePos) -> Vec<EntityHandle>;

    /// Current properties of an entity, `None` once it is no longer valid
    fn describe(&self, entity: EntityHandle) -> Option<EntityInfo>;

    /// Transport line behind a loader entity
    fn loader_mut(&mut self, entity: EntityHandle) -> Option<&mut dyn TransportLine>;

    /// Inventory behind a chest entity
    fn chest_mut(&mut self, entity: EntityHandle) -> Option<&mut dyn ChestInventory>;

    /// Read access to a scanner entity
    fn scanner(&self, entity: EntityHandle) -> Option<&dyn ScannerControl>;

    /// Write access to a scanner entity
    fn scanner_mut(&mut self, entity: EntityHandle) -> Option<&mut dyn ScannerControl>;
}
