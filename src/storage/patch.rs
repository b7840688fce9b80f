//! A connected region of storage tiles with its inventory and connectors

use crate::connector::role::Role;
use crate::connector::set::ConnectorSet;
use crate::host::interface::{EntityHandle, ItemKind};
use crate::spatial::key::TileKey;
use crate::storage::inventory::Inventory;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Patch identifier, unique per surface and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatchId(pub u64);

impl fmt::Display for PatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-kind capacity overrides read from disabled scanners
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLimits {
    /// Explicit maximum per item kind
    pub item_maxima: BTreeMap<ItemKind, u32>,
    /// Maximum for kinds without an explicit entry, `None` when unlimited
    pub default_maximum: Option<u32>,
}

impl ItemLimits {
    /// No limits beyond total capacity
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Resolved maximum for one kind
    pub fn maximum_for(&self, kind: &ItemKind) -> Option<u32> {
        self.item_maxima
            .get(kind)
            .copied()
            .or(self.default_maximum)
    }
}

/// One maximal 4-connected region of storage tiles
///
/// The tile set is never empty while the patch is registered with its
/// surface. Tile membership is only changed by the topology engine so the
/// surface lookup stays consistent with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    id: PatchId,
    tiles: BTreeSet<TileKey>,
    inventory: Inventory,
    limits: ItemLimits,
    connectors: ConnectorSet,
}

impl Patch {
    pub(crate) fn new(id: PatchId) -> Self {
        Self {
            id,
            tiles: BTreeSet::new(),
            inventory: Inventory::new(),
            limits: ItemLimits::unlimited(),
            connectors: ConnectorSet::new(),
        }
    }

    /// Patch identifier
    pub const fn id(&self) -> PatchId {
        self.id
    }

    /// Footprint in key order
    pub const fn tiles(&self) -> &BTreeSet<TileKey> {
        &self.tiles
    }

    /// Number of tiles in the footprint
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the footprint contains a tile
    pub fn contains(&self, key: TileKey) -> bool {
        self.tiles.contains(&key)
    }

    /// Stored items
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Mutable access to stored items
    ///
    /// Capacity is not checked here; it only gates connector transfers.
    pub const fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Total number of stored items
    pub const fn item_count(&self) -> u64 {
        self.inventory.total()
    }

    /// Current per-kind limits
    pub const fn limits(&self) -> &ItemLimits {
        &self.limits
    }

    pub(crate) fn set_limits(&mut self, limits: ItemLimits) {
        self.limits = limits;
    }

    /// Attached connectors
    pub const fn connectors(&self) -> &ConnectorSet {
        &self.connectors
    }

    pub(crate) const fn connectors_mut(&mut self) -> &mut ConnectorSet {
        &mut self.connectors
    }

    /// Total capacity for a given per-tile capacity
    pub fn max_items(&self, tile_capacity: u32) -> u64 {
        self.tile_count() as u64 * u64::from(tile_capacity)
    }

    /// Remaining total capacity, zero when over capacity
    pub fn free_capacity(&self, tile_capacity: u32) -> u64 {
        self.max_items(tile_capacity).saturating_sub(self.item_count())
    }

    /// How many items of `kind` a transfer may add right now
    pub fn acceptable(&self, kind: &ItemKind, tile_capacity: u32) -> u32 {
        let total_room = u32::try_from(self.free_capacity(tile_capacity)).unwrap_or(u32::MAX);
        let kind_room = self
            .limits
            .maximum_for(kind)
            .map_or(u32::MAX, |maximum| {
                maximum.saturating_sub(self.inventory.count(kind))
            });
        total_room.min(kind_room)
    }

    pub(crate) fn insert_tile(&mut self, key: TileKey) -> bool {
        self.tiles.insert(key)
    }

    /// Drop a tile and every connector filed on it
    pub(crate) fn remove_tile(&mut self, key: TileKey) -> Vec<(Role, EntityHandle)> {
        self.tiles.remove(&key);
        self.connectors.remove_tile(key)
    }

    /// Take over another patch's tiles, items and connectors
    pub(crate) fn absorb(&mut self, other: Self) {
        self.tiles.extend(other.tiles);
        self.inventory.absorb(other.inventory);
        self.connectors.absorb(other.connectors);
    }

    /// Move `keys` and their connectors into a new patch without items
    pub(crate) fn carve(&mut self, id: PatchId, keys: &BTreeSet<TileKey>) -> Self {
        let mut fragment = Self::new(id);
        self.tiles.retain(|key| !keys.contains(key));
        fragment.tiles.clone_from(keys);
        fragment.connectors = self.connectors.split_off(keys);
        fragment
    }
}
