//! Per-surface registry of patches and the tile lookup
//!
//! The surface exclusively owns its patches. The lookup maps every storage
//! tile key to the id of the patch holding it and is kept exactly in sync
//! with the union of all tile sets.

use crate::host::interface::{Host, SurfaceId};
use crate::io::error::{Result, partition_violation};
use crate::spatial::key::{TileKey, TilePos};
use crate::storage::patch::{Patch, PatchId};
use crate::tick::signals::read_limits;
use std::collections::{BTreeMap, HashMap};

/// Storage state of one surface
#[derive(Debug, Clone)]
pub struct Surface {
    id: SurfaceId,
    next_id: u64,
    pub(crate) patches: BTreeMap<PatchId, Patch>,
    pub(crate) lookup: HashMap<TileKey, PatchId>,
}

impl Surface {
    /// Create an empty surface; the first patch gets id 1
    pub fn new(id: SurfaceId) -> Self {
        Self {
            id,
            next_id: 1,
            patches: BTreeMap::new(),
            lookup: HashMap::new(),
        }
    }

    /// Rebuild a surface from persisted patches
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `next_id` is zero or leaves no id to allocate
    /// - The patches overlap, are empty or carry ids at or above `next_id`
    /// - The patches do not form a valid partition
    pub fn restore(id: SurfaceId, next_id: u64, patches: Vec<Patch>) -> Result<Self> {
        if next_id == 0 || next_id == u64::MAX {
            return Err(partition_violation(
                id,
                &format!("next patch id {next_id} is outside the allocatable range"),
            ));
        }
        let mut surface = Self::new(id);
        surface.next_id = next_id;
        for patch in patches {
            if patch.id().0 >= next_id {
                return Err(partition_violation(
                    id,
                    &format!("patch {} was never allocated (next id {next_id})", patch.id()),
                ));
            }
            for &key in patch.tiles() {
                if let Some(other) = surface.lookup.insert(key, patch.id()) {
                    return Err(partition_violation(
                        id,
                        &format!("tile {key} claimed by patches {other} and {}", patch.id()),
                    ));
                }
            }
            surface.patches.insert(patch.id(), patch);
        }
        surface.check_structure()?;
        Ok(surface)
    }

    /// Surface identifier
    pub const fn id(&self) -> SurfaceId {
        self.id
    }

    /// Id the next new patch will receive
    pub const fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Patch by id
    pub fn patch(&self, id: PatchId) -> Option<&Patch> {
        self.patches.get(&id)
    }

    /// Mutable patch by id
    pub fn patch_mut(&mut self, id: PatchId) -> Option<&mut Patch> {
        self.patches.get_mut(&id)
    }

    /// Id of the patch owning a tile key
    pub fn owner(&self, key: TileKey) -> Option<PatchId> {
        self.lookup.get(&key).copied()
    }

    /// Id of the patch owning the tile at a position
    pub fn patch_id_at(&self, pos: TilePos) -> Option<PatchId> {
        TileKey::try_from(pos).ok().and_then(|key| self.owner(key))
    }

    /// Patch owning the tile at a position
    pub fn patch_at(&self, pos: TilePos) -> Option<&Patch> {
        self.patch_id_at(pos).and_then(|id| self.patch(id))
    }

    /// All patches in id order
    pub fn patches(&self) -> impl Iterator<Item = &Patch> {
        self.patches.values()
    }

    /// All patch ids in ascending order
    pub fn patch_ids(&self) -> Vec<PatchId> {
        self.patches.keys().copied().collect()
    }

    /// Number of patches
    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    /// Number of storage tiles across all patches
    pub fn tile_count(&self) -> usize {
        self.lookup.len()
    }

    /// Sum of stored items across all patches
    pub fn item_count(&self) -> u64 {
        self.patches.values().map(Patch::item_count).sum()
    }

    pub(crate) const fn allocate_id(&mut self) -> PatchId {
        let id = PatchId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Start a new single-tile patch
    pub(crate) fn spawn_patch(&mut self, key: TileKey) -> PatchId {
        let id = self.allocate_id();
        let mut patch = Patch::new(id);
        patch.insert_tile(key);
        self.patches.insert(id, patch);
        self.lookup.insert(key, id);
        log::debug!("surface {}: created patch {id} at {key}", self.id.0);
        id
    }

    /// Add a tile to an existing patch
    pub(crate) fn attach_tile(&mut self, id: PatchId, key: TileKey) {
        if let Some(patch) = self.patches.get_mut(&id) {
            patch.insert_tile(key);
            self.lookup.insert(key, id);
        }
    }

    /// Re-read a patch's limits from its disabled scanners
    pub fn refresh_limits<H: Host + ?Sized>(&mut self, host: &H, id: PatchId) {
        if let Some(patch) = self.patches.get_mut(&id) {
            let limits = read_limits(host, patch.connectors());
            patch.set_limits(limits);
        }
    }

    /// Verify the partition invariant without consulting the host
    ///
    /// Every patch must be non-empty and 4-connected, the lookup must match
    /// the tile sets exactly, and no two patches may be 4-adjacent.
    ///
    /// # Errors
    ///
    /// Returns a partition violation describing the first problem found
    pub fn check_structure(&self) -> Result<()> {
        let mut tiles_seen = 0;
        for (&id, patch) in &self.patches {
            if patch.id() != id {
                return Err(partition_violation(
                    self.id,
                    &format!("patch {} filed under id {id}", patch.id()),
                ));
            }
            let Some(&seed) = patch.tiles().first() else {
                return Err(partition_violation(self.id, &format!("patch {id} is empty")));
            };
            if crate::storage::topology::flood_fill(patch.tiles(), seed).len()
                != patch.tile_count()
            {
                return Err(partition_violation(
                    self.id,
                    &format!("patch {id} is not 4-connected"),
                ));
            }
            for &key in patch.tiles() {
                if self.owner(key) != Some(id) {
                    return Err(partition_violation(
                        self.id,
                        &format!("lookup for {key} does not point at patch {id}"),
                    ));
                }
                for neighbor in key.pos().cardinal_neighbors() {
                    let Some(other) = self.patch_id_at(neighbor) else {
                        continue;
                    };
                    if other != id {
                        return Err(partition_violation(
                            self.id,
                            &format!("patches {id} and {other} touch at {key}"),
                        ));
                    }
                }
            }
            tiles_seen += patch.tile_count();
        }
        if tiles_seen != self.lookup.len() {
            return Err(partition_violation(
                self.id,
                &format!(
                    "lookup holds {} tiles but patches hold {tiles_seen}",
                    self.lookup.len()
                ),
            ));
        }
        Ok(())
    }

    /// Verify the partition invariant and that every patch tile is a storage tile
    ///
    /// # Errors
    ///
    /// Returns a partition violation describing the first problem found
    pub fn check_partition<H: Host + ?Sized>(&self, host: &H) -> Result<()> {
        self.check_structure()?;
        for (&key, &id) in &self.lookup {
            if !host.is_storage_tile(self.id, key.pos()) {
                return Err(partition_violation(
                    self.id,
                    &format!("patch {id} holds {key}, which is not a storage tile"),
                ));
            }
        }
        Ok(())
    }
}
