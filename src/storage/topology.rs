//! Incremental maintenance of the patch partition
//!
//! Placement joins the new tile to every adjacent patch, merging them when it
//! bridges more than one. Removal drops the tile and, when the local
//! neighbourhood suggests the remainder might have fallen apart, flood fills
//! the patch and carves each disconnected component into a fresh patch.

use crate::connector::role::{ConnectorRegistry, Role};
use crate::host::interface::Host;
use crate::io::configuration::MAX_SPLIT_FRAGMENTS;
use crate::io::error::Result;
use crate::spatial::key::{TileKey, TilePos};
use crate::spatial::neighborhood::Neighborhood;
use crate::storage::patch::{Patch, PatchId};
use crate::storage::surface::Surface;
use std::collections::BTreeSet;

/// Collect the 4-connected component of `seed` within `tiles`
///
/// Uses an explicit stack so large patches cannot exhaust the call stack.
/// Returns an empty set if `seed` is not in `tiles`.
pub fn flood_fill(tiles: &BTreeSet<TileKey>, seed: TileKey) -> BTreeSet<TileKey> {
    let mut component = BTreeSet::new();
    if !tiles.contains(&seed) {
        return component;
    }
    component.insert(seed);
    let mut pending = vec![seed];
    while let Some(key) = pending.pop() {
        for neighbor in key.pos().cardinal_neighbors() {
            let Ok(neighbor_key) = TileKey::try_from(neighbor) else {
                continue;
            };
            if tiles.contains(&neighbor_key) && component.insert(neighbor_key) {
                pending.push(neighbor_key);
            }
        }
    }
    component
}

impl Surface {
    /// Register a newly placed storage tile
    ///
    /// Adjacent patches are merged into one. Neighbours the host reports as
    /// storage tiles that have no patch yet (the rest of a multi-tile brush
    /// whose events have not arrived) are attached along the way. Connectors
    /// in the cell are resolved against the resulting patch.
    ///
    /// # Errors
    ///
    /// Returns an error if `pos` is outside the encodable coordinate range
    pub fn place_tile<H: Host + ?Sized>(
        &mut self,
        host: &H,
        registry: &ConnectorRegistry,
        pos: TilePos,
    ) -> Result<PatchId> {
        let key = TileKey::try_from(pos)?;
        let mut accumulator = self.owner(key);

        for neighbor in pos.cardinal_neighbors() {
            let Ok(neighbor_key) = TileKey::try_from(neighbor) else {
                continue;
            };
            if let Some(owner) = self.owner(neighbor_key) {
                accumulator = Some(match accumulator {
                    Some(current) if current != owner => self.merge(host, current, owner),
                    _ => owner,
                });
            } else if host.is_storage_tile(self.id(), neighbor) {
                let target = match accumulator {
                    Some(current) => {
                        self.attach_tile(current, neighbor_key);
                        current
                    }
                    None => self.spawn_patch(neighbor_key),
                };
                self.resolve_cell(host, registry, neighbor);
                accumulator = Some(target);
            }
        }

        let id = match accumulator {
            Some(id) => {
                self.attach_tile(id, key);
                id
            }
            None => self.spawn_patch(key),
        };
        self.resolve_cell(host, registry, pos);
        Ok(id)
    }

    /// Merge two patches, returning the survivor
    ///
    /// The patch with strictly more tiles survives; on a tie `first` does.
    /// The other patch's tiles, items and connectors move over and its id is
    /// retired.
    pub fn merge<H: Host + ?Sized>(
        &mut self,
        host: &H,
        first: PatchId,
        second: PatchId,
    ) -> PatchId {
        if first == second {
            return first;
        }
        let first_size = self.patch(first).map(Patch::tile_count);
        let second_size = self.patch(second).map(Patch::tile_count);
        let (survivor, absorbed) = match (first_size, second_size) {
            (Some(a), Some(b)) if b > a => (second, first),
            (Some(_), Some(_)) => (first, second),
            (None, _) => return second,
            (Some(_), None) => return first,
        };

        let Some(absorbed_patch) = self.patches.remove(&absorbed) else {
            return survivor;
        };
        for &key in absorbed_patch.tiles() {
            self.lookup.insert(key, survivor);
        }
        log::debug!(
            "surface {}: merged patch {absorbed} ({} tiles) into {survivor}",
            self.id().0,
            absorbed_patch.tile_count()
        );
        if let Some(patch) = self.patches.get_mut(&survivor) {
            patch.absorb(absorbed_patch);
        }
        self.refresh_limits(host, survivor);
        survivor
    }

    /// Unregister a removed storage tile
    ///
    /// Returns `Ok(false)` without touching anything if the tile is the last
    /// one of a patch that still stores items; the caller must restore the
    /// tile in the world. Removing an unknown tile is accepted as a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if `pos` is outside the encodable coordinate range
    pub fn remove_tile<H: Host + ?Sized>(&mut self, host: &H, pos: TilePos) -> Result<bool> {
        let key = TileKey::try_from(pos)?;
        let surface = self.id().0;
        let Some(id) = self.owner(key) else {
            return Ok(true);
        };
        let Some(patch) = self.patches.get_mut(&id) else {
            self.lookup.remove(&key);
            return Ok(true);
        };

        if patch.tile_count() == 1 && patch.item_count() > 0 {
            log::warn!(
                "surface {surface}: kept last tile {pos} of patch {id} holding {} items",
                patch.item_count()
            );
            return Ok(false);
        }

        let dropped = patch.remove_tile(key);
        let emptied = patch.tile_count() == 0;
        let neighborhood = Neighborhood::probe(pos, |cell| {
            TileKey::try_from(cell).is_ok_and(|cell_key| patch.contains(cell_key))
        });
        self.lookup.remove(&key);

        if emptied {
            self.patches.remove(&id);
            log::debug!("surface {surface}: dissolved patch {id}");
            return Ok(true);
        }

        if dropped.iter().any(|&(role, _)| role == Role::Scanner) {
            self.refresh_limits(host, id);
        }
        if neighborhood.may_disconnect() {
            self.split(host, id);
        }
        Ok(true)
    }

    /// Carve every disconnected component of a patch into its own patch
    ///
    /// Returns the ids of the new fragments. If one of them ends up larger
    /// than the shrunken original, all items move there. Capacity is not
    /// checked for that move.
    pub fn split<H: Host + ?Sized>(&mut self, host: &H, id: PatchId) -> Vec<PatchId> {
        let mut fragments = Vec::new();

        for _ in 0..MAX_SPLIT_FRAGMENTS {
            let Some(patch) = self.patches.get(&id) else {
                break;
            };
            let Some(&seed) = patch.tiles().first() else {
                break;
            };
            let component = flood_fill(patch.tiles(), seed);
            if component.len() == patch.tile_count() {
                break;
            }

            let fragment_id = self.allocate_id();
            let Some(patch) = self.patches.get_mut(&id) else {
                break;
            };
            let fragment = patch.carve(fragment_id, &component);
            for &key in &component {
                self.lookup.insert(key, fragment_id);
            }
            self.patches.insert(fragment_id, fragment);
            self.refresh_limits(host, fragment_id);
            fragments.push(fragment_id);
        }

        if fragments.is_empty() {
            return fragments;
        }
        self.refresh_limits(host, id);

        let mut largest = id;
        let mut largest_size = self.patch(id).map_or(0, Patch::tile_count);
        for &fragment_id in &fragments {
            let size = self.patch(fragment_id).map_or(0, Patch::tile_count);
            if size > largest_size {
                largest = fragment_id;
                largest_size = size;
            }
        }

        if largest != id {
            let items = self
                .patch_mut(id)
                .map(|patch| patch.inventory_mut().take())
                .unwrap_or_default();
            if let Some(target) = self.patch_mut(largest) {
                target.inventory_mut().absorb(items);
            }
        }

        log::debug!(
            "surface {}: split patch {id} into {} fragments, items kept by {largest}",
            self.id().0,
            fragments.len() + 1
        );
        fragments
    }
}
