//! Item movement between a patch and one connector
//!
//! Every helper returns the number of items moved and treats a missing
//! filter match, an empty source or a full destination as moving nothing.

use crate::host::interface::{ChestInventory, ItemKind, Lane, TransportLine};
use crate::storage::patch::Patch;
use std::collections::BTreeMap;

// Filtered loaders serve the first filter in stock, unfiltered ones any stored kind
fn output_kind(patch: &Patch, filters: &[ItemKind]) -> Option<ItemKind> {
    if filters.is_empty() {
        patch.inventory().first_kind().cloned()
    } else {
        filters
            .iter()
            .find(|kind| patch.inventory().count(kind) > 0)
            .cloned()
    }
}

/// Push one item per lane from the patch onto an output loader's belt
pub fn output_loader<L: TransportLine + ?Sized>(patch: &mut Patch, line: &mut L) -> u32 {
    let filters = line.filters();
    let mut moved = 0;
    for lane in Lane::BOTH {
        let Some(kind) = output_kind(patch, &filters) else {
            break;
        };
        if line.insert_at_back(lane, &kind) {
            moved += patch.inventory_mut().remove(&kind, 1);
        }
    }
    moved
}

/// Pull the front item of each lane of an input loader into the patch
pub fn input_loader<L: TransportLine + ?Sized>(
    patch: &mut Patch,
    line: &mut L,
    tile_capacity: u32,
) -> u32 {
    let filters = line.filters();
    let mut moved = 0;
    for lane in Lane::BOTH {
        let Some(kind) = line.peek_front(lane) else {
            continue;
        };
        if !filters.is_empty() && !filters.contains(&kind) {
            continue;
        }
        if patch.acceptable(&kind, tile_capacity) == 0 {
            continue;
        }
        if line.remove_item(lane, &kind) {
            moved += patch.inventory_mut().add(&kind, 1);
        }
    }
    moved
}

/// Top an output chest up to its requested amounts from patch stock
///
/// Requests for the same kind in several slots add up.
pub fn output_chest<C: ChestInventory + ?Sized>(patch: &mut Patch, chest: &mut C) -> u32 {
    let mut wanted: BTreeMap<ItemKind, u32> = BTreeMap::new();
    for request in chest.requests() {
        let entry = wanted.entry(request.kind).or_insert(0);
        *entry = entry.saturating_add(request.count);
    }
    for stack in chest.contents() {
        if let Some(entry) = wanted.get_mut(&stack.kind) {
            *entry = entry.saturating_sub(stack.count);
        }
    }

    let mut moved = 0;
    for (kind, missing) in wanted {
        let quantity = missing.min(patch.inventory().count(&kind));
        if quantity == 0 {
            continue;
        }
        let inserted = chest.insert(&kind, quantity);
        moved += patch.inventory_mut().remove(&kind, inserted);
    }
    moved
}

/// Drain an input chest into the patch as far as capacity allows
pub fn input_chest<C: ChestInventory + ?Sized>(
    patch: &mut Patch,
    chest: &mut C,
    tile_capacity: u32,
) -> u32 {
    let mut moved = 0;
    for stack in chest.contents() {
        let quantity = stack.count.min(patch.acceptable(&stack.kind, tile_capacity));
        if quantity == 0 {
            continue;
        }
        let removed = chest.remove(&stack.kind, quantity);
        moved += patch.inventory_mut().add(&stack.kind, removed);
    }
    moved
}
