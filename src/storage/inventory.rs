//! Item counts of one patch with a cached total

use crate::host::interface::{ItemKind, ItemStack};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from item kind to stored count
///
/// Only kinds with a non-zero count are keyed. The total is kept in sync on
/// every mutation so capacity checks never sum the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<ItemKind, u32>", into = "BTreeMap<ItemKind, u32>")]
pub struct Inventory {
    items: BTreeMap<ItemKind, u32>,
    total: u64,
}

impl Inventory {
    /// Create an empty inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all stored counts
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Whether nothing is stored
    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Stored count of one kind
    pub fn count(&self, kind: &ItemKind) -> u32 {
        self.items.get(kind).copied().unwrap_or(0)
    }

    /// Stored kinds in key order with their counts
    pub fn iter(&self) -> impl Iterator<Item = (&ItemKind, u32)> {
        self.items.iter().map(|(kind, &count)| (kind, count))
    }

    /// Number of distinct kinds stored
    pub fn kinds(&self) -> usize {
        self.items.len()
    }

    /// First stored kind in key order
    pub fn first_kind(&self) -> Option<&ItemKind> {
        self.items.keys().next()
    }

    /// Add items, saturating the per-kind count at `u32::MAX`
    ///
    /// Returns how many were actually added.
    pub fn add(&mut self, kind: &ItemKind, count: u32) -> u32 {
        if count == 0 {
            return 0;
        }
        let entry = self.items.entry(kind.clone()).or_insert(0);
        let added = count.min(u32::MAX - *entry);
        *entry += added;
        self.total += u64::from(added);
        added
    }

    /// Remove up to `count` items, returning how many were removed
    pub fn remove(&mut self, kind: &ItemKind, count: u32) -> u32 {
        let Some(stored) = self.items.get_mut(kind) else {
            return 0;
        };
        let removed = count.min(*stored);
        *stored -= removed;
        if *stored == 0 {
            self.items.remove(kind);
        }
        self.total -= u64::from(removed);
        removed
    }

    /// Move everything from `other` into this inventory
    pub fn absorb(&mut self, other: Self) {
        for (kind, count) in other.items {
            self.add(&kind, count);
        }
    }

    /// Take the whole inventory out, leaving this one empty
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Contents as stacks in key order
    pub fn to_stacks(&self) -> Vec<ItemStack> {
        self.items
            .iter()
            .map(|(kind, &count)| ItemStack {
                kind: kind.clone(),
                count,
            })
            .collect()
    }
}

impl From<BTreeMap<ItemKind, u32>> for Inventory {
    fn from(items: BTreeMap<ItemKind, u32>) -> Self {
        let mut inventory = Self::new();
        for (kind, count) in items {
            inventory.add(&kind, count);
        }
        inventory
    }
}

impl From<Inventory> for BTreeMap<ItemKind, u32> {
    fn from(inventory: Inventory) -> Self {
        inventory.items
    }
}
