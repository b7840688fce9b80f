//! Role-indexed connector containers of one patch

use crate::connector::role::Role;
use crate::host::interface::EntityHandle;
use crate::spatial::key::TileKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One map per role from the occupied tile to the connector handle
///
/// A handle is kept in at most one role map. Inserting it under a new role
/// removes it from the old one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorSet {
    inputs: BTreeMap<TileKey, EntityHandle>,
    outputs: BTreeMap<TileKey, EntityHandle>,
    scanners: BTreeMap<TileKey, EntityHandle>,
    input_chests: BTreeMap<TileKey, EntityHandle>,
    output_chests: BTreeMap<TileKey, EntityHandle>,
}

impl ConnectorSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Connectors of one role
    pub const fn role(&self, role: Role) -> &BTreeMap<TileKey, EntityHandle> {
        match role {
            Role::Input => &self.inputs,
            Role::Output => &self.outputs,
            Role::Scanner => &self.scanners,
            Role::InputChest => &self.input_chests,
            Role::OutputChest => &self.output_chests,
        }
    }

    const fn role_mut(&mut self, role: Role) -> &mut BTreeMap<TileKey, EntityHandle> {
        match role {
            Role::Input => &mut self.inputs,
            Role::Output => &mut self.outputs,
            Role::Scanner => &mut self.scanners,
            Role::InputChest => &mut self.input_chests,
            Role::OutputChest => &mut self.output_chests,
        }
    }

    /// Snapshot of one role's entries, safe to iterate while mutating the set
    pub fn entries(&self, role: Role) -> Vec<(TileKey, EntityHandle)> {
        self.role(role)
            .iter()
            .map(|(&key, &handle)| (key, handle))
            .collect()
    }

    /// Role a handle is currently filed under
    pub fn role_of(&self, handle: EntityHandle) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|&role| self.role(role).values().any(|&h| h == handle))
    }

    /// File a connector under `role`, dropping any previous filing of it
    ///
    /// Returns the handle that previously occupied the same tile and role.
    pub fn insert(
        &mut self,
        role: Role,
        key: TileKey,
        handle: EntityHandle,
    ) -> Option<EntityHandle> {
        self.remove_handle(handle);
        self.role_mut(role).insert(key, handle)
    }

    /// Remove a handle wherever it is filed
    pub fn remove_handle(&mut self, handle: EntityHandle) -> Option<Role> {
        let role = self.role_of(handle)?;
        self.role_mut(role).retain(|_, &mut h| h != handle);
        Some(role)
    }

    /// Remove every connector on a tile, returning what was removed
    pub fn remove_tile(&mut self, key: TileKey) -> Vec<(Role, EntityHandle)> {
        Role::ALL
            .into_iter()
            .filter_map(|role| self.role_mut(role).remove(&key).map(|h| (role, h)))
            .collect()
    }

    /// Move every connector on one of `keys` into a new set
    pub fn split_off(&mut self, keys: &BTreeSet<TileKey>) -> Self {
        let mut carved = Self::new();
        for role in Role::ALL {
            let source = self.role_mut(role);
            let moved: Vec<TileKey> = source
                .keys()
                .filter(|key| keys.contains(key))
                .copied()
                .collect();
            for key in moved {
                if let Some(handle) = source.remove(&key) {
                    carved.role_mut(role).insert(key, handle);
                }
            }
        }
        carved
    }

    /// Move every connector of `other` into this set
    pub fn absorb(&mut self, mut other: Self) {
        for role in Role::ALL {
            self.role_mut(role).append(other.role_mut(role));
        }
    }

    /// Total number of connectors
    pub fn len(&self) -> usize {
        Role::ALL.into_iter().map(|role| self.role(role).len()).sum()
    }

    /// Whether no connector is filed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
