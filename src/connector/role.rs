//! Connector kinds, roles and the classification between them

use crate::host::interface::{EntityInfo, LoaderDirection};
use crate::io::configuration::{
    INPUT_CHEST_ENTITY, LOADER_ENTITY, OUTPUT_CHEST_ENTITY, SCANNER_ENTITY,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// What a host entity type is, independent of its current orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    /// Single-item belt loader, direction decides the role
    Loader,
    /// Chest drained into storage
    InputChest,
    /// Chest filled from storage
    OutputChest,
    /// Circuit scanner
    Scanner,
}

/// Bookkeeping slot a connector occupies on its patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Loader moving items into storage
    Input,
    /// Loader moving items out of storage
    Output,
    /// Scanner reporting or configuring
    Scanner,
    /// Chest drained into storage
    InputChest,
    /// Chest filled from storage
    OutputChest,
}

impl Role {
    /// Every role in bookkeeping order
    pub const ALL: [Self; 5] = [
        Self::Input,
        Self::Output,
        Self::Scanner,
        Self::InputChest,
        Self::OutputChest,
    ];

    /// Lowercase label used in listings
    pub const fn label(self) -> &'static str {
        match self {
            Self::Input => "inputs",
            Self::Output => "outputs",
            Self::Scanner => "scanners",
            Self::InputChest => "input chests",
            Self::OutputChest => "output chests",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive the role of an entity of `kind` from its current properties
///
/// Loaders without a reported direction are left unclassified.
pub const fn classify(kind: ConnectorKind, info: &EntityInfo) -> Option<Role> {
    match kind {
        ConnectorKind::Loader => match info.loader_direction {
            Some(LoaderDirection::Input) => Some(Role::Input),
            Some(LoaderDirection::Output) => Some(Role::Output),
            None => None,
        },
        ConnectorKind::InputChest => Some(Role::InputChest),
        ConnectorKind::OutputChest => Some(Role::OutputChest),
        ConnectorKind::Scanner => Some(Role::Scanner),
    }
}

/// Host-defined table of entity names that act as connectors
#[derive(Debug, Clone)]
pub struct ConnectorRegistry {
    kinds: HashMap<String, ConnectorKind>,
}

impl Default for ConnectorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(LOADER_ENTITY, ConnectorKind::Loader);
        registry.register(INPUT_CHEST_ENTITY, ConnectorKind::InputChest);
        registry.register(OUTPUT_CHEST_ENTITY, ConnectorKind::OutputChest);
        registry.register(SCANNER_ENTITY, ConnectorKind::Scanner);
        registry
    }
}

impl ConnectorRegistry {
    /// Registry that recognises nothing
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Register (or re-register) an entity name
    pub fn register(&mut self, name: impl Into<String>, kind: ConnectorKind) {
        self.kinds.insert(name.into(), kind);
    }

    /// Kind registered for an entity name
    pub fn kind_of(&self, name: &str) -> Option<ConnectorKind> {
        self.kinds.get(name).copied()
    }

    /// Role of a described entity, `None` if it is not a classifiable connector
    pub fn role_of(&self, info: &EntityInfo) -> Option<Role> {
        self.kind_of(&info.name).and_then(|kind| classify(kind, info))
    }
}
