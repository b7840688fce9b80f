//! JSON snapshots of the complete store
//!
//! A snapshot records settings, the tick counter and for every surface its
//! id allocator and patches. Tile keys are written as their raw encoded
//! values. The tile lookup is rebuilt from the patches on load and the
//! partition is checked before the store is handed back.

use crate::connector::role::ConnectorRegistry;
use crate::host::interface::SurfaceId;
use crate::io::configuration::Settings;
use crate::io::error::{Result, WithContext};
use crate::storage::patch::Patch;
use crate::storage::store::Store;
use crate::storage::surface::Surface;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Persisted state of one surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    /// Surface identifier
    pub id: SurfaceId,
    /// Next patch id to allocate
    pub next_id: u64,
    /// Patches in id order
    pub patches: Vec<Patch>,
}

/// Persisted state of a whole store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Settings in effect when saved
    pub settings: Settings,
    /// Ticks run so far
    pub ticks: u64,
    /// Surfaces in id order
    pub surfaces: Vec<SurfaceSnapshot>,
}

impl StoreSnapshot {
    /// Copy the persistent parts of a store
    pub fn capture(store: &Store) -> Self {
        Self {
            settings: store.settings(),
            ticks: store.ticks(),
            surfaces: store
                .surfaces()
                .map(|surface| SurfaceSnapshot {
                    id: surface.id(),
                    next_id: surface.next_id(),
                    patches: surface.patches().cloned().collect(),
                })
                .collect(),
        }
    }

    /// Rebuild a store with the default connector registry
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or a surface does not
    /// form a valid partition
    pub fn restore(self) -> Result<Store> {
        self.restore_with_registry(ConnectorRegistry::default())
    }

    /// Rebuild a store that recognises the entity names in `registry`
    ///
    /// The registry is not part of the snapshot. Connectors whose names it
    /// does not know are pruned on the next tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or a surface does not
    /// form a valid partition
    pub fn restore_with_registry(self, registry: ConnectorRegistry) -> Result<Store> {
        self.settings.validate()?;
        let surfaces = self
            .surfaces
            .into_iter()
            .map(|snapshot| Surface::restore(snapshot.id, snapshot.next_id, snapshot.patches))
            .collect::<Result<Vec<_>>>()?;
        Ok(Store::from_parts(self.settings, registry, self.ticks, surfaces))
    }
}

/// Write a snapshot of the store to a JSON file
///
/// # Errors
///
/// Returns an error if the file cannot be created or written
pub fn save_store(store: &Store, path: &Path) -> Result<()> {
    let snapshot = StoreSnapshot::capture(store);
    let file = File::create(path).with_path(path, "create snapshot")?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &snapshot).with_path(path, "encode snapshot")?;
    writer.flush().with_path(path, "write snapshot")?;
    log::info!(
        "saved {} surfaces at tick {} to {}",
        snapshot.surfaces.len(),
        snapshot.ticks,
        path.display()
    );
    Ok(())
}

/// Read a store back from a JSON snapshot with the default connector registry
///
/// Hosts that registered extra entity names must use
/// [`load_store_with_registry`], otherwise those connectors are pruned on the
/// next tick.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded, or if the
/// decoded state fails validation
pub fn load_store(path: &Path) -> Result<Store> {
    load_store_with_registry(path, ConnectorRegistry::default())
}

/// Read a store back from a JSON snapshot, recognising the names in `registry`
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded, or if the
/// decoded state fails validation
pub fn load_store_with_registry(path: &Path, registry: ConnectorRegistry) -> Result<Store> {
    let file = File::open(path).with_path(path, "open snapshot")?;
    let snapshot: StoreSnapshot =
        serde_json::from_reader(BufReader::new(file)).with_path(path, "decode snapshot")?;
    let store = snapshot.restore_with_registry(registry)?;
    log::info!(
        "loaded {} surfaces at tick {} from {}",
        store.surfaces().count(),
        store.ticks(),
        path.display()
    );
    Ok(store)
}
