//! Scripted host events replayed against the sandbox
//!
//! A scenario is a JSON document with optional settings and a list of events
//! tagged by `type`. Each event first changes the sandbox world the way the
//! simulation would, then notifies the store through its event handlers.

use crate::connector::role::ConnectorKind;
use crate::host::interface::{
    ChestInventory, EntityHandle, ItemKind, ItemStack, Lane, LoaderDirection, Signal, SurfaceId,
};
use crate::host::sandbox::{
    EntityBody, Sandbox, SandboxChest, SandboxEntity, SandboxLoader, SandboxScanner,
};
use crate::io::configuration::Settings;
use crate::io::diagnostics::{SurfaceReport, surface_report};
use crate::io::error::{Result, StorageError, WithContext, invalid_parameter};
use crate::spatial::key::TilePos;
use crate::storage::store::Store;
use crate::tick::engine::TickReport;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A replayable sequence of host events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Settings to start with, defaults when absent
    #[serde(default)]
    pub settings: Option<Settings>,
    /// Events in replay order
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

/// One host notification or operator action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioEvent {
    /// Storage tiles built in one brush stroke
    PlaceTiles {
        /// Target surface
        #[serde(default)]
        surface: u32,
        /// Built positions in placement order
        positions: Vec<[i32; 2]>,
    },
    /// Storage tiles mined; refused tiles are put back
    RemoveTiles {
        /// Target surface
        #[serde(default)]
        surface: u32,
        /// Mined positions
        positions: Vec<[i32; 2]>,
    },
    /// An entity built on a cell
    BuildEntity {
        /// Handle to use, next free one when absent
        #[serde(default)]
        id: Option<u64>,
        /// Target surface
        #[serde(default)]
        surface: u32,
        /// Entity prototype name
        name: String,
        /// Occupied cell
        position: [i32; 2],
        /// Loader orientation
        #[serde(default)]
        direction: Option<LoaderDirection>,
        /// Loader filters
        #[serde(default)]
        filters: Vec<String>,
        /// Output chest requests
        #[serde(default)]
        requests: Vec<ItemStack>,
        /// Scanner state, enabled when absent
        #[serde(default)]
        enabled: Option<bool>,
        /// Scanner signals
        #[serde(default)]
        signals: Vec<Signal>,
    },
    /// A loader flipped between input and output
    RotateEntity {
        /// Handle of the loader
        id: u64,
    },
    /// An entity removed from the world
    RemoveEntity {
        /// Handle of the entity
        id: u64,
    },
    /// Items placed on a loader lane or into a chest
    Feed {
        /// Handle of the loader or chest
        id: u64,
        /// Loader lane, left when absent
        #[serde(default)]
        lane: Option<Lane>,
        /// Item kind
        item: String,
        /// Number of items
        count: u32,
    },
    /// Scanner state changed without a notification
    SetScanner {
        /// Handle of the scanner
        id: u64,
        /// New enabled state
        #[serde(default)]
        enabled: Option<bool>,
        /// New signals
        #[serde(default)]
        signals: Option<Vec<Signal>>,
    },
    /// Items added straight into the patch at a position
    Stock {
        /// Target surface
        #[serde(default)]
        surface: u32,
        /// A tile of the patch
        position: [i32; 2],
        /// Item kind
        item: String,
        /// Number of items
        count: u32,
    },
    /// Runtime settings changed
    Configure {
        /// New per-tile capacity
        #[serde(default)]
        tile_capacity: Option<u32>,
        /// New scanner refresh period
        #[serde(default)]
        scanner_update_period: Option<u32>,
    },
    /// Simulation steps
    RunTicks {
        /// Number of ticks
        count: u32,
    },
    /// A surface deleted with everything on it
    DeleteSurface {
        /// Deleted surface
        surface: u32,
    },
    /// Patch listing requested
    Report {
        /// Surface to list, every surface when absent
        #[serde(default)]
        surface: Option<u32>,
    },
}

impl ScenarioEvent {
    /// Short name used in progress messages
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PlaceTiles { .. } => "place_tiles",
            Self::RemoveTiles { .. } => "remove_tiles",
            Self::BuildEntity { .. } => "build_entity",
            Self::RotateEntity { .. } => "rotate_entity",
            Self::RemoveEntity { .. } => "remove_entity",
            Self::Feed { .. } => "feed",
            Self::SetScanner { .. } => "set_scanner",
            Self::Stock { .. } => "stock",
            Self::Configure { .. } => "configure",
            Self::RunTicks { .. } => "run_ticks",
            Self::DeleteSurface { .. } => "delete_surface",
            Self::Report { .. } => "report",
        }
    }
}

/// What applying an event produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// The event changed state and produced nothing to show
    Applied,
    /// Tile removals the store refused; the tiles were restored
    Refused(Vec<TilePos>),
    /// Combined counts of the ticks that ran
    Ticked(TickReport),
    /// Requested patch listings
    Reported(Vec<SurfaceReport>),
}

/// Read a scenario from a JSON file
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid scenario
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let text = std::fs::read_to_string(path).with_path(path, "read scenario")?;
    serde_json::from_str(&text).with_path(path, "decode scenario")
}

fn positions(raw: &[[i32; 2]]) -> Vec<TilePos> {
    raw.iter().copied().map(TilePos::from).collect()
}

fn unknown_entity(id: u64) -> StorageError {
    invalid_parameter("entity", &id, &"no such entity in the sandbox")
}

fn entity_body(store: &Store, name: &str, event: &ScenarioEvent) -> EntityBody {
    let ScenarioEvent::BuildEntity {
        direction,
        filters,
        requests,
        enabled,
        signals,
        ..
    } = event
    else {
        return EntityBody::Inert;
    };
    match store.registry().kind_of(name) {
        Some(ConnectorKind::Loader) => EntityBody::Loader(
            SandboxLoader::new(*direction)
                .with_filters(filters.iter().map(ItemKind::new).collect()),
        ),
        Some(ConnectorKind::InputChest) => EntityBody::Chest(SandboxChest::default()),
        Some(ConnectorKind::OutputChest) => {
            let mut chest = SandboxChest::default();
            chest.requests.clone_from(requests);
            EntityBody::Chest(chest)
        }
        Some(ConnectorKind::Scanner) => {
            let mut scanner = SandboxScanner::configuring(signals.clone());
            scanner.enabled = enabled.unwrap_or(true);
            EntityBody::Scanner(scanner)
        }
        None => EntityBody::Inert,
    }
}

/// Apply one event to the sandbox and notify the store
///
/// # Errors
///
/// Returns an error if the event names an unknown entity or surface,
/// carries out-of-range coordinates or invalid settings
pub fn apply_event(
    store: &mut Store,
    sandbox: &mut Sandbox,
    event: &ScenarioEvent,
) -> Result<EventOutcome> {
    match event {
        ScenarioEvent::PlaceTiles { surface, positions: raw } => {
            let surface = SurfaceId(*surface);
            let placed = positions(raw);
            for &pos in &placed {
                sandbox.set_tile(surface, pos);
            }
            store.on_tiles_built(&*sandbox, surface, &placed)?;
            Ok(EventOutcome::Applied)
        }
        ScenarioEvent::RemoveTiles { surface, positions: raw } => {
            let surface = SurfaceId(*surface);
            let mined = positions(raw);
            for &pos in &mined {
                sandbox.clear_tile(surface, pos);
            }
            let refused = store.on_tiles_mined(&*sandbox, surface, &mined)?;
            for &pos in &refused {
                sandbox.set_tile(surface, pos);
            }
            if refused.is_empty() {
                Ok(EventOutcome::Applied)
            } else {
                Ok(EventOutcome::Refused(refused))
            }
        }
        ScenarioEvent::BuildEntity {
            id,
            surface,
            name,
            position,
            ..
        } => {
            let surface = SurfaceId(*surface);
            let body = entity_body(store, name, event);
            let position = TilePos::from(*position);
            let handle = match id {
                Some(raw) => {
                    let handle = EntityHandle(*raw);
                    let entity = SandboxEntity {
                        surface,
                        name: name.clone(),
                        position,
                        body,
                    };
                    if !sandbox.spawn_as(handle, entity) {
                        return Err(invalid_parameter("entity", raw, &"handle already in use"));
                    }
                    handle
                }
                None => sandbox.spawn(surface, name.clone(), position, body),
            };
            store.on_entity_built(&*sandbox, surface, handle);
            Ok(EventOutcome::Applied)
        }
        ScenarioEvent::RotateEntity { id } => {
            let handle = EntityHandle(*id);
            let surface = sandbox
                .entity(handle)
                .map(|entity| entity.surface)
                .ok_or_else(|| unknown_entity(*id))?;
            sandbox.rotate(handle);
            store.on_entity_rotated(&*sandbox, surface, handle);
            Ok(EventOutcome::Applied)
        }
        ScenarioEvent::RemoveEntity { id } => {
            let handle = EntityHandle(*id);
            let entity = sandbox.destroy(handle).ok_or_else(|| unknown_entity(*id))?;
            store.on_entity_removed(&*sandbox, entity.surface, handle, entity.position);
            Ok(EventOutcome::Applied)
        }
        ScenarioEvent::Feed {
            id,
            lane,
            item,
            count,
        } => {
            let handle = EntityHandle(*id);
            let kind = ItemKind::new(item.as_str());
            if let Some(loader) = sandbox.sandbox_loader_mut(handle) {
                loader.feed(lane.unwrap_or(Lane::Left), &kind, *count);
            } else if let Some(chest) = sandbox.sandbox_chest_mut(handle) {
                chest.insert(&kind, *count);
            } else {
                return Err(unknown_entity(*id));
            }
            Ok(EventOutcome::Applied)
        }
        ScenarioEvent::SetScanner {
            id,
            enabled,
            signals,
        } => {
            let scanner = sandbox
                .sandbox_scanner_mut(EntityHandle(*id))
                .ok_or_else(|| unknown_entity(*id))?;
            if let Some(enabled) = enabled {
                scanner.enabled = *enabled;
            }
            if let Some(signals) = signals {
                scanner.signals.clone_from(signals);
            }
            Ok(EventOutcome::Applied)
        }
        ScenarioEvent::Stock {
            surface,
            position,
            item,
            count,
        } => {
            let surface = SurfaceId(*surface);
            let position = TilePos::from(*position);
            let patch_id = store
                .surface(surface)
                .ok_or(StorageError::UnknownSurface { surface })?
                .patch_id_at(position)
                .ok_or_else(|| invalid_parameter("position", &position, &"not a storage tile"))?;
            if let Some(patch) = store
                .surface_mut(surface)
                .and_then(|state| state.patch_mut(patch_id))
            {
                patch.inventory_mut().add(&ItemKind::new(item.as_str()), *count);
            }
            Ok(EventOutcome::Applied)
        }
        ScenarioEvent::Configure {
            tile_capacity,
            scanner_update_period,
        } => {
            let mut settings = store.settings();
            if let Some(capacity) = tile_capacity {
                settings.tile_capacity = *capacity;
            }
            if let Some(period) = scanner_update_period {
                settings.scanner_update_period = *period;
            }
            store.set_settings(settings)?;
            Ok(EventOutcome::Applied)
        }
        ScenarioEvent::RunTicks { count } => {
            let mut report = TickReport::default();
            for _ in 0..*count {
                report.absorb(store.tick(sandbox));
            }
            Ok(EventOutcome::Ticked(report))
        }
        ScenarioEvent::DeleteSurface { surface } => {
            let surface = SurfaceId(*surface);
            sandbox.delete_surface(surface);
            store.on_surface_deleted(surface);
            Ok(EventOutcome::Applied)
        }
        ScenarioEvent::Report { surface } => {
            let reports = match surface {
                Some(raw) => vec![surface_report(store, SurfaceId(*raw))?],
                None => store
                    .surfaces()
                    .map(|state| SurfaceReport::of(state, store.settings().tile_capacity))
                    .collect(),
            };
            Ok(EventOutcome::Reported(reports))
        }
    }
}
