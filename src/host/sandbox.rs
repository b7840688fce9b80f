//! Deterministic in-memory host
//!
//! Stands in for the simulation when replaying scenarios, fuzzing the
//! topology engine and testing. Tiles are plain position sets per surface,
//! entities live in an ordered map keyed by handle.

use crate::host::interface::{
    ChestInventory, EntityHandle, EntityInfo, Host, ItemKind, ItemStack, Lane, LoaderDirection,
    ScannerControl, Signal, SurfaceId, TransportLine,
};
use crate::io::configuration::{
    SANDBOX_CHEST_CAPACITY, SANDBOX_LANE_CAPACITY, SANDBOX_SCANNER_SLOTS,
};
use crate::spatial::key::TilePos;
use crate::storage::store::Store;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// Two-lane belt end of a loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxLoader {
    /// Current orientation, `None` until the loader is configured
    pub direction: Option<LoaderDirection>,
    /// Item kinds the loader is restricted to
    pub filters: Vec<ItemKind>,
    left: VecDeque<ItemKind>,
    right: VecDeque<ItemKind>,
    lane_capacity: usize,
}

impl SandboxLoader {
    /// Unfiltered loader with empty lanes
    pub const fn new(direction: Option<LoaderDirection>) -> Self {
        Self {
            direction,
            filters: Vec::new(),
            left: VecDeque::new(),
            right: VecDeque::new(),
            lane_capacity: SANDBOX_LANE_CAPACITY,
        }
    }

    /// Restrict the loader to some item kinds
    #[must_use]
    pub fn with_filters(mut self, filters: Vec<ItemKind>) -> Self {
        self.filters = filters;
        self
    }

    /// Items on a lane, front first
    pub const fn lane(&self, lane: Lane) -> &VecDeque<ItemKind> {
        match lane {
            Lane::Left => &self.left,
            Lane::Right => &self.right,
        }
    }

    const fn lane_mut(&mut self, lane: Lane) -> &mut VecDeque<ItemKind> {
        match lane {
            Lane::Left => &mut self.left,
            Lane::Right => &mut self.right,
        }
    }

    /// Put items onto a lane as the upstream belt would, returning how many fit
    pub fn feed(&mut self, lane: Lane, kind: &ItemKind, count: u32) -> u32 {
        let mut fed = 0;
        while fed < count && self.insert_at_back(lane, kind) {
            fed += 1;
        }
        fed
    }

    /// Take everything off a lane as the downstream belt would
    pub fn drain(&mut self, lane: Lane) -> Vec<ItemKind> {
        self.lane_mut(lane).drain(..).collect()
    }

    /// Flip between input and output
    pub const fn rotate(&mut self) {
        self.direction = match self.direction {
            Some(LoaderDirection::Input) => Some(LoaderDirection::Output),
            Some(LoaderDirection::Output) => Some(LoaderDirection::Input),
            None => None,
        };
    }
}

impl TransportLine for SandboxLoader {
    fn peek_front(&self, lane: Lane) -> Option<ItemKind> {
        self.lane(lane).front().cloned()
    }

    fn remove_item(&mut self, lane: Lane, kind: &ItemKind) -> bool {
        let items = self.lane_mut(lane);
        let Some(index) = items.iter().position(|item| item == kind) else {
            return false;
        };
        items.remove(index).is_some()
    }

    fn insert_at_back(&mut self, lane: Lane, kind: &ItemKind) -> bool {
        let capacity = self.lane_capacity;
        let items = self.lane_mut(lane);
        if items.len() >= capacity {
            return false;
        }
        items.push_back(kind.clone());
        true
    }

    fn filters(&self) -> Vec<ItemKind> {
        self.filters.clone()
    }
}

/// Chest with a total item capacity and optional slot requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxChest {
    contents: BTreeMap<ItemKind, u32>,
    capacity: u32,
    /// Requested kinds and totals, one entry per slot
    pub requests: Vec<ItemStack>,
}

impl Default for SandboxChest {
    fn default() -> Self {
        Self::new(SANDBOX_CHEST_CAPACITY)
    }
}

impl SandboxChest {
    /// Empty chest holding at most `capacity` items
    pub const fn new(capacity: u32) -> Self {
        Self {
            contents: BTreeMap::new(),
            capacity,
            requests: Vec::new(),
        }
    }

    /// Count of one kind in the chest
    pub fn count(&self, kind: &ItemKind) -> u32 {
        self.contents.get(kind).copied().unwrap_or(0)
    }

    /// Items held across all kinds
    pub fn total(&self) -> u32 {
        self.contents.values().sum()
    }
}

impl ChestInventory for SandboxChest {
    fn contents(&self) -> Vec<ItemStack> {
        self.contents
            .iter()
            .map(|(kind, &count)| ItemStack {
                kind: kind.clone(),
                count,
            })
            .collect()
    }

    fn insert(&mut self, kind: &ItemKind, count: u32) -> u32 {
        let room = self.capacity.saturating_sub(self.total());
        let inserted = count.min(room);
        if inserted > 0 {
            *self.contents.entry(kind.clone()).or_insert(0) += inserted;
        }
        inserted
    }

    fn remove(&mut self, kind: &ItemKind, count: u32) -> u32 {
        let Some(stored) = self.contents.get_mut(kind) else {
            return 0;
        };
        let removed = count.min(*stored);
        *stored -= removed;
        if *stored == 0 {
            self.contents.remove(kind);
        }
        removed
    }

    fn requests(&self) -> Vec<ItemStack> {
        self.requests.clone()
    }
}

/// Scanner with a fixed number of signal slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxScanner {
    /// Enabled scanners report, disabled ones configure
    pub enabled: bool,
    /// Signals currently on the scanner
    pub signals: Vec<Signal>,
    /// Maximum number of signals
    pub slot_count: usize,
}

impl SandboxScanner {
    /// Reporting scanner with the default slot count
    pub const fn reporting() -> Self {
        Self {
            enabled: true,
            signals: Vec::new(),
            slot_count: SANDBOX_SCANNER_SLOTS,
        }
    }

    /// Disabled scanner carrying configuration signals
    pub const fn configuring(signals: Vec<Signal>) -> Self {
        Self {
            enabled: false,
            signals,
            slot_count: SANDBOX_SCANNER_SLOTS,
        }
    }
}

impl ScannerControl for SandboxScanner {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn signals(&self) -> Vec<Signal> {
        self.signals.clone()
    }

    fn set_signals(&mut self, signals: Vec<Signal>) {
        self.signals = signals;
    }

    fn slot_count(&self) -> usize {
        self.slot_count
    }
}

/// Behaviour attached to a sandbox entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityBody {
    /// Belt loader
    Loader(SandboxLoader),
    /// Chest
    Chest(SandboxChest),
    /// Circuit scanner
    Scanner(SandboxScanner),
    /// Anything else occupying a cell
    Inert,
}

/// An entity placed in the sandbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxEntity {
    /// Surface the entity stands on
    pub surface: SurfaceId,
    /// Prototype name
    pub name: String,
    /// Occupied cell
    pub position: TilePos,
    /// Behaviour
    pub body: EntityBody,
}

/// In-memory world implementing [`Host`]
#[derive(Debug, Default, Clone)]
pub struct Sandbox {
    tiles: HashMap<SurfaceId, BTreeSet<TilePos>>,
    entities: BTreeMap<EntityHandle, SandboxEntity>,
    next_handle: u64,
}

impl Sandbox {
    /// Empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// World whose storage tiles match every patch tile of a store
    ///
    /// Entities are not part of store state, so none are recreated.
    pub fn mirror(store: &Store) -> Self {
        let mut sandbox = Self::new();
        for surface in store.surfaces() {
            for patch in surface.patches() {
                for key in patch.tiles() {
                    sandbox.set_tile(surface.id(), key.pos());
                }
            }
        }
        sandbox
    }

    /// Mark a cell as a storage tile, returning whether it was not one before
    pub fn set_tile(&mut self, surface: SurfaceId, pos: TilePos) -> bool {
        self.tiles.entry(surface).or_default().insert(pos)
    }

    /// Clear a storage tile, returning whether there was one
    pub fn clear_tile(&mut self, surface: SurfaceId, pos: TilePos) -> bool {
        self.tiles
            .get_mut(&surface)
            .is_some_and(|tiles| tiles.remove(&pos))
    }

    /// Storage tiles of a surface in position order
    pub fn storage_tiles(&self, surface: SurfaceId) -> Vec<TilePos> {
        self.tiles
            .get(&surface)
            .map(|tiles| tiles.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Drop a surface and every entity on it
    pub fn delete_surface(&mut self, surface: SurfaceId) {
        self.tiles.remove(&surface);
        self.entities.retain(|_, entity| entity.surface != surface);
    }

    /// Place an entity under the next free handle
    pub fn spawn(
        &mut self,
        surface: SurfaceId,
        name: impl Into<String>,
        position: TilePos,
        body: EntityBody,
    ) -> EntityHandle {
        self.next_handle += 1;
        let handle = EntityHandle(self.next_handle);
        self.entities.insert(
            handle,
            SandboxEntity {
                surface,
                name: name.into(),
                position,
                body,
            },
        );
        handle
    }

    /// Place an entity under a caller-chosen handle
    ///
    /// Returns `false` and changes nothing if the handle is taken.
    pub fn spawn_as(&mut self, handle: EntityHandle, entity: SandboxEntity) -> bool {
        if self.entities.contains_key(&handle) {
            return false;
        }
        self.next_handle = self.next_handle.max(handle.0);
        self.entities.insert(handle, entity);
        true
    }

    /// Destroy an entity, invalidating its handle
    pub fn destroy(&mut self, handle: EntityHandle) -> Option<SandboxEntity> {
        self.entities.remove(&handle)
    }

    /// Entity by handle
    pub fn entity(&self, handle: EntityHandle) -> Option<&SandboxEntity> {
        self.entities.get(&handle)
    }

    /// Loader behind a handle
    pub fn loader(&self, handle: EntityHandle) -> Option<&SandboxLoader> {
        match &self.entities.get(&handle)?.body {
            EntityBody::Loader(loader) => Some(loader),
            _ => None,
        }
    }

    /// Mutable loader behind a handle
    pub fn sandbox_loader_mut(&mut self, handle: EntityHandle) -> Option<&mut SandboxLoader> {
        match &mut self.entities.get_mut(&handle)?.body {
            EntityBody::Loader(loader) => Some(loader),
            _ => None,
        }
    }

    /// Chest behind a handle
    pub fn chest(&self, handle: EntityHandle) -> Option<&SandboxChest> {
        match &self.entities.get(&handle)?.body {
            EntityBody::Chest(chest) => Some(chest),
            _ => None,
        }
    }

    /// Mutable chest behind a handle
    pub fn sandbox_chest_mut(&mut self, handle: EntityHandle) -> Option<&mut SandboxChest> {
        match &mut self.entities.get_mut(&handle)?.body {
            EntityBody::Chest(chest) => Some(chest),
            _ => None,
        }
    }

    /// Scanner behind a handle
    pub fn sandbox_scanner(&self, handle: EntityHandle) -> Option<&SandboxScanner> {
        match &self.entities.get(&handle)?.body {
            EntityBody::Scanner(scanner) => Some(scanner),
            _ => None,
        }
    }

    /// Mutable scanner behind a handle
    pub fn sandbox_scanner_mut(&mut self, handle: EntityHandle) -> Option<&mut SandboxScanner> {
        match &mut self.entities.get_mut(&handle)?.body {
            EntityBody::Scanner(scanner) => Some(scanner),
            _ => None,
        }
    }

    /// Rotate a loader, returning whether the entity is one
    pub fn rotate(&mut self, handle: EntityHandle) -> bool {
        self.sandbox_loader_mut(handle)
            .map(SandboxLoader::rotate)
            .is_some()
    }
}

impl Host for Sandbox {
    fn is_storage_tile(&self, surface: SurfaceId, pos: TilePos) -> bool {
        self.tiles
            .get(&surface)
            .is_some_and(|tiles| tiles.contains(&pos))
    }

    fn entities_in_cell(&self, surface: SurfaceId, pos: TilePos) -> Vec<EntityHandle> {
        self.entities
            .iter()
            .filter(|(_, entity)| entity.surface == surface && entity.position == pos)
            .map(|(&handle, _)| handle)
            .collect()
    }

    fn describe(&self, entity: EntityHandle) -> Option<EntityInfo> {
        let entity = self.entities.get(&entity)?;
        let loader_direction = match &entity.body {
            EntityBody::Loader(loader) => loader.direction,
            _ => None,
        };
        Some(EntityInfo {
            name: entity.name.clone(),
            position: entity.position,
            loader_direction,
        })
    }

    fn loader_mut(&mut self, entity: EntityHandle) -> Option<&mut dyn TransportLine> {
        self.sandbox_loader_mut(entity)
            .map(|loader| loader as &mut dyn TransportLine)
    }

    fn chest_mut(&mut self, entity: EntityHandle) -> Option<&mut dyn ChestInventory> {
        self.sandbox_chest_mut(entity)
            .map(|chest| chest as &mut dyn ChestInventory)
    }

    fn scanner(&self, entity: EntityHandle) -> Option<&dyn ScannerControl> {
        self.sandbox_scanner(entity)
            .map(|scanner| scanner as &dyn ScannerControl)
    }

    fn scanner_mut(&mut self, entity: EntityHandle) -> Option<&mut dyn ScannerControl> {
        self.sandbox_scanner_mut(entity)
            .map(|scanner| scanner as &mut dyn ScannerControl)
    }
}
