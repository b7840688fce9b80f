//! Process-wide storage state and the host event handlers
//!
//! A [`Store`] is constructed once (or loaded from a snapshot) and passed to
//! every handler. Handlers run to completion between simulation steps, so the
//! tick pass never observes a half-updated patch.

use crate::connector::role::{ConnectorRegistry, Role};
use crate::host::interface::{EntityHandle, Host, SurfaceId};
use crate::io::configuration::Settings;
use crate::io::error::{Result, StorageError};
use crate::spatial::key::TilePos;
use crate::storage::surface::Surface;
use crate::tick::engine::{TickReport, tick_surface};
use std::collections::BTreeMap;

/// All surfaces plus the settings and connector registry they share
#[derive(Debug, Clone)]
pub struct Store {
    surfaces: BTreeMap<SurfaceId, Surface>,
    settings: Settings,
    registry: ConnectorRegistry,
    ticks: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Store {
    /// Create an empty store with the default connector registry
    pub fn new(settings: Settings) -> Self {
        Self::with_registry(settings, ConnectorRegistry::default())
    }

    /// Create an empty store with a host-specific connector registry
    pub fn with_registry(settings: Settings, registry: ConnectorRegistry) -> Self {
        Self {
            surfaces: BTreeMap::new(),
            settings,
            registry,
            ticks: 0,
        }
    }

    pub(crate) fn from_parts(
        settings: Settings,
        registry: ConnectorRegistry,
        ticks: u64,
        surfaces: Vec<Surface>,
    ) -> Self {
        let mut store = Self::with_registry(settings, registry);
        store.ticks = ticks;
        for surface in surfaces {
            store.surfaces.insert(surface.id(), surface);
        }
        store
    }

    /// Current settings
    pub const fn settings(&self) -> Settings {
        self.settings
    }

    /// Replace the settings at runtime
    ///
    /// # Errors
    ///
    /// Returns an error if the new settings fail validation
    pub fn set_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Connector registry
    pub const fn registry(&self) -> &ConnectorRegistry {
        &self.registry
    }

    /// Mutable connector registry, for hosts registering extra entity names
    pub const fn registry_mut(&mut self) -> &mut ConnectorRegistry {
        &mut self.registry
    }

    /// Ticks run so far
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Storage state of a surface, if any tile was ever placed on it
    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(&id)
    }

    /// Mutable storage state of a surface
    pub fn surface_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.surfaces.get_mut(&id)
    }

    /// Storage state of a surface, created on first use
    pub fn surface_or_create(&mut self, id: SurfaceId) -> &mut Surface {
        Self::registered(&mut self.surfaces, id)
    }

    fn registered(surfaces: &mut BTreeMap<SurfaceId, Surface>, id: SurfaceId) -> &mut Surface {
        surfaces.entry(id).or_insert_with(|| Surface::new(id))
    }

    /// All surfaces in id order
    pub fn surfaces(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.values()
    }

    /// Verify the partition invariant of one surface
    ///
    /// # Errors
    ///
    /// Returns an error if the surface is unknown or its partition is broken
    pub fn check_partition<H: Host + ?Sized>(&self, host: &H, surface: SurfaceId) -> Result<()> {
        self.surface(surface)
            .ok_or(StorageError::UnknownSurface { surface })?
            .check_partition(host)
    }

    /// Handle storage tiles placed by the host, in placement order
    ///
    /// # Errors
    ///
    /// Returns an error if a position is outside the encodable range; tiles
    /// before it have already been registered
    pub fn on_tiles_built<H: Host + ?Sized>(
        &mut self,
        host: &H,
        surface: SurfaceId,
        positions: &[TilePos],
    ) -> Result<()> {
        let Self {
            surfaces, registry, ..
        } = self;
        let state = Self::registered(surfaces, surface);
        for &pos in positions {
            state.place_tile(host, registry, pos)?;
        }
        Ok(())
    }

    /// Handle storage tiles removed by the host
    ///
    /// Returns the positions whose removal was refused because they were
    /// the last tile of a patch still holding items. The host must put those
    /// tiles back.
    ///
    /// # Errors
    ///
    /// Returns an error if a position is outside the encodable range
    pub fn on_tiles_mined<H: Host + ?Sized>(
        &mut self,
        host: &H,
        surface: SurfaceId,
        positions: &[TilePos],
    ) -> Result<Vec<TilePos>> {
        let Some(state) = self.surfaces.get_mut(&surface) else {
            log::warn!(
                "{} tiles mined on surface {} without storage state",
                positions.len(),
                surface.0
            );
            return Ok(Vec::new());
        };
        let mut refused = Vec::new();
        for &pos in positions {
            if !state.remove_tile(host, pos)? {
                refused.push(pos);
            }
        }
        Ok(refused)
    }

    /// Handle a connector-capable entity being built
    pub fn on_entity_built<H: Host + ?Sized>(
        &mut self,
        host: &H,
        surface: SurfaceId,
        entity: EntityHandle,
    ) -> Option<Role> {
        let Self {
            surfaces, registry, ..
        } = self;
        surfaces
            .get_mut(&surface)?
            .attach_entity(host, registry, entity)
    }

    /// Handle an entity being rotated or otherwise reconfigured
    pub fn on_entity_rotated<H: Host + ?Sized>(
        &mut self,
        host: &H,
        surface: SurfaceId,
        entity: EntityHandle,
    ) -> Option<Role> {
        self.on_entity_built(host, surface, entity)
    }

    /// Handle an entity being removed from `pos`
    pub fn on_entity_removed<H: Host + ?Sized>(
        &mut self,
        host: &H,
        surface: SurfaceId,
        entity: EntityHandle,
        pos: TilePos,
    ) -> Option<Role> {
        self.surfaces
            .get_mut(&surface)?
            .detach_entity(host, entity, pos)
    }

    /// Discard all state of a deleted surface, stored items included
    pub fn on_surface_deleted(&mut self, surface: SurfaceId) -> Option<Surface> {
        let removed = self.surfaces.remove(&surface);
        if let Some(state) = &removed {
            log::debug!(
                "discarded surface {} with {} patches",
                surface.0,
                state.patch_count()
            );
        }
        removed
    }

    /// Run one simulation step over every patch of every surface
    ///
    /// Scanner limits and reports are refreshed on every
    /// `scanner_update_period`-th tick, starting with the first.
    pub fn tick<H: Host + ?Sized>(&mut self, host: &mut H) -> TickReport {
        let Self {
            surfaces,
            settings,
            registry,
            ticks,
        } = self;
        let refresh_scanners = *ticks % u64::from(settings.scanner_update_period.max(1)) == 0;
        let mut report = TickReport::default();
        for surface in surfaces.values_mut() {
            report.absorb(tick_surface(
                surface,
                host,
                registry,
                *settings,
                refresh_scanners,
            ));
        }
        *ticks += 1;
        report
    }
}
