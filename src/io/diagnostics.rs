//! Human-readable patch listings and the per-tile id overlay

use crate::connector::role::Role;
use crate::host::interface::{ItemStack, SurfaceId};
use crate::io::error::{Result, StorageError};
use crate::spatial::key::TilePos;
use crate::storage::patch::{Patch, PatchId};
use crate::storage::store::Store;
use crate::storage::surface::Surface;
use std::fmt;

/// Summary of one patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    /// Patch identifier
    pub id: PatchId,
    /// Number of tiles
    pub tile_count: usize,
    /// Total stored items
    pub item_count: u64,
    /// Total capacity at the current tile capacity
    pub max_items: u64,
    /// Stored items per kind in kind order
    pub items: Vec<ItemStack>,
    /// Connector positions per role, roles without connectors omitted
    pub connectors: Vec<(Role, Vec<TilePos>)>,
}

impl PatchReport {
    /// Summarise a patch
    pub fn of(patch: &Patch, tile_capacity: u32) -> Self {
        let connectors = Role::ALL
            .into_iter()
            .filter_map(|role| {
                let positions: Vec<TilePos> = patch
                    .connectors()
                    .role(role)
                    .keys()
                    .map(|key| key.pos())
                    .collect();
                (!positions.is_empty()).then_some((role, positions))
            })
            .collect();
        Self {
            id: patch.id(),
            tile_count: patch.tile_count(),
            item_count: patch.item_count(),
            max_items: patch.max_items(tile_capacity),
            items: patch.inventory().to_stacks(),
            connectors,
        }
    }
}

impl fmt::Display for PatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  patch {}: {} tiles, {}/{} items",
            self.id, self.tile_count, self.item_count, self.max_items
        )?;
        for stack in &self.items {
            writeln!(f, "    {} x{}", stack.kind, stack.count)?;
        }
        for (role, positions) in &self.connectors {
            let listed: Vec<String> = positions.iter().map(ToString::to_string).collect();
            writeln!(f, "    {}: {}", role.label(), listed.join(" "))?;
        }
        Ok(())
    }
}

/// Summary of every patch on a surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceReport {
    /// Surface identifier
    pub surface: SurfaceId,
    /// Patches in id order
    pub patches: Vec<PatchReport>,
}

impl SurfaceReport {
    /// Summarise a surface
    pub fn of(surface: &Surface, tile_capacity: u32) -> Self {
        Self {
            surface: surface.id(),
            patches: surface
                .patches()
                .map(|patch| PatchReport::of(patch, tile_capacity))
                .collect(),
        }
    }

    /// Tiles across all listed patches
    pub fn tile_count(&self) -> usize {
        self.patches.iter().map(|patch| patch.tile_count).sum()
    }

    /// Items across all listed patches
    pub fn item_count(&self) -> u64 {
        self.patches.iter().map(|patch| patch.item_count).sum()
    }
}

impl fmt::Display for SurfaceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "surface {}: {} patches, {} tiles, {} items",
            self.surface.0,
            self.patches.len(),
            self.tile_count(),
            self.item_count()
        )?;
        for patch in &self.patches {
            write!(f, "{patch}")?;
        }
        Ok(())
    }
}

/// List the patches of one surface
///
/// # Errors
///
/// Returns an error if the surface has no storage state
pub fn surface_report(store: &Store, surface: SurfaceId) -> Result<SurfaceReport> {
    let state = store
        .surface(surface)
        .ok_or(StorageError::UnknownSurface { surface })?;
    Ok(SurfaceReport::of(state, store.settings().tile_capacity))
}

/// A text label drawn over one tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileTag {
    /// Tagged tile
    pub position: TilePos,
    /// Label text
    pub text: String,
}

/// Debug overlay labelling each storage tile with its patch id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagOverlay {
    enabled: bool,
}

impl TagOverlay {
    /// Overlay in the given state
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Whether labels are currently shown
    pub const fn is_enabled(self) -> bool {
        self.enabled
    }

    /// Flip the overlay, returning the new state
    pub const fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Labels for every tile of a surface row by row, empty while disabled
    pub fn labels(self, surface: &Surface) -> Vec<TileTag> {
        if !self.enabled {
            return Vec::new();
        }
        let mut tags: Vec<TileTag> = surface
            .patches()
            .flat_map(|patch| {
                patch.tiles().iter().map(move |key| TileTag {
                    position: key.pos(),
                    text: patch.id().to_string(),
                })
            })
            .collect();
        tags.sort_by_key(|tag| (tag.position.y, tag.position.x));
        tags
    }
}
