//! Per-step pass over every patch of a surface

use crate::connector::role::{ConnectorRegistry, Role};
use crate::host::interface::Host;
use crate::io::configuration::Settings;
use crate::storage::patch::Patch;
use crate::storage::surface::Surface;
use crate::tick::signals::write_reports;
use crate::tick::transfer::{input_chest, input_loader, output_chest, output_loader};

/// What one tick moved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Items pulled into storage
    pub items_in: u64,
    /// Items pushed out of storage
    pub items_out: u64,
    /// Stale connector handles dropped
    pub pruned: usize,
    /// Scanners that received a signal report
    pub scanners_written: usize,
}

impl TickReport {
    /// Add another report's counts to this one
    pub const fn absorb(&mut self, other: Self) {
        self.items_in += other.items_in;
        self.items_out += other.items_out;
        self.pruned += other.pruned;
        self.scanners_written += other.scanners_written;
    }
}

/// Run one tick over every patch of a surface in id order
///
/// Connectors are revalidated first. When `refresh_scanners` is set the
/// patch limits are re-read from disabled scanners and reports are written
/// to enabled ones after the transfers.
pub fn tick_surface<H: Host + ?Sized>(
    surface: &mut Surface,
    host: &mut H,
    registry: &ConnectorRegistry,
    settings: Settings,
    refresh_scanners: bool,
) -> TickReport {
    let mut report = TickReport::default();
    for id in surface.patch_ids() {
        report.pruned += surface.revalidate(&*host, registry, id);
        if refresh_scanners {
            surface.refresh_limits(&*host, id);
        }
        if let Some(patch) = surface.patch_mut(id) {
            report.absorb(tick_patch(patch, host, settings, refresh_scanners));
        }
    }
    report
}

/// Run the transfers of a single patch
///
/// Outputs run before inputs so a full patch can make room in the same tick.
pub fn tick_patch<H: Host + ?Sized>(
    patch: &mut Patch,
    host: &mut H,
    settings: Settings,
    write_scanners: bool,
) -> TickReport {
    let capacity = settings.tile_capacity;
    let mut report = TickReport::default();

    for (_, handle) in patch.connectors().entries(Role::Output) {
        if let Some(line) = host.loader_mut(handle) {
            report.items_out += u64::from(output_loader(patch, line));
        }
    }
    for (_, handle) in patch.connectors().entries(Role::OutputChest) {
        if let Some(chest) = host.chest_mut(handle) {
            report.items_out += u64::from(output_chest(patch, chest));
        }
    }
    for (_, handle) in patch.connectors().entries(Role::Input) {
        if let Some(line) = host.loader_mut(handle) {
            report.items_in += u64::from(input_loader(patch, line, capacity));
        }
    }
    for (_, handle) in patch.connectors().entries(Role::InputChest) {
        if let Some(chest) = host.chest_mut(handle) {
            report.items_in += u64::from(input_chest(patch, chest, capacity));
        }
    }

    if write_scanners {
        report.scanners_written = write_reports(host, patch, capacity);
    }
    report
}
