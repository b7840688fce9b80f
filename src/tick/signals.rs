//! Scanner configuration input and signal report output
//!
//! A disabled scanner is a configuration source: item signals cap that item,
//! the default-maximum virtual signal caps every other item. An enabled
//! scanner is a report sink and is never read for limits.

use crate::connector::role::Role;
use crate::connector::set::ConnectorSet;
use crate::host::interface::{Host, Signal, SignalId};
use crate::io::configuration::{DEFAULT_MAXIMUM_SIGNAL, FREE_CAPACITY_SIGNAL, TOTAL_CAPACITY_SIGNAL};
use crate::storage::patch::{ItemLimits, Patch};

/// Collect limits from every disabled scanner of a connector set
///
/// When several scanners set the same limit the smallest value wins.
/// Negative values leave the item unlimited.
pub fn read_limits<H: Host + ?Sized>(host: &H, connectors: &ConnectorSet) -> ItemLimits {
    let mut limits = ItemLimits::unlimited();
    for &handle in connectors.role(Role::Scanner).values() {
        let Some(scanner) = host.scanner(handle) else {
            continue;
        };
        if scanner.is_enabled() {
            continue;
        }
        for signal in scanner.signals() {
            let Ok(maximum) = u32::try_from(signal.count) else {
                continue;
            };
            match signal.id {
                SignalId::Item(kind) => {
                    let entry = limits.item_maxima.entry(kind).or_insert(maximum);
                    *entry = (*entry).min(maximum);
                }
                SignalId::Virtual(name) if name == DEFAULT_MAXIMUM_SIGNAL => {
                    limits.default_maximum = Some(
                        limits
                            .default_maximum
                            .map_or(maximum, |current| current.min(maximum)),
                    );
                }
                SignalId::Virtual(_) => {}
            }
        }
    }
    limits
}

/// Signals describing a patch: free capacity, total capacity, then one per stored kind
pub fn compose_signals(patch: &Patch, tile_capacity: u32) -> Vec<Signal> {
    let mut signals = Vec::with_capacity(patch.inventory().kinds() + 2);
    signals.push(Signal::virtual_signal(
        FREE_CAPACITY_SIGNAL,
        saturating_signal(patch.free_capacity(tile_capacity)),
    ));
    signals.push(Signal::virtual_signal(
        TOTAL_CAPACITY_SIGNAL,
        saturating_signal(patch.max_items(tile_capacity)),
    ));
    signals.extend(
        patch
            .inventory()
            .iter()
            .map(|(kind, count)| Signal::item(kind.clone(), i64::from(count))),
    );
    signals
}

fn saturating_signal(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Write the patch report to every enabled scanner, truncated to its slot count
///
/// Returns how many scanners were written.
pub fn write_reports<H: Host + ?Sized>(host: &mut H, patch: &Patch, tile_capacity: u32) -> usize {
    let signals = compose_signals(patch, tile_capacity);
    let mut written = 0;
    for &handle in patch.connectors().role(Role::Scanner).values() {
        let Some(scanner) = host.scanner_mut(handle) else {
            continue;
        };
        if !scanner.is_enabled() {
            continue;
        }
        let slots = scanner.slot_count();
        scanner.set_signals(signals.iter().take(slots).cloned().collect());
        written += 1;
    }
    written
}
