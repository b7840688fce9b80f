//! Storage constants and runtime configuration defaults

use crate::io::error::{Result, invalid_parameter};
use serde::{Deserialize, Serialize};

// Coordinate codec bounds, half of a 52-bit mantissa budget per axis
/// Bits reserved for each axis inside a tile key
pub const AXIS_BITS: u32 = 26;
/// Width of the unsigned range of one encoded axis
pub const AXIS_RANGE: i64 = 1 << AXIS_BITS;
/// Exclusive bound on the magnitude of an encodable coordinate
pub const AXIS_LIMIT: i64 = AXIS_RANGE / 2;

// A removed tile touches at most four cardinal neighbours
/// Maximum number of flood-fill rounds after one tile removal
pub const MAX_SPLIT_FRAGMENTS: usize = 4;

// Default values for operator-adjustable settings
/// Items each storage tile adds to its patch capacity
pub const DEFAULT_TILE_CAPACITY: u32 = 2000;
/// Ticks between scanner signal refreshes
pub const DEFAULT_SCANNER_UPDATE_PERIOD: u32 = 60;

// Entity names recognised by the default connector registry
/// Directional single-item loader
pub const LOADER_ENTITY: &str = "storage-loader";
/// Chest whose contents are pulled into the patch
pub const INPUT_CHEST_ENTITY: &str = "storage-input-chest";
/// Chest filled from the patch according to its requests
pub const OUTPUT_CHEST_ENTITY: &str = "storage-output-chest";
/// Reporting or configuring circuit scanner
pub const SCANNER_ENTITY: &str = "storage-scanner";

// Virtual signal names written to and read from scanners
/// Remaining capacity of the patch
pub const FREE_CAPACITY_SIGNAL: &str = "storage-free";
/// Total capacity of the patch
pub const TOTAL_CAPACITY_SIGNAL: &str = "storage-total";
/// Fallback per-item maximum set by a disabled scanner
pub const DEFAULT_MAXIMUM_SIGNAL: &str = "storage-default";

// Sandbox host defaults
/// Items a sandbox loader lane can hold
pub const SANDBOX_LANE_CAPACITY: usize = 4;
/// Items a sandbox chest can hold across all kinds
pub const SANDBOX_CHEST_CAPACITY: u32 = 4800;
/// Signal slots on a sandbox scanner
pub const SANDBOX_SCANNER_SLOTS: usize = 20;

// Overlay export settings
/// Pixel size of one tile in the exported overlay
pub const OVERLAY_TILE_PIXELS: u32 = 4;
/// Largest bounding box, in tiles, an overlay is rasterised for
pub const MAX_OVERLAY_CELLS: u64 = 1 << 20;

// CLI defaults
/// Fixed seed for reproducible fuzzing
pub const DEFAULT_SEED: u64 = 42;
/// Half-width of the square area the fuzzer edits
pub const DEFAULT_FUZZ_RADIUS: i32 = 6;
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

/// Operator-adjustable settings consumed by the tick engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Capacity contributed by each tile of a patch
    pub tile_capacity: u32,
    /// Scanner signals are refreshed every this many ticks
    pub scanner_update_period: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tile_capacity: DEFAULT_TILE_CAPACITY,
            scanner_update_period: DEFAULT_SCANNER_UPDATE_PERIOD,
        }
    }
}

impl Settings {
    /// Reject settings the tick engine cannot run with
    ///
    /// # Errors
    ///
    /// Returns an error if the scanner update period is zero
    pub fn validate(&self) -> Result<()> {
        if self.scanner_update_period == 0 {
            return Err(invalid_parameter(
                "scanner_update_period",
                &self.scanner_update_period,
                &"must be at least one tick",
            ));
        }
        Ok(())
    }
}
