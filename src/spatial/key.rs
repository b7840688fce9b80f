//! Tile coordinates and their single-value key encoding
//!
//! Each axis is offset into `[0, 2^26)` (negative values wrap by adding the
//! range width) and the pair is packed as `y' * 2^26 + x'`. The numeric value
//! is persisted in snapshots, so the packing must not change.

use crate::io::configuration::{AXIS_BITS, AXIS_LIMIT, AXIS_RANGE};
use crate::io::error::{StorageError, invalid_parameter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed grid coordinate of one tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    /// Column, growing east
    pub x: i32,
    /// Row, growing south
    pub y: i32,
}

impl TilePos {
    /// Create a position
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this position, saturating at the `i32` bounds
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// The four edge-sharing neighbours in north, east, south, west order
    pub const fn cardinal_neighbors(self) -> [Self; 4] {
        [
            self.offset(0, -1),
            self.offset(1, 0),
            self.offset(0, 1),
            self.offset(-1, 0),
        ]
    }

    /// All eight surrounding cells, clockwise starting north
    pub const fn ring(self) -> [Self; 8] {
        [
            self.offset(0, -1),
            self.offset(1, -1),
            self.offset(1, 0),
            self.offset(1, 1),
            self.offset(0, 1),
            self.offset(-1, 1),
            self.offset(-1, 0),
            self.offset(-1, -1),
        ]
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<[i32; 2]> for TilePos {
    fn from(value: [i32; 2]) -> Self {
        let [x, y] = value;
        Self { x, y }
    }
}

/// Orderable single-value encoding of a [`TilePos`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct TileKey(u64);

impl TileKey {
    /// Raw encoded value
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Rebuild a key from its raw value
    ///
    /// Returns `None` for values no in-range position encodes to.
    pub const fn from_value(value: u64) -> Option<Self> {
        if value < (AXIS_RANGE as u64) * (AXIS_RANGE as u64) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Decode back into the signed coordinate pair
    pub const fn pos(self) -> TilePos {
        let packed = self.0 as i64;
        let unsigned_y = packed >> AXIS_BITS;
        let unsigned_x = packed - (unsigned_y << AXIS_BITS);
        TilePos {
            x: unwrap_axis(unsigned_x) as i32,
            y: unwrap_axis(unsigned_y) as i32,
        }
    }

    /// Whether a coordinate pair lies inside the encodable range
    pub const fn in_range(pos: TilePos) -> bool {
        axis_in_range(pos.x) && axis_in_range(pos.y)
    }
}

impl TryFrom<TilePos> for TileKey {
    type Error = StorageError;

    fn try_from(pos: TilePos) -> Result<Self, Self::Error> {
        if !Self::in_range(pos) {
            return Err(StorageError::CoordinateOutOfRange { position: pos });
        }
        let unsigned_x = wrap_axis(pos.x);
        let unsigned_y = wrap_axis(pos.y);
        Ok(Self(((unsigned_y << AXIS_BITS) + unsigned_x) as u64))
    }
}

impl TryFrom<u64> for TileKey {
    type Error = StorageError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or_else(|| {
            invalid_parameter("tile_key", &value, &"no in-range position encodes to it")
        })
    }
}

impl From<TileKey> for u64 {
    fn from(key: TileKey) -> Self {
        key.0
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pos())
    }
}

const fn axis_in_range(value: i32) -> bool {
    let wide = value as i64;
    wide >= -AXIS_LIMIT && wide < AXIS_LIMIT
}

const fn wrap_axis(value: i32) -> i64 {
    let wide = value as i64;
    if wide < 0 { wide + AXIS_RANGE } else { wide }
}

// Upper half of the unsigned range holds the negative coordinates
const fn unwrap_axis(value: i64) -> i64 {
    if value >= AXIS_LIMIT {
        value - AXIS_RANGE
    } else {
        value
    }
}
