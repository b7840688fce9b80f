//! Eight-cell neighbourhood probe gating the flood-fill split check
//!
//! After a tile is removed, the surrounding ring tells cheaply whether the
//! remaining cardinal neighbours still touch each other locally. Two present
//! cardinals are linked when the diagonal between them is present as well.
//! If the cardinals fall into more than one linked group the region might
//! be disconnected and the caller has to flood fill. A ring of tiles closing
//! around the far side produces false positives; there are no false negatives.

use crate::spatial::key::TilePos;
use bitvec::prelude::*;

/// Ring slots holding the cardinal cells (N, E, S, W)
const CARDINAL_SLOTS: [usize; 4] = [0, 2, 4, 6];

/// Occupancy of the eight cells around a position
///
/// Bits follow [`TilePos::ring`]: even slots are cardinals, odd slots are
/// the diagonals between the two cardinals on either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighborhood {
    ring: BitArr!(for 8, in u8, Lsb0),
}

impl Neighborhood {
    /// Record which ring cells around `center` satisfy `present`
    pub fn probe<F>(center: TilePos, mut present: F) -> Self
    where
        F: FnMut(TilePos) -> bool,
    {
        let mask = center
            .ring()
            .into_iter()
            .enumerate()
            .filter(|&(_, cell)| present(cell))
            .fold(0u8, |mask, (slot, _)| mask | (1 << slot));
        Self::from_mask(mask)
    }

    /// Build directly from a ring bitmask (bit 0 = north, clockwise)
    pub fn from_mask(mask: u8) -> Self {
        let mut ring = bitarr![u8, Lsb0; 0; 8];
        ring.store(mask);
        Self { ring }
    }

    fn occupied(&self, slot: usize) -> bool {
        self.ring.get(slot % 8).as_deref() == Some(&true)
    }

    /// Number of present cardinal neighbours
    pub fn cardinal_count(&self) -> usize {
        CARDINAL_SLOTS
            .iter()
            .filter(|&&slot| self.occupied(slot))
            .count()
    }

    // Cardinal at `slot` and the next cardinal clockwise share a present diagonal
    fn linked_forward(&self, slot: usize) -> bool {
        self.occupied(slot) && self.occupied(slot + 1) && self.occupied(slot + 2)
    }

    /// Number of locally linked groups the present cardinals form
    pub fn cardinal_groups(&self) -> usize {
        let present = self.cardinal_count();
        let links = CARDINAL_SLOTS
            .iter()
            .filter(|&&slot| self.linked_forward(slot))
            .count();
        // Four links close the ring into one group
        if links == CARDINAL_SLOTS.len() {
            1
        } else {
            present - links
        }
    }

    /// Whether removing the centre could have disconnected its neighbours
    pub fn may_disconnect(&self) -> bool {
        self.cardinal_groups() > 1
    }
}
