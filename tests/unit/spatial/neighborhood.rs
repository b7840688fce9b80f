//! Tests for the eight-cell split heuristic

#[cfg(test)]
mod tests {
    use patchstore::spatial::key::TilePos;
    use patchstore::spatial::neighborhood::Neighborhood;
    use std::collections::HashSet;

    // Ring bits, clockwise from north
    const N: u8 = 1;
    const NE: u8 = 1 << 1;
    const E: u8 = 1 << 2;
    const SE: u8 = 1 << 3;
    const S: u8 = 1 << 4;
    const SW: u8 = 1 << 5;
    const W: u8 = 1 << 6;
    const NW: u8 = 1 << 7;

    // Tests probing maps ring cells to the matching bits
    // Verified by offsetting the slot index in probe
    #[test]
    fn test_probe_matches_mask() {
        let center = TilePos::new(0, 0);
        let present: HashSet<TilePos> =
            [TilePos::new(0, -1), TilePos::new(1, -1), TilePos::new(1, 0)]
                .into_iter()
                .collect();
        let probed = Neighborhood::probe(center, |cell| present.contains(&cell));
        assert_eq!(probed, Neighborhood::from_mask(N | NE | E));
    }

    // Tests a straight line through the centre is flagged
    // Verified by counting links instead of groups
    #[test]
    fn test_line_may_disconnect() {
        let ring = Neighborhood::from_mask(N | S);
        assert_eq!(ring.cardinal_count(), 2);
        assert_eq!(ring.cardinal_groups(), 2);
        assert!(ring.may_disconnect());
    }

    // Tests cardinals joined through their diagonal stay one group
    // Verified by ignoring the diagonal in the link check
    #[test]
    fn test_linked_corner_is_safe() {
        let ring = Neighborhood::from_mask(N | NE | E);
        assert_eq!(ring.cardinal_groups(), 1);
        assert!(!ring.may_disconnect());
    }

    // Tests a corner without its diagonal is flagged
    // Verified by treating any two cardinals as linked
    #[test]
    fn test_open_corner_may_disconnect() {
        let ring = Neighborhood::from_mask(N | E);
        assert_eq!(ring.cardinal_groups(), 2);
        assert!(ring.may_disconnect());
    }

    // Tests a lone cardinal next to a linked pair is still caught
    // Verified by flagging only when no cardinal is linked
    #[test]
    fn test_single_cut_off_cardinal_detected() {
        let ring = Neighborhood::from_mask(N | NE | E | S);
        assert_eq!(ring.cardinal_count(), 3);
        assert_eq!(ring.cardinal_groups(), 2);
        assert!(ring.may_disconnect());
    }

    // Tests a fully surrounded centre is one closed group
    // Verified by returning present minus links for a closed ring
    #[test]
    fn test_full_ring_is_safe() {
        let ring = Neighborhood::from_mask(N | NE | E | SE | S | SW | W | NW);
        assert_eq!(ring.cardinal_groups(), 1);
        assert!(!ring.may_disconnect());
    }

    // Tests leaf and empty neighbourhoods never trigger a flood fill
    // Verified by flagging any neighbourhood with a missing cardinal
    #[test]
    fn test_leaf_and_empty_are_safe() {
        assert!(!Neighborhood::from_mask(0).may_disconnect());
        assert!(!Neighborhood::from_mask(W).may_disconnect());
        assert!(!Neighborhood::from_mask(W | NW | N | SE).may_disconnect());
    }

    // Tests three linked cardinals with one gap form one group
    // Verified by subtracting links from four present cardinals
    #[test]
    fn test_three_links_single_group() {
        let ring = Neighborhood::from_mask(N | NE | E | SE | S | SW | W);
        assert_eq!(ring.cardinal_groups(), 1);
        let split = Neighborhood::from_mask(N | E | SE | S | SW | W);
        assert_eq!(split.cardinal_groups(), 2);
    }
}
