//! Tests for the per-surface patch table and partition checks

#[cfg(test)]
mod tests {
    use patchstore::StorageError;
    use patchstore::host::interface::SurfaceId;
    use patchstore::host::sandbox::Sandbox;
    use patchstore::spatial::key::{TileKey, TilePos};
    use patchstore::storage::patch::{Patch, PatchId};
    use patchstore::storage::store::Store;
    use patchstore::storage::surface::Surface;

    const SURFACE: SurfaceId = SurfaceId(0);

    fn built(tiles: &[(i32, i32)]) -> (Store, Sandbox) {
        let mut store = Store::default();
        let mut sandbox = Sandbox::new();
        let positions: Vec<TilePos> = tiles.iter().map(|&(x, y)| TilePos::new(x, y)).collect();
        for &pos in &positions {
            sandbox.set_tile(SURFACE, pos);
        }
        store
            .on_tiles_built(&sandbox, SURFACE, &positions)
            .expect("tiles in range");
        (store, sandbox)
    }

    fn patches(store: &Store) -> Vec<Patch> {
        store
            .surface(SURFACE)
            .map(|surface| surface.patches().cloned().collect())
            .unwrap_or_default()
    }

    // Tests patch ids start at one and are never reused
    // Verified by reusing the id of a dissolved patch
    #[test]
    fn test_ids_monotonic() {
        let (mut store, mut sandbox) = built(&[(0, 0)]);
        let first = store
            .surface(SURFACE)
            .and_then(|surface| surface.patch_id_at(TilePos::new(0, 0)));
        assert_eq!(first, Some(PatchId(1)));

        sandbox.clear_tile(SURFACE, TilePos::new(0, 0));
        store
            .on_tiles_mined(&sandbox, SURFACE, &[TilePos::new(0, 0)])
            .expect("tiles in range");
        sandbox.set_tile(SURFACE, TilePos::new(0, 0));
        store
            .on_tiles_built(&sandbox, SURFACE, &[TilePos::new(0, 0)])
            .expect("tiles in range");

        let second = store
            .surface(SURFACE)
            .and_then(|surface| surface.patch_id_at(TilePos::new(0, 0)));
        assert_eq!(second, Some(PatchId(2)));
    }

    // Tests lookups by key and position agree with tile membership
    // Verified by skipping the lookup insert in attach_tile
    #[test]
    fn test_lookup_matches_tiles() {
        let (store, sandbox) = built(&[(0, 0), (1, 0), (5, 5)]);
        let surface = store.surface(SURFACE).expect("surface exists");

        assert_eq!(surface.patch_count(), 2);
        assert_eq!(surface.tile_count(), 3);
        for patch in surface.patches() {
            for &key in patch.tiles() {
                assert_eq!(surface.owner(key), Some(patch.id()));
            }
        }
        assert!(surface.patch_at(TilePos::new(2, 0)).is_none());
        assert!(surface.check_partition(&sandbox).is_ok());
    }

    // Tests restoring persisted patches rebuilds the lookup
    // Verified by leaving the lookup empty on restore
    #[test]
    fn test_restore_rebuilds_lookup() {
        let (store, _sandbox) = built(&[(0, 0), (0, 1), (4, 4)]);
        let next_id = store.surface(SURFACE).map_or(0, Surface::next_id);

        let restored =
            Surface::restore(SURFACE, next_id, patches(&store)).expect("valid partition");
        assert_eq!(restored.tile_count(), 3);
        assert_eq!(restored.patch_count(), 2);
        assert_eq!(
            restored.patch_id_at(TilePos::new(0, 1)),
            restored.patch_id_at(TilePos::new(0, 0))
        );
        assert_eq!(restored.next_id(), next_id);
    }

    // Tests restoring rejects patches claiming the same tile
    // Verified by letting later patches overwrite lookup entries
    #[test]
    fn test_restore_rejects_overlap() {
        let (store, _sandbox) = built(&[(0, 0)]);
        let mut duplicated = patches(&store);
        duplicated.extend(patches(&store));

        let result = Surface::restore(SURFACE, 10, duplicated);
        assert!(matches!(
            result,
            Err(StorageError::PartitionViolation { .. })
        ));
    }

    // Tests restoring rejects ids the allocator never handed out
    // Verified by dropping the next id comparison
    #[test]
    fn test_restore_rejects_unallocated_id() {
        let (store, _sandbox) = built(&[(0, 0)]);
        let result = Surface::restore(SURFACE, 1, patches(&store));
        assert!(matches!(
            result,
            Err(StorageError::PartitionViolation { .. })
        ));
    }

    // Tests restoring rejects an allocator with no id left to hand out
    // Verified by accepting any next id above the stored patches
    #[test]
    fn test_restore_rejects_exhausted_allocator() {
        let (store, _sandbox) = built(&[(0, 0)]);
        let exhausted = Surface::restore(SURFACE, u64::MAX, patches(&store));
        assert!(matches!(
            exhausted,
            Err(StorageError::PartitionViolation { .. })
        ));

        let zero = Surface::restore(SURFACE, 0, Vec::new());
        assert!(matches!(zero, Err(StorageError::PartitionViolation { .. })));

        let highest = Surface::restore(SURFACE, u64::MAX - 1, patches(&store))
            .expect("one id left to allocate");
        assert_eq!(highest.next_id(), u64::MAX - 1);
    }

    // Tests the structure check catches a patch split in two
    // Verified by skipping the flood fill comparison
    #[test]
    fn test_structure_rejects_disconnected_patch() {
        let (store, _sandbox) = built(&[(0, 0), (1, 0), (2, 0)]);
        let mut value = serde_json::to_value(patches(&store)).expect("encode patches");
        let far_key = TileKey::try_from(TilePos::new(2, 0)).expect("in range");
        if let Some(tiles) = value
            .get_mut(0)
            .and_then(|patch| patch.get_mut("tiles"))
        {
            *tiles = serde_json::json!([0, far_key.value()]);
        }
        let broken: Vec<Patch> = serde_json::from_value(value).expect("decode patches");

        let result = Surface::restore(SURFACE, 2, broken);
        match result {
            Err(StorageError::PartitionViolation { reason, .. }) => {
                assert!(reason.contains("not 4-connected"), "{reason}");
            }
            other => unreachable!("expected partition violation, got {other:?}"),
        }
    }

    // Tests the structure check catches two adjacent patches
    // Verified by skipping the neighbour comparison
    #[test]
    fn test_structure_rejects_touching_patches() {
        let (left, _left_sandbox) = built(&[(0, 0)]);
        let (right, _right_sandbox) = built(&[(1, 0)]);
        let mut value = serde_json::to_value(patches(&right)).expect("encode patches");
        if let Some(id) = value.get_mut(0).and_then(|patch| patch.get_mut("id")) {
            *id = serde_json::json!(2);
        }
        let mut combined = patches(&left);
        combined.extend(serde_json::from_value::<Vec<Patch>>(value).expect("decode patches"));

        let result = Surface::restore(SURFACE, 3, combined);
        match result {
            Err(StorageError::PartitionViolation { reason, .. }) => {
                assert!(reason.contains("touch"), "{reason}");
            }
            other => unreachable!("expected partition violation, got {other:?}"),
        }
    }

    // Tests the host check rejects tiles the world no longer has
    // Verified by skipping the host query in check_partition
    #[test]
    fn test_partition_check_consults_host() {
        let (store, mut sandbox) = built(&[(0, 0), (1, 0)]);
        sandbox.clear_tile(SURFACE, TilePos::new(1, 0));

        let surface = store.surface(SURFACE).expect("surface exists");
        assert!(surface.check_structure().is_ok());
        assert!(surface.check_partition(&sandbox).is_err());
    }
}
