//! Tests for patch listings and the tile tag overlay

#[cfg(test)]
mod tests {
    use patchstore::connector::role::Role;
    use patchstore::host::interface::{ItemKind, ItemStack, LoaderDirection, SurfaceId};
    use patchstore::host::sandbox::{EntityBody, Sandbox, SandboxLoader};
    use patchstore::io::configuration::{LOADER_ENTITY, Settings};
    use patchstore::io::diagnostics::{SurfaceReport, TagOverlay, surface_report};
    use patchstore::io::error::StorageError;
    use patchstore::spatial::key::TilePos;
    use patchstore::storage::store::Store;

    const SURFACE: SurfaceId = SurfaceId(0);

    fn two_patches() -> (Store, Sandbox) {
        let mut sandbox = Sandbox::new();
        let positions = [TilePos::new(0, 0), TilePos::new(1, 0), TilePos::new(5, 5)];
        for &pos in &positions {
            sandbox.set_tile(SURFACE, pos);
        }
        let mut store = Store::new(Settings {
            tile_capacity: 100,
            scanner_update_period: 60,
        });
        store
            .on_tiles_built(&sandbox, SURFACE, &positions)
            .expect("tiles in range");

        let loader = sandbox.spawn(
            SURFACE,
            LOADER_ENTITY,
            TilePos::new(1, 0),
            EntityBody::Loader(SandboxLoader::new(Some(LoaderDirection::Input))),
        );
        store.on_entity_built(&sandbox, SURFACE, loader);

        let surface = store.surface_mut(SURFACE).expect("surface exists");
        let id = surface.patch_id_at(TilePos::new(0, 0)).expect("patch exists");
        surface
            .patch_mut(id)
            .expect("patch exists")
            .inventory_mut()
            .add(&ItemKind::new("iron-plate"), 5);
        (store, sandbox)
    }

    // Tests a patch report lists items and connector positions per role
    // Verified by listing empty roles
    #[test]
    fn test_surface_report_contents() {
        let (store, _sandbox) = two_patches();
        let report = surface_report(&store, SURFACE).expect("surface exists");

        assert_eq!(report.patches.len(), 2);
        assert_eq!(report.tile_count(), 3);
        assert_eq!(report.item_count(), 5);

        let first = report.patches.first().expect("first patch");
        assert_eq!(first.max_items, 200);
        assert_eq!(first.items, vec![ItemStack::new("iron-plate", 5)]);
        assert_eq!(first.connectors, vec![(Role::Input, vec![TilePos::new(1, 0)])]);
    }

    // Tests the text listing printed by the runner
    // Verified by changing the capacity formatting
    #[test]
    fn test_surface_report_display() {
        let (store, _sandbox) = two_patches();
        let surface = store.surface(SURFACE).expect("surface exists");
        let text = SurfaceReport::of(surface, 100).to_string();

        assert_eq!(
            text,
            "surface 0: 2 patches, 3 tiles, 5 items\n\
             \x20 patch 1: 2 tiles, 5/200 items\n\
             \x20   iron-plate x5\n\
             \x20   inputs: (1, 0)\n\
             \x20 patch 2: 1 tiles, 0/100 items\n"
        );
    }

    // Tests listing an unknown surface fails
    // Verified by returning an empty report
    #[test]
    fn test_unknown_surface() {
        let store = Store::default();
        assert!(matches!(
            surface_report(&store, SurfaceId(9)),
            Err(StorageError::UnknownSurface {
                surface: SurfaceId(9)
            })
        ));
    }

    // Tests tags label each tile with its patch id row by row
    // Verified by sorting tags by key
    #[test]
    fn test_tag_overlay_labels() {
        let (store, _sandbox) = two_patches();
        let surface = store.surface(SURFACE).expect("surface exists");
        let mut overlay = TagOverlay::default();
        assert!(!overlay.is_enabled());
        assert!(overlay.labels(surface).is_empty());

        assert!(overlay.toggle());
        let tags: Vec<(TilePos, String)> = overlay
            .labels(surface)
            .into_iter()
            .map(|tag| (tag.position, tag.text))
            .collect();
        assert_eq!(
            tags,
            vec![
                (TilePos::new(0, 0), "1".to_string()),
                (TilePos::new(1, 0), "1".to_string()),
                (TilePos::new(5, 5), "2".to_string()),
            ]
        );
        assert!(!overlay.toggle());
    }
}
