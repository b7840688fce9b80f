//! Tests for the in-memory host

#[cfg(test)]
mod tests {
    use patchstore::host::interface::{
        ChestInventory, EntityHandle, Host, ItemKind, Lane, LoaderDirection, SurfaceId,
        TransportLine,
    };
    use patchstore::host::sandbox::{
        EntityBody, Sandbox, SandboxChest, SandboxEntity, SandboxLoader,
    };
    use patchstore::io::configuration::{LOADER_ENTITY, SANDBOX_LANE_CAPACITY};
    use patchstore::spatial::key::TilePos;
    use patchstore::storage::store::Store;

    const SURFACE: SurfaceId = SurfaceId(0);

    // Tests lanes stop accepting items at their capacity
    // Verified by letting feed ignore the lane capacity
    #[test]
    fn test_loader_lane_capacity() {
        let iron = ItemKind::new("iron-plate");
        let mut loader = SandboxLoader::new(Some(LoaderDirection::Input));
        assert_eq!(loader.feed(Lane::Left, &iron, 10) as usize, SANDBOX_LANE_CAPACITY);
        assert!(!loader.insert_at_back(Lane::Left, &iron));
        assert!(loader.insert_at_back(Lane::Right, &iron));
        assert_eq!(loader.drain(Lane::Left).len(), SANDBOX_LANE_CAPACITY);
        assert!(loader.lane(Lane::Left).is_empty());
    }

    // Tests removal takes the first matching item of a lane
    // Verified by always removing the front item
    #[test]
    fn test_loader_remove_item() {
        let iron = ItemKind::new("iron-plate");
        let copper = ItemKind::new("copper-plate");
        let mut loader = SandboxLoader::new(None);
        loader.feed(Lane::Left, &iron, 1);
        loader.feed(Lane::Left, &copper, 1);

        assert_eq!(loader.peek_front(Lane::Left), Some(iron.clone()));
        assert!(loader.remove_item(Lane::Left, &copper));
        assert!(!loader.remove_item(Lane::Left, &copper));
        assert!(!loader.remove_item(Lane::Right, &iron));
        assert_eq!(loader.lane(Lane::Left).len(), 1);
    }

    // Tests rotation flips direction and leaves undirected loaders alone
    // Verified by defaulting undirected loaders to input
    #[test]
    fn test_loader_rotate() {
        let mut loader = SandboxLoader::new(Some(LoaderDirection::Input));
        loader.rotate();
        assert_eq!(loader.direction, Some(LoaderDirection::Output));

        let mut undirected = SandboxLoader::new(None);
        undirected.rotate();
        assert_eq!(undirected.direction, None);
    }

    // Tests chests accept only up to their capacity and drop empty kinds
    // Verified by letting insert exceed capacity
    #[test]
    fn test_chest_capacity() {
        let iron = ItemKind::new("iron-plate");
        let mut chest = SandboxChest::new(10);
        assert_eq!(chest.insert(&iron, 7), 7);
        assert_eq!(chest.insert(&ItemKind::new("gear"), 7), 3);
        assert_eq!(chest.insert(&iron, 1), 0);
        assert_eq!(chest.total(), 10);

        assert_eq!(chest.remove(&iron, 100), 7);
        assert_eq!(chest.count(&iron), 0);
        assert_eq!(chest.contents().len(), 1);
    }

    // Tests entity lookups by cell, surface and handle validity
    // Verified by ignoring the surface in cell queries
    #[test]
    fn test_entities_in_cell() {
        let mut sandbox = Sandbox::new();
        let pos = TilePos::new(2, 3);
        let here = sandbox.spawn(SURFACE, "lamp", pos, EntityBody::Inert);
        let elsewhere = sandbox.spawn(SurfaceId(1), "lamp", pos, EntityBody::Inert);

        assert_eq!(sandbox.entities_in_cell(SURFACE, pos), vec![here]);
        assert_eq!(sandbox.entities_in_cell(SurfaceId(1), pos), vec![elsewhere]);

        let info = sandbox.describe(here).expect("entity exists");
        assert_eq!(info.position, pos);
        assert_eq!(info.loader_direction, None);

        sandbox.destroy(here);
        assert!(sandbox.describe(here).is_none());
        assert!(sandbox.entities_in_cell(SURFACE, pos).is_empty());
    }

    // Tests chosen handles are refused when taken and advance the allocator
    // Verified by overwriting existing entities
    #[test]
    fn test_spawn_as() {
        let mut sandbox = Sandbox::new();
        let entity = SandboxEntity {
            surface: SURFACE,
            name: LOADER_ENTITY.to_string(),
            position: TilePos::new(0, 0),
            body: EntityBody::Loader(SandboxLoader::new(Some(LoaderDirection::Output))),
        };
        assert!(sandbox.spawn_as(EntityHandle(10), entity.clone()));
        assert!(!sandbox.spawn_as(EntityHandle(10), entity));

        let next = sandbox.spawn(SURFACE, "lamp", TilePos::new(1, 1), EntityBody::Inert);
        assert_eq!(next, EntityHandle(11));
        assert!(sandbox.loader(EntityHandle(10)).is_some());
        assert!(sandbox.chest(EntityHandle(10)).is_none());
    }

    // Tests deleting a surface drops its tiles and entities only
    // Verified by keeping entities of deleted surfaces
    #[test]
    fn test_delete_surface() {
        let mut sandbox = Sandbox::new();
        sandbox.set_tile(SURFACE, TilePos::new(0, 0));
        sandbox.set_tile(SurfaceId(1), TilePos::new(0, 0));
        sandbox.spawn(SURFACE, "lamp", TilePos::new(0, 0), EntityBody::Inert);
        let kept = sandbox.spawn(SurfaceId(1), "lamp", TilePos::new(0, 0), EntityBody::Inert);

        sandbox.delete_surface(SURFACE);
        assert!(!sandbox.is_storage_tile(SURFACE, TilePos::new(0, 0)));
        assert!(sandbox.is_storage_tile(SurfaceId(1), TilePos::new(0, 0)));
        assert!(sandbox.entity(kept).is_some());
        assert!(sandbox.entities_in_cell(SURFACE, TilePos::new(0, 0)).is_empty());
    }

    // Tests mirroring a store recreates exactly its storage tiles
    // Verified by mirroring only the first patch
    #[test]
    fn test_mirror() {
        let mut source = Sandbox::new();
        let positions = [TilePos::new(0, 0), TilePos::new(1, 0), TilePos::new(5, 5)];
        for &pos in &positions {
            source.set_tile(SURFACE, pos);
        }
        let mut store = Store::default();
        store
            .on_tiles_built(&source, SURFACE, &positions)
            .expect("tiles in range");

        let mirrored = Sandbox::mirror(&store);
        assert_eq!(mirrored.storage_tiles(SURFACE), source.storage_tiles(SURFACE));
        store
            .check_partition(&mirrored, SURFACE)
            .expect("mirror matches store");
    }
}
