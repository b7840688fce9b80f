//! Tests for patch rasterisation and PNG overlay export

#[cfg(test)]
mod tests {
    use patchstore::connector::role::ConnectorRegistry;
    use patchstore::host::interface::SurfaceId;
    use patchstore::host::sandbox::Sandbox;
    use patchstore::io::configuration::{AXIS_LIMIT, MAX_OVERLAY_CELLS, OVERLAY_TILE_PIXELS};
    use patchstore::io::error::StorageError;
    use patchstore::io::image::{export_overlay_png, patch_color, rasterize};
    use patchstore::spatial::key::TilePos;
    use patchstore::storage::surface::Surface;

    fn surface_of(tiles: &[TilePos]) -> Surface {
        let mut sandbox = Sandbox::new();
        let registry = ConnectorRegistry::default();
        let mut surface = Surface::new(SurfaceId(0));
        for &pos in tiles {
            sandbox.set_tile(SurfaceId(0), pos);
            surface
                .place_tile(&sandbox, &registry, pos)
                .expect("tile in range");
        }
        surface
    }

    // Tests the raster spans the bounding box with zero gaps
    // Verified by anchoring the raster at the origin
    #[test]
    fn test_rasterize_bounds() {
        let surface =
            surface_of(&[TilePos::new(-2, -1), TilePos::new(-1, -1), TilePos::new(1, 0)]);
        let raster = rasterize(&surface).expect("surface has tiles");

        assert_eq!(raster.origin, TilePos::new(-2, -1));
        assert_eq!(raster.cells.dim(), (2, 4));
        assert_eq!(raster.cells[[0, 0]], raster.cells[[0, 1]]);
        assert_ne!(raster.cells[[0, 0]], 0);
        assert_eq!(raster.cells[[0, 2]], 0);
        assert_ne!(raster.cells[[1, 3]], raster.cells[[0, 0]]);
    }

    // Tests an empty surface has no raster and refuses export
    // Verified by rendering a zero-sized image
    #[test]
    fn test_empty_surface() {
        let surface = Surface::new(SurfaceId(3));
        assert!(matches!(
            rasterize(&surface),
            Err(StorageError::NothingToRender { .. })
        ));

        let dir = tempfile::tempdir().expect("temp dir");
        let result = export_overlay_png(&surface, &dir.path().join("empty.png"));
        assert!(matches!(
            result,
            Err(StorageError::NothingToRender {
                surface: SurfaceId(3)
            })
        ));
    }

    // Tests tiles at opposite corners of the key range are refused, not allocated
    // Verified by sizing the raster from the bounding box alone
    #[test]
    fn test_oversized_bounding_box_refused() {
        let edge = AXIS_LIMIT as i32;
        let surface = surface_of(&[TilePos::new(-edge, -edge), TilePos::new(edge - 1, edge - 1)]);
        assert!(matches!(
            rasterize(&surface),
            Err(StorageError::InvalidParameter {
                parameter: "overlay",
                ..
            })
        ));

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("huge.png");
        assert!(export_overlay_png(&surface, &path).is_err());
        assert!(!path.exists());
    }

    // Tests a box exactly at the cell limit still rasterises
    // Verified by comparing the cell count with greater-or-equal
    #[test]
    fn test_bounding_box_at_limit() {
        let side = (MAX_OVERLAY_CELLS as f64).sqrt() as i32;
        let surface = surface_of(&[TilePos::new(0, 0), TilePos::new(side - 1, side - 1)]);
        let raster = rasterize(&surface).expect("box within limit");
        assert_eq!(raster.cells.dim(), (side as usize, side as usize));
    }

    // Tests colours are opaque, distinct for neighbours and clear for gaps
    // Verified by returning a constant colour
    #[test]
    fn test_patch_color() {
        assert_eq!(patch_color(0), [0, 0, 0, 0]);
        assert_eq!(patch_color(1)[3], u8::MAX);
        assert_ne!(patch_color(1), patch_color(2));
        assert_eq!(patch_color(7), patch_color(7));
    }

    // Tests the exported PNG is scaled per tile and creates missing directories
    // Verified by skipping directory creation
    #[test]
    fn test_export_overlay() {
        let surface = surface_of(&[TilePos::new(0, 0), TilePos::new(2, 1)]);
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("overlay.png");

        export_overlay_png(&surface, &path).expect("export succeeds");

        let img = image::open(&path).expect("png readable").to_rgba8();
        assert_eq!(img.dimensions(), (3 * OVERLAY_TILE_PIXELS, 2 * OVERLAY_TILE_PIXELS));
        assert_eq!(img.get_pixel(0, 0).0[3], u8::MAX);
        assert_eq!(img.get_pixel(OVERLAY_TILE_PIXELS, 0).0[3], 0);
    }
}
