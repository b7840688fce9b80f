//! PNG export of a surface's patch layout with transparent gaps

use crate::io::configuration::{MAX_OVERLAY_CELLS, OVERLAY_TILE_PIXELS};
use crate::io::error::{Result, StorageError, WithContext, invalid_parameter};
use crate::spatial::key::TilePos;
use crate::storage::surface::Surface;
use image::{ImageBuffer, Rgba};
use ndarray::Array2;
use std::path::Path;

/// Patch ids laid out on the bounding box of a surface's tiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRaster {
    /// Position of the top-left cell
    pub origin: TilePos,
    /// Patch id per cell indexed `[row, col]`, zero where there is no tile
    pub cells: Array2<u64>,
}

/// Rasterise a surface into patch ids
///
/// # Errors
///
/// Returns an error if the surface holds no tiles or its bounding box
/// exceeds [`MAX_OVERLAY_CELLS`]
pub fn rasterize(surface: &Surface) -> Result<PatchRaster> {
    let mut bounds: Option<(TilePos, TilePos)> = None;
    for patch in surface.patches() {
        for key in patch.tiles() {
            let pos = key.pos();
            bounds = Some(bounds.map_or((pos, pos), |(min, max)| {
                (
                    TilePos::new(min.x.min(pos.x), min.y.min(pos.y)),
                    TilePos::new(max.x.max(pos.x), max.y.max(pos.y)),
                )
            }));
        }
    }
    let (min, max) = bounds.ok_or(StorageError::NothingToRender {
        surface: surface.id(),
    })?;

    let rows = (i64::from(max.y) - i64::from(min.y) + 1) as u64;
    let cols = (i64::from(max.x) - i64::from(min.x) + 1) as u64;
    if rows * cols > MAX_OVERLAY_CELLS {
        return Err(invalid_parameter(
            "overlay",
            &format!("{cols}x{rows} tiles"),
            &format!("bounding box exceeds {MAX_OVERLAY_CELLS} tiles"),
        ));
    }
    let mut cells = Array2::<u64>::zeros((rows as usize, cols as usize));
    for patch in surface.patches() {
        for key in patch.tiles() {
            let pos = key.pos();
            let row = (i64::from(pos.y) - i64::from(min.y)) as usize;
            let col = (i64::from(pos.x) - i64::from(min.x)) as usize;
            if let Some(cell) = cells.get_mut([row, col]) {
                *cell = patch.id().0;
            }
        }
    }
    Ok(PatchRaster { origin: min, cells })
}

/// Stable colour for a patch id, fully transparent for zero
pub const fn patch_color(id: u64) -> [u8; 4] {
    if id == 0 {
        return [0, 0, 0, 0];
    }
    // Fibonacci hashing spreads consecutive ids across the palette
    let mixed = id.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    [
        (mixed >> 56) as u8 | 0x40,
        (mixed >> 48) as u8 | 0x40,
        (mixed >> 40) as u8 | 0x40,
        u8::MAX,
    ]
}

/// Export a surface's patch layout as a PNG, one colour per patch
///
/// # Errors
///
/// Returns an error if:
/// - The surface holds no tiles
/// - The tiles span more than [`MAX_OVERLAY_CELLS`]
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_overlay_png(surface: &Surface, output_path: &Path) -> Result<()> {
    let raster = rasterize(surface)?;
    let (rows, cols) = raster.cells.dim();
    let width = cols as u32 * OVERLAY_TILE_PIXELS;
    let height = rows as u32 * OVERLAY_TILE_PIXELS;

    let img = ImageBuffer::from_fn(width, height, |x, y| {
        let row = (y / OVERLAY_TILE_PIXELS) as usize;
        let col = (x / OVERLAY_TILE_PIXELS) as usize;
        let id = raster.cells.get([row, col]).copied().unwrap_or(0);
        Rgba(patch_color(id))
    });

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).with_path(parent, "create directory")?;
    }

    img.save(output_path)
        .map_err(|source| StorageError::ImageExport {
            path: output_path.to_path_buf(),
            source,
        })?;

    log::debug!(
        "surface {}: wrote {width}x{height} overlay to {}",
        surface.id().0,
        output_path.display()
    );
    Ok(())
}
