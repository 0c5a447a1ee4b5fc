//! Tile partitioning: split a raster into an exact rows×cols grid.
//!
//! ## Why round each edge independently?
//!
//! Cell boundaries are computed from the real-valued cell size and rounded one
//! edge at a time (`round(c * W / cols)`), never by accumulating rounded
//! widths. Two neighbouring tiles therefore compute their shared edge from the
//! same expression and always agree on it: no gap, no overlap. The price is
//! ±1 px of size variation between cells when `W / cols` is not integral.
//!
//! The preview overlay draws its lines through [`cut_position`] as well, so
//! the preview shows exactly where the export will cut.

use crate::error::PosterError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Rows × columns partition of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    rows: u32,
    cols: u32,
}

impl TileGrid {
    /// # Errors
    /// [`PosterError::InvalidGrid`] when either count is zero.
    pub fn new(rows: u32, cols: u32) -> Result<Self, PosterError> {
        if rows < 1 || cols < 1 {
            return Err(PosterError::InvalidGrid {
                rows,
                cols,
                detail: "rows and cols must be >= 1".into(),
            });
        }
        Ok(Self { rows, cols })
    }

    /// The 1×1 grid: the whole image is one tile.
    pub const fn single() -> Self {
        Self { rows: 1, cols: 1 }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Number of tiles (and therefore output pages).
    pub fn tile_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Check that every cell of the grid gets at least one pixel of a
    /// `width`×`height` raster.
    ///
    /// # Errors
    /// [`PosterError::InvalidGrid`] when there are more columns than pixel
    /// columns or more rows than pixel rows.
    pub fn check_fits(&self, width: u32, height: u32) -> Result<(), PosterError> {
        if self.cols > width || self.rows > height {
            return Err(PosterError::InvalidGrid {
                rows: self.rows,
                cols: self.cols,
                detail: format!("grid is finer than the {width}x{height} px raster"),
            });
        }
        Ok(())
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::single()
    }
}

/// Pixel rectangle `[left, right) × [upper, lower)` of cell (row, col).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRect {
    pub row: u32,
    pub col: u32,
    pub left: u32,
    pub upper: u32,
    pub right: u32,
    pub lower: u32,
}

impl TileRect {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.lower - self.upper
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
}

/// One cropped cell of the poster raster.
#[derive(Debug, Clone)]
pub struct Tile {
    pub rect: TileRect,
    pub image: DynamicImage,
}

/// Position of boundary `index` (0..=count) along an axis of `extent` pixels.
///
/// Rounds half to even (`round(2.5) == 2`); cut positions are part of the
/// output format and must not drift between releases.
pub fn cut_position(index: u32, count: u32, extent: u32) -> u32 {
    let cell = extent as f64 / count as f64;
    (index as f64 * cell).round_ties_even() as u32
}

/// Compute every cell rectangle of `grid` over a `width`×`height` raster,
/// row-major.
///
/// # Errors
/// [`PosterError::InvalidGrid`] from [`TileGrid::check_fits`].
pub fn tile_rects(width: u32, height: u32, grid: TileGrid) -> Result<Vec<TileRect>, PosterError> {
    grid.check_fits(width, height)?;

    let mut rects = Vec::with_capacity(grid.tile_count());
    for row in 0..grid.rows {
        let upper = cut_position(row, grid.rows, height);
        let lower = cut_position(row + 1, grid.rows, height);
        for col in 0..grid.cols {
            rects.push(TileRect {
                row,
                col,
                left: cut_position(col, grid.cols, width),
                upper,
                right: cut_position(col + 1, grid.cols, width),
                lower,
            });
        }
    }
    Ok(rects)
}

/// Crop `image` into `grid.tile_count()` tiles in row-major order.
pub fn cut_into_tiles(image: &DynamicImage, grid: TileGrid) -> Result<Vec<Tile>, PosterError> {
    let rects = tile_rects(image.width(), image.height(), grid)?;

    let tiles: Vec<Tile> = rects
        .into_iter()
        .map(|rect| Tile {
            image: image.crop_imm(rect.left, rect.upper, rect.width(), rect.height()),
            rect,
        })
        .collect();

    debug!(
        "Cut {}x{} px raster into {} tiles ({}x{})",
        image.width(),
        image.height(),
        tiles.len(),
        grid.rows,
        grid.cols
    );
    Ok(tiles)
}
