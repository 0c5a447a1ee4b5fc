//! Poster composition: one output page per tile.
//!
//! Every page has the chosen paper size. Each tile is scaled uniformly to
//! fit ("fit", not "fill") inside the printable area (the paper minus the
//! margin on all four sides) and centred on the page. In a uniform grid all
//! tiles share an aspect ratio, so drawn size and position only vary by the
//! ±1 px rounding of the partitioner.
//!
//! Page emission goes through [`PageWriter`]; the pdfium implementation is
//! [`PdfiumPageWriter`]. A writer failure aborts the export: callers get the
//! whole document or an error, never a truncated file.

use super::tiles::Tile;
use crate::error::PosterError;
use crate::progress::ExportProgressCallback;
use crate::units::DeviceSize;
use image::DynamicImage;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where a tile is drawn on its page, in points from the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Layout of one output page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePlacement {
    /// 1-indexed page number in the output document.
    pub page: usize,
    pub row: u32,
    pub col: u32,
    pub tile_width_px: u32,
    pub tile_height_px: u32,
    pub placement: Placement,
}

/// Emits pages into an output document.
pub trait PageWriter {
    /// Append a page of `size` with `image` drawn at `placement`.
    fn emit_page(
        &mut self,
        size: DeviceSize,
        image: &DynamicImage,
        placement: &Placement,
    ) -> Result<(), PosterError>;

    /// Serialise the finished document.
    fn finish(self) -> Result<Vec<u8>, PosterError>;
}

/// Paper minus `margin_pt` on every side, floored at 1 pt per axis.
///
/// Negative margins count as zero. A margin of half the paper or more
/// leaves a 1 pt area rather than an error.
pub fn printable_area(page: DeviceSize, margin_pt: f64) -> (f64, f64) {
    let margin = margin_pt.max(0.0);
    (
        (page.width - 2.0 * margin).max(1.0),
        (page.height - 2.0 * margin).max(1.0),
    )
}

/// Aspect-fit a `tile_width`×`tile_height` tile into the printable area of
/// `page` and centre it.
pub fn fit_tile(tile_width: u32, tile_height: u32, page: DeviceSize, margin_pt: f64) -> Placement {
    let (printable_w, printable_h) = printable_area(page, margin_pt);
    let (tw, th) = (tile_width as f64, tile_height as f64);

    let scale = (printable_w / tw).min(printable_h / th);
    let width = tw * scale;
    let height = th * scale;

    Placement {
        x: (page.width - width) / 2.0,
        y: (page.height - height) / 2.0,
        width,
        height,
    }
}

/// Result of [`compose_poster`].
#[derive(Debug, Clone)]
pub struct ComposedPoster {
    pub pdf: Vec<u8>,
    pub pages: Vec<PagePlacement>,
}

/// Lay out every tile on its own `page`-sized page, in order.
///
/// # Errors
/// * [`PosterError::Internal`] — `tiles` is empty
/// * whatever the writer returns; the partially written document is dropped
pub fn compose_poster<W: PageWriter>(
    mut writer: W,
    tiles: &[Tile],
    page: DeviceSize,
    margin_pt: f64,
    progress: Option<&dyn ExportProgressCallback>,
) -> Result<ComposedPoster, PosterError> {
    if tiles.is_empty() {
        return Err(PosterError::Internal("no tiles to compose".into()));
    }

    let total = tiles.len();
    if let Some(cb) = progress {
        cb.on_export_start(total);
    }

    let mut pages = Vec::with_capacity(total);
    for (i, tile) in tiles.iter().enumerate() {
        // The page contract requires opaque colour: alpha is dropped.
        let rgb;
        let image = match &tile.image {
            img @ DynamicImage::ImageRgb8(_) => img,
            other => {
                rgb = DynamicImage::ImageRgb8(other.to_rgb8());
                &rgb
            }
        };

        let placement = fit_tile(image.width(), image.height(), page, margin_pt);
        writer.emit_page(page, image, &placement)?;

        let layout = PagePlacement {
            page: i + 1,
            row: tile.rect.row,
            col: tile.rect.col,
            tile_width_px: image.width(),
            tile_height_px: image.height(),
            placement,
        };
        debug!(
            "Page {}/{}: tile ({}, {}) {}x{} px → {:.1}x{:.1} pt at ({:.1}, {:.1})",
            layout.page,
            total,
            layout.row,
            layout.col,
            layout.tile_width_px,
            layout.tile_height_px,
            placement.width,
            placement.height,
            placement.x,
            placement.y
        );
        if let Some(cb) = progress {
            cb.on_tile_composed(&layout, total);
        }
        pages.push(layout);
    }

    let pdf = writer.finish()?;
    if let Some(cb) = progress {
        cb.on_export_complete(pages.len(), pdf.len());
    }

    Ok(ComposedPoster { pdf, pages })
}

// ── pdfium backend ───────────────────────────────────────────────────────

/// Writes pages into a new pdfium document.
pub struct PdfiumPageWriter<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumPageWriter<'a> {
    pub fn new(pdfium: &'a Pdfium) -> Result<Self, PosterError> {
        let document = pdfium
            .create_new_pdf()
            .map_err(|e| PosterError::Internal(format!("Failed to create output PDF: {:?}", e)))?;
        Ok(Self { document })
    }
}

impl PageWriter for PdfiumPageWriter<'_> {
    fn emit_page(
        &mut self,
        size: DeviceSize,
        image: &DynamicImage,
        placement: &Placement,
    ) -> Result<(), PosterError> {
        let page_number = self.document.pages().len() as usize + 1;
        let fail = |e: PdfiumError| PosterError::ComposeFailed {
            page: page_number,
            detail: format!("{:?}", e),
        };

        let paper = PdfPagePaperSize::from_points(
            PdfPoints::new(size.width as f32),
            PdfPoints::new(size.height as f32),
        );
        let mut page = self
            .document
            .pages_mut()
            .create_page_at_end(paper)
            .map_err(fail)?;

        page.objects_mut()
            .create_image_object(
                PdfPoints::new(placement.x as f32),
                PdfPoints::new(placement.y as f32),
                image,
                Some(PdfPoints::new(placement.width as f32)),
                Some(PdfPoints::new(placement.height as f32)),
            )
            .map_err(fail)?;

        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, PosterError> {
        self.document
            .save_to_bytes()
            .map_err(|e| PosterError::Internal(format!("Failed to serialise output PDF: {:?}", e)))
    }
}
