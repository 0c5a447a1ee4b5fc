//! Output types returned by the preview and export operations.

use crate::pipeline::compose::PagePlacement;
use crate::pipeline::tiles::TileGrid;
use crate::units::PaperSize;
use serde::{Deserialize, Serialize};

/// Result of [`crate::preview`]: the grid-overlaid raster as PNG.
#[derive(Debug, Clone)]
pub struct PreviewOutput {
    /// PNG-encoded preview (`image/png`).
    pub png: Vec<u8>,
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    pub grid: TileGrid,
}

/// Result of [`crate::export`]: the tiled PDF plus its layout.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    /// The finished multi-page PDF.
    pub pdf: Vec<u8>,
    /// Suggested download name.
    pub filename: String,
    pub paper: PaperSize,
    /// One entry per page, in page order.
    pub pages: Vec<PagePlacement>,
    pub stats: ExportStats,
}

/// Timing and size figures for one export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportStats {
    pub page_count: usize,
    pub raster_width: u32,
    pub raster_height: u32,
    pub pdf_bytes: usize,
    pub render_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Serialisable description of an export, for `--json` and `--dry-run`.
///
/// Produced by [`ExportOutput::report`] or by [`crate::plan_export`], which
/// fills in the layout without rendering anything (so `stats` is absent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReport {
    pub paper: PaperSize,
    pub page_width_pt: f64,
    pub page_height_pt: f64,
    pub margin_mm: f64,
    pub rows: u32,
    pub cols: u32,
    pub pages: Vec<PagePlacement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ExportStats>,
}

impl ExportOutput {
    /// Layout and stats of this export, without the PDF bytes.
    pub fn report(&self, grid: TileGrid, margin_mm: f64) -> ExportReport {
        let page = self.paper.device_size();
        ExportReport {
            paper: self.paper,
            page_width_pt: page.width,
            page_height_pt: page.height,
            margin_mm,
            rows: grid.rows(),
            cols: grid.cols(),
            pages: self.pages.clone(),
            stats: Some(self.stats.clone()),
        }
    }
}
