//! Options for the preview and export operations.
//!
//! Both option structs are built through a builder whose `build()` does the
//! validation: the grid is checked there and the paper identifier is parsed
//! there, so an options value that exists is always usable. The same
//! validation therefore runs before any PDF byte is looked at.

use crate::error::PosterError;
use crate::pipeline::tiles::TileGrid;
use crate::progress::ProgressCallback;
use crate::units::{to_points, PaperSize};
use std::fmt;
use tracing::warn;

/// Default preview pixel budget (≈ 1.2 MP).
pub const DEFAULT_PREVIEW_MAX_PIXELS: u64 = 1_200_000;

/// Pixel budget for export rasters. Not configurable: print quality should
/// not depend on who calls the export.
pub const EXPORT_MAX_PIXELS: u64 = 16_000_000;

/// Default margin on every side of an output page.
pub const DEFAULT_MARGIN_MM: f64 = 5.0;

/// Paper used when none is given.
pub const DEFAULT_PAPER: &str = "A4";

/// Suggested filename for the exported document.
pub const DEFAULT_EXPORT_FILENAME: &str = "poster-tiles.pdf";

// ── Preview ──────────────────────────────────────────────────────────────

/// Options for [`crate::preview`].
///
/// # Example
/// ```rust
/// use poster_tiler::PreviewOptions;
///
/// let options = PreviewOptions::builder()
///     .grid(2, 3)
///     .max_pixels(500_000)
///     .build()
///     .unwrap();
/// assert_eq!(options.grid.tile_count(), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewOptions {
    pub grid: TileGrid,

    /// Approximate `width × height` ceiling of the preview raster.
    pub max_pixels: u64,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            grid: TileGrid::single(),
            max_pixels: DEFAULT_PREVIEW_MAX_PIXELS,
        }
    }
}

impl PreviewOptions {
    pub fn builder() -> PreviewOptionsBuilder {
        PreviewOptionsBuilder {
            rows: 1,
            cols: 1,
            max_pixels: DEFAULT_PREVIEW_MAX_PIXELS,
        }
    }
}

/// Builder for [`PreviewOptions`].
#[derive(Debug, Clone)]
pub struct PreviewOptionsBuilder {
    rows: u32,
    cols: u32,
    max_pixels: u64,
}

impl PreviewOptionsBuilder {
    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = rows;
        self
    }

    pub fn cols(mut self, cols: u32) -> Self {
        self.cols = cols;
        self
    }

    /// Set rows and columns together.
    pub fn grid(self, rows: u32, cols: u32) -> Self {
        self.rows(rows).cols(cols)
    }

    pub fn max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// Build the options, validating the grid and the pixel budget.
    pub fn build(self) -> Result<PreviewOptions, PosterError> {
        let grid = TileGrid::new(self.rows, self.cols)?;
        if self.max_pixels == 0 {
            return Err(PosterError::InvalidConfig(
                "max_pixels must be >= 1".to_string(),
            ));
        }
        Ok(PreviewOptions {
            grid,
            max_pixels: self.max_pixels,
        })
    }
}

// ── Export ───────────────────────────────────────────────────────────────

/// Options for [`crate::export`].
///
/// # Example
/// ```rust
/// use poster_tiler::{ExportOptions, PaperSize};
///
/// let options = ExportOptions::builder()
///     .grid(3, 2)
///     .paper("Letter")
///     .margin_mm(10.0)
///     .build()
///     .unwrap();
/// assert_eq!(options.paper, PaperSize::Letter);
/// ```
#[derive(Clone)]
pub struct ExportOptions {
    pub grid: TileGrid,
    pub paper: PaperSize,

    /// Blank border on every side of each page, in millimetres. Always ≥ 0.
    pub margin_mm: f64,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            grid: TileGrid::single(),
            paper: PaperSize::default(),
            margin_mm: DEFAULT_MARGIN_MM,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportOptions")
            .field("grid", &self.grid)
            .field("paper", &self.paper)
            .field("margin_mm", &self.margin_mm)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExportProgressCallback>"),
            )
            .finish()
    }
}

impl ExportOptions {
    pub fn builder() -> ExportOptionsBuilder {
        ExportOptionsBuilder {
            rows: 1,
            cols: 1,
            paper: DEFAULT_PAPER.to_string(),
            margin_mm: DEFAULT_MARGIN_MM,
            progress_callback: None,
        }
    }

    /// The margin in PDF points.
    pub fn margin_pt(&self) -> f64 {
        to_points(self.margin_mm)
    }
}

/// Builder for [`ExportOptions`].
pub struct ExportOptionsBuilder {
    rows: u32,
    cols: u32,
    paper: String,
    margin_mm: f64,
    progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ExportOptionsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportOptionsBuilder")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("paper", &self.paper)
            .field("margin_mm", &self.margin_mm)
            .finish_non_exhaustive()
    }
}

impl ExportOptionsBuilder {
    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = rows;
        self
    }

    pub fn cols(mut self, cols: u32) -> Self {
        self.cols = cols;
        self
    }

    /// Set rows and columns together.
    pub fn grid(self, rows: u32, cols: u32) -> Self {
        self.rows(rows).cols(cols)
    }

    /// Paper identifier: `A4`, `A3`, `Letter`, `Legal` or `custom:W,H` (mm).
    /// Parsed by [`build`](Self::build).
    pub fn paper(mut self, paper: impl Into<String>) -> Self {
        self.paper = paper.into();
        self
    }

    pub fn paper_size(mut self, paper: PaperSize) -> Self {
        self.paper = paper.to_string();
        self
    }

    pub fn margin_mm(mut self, margin_mm: f64) -> Self {
        self.margin_mm = margin_mm;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.progress_callback = Some(cb);
        self
    }

    /// Build the options: validate the grid, resolve the paper, clamp the
    /// margin to ≥ 0.
    pub fn build(self) -> Result<ExportOptions, PosterError> {
        let grid = TileGrid::new(self.rows, self.cols)?;
        let paper = PaperSize::parse(&self.paper)?;

        // NaN falls through `max` to 0 as well.
        let margin_mm = self.margin_mm.max(0.0);
        if margin_mm != self.margin_mm {
            warn!("Margin {} mm clamped to {} mm", self.margin_mm, margin_mm);
        }

        Ok(ExportOptions {
            grid,
            paper,
            margin_mm,
            progress_callback: self.progress_callback,
        })
    }
}
