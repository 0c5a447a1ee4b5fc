//! The two user-facing operations: preview and export.
//!
//! Both are pure functions of their inputs. Each request rasterises the
//! first page, works on its own copies, and returns the complete artifact or
//! an error. The pdfium engine is bound once by the caller and borrowed.
//!
//! Validation happens in a fixed order before any PDF byte is parsed:
//! options (grid, paper) when they are built, then the content type, then
//! the document itself.

use crate::config::{ExportOptions, PreviewOptions, DEFAULT_EXPORT_FILENAME, EXPORT_MAX_PIXELS};
use crate::error::PosterError;
use crate::output::{ExportOutput, ExportReport, ExportStats, PreviewOutput};
use crate::pipeline::compose::{compose_poster, fit_tile, PagePlacement, PageWriter, PdfiumPageWriter};
use crate::pipeline::encode::encode_png;
use crate::pipeline::input::PdfUpload;
use crate::pipeline::overlay::draw_grid_overlay;
use crate::pipeline::render::{first_page_raster_size, rasterize_first_page, Rasterizer};
use crate::pipeline::tiles::{cut_into_tiles, tile_rects};
use pdfium_render::prelude::Pdfium;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Render the first page within the preview budget, draw the cut grid on
/// it, and return it as PNG.
///
/// # Errors
/// * [`PosterError::InvalidInputType`] — upload is not declared as PDF
/// * [`PosterError::InvalidDocument`], [`PosterError::EmptyDocument`],
///   [`PosterError::InvalidPageGeometry`] — unusable document
/// * [`PosterError::InvalidGrid`] — the grid is finer than the preview
///   raster, the same rule [`export`] applies to its larger raster
/// * [`PosterError::RenderFailed`], [`PosterError::EncodeFailed`]
pub fn preview(
    rasterizer: &dyn Rasterizer,
    upload: &PdfUpload,
    options: &PreviewOptions,
) -> Result<PreviewOutput, PosterError> {
    let start = Instant::now();
    upload.validate()?;
    info!(
        "Preview: {} bytes, grid {}x{}, budget {} px",
        upload.bytes.len(),
        options.grid.rows(),
        options.grid.cols(),
        options.max_pixels
    );

    let raster = rasterize_first_page(rasterizer, &upload.bytes, options.max_pixels)?;
    options.grid.check_fits(raster.width(), raster.height())?;
    let overlay = draw_grid_overlay(&raster, options.grid);
    let png = encode_png(&overlay)?;

    info!(
        "Preview ready: {}x{} px, {} bytes PNG in {}ms",
        overlay.width(),
        overlay.height(),
        png.len(),
        start.elapsed().as_millis()
    );

    Ok(PreviewOutput {
        png,
        width: overlay.width(),
        height: overlay.height(),
        grid: options.grid,
    })
}

/// Render the first page at print resolution, cut it into the grid, and
/// lay every tile out on its own page.
///
/// `writer` receives one page per tile in row-major order. The result holds
/// the finished PDF, or nothing: any failure aborts the whole export.
///
/// # Errors
/// Everything [`preview`] can return except `EncodeFailed`, plus
/// [`PosterError::InvalidGrid`] when the grid is finer than the raster and
/// [`PosterError::ComposeFailed`] when the writer fails.
pub fn export<W: PageWriter>(
    rasterizer: &dyn Rasterizer,
    writer: W,
    upload: &PdfUpload,
    options: &ExportOptions,
) -> Result<ExportOutput, PosterError> {
    let start = Instant::now();
    upload.validate()?;
    info!(
        "Export: {} bytes, grid {}x{}, paper {}, margin {} mm",
        upload.bytes.len(),
        options.grid.rows(),
        options.grid.cols(),
        options.paper,
        options.margin_mm
    );

    let render_start = Instant::now();
    let raster = rasterize_first_page(rasterizer, &upload.bytes, EXPORT_MAX_PIXELS)?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    let tiles = cut_into_tiles(&raster, options.grid)?;
    let composed = compose_poster(
        writer,
        &tiles,
        options.paper.device_size(),
        options.margin_pt(),
        options.progress_callback.as_deref(),
    )?;

    let stats = ExportStats {
        page_count: composed.pages.len(),
        raster_width: raster.width(),
        raster_height: raster.height(),
        pdf_bytes: composed.pdf.len(),
        render_duration_ms,
        total_duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Export complete: {} pages, {} bytes, {}ms total",
        stats.page_count, stats.pdf_bytes, stats.total_duration_ms
    );

    Ok(ExportOutput {
        pdf: composed.pdf,
        filename: DEFAULT_EXPORT_FILENAME.to_string(),
        paper: options.paper,
        pages: composed.pages,
        stats,
    })
}

/// [`export`] using pdfium both to rasterise and to write the output.
pub fn export_with_pdfium(
    pdfium: &Pdfium,
    upload: &PdfUpload,
    options: &ExportOptions,
) -> Result<ExportOutput, PosterError> {
    let writer = PdfiumPageWriter::new(pdfium)?;
    export(pdfium, writer, upload, options)
}

/// [`export`] and write the PDF to `path`.
///
/// Parent directories are created. The file is written to a temporary file
/// in the same directory and renamed into place, so `path` never holds a
/// partial document.
pub fn export_to_file<W: PageWriter>(
    rasterizer: &dyn Rasterizer,
    writer: W,
    upload: &PdfUpload,
    options: &ExportOptions,
    path: impl AsRef<Path>,
) -> Result<ExportOutput, PosterError> {
    let output = export(rasterizer, writer, upload, options)?;
    write_atomic(path.as_ref(), &output.pdf)?;
    info!("Wrote {} bytes to {}", output.pdf.len(), path.as_ref().display());
    Ok(output)
}

/// Lay out an export of a `width_px`×`height_px` raster without rendering
/// or writing anything.
///
/// The raster size is what [`export`] would rasterise; [`plan_export_for`]
/// derives it from a document.
pub fn plan_export(
    width_px: u32,
    height_px: u32,
    options: &ExportOptions,
) -> Result<ExportReport, PosterError> {
    let page = options.paper.device_size();
    let margin_pt = options.margin_pt();

    let pages: Vec<PagePlacement> = tile_rects(width_px, height_px, options.grid)?
        .into_iter()
        .enumerate()
        .map(|(i, rect)| PagePlacement {
            page: i + 1,
            row: rect.row,
            col: rect.col,
            tile_width_px: rect.width(),
            tile_height_px: rect.height(),
            placement: fit_tile(rect.width(), rect.height(), page, margin_pt),
        })
        .collect();
    debug!(
        "Planned {} pages for a {}x{} px raster",
        pages.len(),
        width_px,
        height_px
    );

    Ok(ExportReport {
        paper: options.paper,
        page_width_pt: page.width,
        page_height_pt: page.height,
        margin_mm: options.margin_mm,
        rows: options.grid.rows(),
        cols: options.grid.cols(),
        pages,
        stats: None,
    })
}

/// [`plan_export`] for an uploaded document: validates the upload and reads
/// the first page size, but renders nothing.
pub fn plan_export_for(
    rasterizer: &dyn Rasterizer,
    upload: &PdfUpload,
    options: &ExportOptions,
) -> Result<ExportReport, PosterError> {
    upload.validate()?;
    let (width_px, height_px) =
        first_page_raster_size(rasterizer, &upload.bytes, EXPORT_MAX_PIXELS)?;
    plan_export(width_px, height_px, options)
}

/// Write `bytes` to `path` via a temporary sibling file and a rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PosterError> {
    let write_err = |source: std::io::Error| PosterError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
