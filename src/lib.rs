//! # poster-tiler
//!
//! Split a single-page PDF poster into a grid of tiles, one printable page
//! per tile, sized to a standard or custom paper.
//!
//! ## Why rasterise?
//!
//! A poster PDF may contain anything: vector art, embedded photos, text in
//! exotic fonts. Cutting the vector content page-by-page would need a clip
//! path per tile and a PDF rewriter that understands every content stream.
//! Rasterising the first page once at print resolution (a fixed 16 MP
//! budget) and cropping pixels is simple, exact, and always prints what the
//! preview showed.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Input    content-type check
//!  ├─ 2. Render   first page via pdfium under a pixel budget
//!  ├─ 3a. Overlay cut lines on a copy → PNG           (preview)
//!  ├─ 3b. Tiles   exact rows×cols partition           (export)
//!  └─ 4. Compose  one aspect-fit, centred tile per page → PDF
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use poster_tiler::{bind_pdfium, export_with_pdfium, load_pdf_file, ExportOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pdfium = bind_pdfium(None)?;
//!     let upload = load_pdf_file("poster.pdf")?;
//!     let options = ExportOptions::builder().grid(2, 3).paper("A4").build()?;
//!
//!     let output = export_with_pdfium(&pdfium, &upload, &options)?;
//!     std::fs::write(&output.filename, &output.pdf)?;
//!     eprintln!("{} pages", output.stats.page_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `poster-tiler` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! poster-tiler = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod poster;
pub mod progress;
pub mod units;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ExportOptions, ExportOptionsBuilder, PreviewOptions, PreviewOptionsBuilder,
    DEFAULT_EXPORT_FILENAME, DEFAULT_MARGIN_MM, DEFAULT_PAPER, DEFAULT_PREVIEW_MAX_PIXELS,
    EXPORT_MAX_PIXELS,
};
pub use engine::{bind_pdfium, bind_pdfium_from_path};
pub use error::PosterError;
pub use output::{ExportOutput, ExportReport, ExportStats, PreviewOutput};
pub use pipeline::compose::{PagePlacement, PageWriter, PdfiumPageWriter, Placement};
pub use pipeline::input::{load_pdf_file, PdfUpload};
pub use pipeline::render::{PageSource, Rasterizer};
pub use pipeline::tiles::{TileGrid, TileRect};
pub use poster::{
    export, export_to_file, export_with_pdfium, plan_export, plan_export_for, preview,
};
pub use progress::{ExportProgressCallback, NoopProgressCallback, ProgressCallback};
pub use units::{DeviceSize, PaperSize, PhysicalSize};
