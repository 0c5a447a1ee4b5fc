//! Error type for the poster-tiler library.
//!
//! Every failure is fatal for the request that hit it: the pipeline either
//! returns the complete artifact (PNG preview or the full tiled PDF) or an
//! [`PosterError`]. There is no partial-success mode and nothing is retried.
//!
//! The variants split into two families:
//!
//! * **Client errors** — the caller sent something unusable (bad grid, not a
//!   PDF, unknown paper). [`PosterError::is_client_error`] returns `true` so a
//!   transport can answer with a 4xx.
//! * **Engine / I/O errors** — pdfium could not be bound, a render or encode
//!   step failed, the output file could not be written.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the poster-tiler library.
#[derive(Debug, Error)]
pub enum PosterError {
    // ── Request validation ────────────────────────────────────────────────
    /// Rows or columns below 1, or a grid finer than the raster itself.
    #[error("Invalid tile grid {rows}x{cols}: {detail}")]
    InvalidGrid { rows: u32, cols: u32, detail: String },

    /// Uploaded content is not declared as a PDF.
    #[error("Please upload a PDF file (got content type '{content_type}')")]
    InvalidInputType { content_type: String },

    // ── Document errors ───────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("Failed to read PDF. Is the file valid? ({detail})")]
    InvalidDocument { detail: String },

    /// The document parsed but contains no pages.
    #[error("PDF has no pages")]
    EmptyDocument,

    /// The first page reports a dimension that is not a positive finite number.
    #[error("Invalid PDF page size: {width}x{height} pt")]
    InvalidPageGeometry { width: f32, height: f32 },

    // ── Paper errors ──────────────────────────────────────────────────────
    /// A `custom:W,H` identifier that does not parse to two positive numbers.
    #[error("Invalid custom paper format '{input}'. Use custom:W_mm,H_mm")]
    InvalidPaperFormat { input: String },

    /// Neither a known preset nor a `custom:` identifier.
    #[error("Unsupported paper size '{input}'. Supported: A4, A3, Letter, Legal, custom:W_mm,H_mm")]
    UnsupportedPaperSize { input: String },

    // ── Pipeline errors ───────────────────────────────────────────────────
    /// pdfium returned an error while rasterising the first page.
    #[error("Rasterisation failed: {detail}")]
    RenderFailed { detail: String },

    /// The preview raster could not be PNG-encoded.
    #[error("Image encoding failed: {detail}")]
    EncodeFailed { detail: String },

    /// Writing tile `page` (1-indexed) into the output document failed.
    #[error("Failed to compose output page {page}: {detail}")]
    ComposeFailed { page: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib).\n\
  • Install libpdfium system-wide.\n\
  • Download a build from https://github.com/bblanchon/pdfium-binaries/releases\n"
    )]
    PdfiumBindingFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed outside the grid and paper checks, e.g. a
    /// zero pixel budget.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PosterError {
    /// `true` when the request itself was at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PosterError::InvalidGrid { .. }
                | PosterError::InvalidInputType { .. }
                | PosterError::InvalidDocument { .. }
                | PosterError::EmptyDocument
                | PosterError::InvalidPageGeometry { .. }
                | PosterError::InvalidPaperFormat { .. }
                | PosterError::UnsupportedPaperSize { .. }
                | PosterError::InvalidConfig(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_grid_display() {
        let e = PosterError::InvalidGrid {
            rows: 0,
            cols: 3,
            detail: "rows and cols must be >= 1".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("0x3"), "got: {msg}");
        assert!(msg.contains(">= 1"), "got: {msg}");
    }

    #[test]
    fn paper_errors_echo_input() {
        let e = PosterError::UnsupportedPaperSize { input: "B5".into() };
        assert!(e.to_string().contains("'B5'"));

        let e = PosterError::InvalidPaperFormat {
            input: "custom:abc".into(),
        };
        assert!(e.to_string().contains("custom:W_mm,H_mm"));
    }

    #[test]
    fn compose_failed_display() {
        let e = PosterError::ComposeFailed {
            page: 4,
            detail: "out of memory".into(),
        };
        assert!(e.to_string().contains("page 4"));
        assert!(e.to_string().contains("out of memory"));
    }

    #[test]
    fn client_errors_are_classified() {
        assert!(PosterError::EmptyDocument.is_client_error());
        assert!(PosterError::InvalidInputType {
            content_type: "image/png".into()
        }
        .is_client_error());
        assert!(!PosterError::RenderFailed {
            detail: "boom".into()
        }
        .is_client_error());
        assert!(!PosterError::PdfiumBindingFailed("missing".into()).is_client_error());
        assert!(PosterError::InvalidConfig("max_pixels must be >= 1".into()).is_client_error());
    }
}
