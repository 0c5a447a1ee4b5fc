//! Pipeline stages for poster tiling.
//!
//! Each submodule implements exactly one transformation step, so each is
//! independently testable and the pdfium-backed stages can be swapped for
//! another backend without touching the geometry.
//!
//! ## Data Flow
//!
//! ```text
//!                          ┌──▶ overlay ──▶ encode      (preview)
//! input ──▶ render ──▶ ────┤
//! (bytes)   (pdfium)       └──▶ tiles ───▶ compose     (export)
//! ```
//!
//! 1. [`input`]   — accept an upload: content-type check, `%PDF` sniffing,
//!    local file loading
//! 2. [`render`]  — rasterise the first page under a pixel budget
//! 3. [`tiles`]   — partition the raster into an exact rows×cols grid
//! 4. [`overlay`] — draw the cut lines onto a copy of the raster
//! 5. [`encode`]  — PNG-encode the preview raster
//! 6. [`compose`] — fit each tile onto its own output page

pub mod compose;
pub mod encode;
pub mod input;
pub mod overlay;
pub mod render;
pub mod tiles;
