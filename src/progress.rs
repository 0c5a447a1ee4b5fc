//! Progress-callback trait for export events.
//!
//! Inject an [`Arc<dyn ExportProgressCallback>`] via
//! [`crate::config::ExportOptionsBuilder::progress_callback`] to hear about
//! each tile as it lands on its page. Rasterising a large budget and
//! composing dozens of pages can take a few seconds; the CLI turns these
//! events into a progress bar.
//!
//! # Example
//!
//! ```rust
//! use poster_tiler::{ExportOptions, ExportProgressCallback, PagePlacement};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     composed: AtomicUsize,
//! }
//!
//! impl ExportProgressCallback for CountingCallback {
//!     fn on_tile_composed(&self, page: &PagePlacement, total: usize) {
//!         self.composed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done", page.page, total);
//!     }
//! }
//!
//! let options = ExportOptions::builder()
//!     .grid(2, 3)
//!     .progress_callback(Arc::new(CountingCallback { composed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::pipeline::compose::PagePlacement;
use std::sync::Arc;

/// Called by the export pipeline as it composes each page.
///
/// Implementations must be `Send + Sync` so options carrying a callback can
/// be shared across threads. All methods have default no-op implementations;
/// override only what you need.
pub trait ExportProgressCallback: Send + Sync {
    /// Called once before the first page is written.
    ///
    /// # Arguments
    /// * `total_tiles` — number of pages the document will have
    fn on_export_start(&self, total_tiles: usize) {
        let _ = total_tiles;
    }

    /// Called after each tile is placed on its page.
    ///
    /// # Arguments
    /// * `page`  — layout of the page just written (1-indexed `page`)
    /// * `total` — total pages
    fn on_tile_composed(&self, page: &PagePlacement, total: usize) {
        let _ = (page, total);
    }

    /// Called once the document has been serialised.
    ///
    /// # Arguments
    /// * `total_pages` — pages written
    /// * `pdf_bytes`   — size of the finished PDF
    fn on_export_complete(&self, total_pages: usize, pdf_bytes: usize) {
        let _ = (total_pages, pdf_bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExportOptions`].
pub type ProgressCallback = Arc<dyn ExportProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::compose::Placement;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        started_total: AtomicUsize,
        composed: AtomicUsize,
        last_page: AtomicUsize,
        completed_pages: AtomicUsize,
        completed_bytes: AtomicUsize,
    }

    impl ExportProgressCallback for TrackingCallback {
        fn on_export_start(&self, total_tiles: usize) {
            self.started_total.store(total_tiles, Ordering::SeqCst);
        }

        fn on_tile_composed(&self, page: &PagePlacement, _total: usize) {
            self.composed.fetch_add(1, Ordering::SeqCst);
            self.last_page.store(page.page, Ordering::SeqCst);
        }

        fn on_export_complete(&self, total_pages: usize, pdf_bytes: usize) {
            self.completed_pages.store(total_pages, Ordering::SeqCst);
            self.completed_bytes.store(pdf_bytes, Ordering::SeqCst);
        }
    }

    fn layout(page: usize) -> PagePlacement {
        PagePlacement {
            page,
            row: 0,
            col: page as u32 - 1,
            tile_width_px: 10,
            tile_height_px: 10,
            placement: Placement {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 100.0,
            },
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_export_start(2);
        cb.on_tile_composed(&layout(1), 2);
        cb.on_export_complete(2, 1024);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_export_start(3);
        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 3);

        for page in 1..=3 {
            tracker.on_tile_composed(&layout(page), 3);
        }
        assert_eq!(tracker.composed.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.last_page.load(Ordering::SeqCst), 3);

        tracker.on_export_complete(3, 4096);
        assert_eq!(tracker.completed_pages.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completed_bytes.load(Ordering::SeqCst), 4096);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_export_start(1);
        cb.on_tile_composed(&layout(1), 1);
    }
}
