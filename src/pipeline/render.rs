//! PDF rasterisation: render the first page under a pixel budget.
//!
//! ## Why a pixel budget, not DPI?
//!
//! Posters come in every size: an A0 sheet at 300 DPI would be a ~140 MP
//! raster. Instead of a resolution we take an approximate `width × height`
//! ceiling and derive one uniform scale factor from the page's area in
//! points, clamped to `[0.25, 6.0]` so neither a tiny budget nor a huge one
//! produces a degenerate raster. The budget is the only guard against
//! unbounded memory use, and picking it is the caller's trade-off (small for
//! previews, large for export).
//!
//! The pdfium backend sits behind [`Rasterizer`] / [`PageSource`], so the
//! scale computation and error mapping are testable without the native
//! library.

use crate::error::PosterError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Smallest render scale (pixels per point).
pub const MIN_RENDER_SCALE: f64 = 0.25;
/// Largest render scale (pixels per point).
pub const MAX_RENDER_SCALE: f64 = 6.0;

/// Opens a PDF held in memory.
pub trait Rasterizer {
    /// Parse `pdf`.
    ///
    /// # Errors
    /// [`PosterError::InvalidDocument`] for malformed or unreadable bytes.
    fn load<'a>(&'a self, pdf: &'a [u8]) -> Result<Box<dyn PageSource + 'a>, PosterError>;
}

/// A loaded document that can report page geometry and render pages.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// `(width, height)` of page `index` in points.
    fn page_size(&self, index: usize) -> Result<(f32, f32), PosterError>;

    /// Render page `index` at `scale` pixels per point.
    fn render_page(&self, index: usize, scale: f32) -> Result<DynamicImage, PosterError>;
}

/// Scale factor that makes a `w_pt × h_pt` page land near `max_pixels`.
///
/// `sqrt(max(1, max_pixels) / (w_pt * h_pt))`, clamped to
/// [`MIN_RENDER_SCALE`]..=[`MAX_RENDER_SCALE`].
pub fn compute_scale(max_pixels: u64, w_pt: f64, h_pt: f64) -> f64 {
    let budget = (max_pixels as f64).max(1.0);
    (budget / (w_pt * h_pt))
        .sqrt()
        .clamp(MIN_RENDER_SCALE, MAX_RENDER_SCALE)
}

/// Keep RGB and RGBA rasters as they are; convert every other layout to RGB.
pub fn normalize_color(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

/// Rasterise the first page of `pdf` within roughly `max_pixels` pixels.
///
/// # Errors
/// * [`PosterError::InvalidDocument`] — bytes are not a readable PDF
/// * [`PosterError::EmptyDocument`] — the document has no pages
/// * [`PosterError::InvalidPageGeometry`] — a page dimension is ≤ 0 or
///   not finite
/// * [`PosterError::RenderFailed`] — pdfium failed while rendering
pub fn rasterize_first_page(
    rasterizer: &dyn Rasterizer,
    pdf: &[u8],
    max_pixels: u64,
) -> Result<DynamicImage, PosterError> {
    let document = rasterizer.load(pdf)?;
    let (width, height) = first_page_size(&*document)?;

    let scale = compute_scale(max_pixels, width as f64, height as f64);
    debug!(
        "Page 1 is {:.1}x{:.1} pt; budget {} px → scale {:.4}",
        width, height, max_pixels, scale
    );

    let image = normalize_color(document.render_page(0, scale as f32)?);
    debug!("Rendered page 1 → {}x{} px", image.width(), image.height());

    Ok(image)
}

/// Pixel size [`rasterize_first_page`] would produce, without rendering.
///
/// Each side is `round(side_pt * scale)` in `f32`, at least 1, the same
/// arithmetic pdfium applies to `scale_page_by_factor`.
pub fn first_page_raster_size(
    rasterizer: &dyn Rasterizer,
    pdf: &[u8],
    max_pixels: u64,
) -> Result<(u32, u32), PosterError> {
    let document = rasterizer.load(pdf)?;
    let (width, height) = first_page_size(&*document)?;
    let scale = compute_scale(max_pixels, width as f64, height as f64);
    let scale = scale as f32;
    let px = |pt: f32| ((pt * scale).round() as u32).max(1);
    Ok((px(width), px(height)))
}

/// Size of page 1 in points, after the page-count and geometry checks.
fn first_page_size(document: &dyn PageSource) -> Result<(f32, f32), PosterError> {
    let total_pages = document.page_count();
    if total_pages == 0 {
        return Err(PosterError::EmptyDocument);
    }
    info!("PDF loaded: {} pages (using page 1)", total_pages);

    let (width, height) = document.page_size(0)?;
    let valid = |side: f32| side.is_finite() && side > 0.0;
    if !valid(width) || !valid(height) {
        return Err(PosterError::InvalidPageGeometry { width, height });
    }
    Ok((width, height))
}

// ── pdfium backend ───────────────────────────────────────────────────────

impl Rasterizer for Pdfium {
    fn load<'a>(&'a self, pdf: &'a [u8]) -> Result<Box<dyn PageSource + 'a>, PosterError> {
        let document = self
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| PosterError::InvalidDocument {
                detail: format!("{:?}", e),
            })?;
        Ok(Box::new(PdfiumPageSource { document }))
    }
}

/// A document opened by pdfium.
struct PdfiumPageSource<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumPageSource<'a> {
    fn page(&self, index: usize) -> Result<PdfPage<'a>, PosterError> {
        let index = PdfPageIndex::try_from(index).map_err(|_| PosterError::RenderFailed {
            detail: format!("page index {index} out of range"),
        })?;
        self.document
            .pages()
            .get(index)
            .map_err(|e| PosterError::InvalidDocument {
                detail: format!("{:?}", e),
            })
    }
}

impl PageSource for PdfiumPageSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_size(&self, index: usize) -> Result<(f32, f32), PosterError> {
        let page = self.page(index)?;
        Ok((page.width().value, page.height().value))
    }

    fn render_page(&self, index: usize, scale: f32) -> Result<DynamicImage, PosterError> {
        let page = self.page(index)?;
        let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| PosterError::RenderFailed {
                detail: format!("{:?}", e),
            })?;

        Ok(bitmap.as_image())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage, RgbaImage};

    /// In-memory stand-in for a parsed PDF.
    struct FakeDocument {
        pages: Vec<(f32, f32)>,
    }

    impl Rasterizer for FakeDocument {
        fn load<'a>(&'a self, pdf: &'a [u8]) -> Result<Box<dyn PageSource + 'a>, PosterError> {
            if !pdf.starts_with(b"%PDF") {
                return Err(PosterError::InvalidDocument {
                    detail: "missing header".into(),
                });
            }
            Ok(Box::new(FakePages(&self.pages)))
        }
    }

    /// Renders at `round(side_pt * scale)` in `f32`, like pdfium.
    struct FakePages<'a>(&'a [(f32, f32)]);

    impl PageSource for FakePages<'_> {
        fn page_count(&self) -> usize {
            self.0.len()
        }

        fn page_size(&self, index: usize) -> Result<(f32, f32), PosterError> {
            Ok(self.0[index])
        }

        fn render_page(&self, index: usize, scale: f32) -> Result<DynamicImage, PosterError> {
            let (w, h) = self.0[index];
            let px = |v: f32| ((v * scale).round() as u32).max(1);
            Ok(DynamicImage::ImageLuma8(GrayImage::from_pixel(
                px(w),
                px(h),
                Luma([128]),
            )))
        }
    }

    #[test]
    fn scale_hits_budget_in_range() {
        // 1000 × 1000 pt page, 4 MP budget → scale 2.
        assert!((compute_scale(4_000_000, 1000.0, 1000.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn scale_floors_at_quarter() {
        assert_eq!(compute_scale(1, 2384.0, 3370.0), MIN_RENDER_SCALE);
        assert_eq!(compute_scale(0, 595.0, 842.0), MIN_RENDER_SCALE);
    }

    #[test]
    fn scale_ceils_at_six() {
        assert_eq!(compute_scale(16_000_000, 10.0, 10.0), MAX_RENDER_SCALE);
        assert_eq!(compute_scale(u64::MAX, 595.0, 842.0), MAX_RENDER_SCALE);
    }

    #[test]
    fn normalize_keeps_rgb_and_rgba() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        assert!(matches!(normalize_color(rgb), DynamicImage::ImageRgb8(_)));
        let rgba = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));
        assert!(matches!(normalize_color(rgba), DynamicImage::ImageRgba8(_)));
        let gray = DynamicImage::ImageLuma8(GrayImage::new(2, 2));
        assert!(matches!(normalize_color(gray), DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn rasterizes_first_page_within_budget() {
        let doc = FakeDocument {
            pages: vec![(600.0, 400.0), (100.0, 100.0)],
        };
        let img = rasterize_first_page(&doc, b"%PDF-1.7", 960_000).unwrap();
        // scale = sqrt(960000 / 240000) = 2
        assert_eq!((img.width(), img.height()), (1200, 800));
        assert!(matches!(img, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn raster_size_matches_render() {
        let doc = FakeDocument {
            pages: vec![(600.0, 400.0)],
        };
        assert_eq!(
            first_page_raster_size(&doc, b"%PDF-1.7", 960_000).unwrap(),
            (1200, 800)
        );
        let empty = FakeDocument { pages: vec![] };
        assert!(matches!(
            first_page_raster_size(&empty, b"%PDF-1.7", 960_000),
            Err(PosterError::EmptyDocument)
        ));
    }

    #[test]
    fn raster_size_agrees_with_render_on_awkward_sizes() {
        let sizes = [
            (595.2756, 841.8898),
            (612.0, 792.0),
            (2383.937, 3370.3938),
            (333.3, 77.7),
            (1.0, 999.9),
        ];
        for budget in [1_200_000, 16_000_000, 777_777] {
            for size in sizes {
                let doc = FakeDocument { pages: vec![size] };
                let img = rasterize_first_page(&doc, b"%PDF-1.7", budget).unwrap();
                assert_eq!(
                    first_page_raster_size(&doc, b"%PDF-1.7", budget).unwrap(),
                    (img.width(), img.height()),
                    "{size:?} at {budget} px"
                );
            }
        }
    }

    #[test]
    fn malformed_bytes_are_invalid_document() {
        let doc = FakeDocument {
            pages: vec![(100.0, 100.0)],
        };
        assert!(matches!(
            rasterize_first_page(&doc, b"garbage", 1000),
            Err(PosterError::InvalidDocument { .. })
        ));
    }

    #[test]
    fn zero_pages_is_empty_document() {
        let doc = FakeDocument { pages: vec![] };
        assert!(matches!(
            rasterize_first_page(&doc, b"%PDF-1.7", 1000),
            Err(PosterError::EmptyDocument)
        ));
    }

    #[test]
    fn degenerate_page_is_invalid_geometry() {
        for size in [
            (0.0, 100.0),
            (100.0, -5.0),
            (f32::NAN, 100.0),
            (100.0, f32::NAN),
            (f32::INFINITY, 100.0),
            (100.0, f32::NEG_INFINITY),
        ] {
            let doc = FakeDocument { pages: vec![size] };
            assert!(matches!(
                rasterize_first_page(&doc, b"%PDF-1.7", 1000),
                Err(PosterError::InvalidPageGeometry { .. })
            ));
            assert!(matches!(
                first_page_raster_size(&doc, b"%PDF-1.7", 1000),
                Err(PosterError::InvalidPageGeometry { .. })
            ));
        }
    }
}
