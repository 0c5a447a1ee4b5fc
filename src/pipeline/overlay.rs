//! Preview overlay: draw the cut-line grid onto a copy of the raster.
//!
//! Lines sit on the exact boundaries returned by
//! [`tiles::cut_position`](super::tiles::cut_position), so what the user sees
//! in the preview is where the export cuts. The overlay is never fed back
//! into the tiler.

use super::render::normalize_color;
use super::tiles::{cut_position, TileGrid};
use image::{DynamicImage, ImageBuffer, Pixel, Rgb, Rgba};
use std::ops::Range;
use tracing::debug;

/// Cut-line colour: opaque cyan.
pub const GRID_LINE_RGB: [u8; 3] = [0, 255, 255];

/// Line thickness relative to the shorter raster edge.
const LINE_WIDTH_RATIO: f64 = 0.002;

/// `max(1, round(min(W, H) * 0.002))` — thin on small previews, never zero.
pub fn grid_line_width(width: u32, height: u32) -> u32 {
    let scaled = (width.min(height) as f64 * LINE_WIDTH_RATIO).round_ties_even() as u32;
    scaled.max(1)
}

/// Interior vertical cut positions (`cols - 1` of them).
pub fn vertical_cut_lines(width: u32, grid: TileGrid) -> Vec<u32> {
    (1..grid.cols())
        .map(|c| cut_position(c, grid.cols(), width))
        .collect()
}

/// Interior horizontal cut positions (`rows - 1` of them).
pub fn horizontal_cut_lines(height: u32, grid: TileGrid) -> Vec<u32> {
    (1..grid.rows())
        .map(|r| cut_position(r, grid.rows(), height))
        .collect()
}

/// Return a copy of `image` with the grid drawn on it.
pub fn draw_grid_overlay(image: &DynamicImage, grid: TileGrid) -> DynamicImage {
    let mut overlay = normalize_color(image.clone());

    match &mut overlay {
        DynamicImage::ImageRgba8(buf) => {
            let [r, g, b] = GRID_LINE_RGB;
            draw_lines(buf, grid, Rgba([r, g, b, 255]));
        }
        DynamicImage::ImageRgb8(buf) => draw_lines(buf, grid, Rgb(GRID_LINE_RGB)),
        other => {
            let mut rgb = other.to_rgb8();
            draw_lines(&mut rgb, grid, Rgb(GRID_LINE_RGB));
            *other = DynamicImage::ImageRgb8(rgb);
        }
    }

    overlay
}

fn draw_lines<P: Pixel>(buf: &mut ImageBuffer<P, Vec<P::Subpixel>>, grid: TileGrid, color: P) {
    let (width, height) = buf.dimensions();
    let line_width = grid_line_width(width, height);

    let verticals = vertical_cut_lines(width, grid);
    let horizontals = horizontal_cut_lines(height, grid);
    debug!(
        "Overlay {}x{} px: {} vertical, {} horizontal lines, {} px wide",
        width,
        height,
        verticals.len(),
        horizontals.len(),
        line_width
    );

    for x in verticals {
        fill(buf, band(x, line_width, width), 0..height, color);
    }
    for y in horizontals {
        fill(buf, 0..width, band(y, line_width, height), color);
    }
}

/// Pixel span of a line of `line_width` centred on `pos`, clipped to the image.
fn band(pos: u32, line_width: u32, extent: u32) -> Range<u32> {
    let start = pos.saturating_sub(line_width / 2);
    let end = (start + line_width).min(extent);
    start..end
}

fn fill<P: Pixel>(
    buf: &mut ImageBuffer<P, Vec<P::Subpixel>>,
    xs: Range<u32>,
    ys: Range<u32>,
    color: P,
) {
    for y in ys {
        for x in xs.clone() {
            buf.put_pixel(x, y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tiles::tile_rects;
    use image::{GrayImage, Luma, RgbImage, RgbaImage};

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const CYAN: Rgb<u8> = Rgb(GRID_LINE_RGB);

    #[test]
    fn line_width_scales_with_size() {
        assert_eq!(grid_line_width(100, 100), 1);
        assert_eq!(grid_line_width(1000, 700), 1);
        assert_eq!(grid_line_width(1000, 1000), 2);
        assert_eq!(grid_line_width(4000, 3000), 6);
        assert_eq!(grid_line_width(1, 1), 1);
    }

    #[test]
    fn lines_match_tile_boundaries() {
        for (width, height) in [(1000, 700), (17, 13), (640, 481)] {
            for rows in 1..=4 {
                for cols in 1..=5 {
                    let grid = TileGrid::new(rows, cols).unwrap();
                    let rects = tile_rects(width, height, grid).unwrap();

                    let expected_x: Vec<u32> =
                        rects.iter().filter(|r| r.row == 0 && r.col > 0).map(|r| r.left).collect();
                    let expected_y: Vec<u32> =
                        rects.iter().filter(|r| r.col == 0 && r.row > 0).map(|r| r.upper).collect();

                    assert_eq!(vertical_cut_lines(width, grid), expected_x);
                    assert_eq!(horizontal_cut_lines(height, grid), expected_y);
                }
            }
        }
    }

    #[test]
    fn draws_cyan_lines_and_leaves_source_untouched() {
        let src = DynamicImage::ImageRgb8(RgbImage::from_pixel(1000, 700, WHITE));
        let grid = TileGrid::new(2, 3).unwrap();
        let out = draw_grid_overlay(&src, grid).to_rgb8();

        assert_eq!(*out.get_pixel(333, 10), CYAN);
        assert_eq!(*out.get_pixel(667, 699), CYAN);
        assert_eq!(*out.get_pixel(10, 350), CYAN);
        assert_eq!(*out.get_pixel(332, 10), WHITE);
        assert_eq!(*out.get_pixel(334, 10), WHITE);
        assert_eq!(*out.get_pixel(10, 351), WHITE);

        assert!(src.to_rgb8().pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn single_tile_grid_draws_nothing() {
        let src = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 40, WHITE));
        let out = draw_grid_overlay(&src, TileGrid::single());
        assert_eq!(out.as_bytes(), src.as_bytes());
    }

    #[test]
    fn wide_lines_stay_centred() {
        let src = DynamicImage::ImageRgb8(RgbImage::from_pixel(2000, 2000, WHITE));
        let grid = TileGrid::new(1, 2).unwrap();
        let out = draw_grid_overlay(&src, grid).to_rgb8();
        // width 4 around x = 1000 → columns 998..1002
        assert_eq!(*out.get_pixel(997, 5), WHITE);
        for x in 998..1002 {
            assert_eq!(*out.get_pixel(x, 5), CYAN, "x = {x}");
        }
        assert_eq!(*out.get_pixel(1002, 5), WHITE);
    }

    #[test]
    fn rgba_keeps_alpha_channel_and_lines_are_opaque() {
        let src = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0])));
        let out = draw_grid_overlay(&src, TileGrid::new(2, 2).unwrap());
        let DynamicImage::ImageRgba8(buf) = out else {
            panic!("expected RGBA output");
        };
        assert_eq!(*buf.get_pixel(5, 0), Rgba([0, 255, 255, 255]));
        assert_eq!(*buf.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn grayscale_input_becomes_rgb() {
        let src = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([200])));
        let out = draw_grid_overlay(&src, TileGrid::new(1, 2).unwrap());
        assert!(matches!(out, DynamicImage::ImageRgb8(_)));
        assert_eq!(*out.to_rgb8().get_pixel(4, 3), CYAN);
    }
}
