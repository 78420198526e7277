//! The drawing seam between the preview control and the host GUI toolkit.

use crate::geometry::{Color, Point, Rect};
use crate::raster::Raster;

/// A 2D drawing context supplied by the host toolkit for one paint cycle.
///
/// Coordinates are device pixels relative to the preview viewport's origin.
/// Implementations are expected to clip to the viewport themselves.
pub trait DrawSurface {
    /// Fill `rect` with a solid color.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw a one-pixel outline of `rect`.
    fn stroke_rect(&mut self, rect: Rect, color: Color);

    /// Draw a straight line of the given stroke width.
    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Color);

    /// Draw `raster` stretched to fill `rect`.
    fn draw_raster(&mut self, raster: &Raster, rect: Rect);

    /// Draw `text` with its top-left corner at `pos`.
    fn draw_text(&mut self, pos: Point, font_size: f32, color: Color, text: &str);

    /// Measure the width of `text` at `font_size`, in device pixels.
    fn text_width(&self, font_size: f32, text: &str) -> i32;
}
