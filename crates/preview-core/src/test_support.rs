//! Shared test doubles for the drawing and layout tests.

use crate::geometry::{Color, Point, Rect, Size};
use crate::page::{Page, PageRef, ScaleError};
use crate::raster::Raster;
use crate::surface::DrawSurface;
use std::sync::Arc;

/// One recorded drawing primitive, in call order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawCall {
    FillRect(Rect, Color),
    StrokeRect(Rect, Color),
    StrokeLine(Point, Point),
    Raster(Rect),
    Text(Point, String),
}

/// A `DrawSurface` that records every call for later inspection.
#[derive(Default)]
pub(crate) struct RecordingSurface {
    pub(crate) calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The white page-background rectangles, in draw order.
    pub(crate) fn page_rects(&self) -> Vec<Rect> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::FillRect(rect, color) if *color == Color::WHITE => Some(*rect),
                _ => None,
            })
            .collect()
    }
}

impl DrawSurface for RecordingSurface {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(DrawCall::FillRect(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(DrawCall::StrokeRect(rect, color));
    }

    fn stroke_line(&mut self, from: Point, to: Point, _width: f32, _color: Color) {
        self.calls.push(DrawCall::StrokeLine(from, to));
    }

    fn draw_raster(&mut self, _raster: &Raster, rect: Rect) {
        self.calls.push(DrawCall::Raster(rect));
    }

    fn draw_text(&mut self, pos: Point, _font_size: f32, _color: Color, text: &str) {
        self.calls.push(DrawCall::Text(pos, text.to_string()));
    }

    fn text_width(&self, font_size: f32, text: &str) -> i32 {
        (text.len() as f32 * font_size / 2.0) as i32
    }
}

/// A page that always draws a raster covering its rectangle.
pub(crate) struct StubPage {
    nominal: Size,
    raster: Raster,
}

impl StubPage {
    pub(crate) fn new(nominal: Size) -> Self {
        Self {
            nominal,
            raster: Raster::from_rgba(Size::new(1, 1), vec![255; 4]),
        }
    }
}

impl Page for StubPage {
    fn draw(&self, surface: &mut dyn DrawSurface, rect: Rect) {
        surface.draw_raster(&self.raster, rect);
    }

    fn is_scaled(&self, _resolution: Size) -> bool {
        false
    }

    fn hi_quality_scale(&self, _resolution: Size) -> Result<(), ScaleError> {
        Ok(())
    }

    fn nominal_size(&self) -> Size {
        self.nominal
    }

    fn free_resources(&self) {}
}

pub(crate) fn stub_pages(count: usize, nominal: Size) -> Vec<PageRef> {
    (0..count)
        .map(|_| Arc::new(StubPage::new(nominal)) as PageRef)
        .collect()
}
