//! Page adorners: pluggable decorations drawn around each page.

use crate::geometry::{Color, Point, Rect};
use crate::surface::DrawSurface;

/// Draws extra visual elements around a page (shadow, border, page number).
///
/// `draw_pre_page` runs before the page content is painted, `draw_post_page`
/// after; both receive the same page rectangle. `page_number` is 1-based.
pub trait PageAdorner {
    fn draw_pre_page(
        &self,
        surface: &mut dyn DrawSurface,
        backdrop: Color,
        page_number: usize,
        zoom: f32,
        page_rect: Rect,
    );

    fn draw_post_page(
        &self,
        surface: &mut dyn DrawSurface,
        backdrop: Color,
        page_number: usize,
        zoom: f32,
        page_rect: Rect,
    );
}

/// Composes multiple adorners; each hook runs in registration order and all
/// adorners see the same page rectangle.
pub struct CompoundAdorner {
    adorners: Vec<Box<dyn PageAdorner>>,
}

impl CompoundAdorner {
    pub fn new(adorners: Vec<Box<dyn PageAdorner>>) -> Self {
        Self { adorners }
    }
}

impl PageAdorner for CompoundAdorner {
    fn draw_pre_page(
        &self,
        surface: &mut dyn DrawSurface,
        backdrop: Color,
        page_number: usize,
        zoom: f32,
        page_rect: Rect,
    ) {
        for adorner in &self.adorners {
            adorner.draw_pre_page(surface, backdrop, page_number, zoom, page_rect);
        }
    }

    fn draw_post_page(
        &self,
        surface: &mut dyn DrawSurface,
        backdrop: Color,
        page_number: usize,
        zoom: f32,
        page_rect: Rect,
    ) {
        for adorner in &self.adorners {
            adorner.draw_post_page(surface, backdrop, page_number, zoom, page_rect);
        }
    }
}

/// Adorns a page with a drop shadow along its right and bottom edges and a
/// thin black border on top of the content.
pub struct ShadowAdorner {
    shadow_width: i32,
    shadow_color: Color,
}

impl ShadowAdorner {
    pub fn new(shadow_width: i32, shadow_color: Color) -> Self {
        Self {
            shadow_width,
            shadow_color,
        }
    }
}

impl Default for ShadowAdorner {
    fn default() -> Self {
        Self::new(4, Color::DARK_GRAY)
    }
}

impl PageAdorner for ShadowAdorner {
    fn draw_pre_page(
        &self,
        surface: &mut dyn DrawSurface,
        backdrop: Color,
        _page_number: usize,
        _zoom: f32,
        page_rect: Rect,
    ) {
        // layered strokes fading from the shadow color into the backdrop
        let sw = self.shadow_width * 2;
        let mut stroke = sw;
        while stroke >= 2 {
            let pct = (sw - stroke) as f32 / (sw - 1) as f32;
            let color = Color::mix(self.shadow_color, pct, backdrop, 1.0 - pct);
            surface.stroke_line(
                Point::new(page_rect.right(), page_rect.y + self.shadow_width),
                Point::new(page_rect.right(), page_rect.bottom()),
                stroke as f32,
                color,
            );
            surface.stroke_line(
                Point::new(page_rect.x + self.shadow_width, page_rect.bottom()),
                Point::new(page_rect.right(), page_rect.bottom()),
                stroke as f32,
                color,
            );
            stroke -= 2;
        }
    }

    fn draw_post_page(
        &self,
        surface: &mut dyn DrawSurface,
        _backdrop: Color,
        _page_number: usize,
        _zoom: f32,
        page_rect: Rect,
    ) {
        surface.stroke_rect(page_rect, Color::BLACK);
    }
}

/// Stamps the page number below the bottom-right corner of each page.
///
/// The label template uses `{page}` as the page-number placeholder.
pub struct PageNumberAdorner {
    font_size: f32,
    color: Color,
    y_offset: i32,
    template: String,
}

impl PageNumberAdorner {
    pub fn new(font_size: f32, color: Color) -> Self {
        Self::with_template(font_size, color, 5, "Page {page}")
    }

    pub fn with_template(
        font_size: f32,
        color: Color,
        y_offset: i32,
        template: impl Into<String>,
    ) -> Self {
        Self {
            font_size,
            color,
            y_offset,
            template: template.into(),
        }
    }

    fn label(&self, page_number: usize) -> String {
        self.template.replace("{page}", &page_number.to_string())
    }
}

impl PageAdorner for PageNumberAdorner {
    fn draw_pre_page(
        &self,
        _surface: &mut dyn DrawSurface,
        _backdrop: Color,
        _page_number: usize,
        _zoom: f32,
        _page_rect: Rect,
    ) {
    }

    fn draw_post_page(
        &self,
        surface: &mut dyn DrawSurface,
        _backdrop: Color,
        page_number: usize,
        zoom: f32,
        page_rect: Rect,
    ) {
        let label = self.label(page_number);
        let font_size = self.font_size * zoom;
        let text_width = surface.text_width(font_size, &label);
        surface.draw_text(
            Point::new(
                page_rect.right() - text_width,
                page_rect.bottom() + self.y_offset,
            ),
            font_size,
            self.color,
            &label,
        );
    }
}
