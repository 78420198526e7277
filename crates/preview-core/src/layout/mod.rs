//! Interchangeable page-arrangement strategies.
//!
//! A layout positions pages inside a zoomable, scrollable canvas and answers
//! all geometry questions the display orchestrator has: how big the canvas
//! must be, which pages intersect the viewport, and where a given page lives.
//! Layouts never own pages; the only mutable state a layout may carry is its
//! navigation cursor (the "current page" of the single and facing layouts),
//! which is updated through `ensure_visible`.

mod continuous;
mod continuous_facing;
mod facing;
mod single;

pub use continuous::ContinuousLayout;
pub use continuous_facing::ContinuousFacingLayout;
pub use facing::FacingLayout;
pub use single::SinglePageLayout;

use crate::adorner::PageAdorner;
use crate::geometry::{Color, Point, Rect, Size};
use crate::page::PageRef;
use crate::surface::DrawSurface;
use crate::visibility::PageVisibility;

/// Horizontal spacing between pages at 100 % zoom, in device pixels.
pub const HORIZONTAL_SPACING: i32 = 20;
/// Vertical spacing between pages at 100 % zoom, in device pixels.
pub const VERTICAL_SPACING: i32 = 40;

/// Arranges preview pages.
///
/// All coordinates are device pixels at the given zoom level. `nominal` is
/// the per-page size table at 100 % zoom; `page_count` may be smaller than
/// `nominal.len()` while a document is still loading.
pub trait PreviewLayout {
    /// Per-page sizes at `zoom`, truncated to device pixels.
    fn page_sizes(&self, zoom: f32, nominal: &[Size]) -> Vec<Size> {
        nominal.iter().map(|size| size.scaled(zoom)).collect()
    }

    /// Total scrollable canvas extent needed at `zoom`, for scrollbar ranging.
    fn needed_space(&self, zoom: f32, nominal: &[Size]) -> Size;

    /// Size of the view element containing `page_index`, including spacing.
    fn view_element_size(&self, zoom: f32, page_index: usize, nominal: &[Size]) -> Size;

    /// Pages intersecting the viewport and the fraction of each page's
    /// height that falls inside it.
    fn visible_pages(
        &self,
        viewport: Size,
        zoom: f32,
        nominal: &[Size],
        scroll: Point,
        page_count: usize,
    ) -> Vec<PageVisibility>;

    /// Position and draw every visible page into `target`.
    #[allow(clippy::too_many_arguments)]
    fn draw(
        &self,
        surface: &mut dyn DrawSurface,
        background: Color,
        target: Rect,
        zoom: f32,
        nominal: &[Size],
        scroll: Point,
        pages: &[PageRef],
        adorner: Option<&dyn PageAdorner>,
    );

    /// Scroll offset that brings `page_index` into view. Updates the
    /// layout's navigation cursor where one exists.
    fn ensure_visible(
        &mut self,
        viewport: Size,
        zoom: f32,
        nominal: &[Size],
        page_index: usize,
    ) -> Point;

    /// Number of view elements for a document of `page_count` pages.
    fn view_element_count(&self, page_count: usize) -> usize;

    /// Index of the view element containing `page_index`.
    fn view_element_index(&self, page_index: usize) -> usize;

    /// First page of the view element after the one containing `page_index`.
    /// May exceed the last page; callers clamp to `page_count - 1`.
    fn next_view_element(&self, page_index: usize) -> usize;

    /// First page of the view element before the one containing `page_index`.
    fn previous_view_element(&self, page_index: usize) -> usize;
}

pub(crate) fn zoomed(value: i32, zoom: f32) -> i32 {
    (value as f32 * zoom) as i32
}

/// White page fill and page content, sandwiched between the adorner hooks.
pub(crate) fn draw_page(
    surface: &mut dyn DrawSurface,
    background: Color,
    page_number: usize,
    zoom: f32,
    rect: Rect,
    page: &PageRef,
    adorner: Option<&dyn PageAdorner>,
) {
    if let Some(adorner) = adorner {
        adorner.draw_pre_page(surface, background, page_number, zoom, rect);
    }
    surface.fill_rect(rect, Color::WHITE);
    page.draw(surface, rect);
    if let Some(adorner) = adorner {
        adorner.draw_post_page(surface, background, page_number, zoom, rect);
    }
}

/// Fraction of a page's height visible in a viewport of `viewport_height`,
/// given the page's y position (may be negative when scrolled past).
pub(crate) fn visible_fraction(page_y: i32, page_height: i32, viewport_height: i32) -> f32 {
    if page_height <= 0 {
        return 0.0;
    }
    let visible = (page_y + page_height).min(viewport_height) - page_y.max(0);
    visible.max(0) as f32 / page_height as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adorner::CompoundAdorner;
    use crate::test_support::{stub_pages, DrawCall, RecordingSurface};

    struct MarkerAdorner {
        pre: Color,
        post: Color,
    }

    impl PageAdorner for MarkerAdorner {
        fn draw_pre_page(
            &self,
            surface: &mut dyn DrawSurface,
            _backdrop: Color,
            _page_number: usize,
            _zoom: f32,
            page_rect: Rect,
        ) {
            surface.stroke_rect(page_rect, self.pre);
        }

        fn draw_post_page(
            &self,
            surface: &mut dyn DrawSurface,
            _backdrop: Color,
            _page_number: usize,
            _zoom: f32,
            page_rect: Rect,
        ) {
            surface.stroke_rect(page_rect, self.post);
        }
    }

    #[test]
    fn adorner_hooks_sandwich_the_page_content_in_registration_order() {
        let adorner = CompoundAdorner::new(vec![
            Box::new(MarkerAdorner {
                pre: Color::rgb(1, 0, 0),
                post: Color::rgb(2, 0, 0),
            }),
            Box::new(MarkerAdorner {
                pre: Color::rgb(3, 0, 0),
                post: Color::rgb(4, 0, 0),
            }),
        ]);
        let pages = stub_pages(1, Size::new(100, 200));
        let rect = Rect::new(10, 20, 100, 200);

        let mut surface = RecordingSurface::new();
        draw_page(&mut surface, Color::GRAY, 1, 1.0, rect, &pages[0], Some(&adorner));

        assert_eq!(
            surface.calls,
            vec![
                DrawCall::StrokeRect(rect, Color::rgb(1, 0, 0)),
                DrawCall::StrokeRect(rect, Color::rgb(3, 0, 0)),
                DrawCall::FillRect(rect, Color::WHITE),
                DrawCall::Raster(rect),
                DrawCall::StrokeRect(rect, Color::rgb(2, 0, 0)),
                DrawCall::StrokeRect(rect, Color::rgb(4, 0, 0)),
            ]
        );
    }

    #[test]
    fn page_content_draws_without_an_adorner() {
        let pages = stub_pages(1, Size::new(100, 200));
        let rect = Rect::new(0, 0, 100, 200);

        let mut surface = RecordingSurface::new();
        draw_page(&mut surface, Color::GRAY, 1, 1.0, rect, &pages[0], None);

        assert_eq!(
            surface.calls,
            vec![
                DrawCall::FillRect(rect, Color::WHITE),
                DrawCall::Raster(rect),
            ]
        );
    }

    #[test]
    fn visible_fraction_clamps_to_viewport() {
        // fully inside
        assert_eq!(visible_fraction(10, 100, 500), 1.0);
        // half scrolled off the top
        assert_eq!(visible_fraction(-50, 100, 500), 0.5);
        // half off the bottom
        assert_eq!(visible_fraction(450, 100, 500), 0.5);
        // entirely outside
        assert_eq!(visible_fraction(600, 100, 500), 0.0);
    }
}
