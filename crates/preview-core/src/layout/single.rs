//! Layout showing a single page at a time.

use super::{draw_page, zoomed, PreviewLayout, HORIZONTAL_SPACING, VERTICAL_SPACING};
use crate::adorner::PageAdorner;
use crate::geometry::{Color, Point, Rect, Size};
use crate::page::PageRef;
use crate::surface::DrawSurface;
use crate::visibility::PageVisibility;

/// Shows only the current page; navigation moves one page at a time.
pub struct SinglePageLayout {
    horizontal_spacing: i32,
    vertical_spacing: i32,
    current_page: usize,
}

impl SinglePageLayout {
    pub fn new() -> Self {
        Self {
            horizontal_spacing: HORIZONTAL_SPACING,
            vertical_spacing: VERTICAL_SPACING,
            current_page: 0,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    fn h_spacing(&self, zoom: f32) -> i32 {
        zoomed(self.horizontal_spacing, zoom)
    }

    fn v_spacing(&self, zoom: f32) -> i32 {
        zoomed(self.vertical_spacing, zoom)
    }
}

impl Default for SinglePageLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewLayout for SinglePageLayout {
    fn needed_space(&self, zoom: f32, nominal: &[Size]) -> Size {
        if nominal.is_empty() {
            return Size::ZERO;
        }
        let current = self.current_page.min(nominal.len() - 1);
        let size = nominal[current].scaled(zoom);
        Size::new(
            2 * self.h_spacing(zoom) + size.width,
            2 * self.v_spacing(zoom) + size.height,
        )
    }

    fn view_element_size(&self, zoom: f32, page_index: usize, nominal: &[Size]) -> Size {
        if nominal.is_empty() {
            return Size::ZERO;
        }
        let size = nominal[page_index.min(nominal.len() - 1)].scaled(zoom);
        Size::new(
            self.horizontal_spacing + size.width,
            self.vertical_spacing + size.height,
        )
    }

    fn visible_pages(
        &self,
        _viewport: Size,
        _zoom: f32,
        _nominal: &[Size],
        _scroll: Point,
        page_count: usize,
    ) -> Vec<PageVisibility> {
        if self.current_page < page_count {
            vec![PageVisibility::new(self.current_page, 1.0)]
        } else {
            Vec::new()
        }
    }

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
    ) {
        if self.current_page >= pages.len() {
            return;
        }
        let size = nominal[self.current_page].scaled(zoom);

        let px = if size.width + 10 <= target.width {
            // center page horizontally (enough room)
            (target.width - size.width) / 2
        } else {
            self.h_spacing(zoom) - scroll.x
        };
        let py = if size.height + 10 <= target.height {
            // center page vertically (enough room)
            (target.height - size.height) / 2
        } else {
            self.v_spacing(zoom) - scroll.y
        };

        draw_page(
            surface,
            background,
            self.current_page + 1,
            zoom,
            Rect::new(px, py, size.width, size.height),
            &pages[self.current_page],
            adorner,
        );
    }

    fn ensure_visible(
        &mut self,
        _viewport: Size,
        _zoom: f32,
        _nominal: &[Size],
        page_index: usize,
    ) -> Point {
        self.current_page = page_index;
        Point::ZERO
    }

    fn view_element_count(&self, page_count: usize) -> usize {
        page_count
    }

    fn view_element_index(&self, page_index: usize) -> usize {
        page_index
    }

    fn next_view_element(&self, page_index: usize) -> usize {
        page_index + 1
    }

    fn previous_view_element(&self, page_index: usize) -> usize {
        page_index.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{stub_pages, RecordingSurface};

    fn sizes(n: usize) -> Vec<Size> {
        vec![Size::new(800, 1000); n]
    }

    #[test]
    fn draw_centers_the_page_when_it_fits() {
        let layout = SinglePageLayout::new();
        let pages = stub_pages(1, Size::new(800, 1000));

        let mut surface = RecordingSurface::new();
        layout.draw(
            &mut surface,
            Color::GRAY,
            Rect::new(0, 0, 900, 1200),
            1.0,
            &sizes(1),
            Point::ZERO,
            &pages,
            None,
        );

        assert_eq!(surface.page_rects(), vec![Rect::new(50, 100, 800, 1000)]);
    }

    #[test]
    fn draw_pins_to_the_spacing_origin_when_the_page_overflows() {
        let layout = SinglePageLayout::new();
        let pages = stub_pages(1, Size::new(800, 1000));

        let mut surface = RecordingSurface::new();
        layout.draw(
            &mut surface,
            Color::GRAY,
            Rect::new(0, 0, 600, 700),
            1.0,
            &sizes(1),
            Point::new(30, 50),
            &pages,
            None,
        );

        // spacing origin (20, 40) minus the scroll offset
        assert_eq!(surface.page_rects(), vec![Rect::new(-10, -10, 800, 1000)]);
    }

    #[test]
    fn needed_space_covers_one_page_plus_spacing() {
        let layout = SinglePageLayout::new();
        let space = layout.needed_space(1.0, &sizes(5));
        assert_eq!(space, Size::new(840, 1080));
    }

    #[test]
    fn needed_space_is_zero_without_pages() {
        let layout = SinglePageLayout::new();
        assert_eq!(layout.needed_space(1.0, &[]), Size::ZERO);
    }

    #[test]
    fn only_the_current_page_is_visible() {
        let mut layout = SinglePageLayout::new();
        layout.ensure_visible(Size::new(600, 800), 1.0, &sizes(5), 3);

        let visible = layout.visible_pages(Size::new(600, 800), 1.0, &sizes(5), Point::ZERO, 5);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].page_index, 3);
        assert_eq!(visible[0].visible_fraction, 1.0);
    }

    #[test]
    fn navigation_moves_one_page_and_saturates_at_zero() {
        let layout = SinglePageLayout::new();
        assert_eq!(layout.next_view_element(2), 3);
        assert_eq!(layout.previous_view_element(3), 2);
        assert_eq!(layout.previous_view_element(0), 0);
    }

    #[test]
    fn element_index_is_page_index() {
        let layout = SinglePageLayout::new();
        assert_eq!(layout.view_element_count(5), 5);
        assert_eq!(layout.view_element_index(4), 4);
    }
}
