//! Layout showing two facing pages at a time.

use super::{draw_page, zoomed, PreviewLayout, HORIZONTAL_SPACING, VERTICAL_SPACING};
use crate::adorner::PageAdorner;
use crate::geometry::{Color, Point, Rect, Size};
use crate::page::PageRef;
use crate::surface::DrawSurface;
use crate::visibility::PageVisibility;

/// Shows one pair of facing pages; navigation moves two pages at a time.
/// A trailing odd page is shown alone on the left side.
pub struct FacingLayout {
    horizontal_spacing: i32,
    vertical_spacing: i32,
    /// Left page of the currently shown pair; always even.
    current_page: usize,
}

impl FacingLayout {
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

    /// Width and height of the pair starting at `left` (or of the lone
    /// trailing page, reserving room for a missing right-hand page).
    fn pair_extent(&self, left: usize, sizes: &[Size], zoom: f32) -> Size {
        if left + 1 < sizes.len() {
            Size::new(
                sizes[left].width + sizes[left + 1].width + 2 * self.h_spacing(zoom),
                sizes[left].height.max(sizes[left + 1].height),
            )
        } else {
            Size::new(
                2 * (sizes[left].width + self.h_spacing(zoom)),
                sizes[left].height,
            )
        }
    }
}

impl Default for FacingLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewLayout for FacingLayout {
    fn needed_space(&self, zoom: f32, nominal: &[Size]) -> Size {
        if nominal.is_empty() {
            return Size::ZERO;
        }
        let sizes = self.page_sizes(zoom, nominal);
        let left = self.current_page.min(sizes.len() - 1);
        let extent = self.pair_extent(left, &sizes, zoom);
        // the half-spacing gap allowance only applies between two pages
        let width = if left + 1 < sizes.len() {
            extent.width + self.h_spacing(zoom) / 2
        } else {
            extent.width
        };
        Size::new(width, 2 * self.v_spacing(zoom) + extent.height)
    }

    fn view_element_size(&self, zoom: f32, page_index: usize, nominal: &[Size]) -> Size {
        if nominal.is_empty() {
            return Size::ZERO;
        }
        let sizes = self.page_sizes(zoom, nominal);
        let left = (page_index / 2 * 2).min(sizes.len() - 1);
        let extent = self.pair_extent(left, &sizes, zoom);
        Size::new(extent.width, 2 * self.v_spacing(zoom) + extent.height)
    }

    fn visible_pages(
        &self,
        _viewport: Size,
        _zoom: f32,
        _nominal: &[Size],
        _scroll: Point,
        page_count: usize,
    ) -> Vec<PageVisibility> {
        let mut visible = Vec::with_capacity(2);
        if self.current_page < page_count {
            visible.push(PageVisibility::new(self.current_page, 1.0));
        }
        if self.current_page + 1 < page_count {
            visible.push(PageVisibility::new(self.current_page + 1, 1.0));
        }
        visible
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
        let sizes = self.page_sizes(zoom, nominal);
        let left = self.current_page;
        let extent = self.pair_extent(left, &sizes, zoom);

        let px = if extent.width + 10 <= target.width {
            // center pages horizontally (enough room)
            (target.width - extent.width) / 2
        } else {
            self.h_spacing(zoom) - scroll.x
        };
        let py_center = if extent.height + 10 <= target.height {
            // center pages vertically (enough room)
            target.y + target.height / 2
        } else {
            self.v_spacing(zoom) - scroll.y + extent.height / 2
        };

        draw_page(
            surface,
            background,
            left + 1,
            zoom,
            Rect::new(
                px,
                py_center - sizes[left].height / 2,
                sizes[left].width,
                sizes[left].height,
            ),
            &pages[left],
            adorner,
        );

        if left + 1 < pages.len() {
            draw_page(
                surface,
                background,
                left + 2,
                zoom,
                Rect::new(
                    px + sizes[left].width + self.h_spacing(zoom),
                    py_center - sizes[left + 1].height / 2,
                    sizes[left + 1].width,
                    sizes[left + 1].height,
                ),
                &pages[left + 1],
                adorner,
            );
        }
    }

    fn ensure_visible(
        &mut self,
        _viewport: Size,
        zoom: f32,
        nominal: &[Size],
        page_index: usize,
    ) -> Point {
        self.current_page = page_index / 2 * 2;
        let left_width = nominal
            .get(self.current_page)
            .map(|size| size.scaled(zoom).width)
            .unwrap_or(0);
        // requesting the right-hand page scrolls past the left one
        let sx = (page_index % 2) as i32 * left_width + self.h_spacing(zoom);
        Point::new(sx, 0)
    }

    fn view_element_count(&self, page_count: usize) -> usize {
        page_count / 2 + page_count % 2
    }

    fn view_element_index(&self, page_index: usize) -> usize {
        page_index / 2
    }

    fn next_view_element(&self, page_index: usize) -> usize {
        page_index / 2 * 2 + 2
    }

    fn previous_view_element(&self, page_index: usize) -> usize {
        (page_index / 2 * 2).saturating_sub(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(n: usize) -> Vec<Size> {
        vec![Size::new(800, 1000); n]
    }

    #[test]
    fn both_pages_of_the_pair_are_visible() {
        let mut layout = FacingLayout::new();
        layout.ensure_visible(Size::new(900, 800), 1.0, &sizes(5), 2);

        let visible = layout.visible_pages(Size::new(900, 800), 1.0, &sizes(5), Point::ZERO, 5);
        let indices: Vec<usize> = visible.iter().map(|pv| pv.page_index).collect();
        assert_eq!(indices, vec![2, 3]);
    }

    #[test]
    fn trailing_odd_page_is_shown_alone() {
        let mut layout = FacingLayout::new();
        layout.ensure_visible(Size::new(900, 800), 1.0, &sizes(5), 4);

        let visible = layout.visible_pages(Size::new(900, 800), 1.0, &sizes(5), Point::ZERO, 5);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].page_index, 4);
    }

    #[test]
    fn ensure_visible_snaps_to_the_left_page() {
        let mut layout = FacingLayout::new();
        layout.ensure_visible(Size::new(900, 800), 1.0, &sizes(6), 3);
        assert_eq!(layout.current_page(), 2);
    }

    #[test]
    fn lone_page_canvas_has_no_pair_gap_allowance() {
        let mut layout = FacingLayout::new();

        layout.ensure_visible(Size::new(900, 800), 1.0, &sizes(5), 0);
        assert_eq!(layout.needed_space(1.0, &sizes(5)), Size::new(1650, 1080));

        layout.ensure_visible(Size::new(900, 800), 1.0, &sizes(5), 4);
        assert_eq!(layout.needed_space(1.0, &sizes(5)), Size::new(1640, 1080));
    }

    #[test]
    fn element_arithmetic_pairs_pages() {
        let layout = FacingLayout::new();
        assert_eq!(layout.view_element_count(6), 3);
        assert_eq!(layout.view_element_count(5), 3);
        assert_eq!(layout.view_element_index(0), 0);
        assert_eq!(layout.view_element_index(1), 0);
        assert_eq!(layout.view_element_index(4), 2);
        assert_eq!(layout.next_view_element(1), 2);
        assert_eq!(layout.previous_view_element(4), 2);
        assert_eq!(layout.previous_view_element(1), 0);
    }
}
