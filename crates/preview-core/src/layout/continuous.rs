//! Layout showing all pages in one vertically scrolling column.

use super::{
    draw_page, visible_fraction, zoomed, PreviewLayout, HORIZONTAL_SPACING, VERTICAL_SPACING,
};
use crate::adorner::PageAdorner;
use crate::geometry::{Color, Point, Rect, Size};
use crate::page::PageRef;
use crate::surface::DrawSurface;
use crate::visibility::PageVisibility;

/// All pages stacked vertically, centered on a common axis.
pub struct ContinuousLayout {
    horizontal_spacing: i32,
    vertical_spacing: i32,
}

/// First page intersecting the viewport and its y position (may be negative).
struct TopPage {
    index: usize,
    y: i32,
}

impl ContinuousLayout {
    pub fn new() -> Self {
        Self {
            horizontal_spacing: HORIZONTAL_SPACING,
            vertical_spacing: VERTICAL_SPACING,
        }
    }

    fn h_spacing(&self, zoom: f32) -> i32 {
        zoomed(self.horizontal_spacing, zoom)
    }

    fn v_spacing(&self, zoom: f32) -> i32 {
        zoomed(self.vertical_spacing, zoom)
    }

    fn top_page(&self, start_y: i32, v_spacing: i32, sizes: &[Size]) -> TopPage {
        let mut top = TopPage {
            index: 0,
            y: start_y,
        };
        while top.index < sizes.len() && top.y + sizes[top.index].height + v_spacing < 0 {
            top.y += sizes[top.index].height + v_spacing;
            top.index += 1;
        }
        top
    }

    fn max_width(sizes: &[Size]) -> i32 {
        sizes.iter().map(|size| size.width).max().unwrap_or(0)
    }

    /// Horizontal center of the page column inside `target`.
    fn x_center(&self, target: Rect, start_x: i32, width: i32) -> i32 {
        if width + 10 <= target.width {
            // center pages horizontally (enough room)
            target.x + target.width / 2
        } else {
            target.x + start_x + width / 2
        }
    }
}

impl Default for ContinuousLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewLayout for ContinuousLayout {
    fn needed_space(&self, zoom: f32, nominal: &[Size]) -> Size {
        if nominal.is_empty() {
            return Size::ZERO;
        }
        let sizes = self.page_sizes(zoom, nominal);
        let max_width = Self::max_width(&sizes);
        let page_heights: i32 = sizes
            .iter()
            .map(|size| size.height + self.v_spacing(zoom))
            .sum();

        Size::new(
            2 * self.h_spacing(zoom) + max_width,
            self.v_spacing(zoom) + page_heights,
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
        viewport: Size,
        zoom: f32,
        nominal: &[Size],
        scroll: Point,
        page_count: usize,
    ) -> Vec<PageVisibility> {
        let mut visible = Vec::new();
        if page_count == 0 {
            return visible;
        }

        let sizes = self.page_sizes(zoom, nominal);
        let v_spacing = self.v_spacing(zoom);
        let top = self.top_page(v_spacing - scroll.y, v_spacing, &sizes);

        let mut index = top.index;
        let mut y = top.y;
        while index < page_count && y < viewport.height {
            let fraction = visible_fraction(y, sizes[index].height, viewport.height);
            if fraction > 0.0 {
                visible.push(PageVisibility::new(index, fraction));
            }
            y += sizes[index].height + v_spacing;
            index += 1;
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
        if pages.is_empty() {
            return;
        }

        let sizes = self.page_sizes(zoom, nominal);
        let v_spacing = self.v_spacing(zoom);
        let max_width = Self::max_width(&sizes);
        let x_center = self.x_center(target, self.h_spacing(zoom) - scroll.x, max_width);
        let top = self.top_page(v_spacing - scroll.y, v_spacing, &sizes);

        let mut index = top.index;
        let mut y = top.y;
        while index < pages.len() && y < target.bottom() {
            let size = sizes[index];
            draw_page(
                surface,
                background,
                index + 1,
                zoom,
                Rect::new(x_center - size.width / 2, y, size.width, size.height),
                &pages[index],
                adorner,
            );
            y += size.height + v_spacing;
            index += 1;
        }
    }

    fn ensure_visible(
        &mut self,
        _viewport: Size,
        zoom: f32,
        nominal: &[Size],
        page_index: usize,
    ) -> Point {
        let sizes = self.page_sizes(zoom, nominal);
        let v_spacing = self.v_spacing(zoom);
        let top: i32 = sizes
            .iter()
            .take(page_index)
            .map(|size| size.height + v_spacing)
            .sum();
        Point::new(0, v_spacing + top)
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

    fn sizes(n: usize) -> Vec<Size> {
        vec![Size::new(800, 1000); n]
    }

    #[test]
    fn needed_space_sums_all_pages_and_spacing() {
        let layout = ContinuousLayout::new();
        let space = layout.needed_space(1.0, &sizes(3));
        // width: 2*20 + 800, height: 40 + 3*(1000 + 40)
        assert_eq!(space, Size::new(840, 3160));
    }

    #[test]
    fn needed_space_scales_with_zoom() {
        let layout = ContinuousLayout::new();
        let space = layout.needed_space(0.5, &sizes(2));
        assert_eq!(space, Size::new(2 * 10 + 400, 20 + 2 * (500 + 20)));
    }

    #[test]
    fn visible_pages_follow_scroll_offset() {
        let layout = ContinuousLayout::new();
        let viewport = Size::new(900, 800);

        // at the top only page 0 intersects an 800px viewport
        let at_top = layout.visible_pages(viewport, 1.0, &sizes(3), Point::ZERO, 3);
        assert_eq!(at_top.len(), 1);
        assert_eq!(at_top[0].page_index, 0);

        // scrolled one page down, pages 1 and 2 intersect
        let scrolled = layout.visible_pages(viewport, 1.0, &sizes(3), Point::new(0, 1400), 3);
        let indices: Vec<usize> = scrolled.iter().map(|pv| pv.page_index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn visible_fraction_reflects_partial_overlap() {
        let layout = ContinuousLayout::new();
        // page 0 occupies y = 40..1040; scroll so half of it is above the top
        let visible =
            layout.visible_pages(Size::new(900, 2000), 1.0, &sizes(1), Point::new(0, 540), 1);
        assert_eq!(visible.len(), 1);
        assert!((visible[0].visible_fraction - 0.5).abs() < 0.01);
    }

    #[test]
    fn draw_places_rows_at_scrolled_positions() {
        use crate::test_support::{stub_pages, RecordingSurface};

        let layout = ContinuousLayout::new();
        let pages = stub_pages(3, Size::new(800, 1000));

        let mut surface = RecordingSurface::new();
        layout.draw(
            &mut surface,
            Color::GRAY,
            Rect::new(0, 0, 900, 800),
            1.0,
            &sizes(3),
            Point::new(0, 1400),
            &pages,
            None,
        );

        // pages center on x = 450; page 0 is scrolled out entirely
        assert_eq!(
            surface.page_rects(),
            vec![
                Rect::new(50, -320, 800, 1000),
                Rect::new(50, 720, 800, 1000),
            ]
        );
    }

    #[test]
    fn ensure_visible_returns_page_top() {
        let mut layout = ContinuousLayout::new();
        let scroll = layout.ensure_visible(Size::new(900, 800), 1.0, &sizes(5), 2);
        // 40 + 2*(1000 + 40)
        assert_eq!(scroll, Point::new(0, 2120));
    }

    #[test]
    fn zero_pages_mean_zero_sizes_and_no_visibility() {
        let layout = ContinuousLayout::new();
        assert_eq!(layout.needed_space(1.0, &[]), Size::ZERO);
        assert!(layout
            .visible_pages(Size::new(900, 800), 1.0, &[], Point::ZERO, 0)
            .is_empty());
    }
}
