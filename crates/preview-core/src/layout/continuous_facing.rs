//! Layout showing all pages as vertically scrolling rows of facing pairs.

use super::{
    draw_page, visible_fraction, zoomed, PreviewLayout, HORIZONTAL_SPACING, VERTICAL_SPACING,
};
use crate::adorner::PageAdorner;
use crate::geometry::{Color, Point, Rect, Size};
use crate::page::PageRef;
use crate::surface::DrawSurface;
use crate::visibility::PageVisibility;

/// All pages in rows of two facing pages, scrolling vertically.
/// A trailing odd page forms a single-page row.
pub struct ContinuousFacingLayout {
    horizontal_spacing: i32,
    vertical_spacing: i32,
}

/// Maximum widths of the left and right columns.
///
/// Tracked separately so every row aligns on the same virtual spine between
/// the two columns.
#[derive(Default)]
struct ColumnWidths {
    left: i32,
    right: i32,
}

impl ColumnWidths {
    fn total(&self) -> i32 {
        self.left + self.right
    }
}

impl ContinuousFacingLayout {
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

    fn column_widths(sizes: &[Size]) -> ColumnWidths {
        let mut widths = ColumnWidths::default();
        let mut index = 0;
        while index < sizes.len() {
            widths.left = widths.left.max(sizes[index].width);
            if index + 1 < sizes.len() {
                widths.right = widths.right.max(sizes[index + 1].width);
            }
            index += 2;
        }
        widths
    }

    /// Height of the row containing `page_index`.
    fn row_height(page_index: usize, sizes: &[Size]) -> i32 {
        if sizes.is_empty() {
            return 0;
        }
        let left = (page_index / 2 * 2).min(sizes.len() - 1);
        if left == sizes.len() - 1 {
            sizes[left].height
        } else {
            sizes[left].height.max(sizes[left + 1].height)
        }
    }

    /// First row intersecting the viewport: (left page index, row y position).
    fn top_row(&self, start_y: i32, v_spacing: i32, sizes: &[Size]) -> (usize, i32) {
        let mut index = 0;
        let mut y = start_y;
        while index < sizes.len() {
            let row_height = Self::row_height(index, sizes);
            if y + row_height >= 0 {
                break;
            }
            y += row_height + v_spacing;
            index += 2;
        }
        (index, y)
    }

    fn x_offset(target: Rect, start_x: i32, width: i32) -> i32 {
        if width + 10 <= target.width {
            // center pages horizontally (enough room)
            target.x + target.width / 2 - width / 2
        } else {
            start_x
        }
    }
}

impl Default for ContinuousFacingLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewLayout for ContinuousFacingLayout {
    fn needed_space(&self, zoom: f32, nominal: &[Size]) -> Size {
        if nominal.is_empty() {
            return Size::ZERO;
        }
        let sizes = self.page_sizes(zoom, nominal);
        let v_spacing = self.v_spacing(zoom);

        let mut max_row_width = 0;
        let mut row_heights = 0;
        let mut index = 0;
        while index < sizes.len() {
            let row_width = if index == sizes.len() - 1 {
                sizes[index].width
            } else {
                sizes[index].width + sizes[index + 1].width
            };
            max_row_width = max_row_width.max(row_width);
            row_heights += Self::row_height(index, &sizes) + v_spacing;
            index += 2;
        }

        Size::new(
            3 * self.h_spacing(zoom) + max_row_width,
            3 * v_spacing + row_heights,
        )
    }

    fn view_element_size(&self, zoom: f32, page_index: usize, nominal: &[Size]) -> Size {
        if nominal.is_empty() {
            return Size::ZERO;
        }
        let sizes = self.page_sizes(zoom, nominal);
        Size::new(
            Self::column_widths(&sizes).total() + self.h_spacing(zoom),
            Self::row_height(page_index, &sizes) + self.v_spacing(zoom),
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
        let (top, top_y) = self.top_row(v_spacing - scroll.y, v_spacing, &sizes);

        let mut index = top;
        let mut y = top_y;
        while index < page_count && y < viewport.height {
            let fraction = visible_fraction(y, sizes[index].height, viewport.height);
            if fraction > 0.0 {
                visible.push(PageVisibility::new(index, fraction));
            }
            if index + 1 < page_count {
                let fraction = visible_fraction(y, sizes[index + 1].height, viewport.height);
                if fraction > 0.0 {
                    visible.push(PageVisibility::new(index + 1, fraction));
                }
            }
            y += Self::row_height(index, &sizes) + v_spacing;
            index += 2;
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
        let h_spacing = self.h_spacing(zoom);
        let v_spacing = self.v_spacing(zoom);
        let widths = Self::column_widths(&sizes);
        let px_start = Self::x_offset(
            target,
            h_spacing - scroll.x,
            widths.total() + 2 * h_spacing,
        );
        let (top, top_y) = self.top_row(v_spacing - scroll.y, v_spacing, &sizes);

        let mut index = top;
        let mut y = top_y;
        while index < pages.len() && y < target.bottom() {
            let row_height = Self::row_height(index, &sizes);

            draw_page(
                surface,
                background,
                index + 1,
                zoom,
                Rect::new(
                    px_start,
                    y + row_height / 2 - sizes[index].height / 2,
                    sizes[index].width,
                    sizes[index].height,
                ),
                &pages[index],
                adorner,
            );

            if index + 1 < pages.len() {
                draw_page(
                    surface,
                    background,
                    index + 2,
                    zoom,
                    Rect::new(
                        px_start + widths.left + h_spacing,
                        y + row_height / 2 - sizes[index + 1].height / 2,
                        sizes[index + 1].width,
                        sizes[index + 1].height,
                    ),
                    &pages[index + 1],
                    adorner,
                );
            }

            y += row_height + v_spacing;
            index += 2;
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
        let h_spacing = self.h_spacing(zoom);
        let v_spacing = self.v_spacing(zoom);

        let row = page_index / 2;
        let mut sy = 0;
        for r in 0..row {
            sy += Self::row_height(r * 2, &sizes);
        }
        sy += v_spacing + row as i32 * v_spacing;

        let sx = if page_index % 2 == 0 {
            h_spacing
        } else {
            // right page: scroll past the left column
            sizes
                .get(page_index / 2 * 2)
                .map(|size| size.width)
                .unwrap_or(0)
                + 2 * h_spacing
        };

        Point::new(sx, sy)
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
    fn three_pages_make_two_view_elements() {
        let layout = ContinuousFacingLayout::new();
        assert_eq!(layout.view_element_count(3), 2);
        assert_eq!(layout.view_element_count(4), 2);
        assert_eq!(layout.view_element_count(0), 0);
    }

    #[test]
    fn needed_space_uses_row_extents() {
        let layout = ContinuousFacingLayout::new();
        let space = layout.needed_space(1.0, &sizes(3));
        // width: 3*20 + (800+800); height: 3*40 + 2 rows of (1000 + 40)
        assert_eq!(space, Size::new(1660, 2200));
    }

    #[test]
    fn navigation_round_trip_stays_in_bounds() {
        let layout = ContinuousFacingLayout::new();
        let page_count = 7usize;

        let mut page = 0usize;
        for _ in 0..10 {
            page = layout.next_view_element(page).min(page_count - 1);
            assert!(page < page_count);
        }
        assert_eq!(page, 6);

        for _ in 0..10 {
            page = layout.previous_view_element(page);
        }
        assert_eq!(page, 0);
    }

    #[test]
    fn element_index_increases_monotonically_under_next() {
        let layout = ContinuousFacingLayout::new();
        let page_count = 7usize;
        let mut page = 0usize;
        let mut last_element = layout.view_element_index(page);

        loop {
            let next = layout.next_view_element(page).min(page_count - 1);
            let element = layout.view_element_index(next);
            if next == page {
                break;
            }
            assert!(element > last_element);
            last_element = element;
            page = next;
        }
        assert_eq!(last_element, layout.view_element_count(page_count) - 1);
    }

    #[test]
    fn rows_become_visible_as_the_view_scrolls() {
        let layout = ContinuousFacingLayout::new();
        let viewport = Size::new(1800, 900);

        let at_top = layout.visible_pages(viewport, 1.0, &sizes(5), Point::ZERO, 5);
        let indices: Vec<usize> = at_top.iter().map(|pv| pv.page_index).collect();
        assert_eq!(indices, vec![0, 1]);

        let scrolled = layout.visible_pages(viewport, 1.0, &sizes(5), Point::new(0, 1100), 5);
        let indices: Vec<usize> = scrolled.iter().map(|pv| pv.page_index).collect();
        assert_eq!(indices, vec![2, 3]);
    }

    #[test]
    fn lone_last_page_occupies_its_own_row() {
        let layout = ContinuousFacingLayout::new();
        // rows: {0,1}, {2}; scrolled past the first row entirely
        let scrolled = layout.visible_pages(
            Size::new(1800, 900),
            1.0,
            &sizes(3),
            Point::new(0, 1100),
            3,
        );
        let indices: Vec<usize> = scrolled.iter().map(|pv| pv.page_index).collect();
        assert_eq!(indices, vec![2]);
    }
}
