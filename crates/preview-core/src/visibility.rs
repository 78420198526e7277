/// How much of a page is currently visible in the viewport.
///
/// Produced fresh on every query; never stored by the layouts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageVisibility {
    pub page_index: usize,
    /// Fraction of the page's height inside the viewport, in `[0, 1]`.
    pub visible_fraction: f32,
}

impl PageVisibility {
    pub fn new(page_index: usize, visible_fraction: f32) -> Self {
        Self {
            page_index,
            visible_fraction,
        }
    }
}
