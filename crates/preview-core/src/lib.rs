//! Core types for the paginated document preview control.
//!
//! This crate defines the contracts the rest of the workspace builds on:
//! the [`Page`] and [`PageSource`] document seams, the [`DrawSurface`] seam
//! towards the host GUI toolkit, the [`PageAdorner`] decoration hooks and the
//! four interchangeable [`PreviewLayout`] strategies. It performs no I/O and
//! owns no threads.

mod adorner;
mod geometry;
mod layout;
mod page;
mod raster;
mod surface;
#[cfg(test)]
mod test_support;
mod visibility;

pub use adorner::{CompoundAdorner, PageAdorner, PageNumberAdorner, ShadowAdorner};
pub use geometry::{Color, Point, Rect, Size};
pub use layout::{
    ContinuousFacingLayout, ContinuousLayout, FacingLayout, PreviewLayout, SinglePageLayout,
    HORIZONTAL_SPACING, VERTICAL_SPACING,
};
pub use page::{same_page, BufferedPage, Page, PageRef, PageRenderer, PageSource, ScaleError};
pub use raster::Raster;
pub use surface::DrawSurface;
pub use visibility::PageVisibility;
