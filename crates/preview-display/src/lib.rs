//! Preview orchestration: the [`PageDisplay`] control and its scrollbar
//! models, tying the layout strategies, the background scaler and the
//! incremental page loader together behind a toolkit-neutral API.

mod display;
mod scrollbar;

pub use display::{
    DocumentState, FitMode, PageDisplay, PreviewError, PreviewEvent, PreviewListener,
    RepaintHandle, MAX_ZOOM_LEVEL, MIN_ZOOM_LEVEL, WHEEL_SCROLL_DISTANCE, ZOOM_EPSILON,
    ZOOM_SCROLL_CHANGE,
};
pub use scrollbar::ScrollBarModel;
