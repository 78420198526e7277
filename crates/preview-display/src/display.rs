//! The preview orchestrator: zoom, scroll, navigation, incremental loading
//! and the paint pipeline, glued together over a [`PreviewLayout`].

use crate::scrollbar::ScrollBarModel;
use preview_core::{
    Color, DrawSurface, PageAdorner, PageRef, PageSource, PageVisibility, Point, PreviewLayout,
    Rect, SinglePageLayout, Size,
};
use preview_scaler::PageScaler;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Smallest accepted zoom level.
pub const MIN_ZOOM_LEVEL: f32 = 0.05;
/// Largest accepted zoom level.
pub const MAX_ZOOM_LEVEL: f32 = 4.0;
/// Zoom changes smaller than this are ignored.
pub const ZOOM_EPSILON: f32 = 0.01;
/// Vertical scroll distance per wheel click at 100 % zoom, in device pixels.
pub const WHEEL_SCROLL_DISTANCE: i32 = 40;
/// Zoom change per wheel click while Ctrl is held.
pub const ZOOM_SCROLL_CHANGE: f32 = 0.03;

/// Errors reported by display operations.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// Zoom levels must be strictly positive; positive values outside the
    /// accepted range are clamped silently instead.
    #[error("zoom level must be positive, got {0}")]
    InvalidZoomLevel(f32),
}

/// State changes broadcast to registered listeners, synchronously on the
/// thread that caused them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewEvent {
    CurrentPageChanged,
    ZoomLevelChanged,
}

/// Document lifecycle as seen by the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    NoDocument,
    Loading,
    Ready,
}

/// How the zoom level follows viewport resizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    Manual,
    FitPage,
    FitWidth,
}

/// Thread-safe hook the display uses to ask the host for a redraw.
pub type RepaintHandle = Arc<dyn Fn() + Send + Sync>;

/// Callback for [`PreviewEvent`] notifications.
pub type PreviewListener = Box<dyn Fn(PreviewEvent)>;

/// Materializes pages one at a time off the UI thread.
///
/// Each loaded page is published over the channel followed by a repaint
/// request; the display drains the channel from `poll_loaded_pages`.
struct PageLoader {
    receiver: Receiver<PageRef>,
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl PageLoader {
    fn start(source: Arc<dyn PageSource>, repaint: RepaintHandle) -> Self {
        let (sender, receiver) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_flag = cancel.clone();

        let thread = thread::Builder::new()
            .name("page-loader".into())
            .spawn(move || {
                let count = source.page_count();
                for index in 0..count {
                    if cancel_flag.load(Ordering::Relaxed) {
                        return;
                    }
                    let page = source.page(index);
                    if sender.send(page).is_err() {
                        return;
                    }
                    repaint();
                }
                log::debug!("loaded {count} pages");
            })
            .expect("failed to spawn page loader");

        Self {
            receiver,
            cancel,
            thread: Some(thread),
        }
    }

    fn stop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("page loader panicked");
            }
        }
    }
}

impl Drop for PageLoader {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Paginated document preview.
///
/// Owns the layout strategy, scrollbar models, background scaler and loader
/// thread. All methods are meant to be called from the UI thread; background
/// threads only ever request repaints through the [`RepaintHandle`].
pub struct PageDisplay {
    layout: Box<dyn PreviewLayout>,
    source: Option<Arc<dyn PageSource>>,
    loader: Option<PageLoader>,
    pages: Vec<PageRef>,
    nominal_sizes: Vec<Size>,
    zoom: f32,
    fit_mode: FitMode,
    viewport: Size,
    background: Color,
    adorner: Option<Box<dyn PageAdorner>>,
    cursor: usize,
    horizontal: ScrollBarModel,
    vertical: ScrollBarModel,
    scaler: Option<PageScaler>,
    allow_hi_quality_scale: bool,
    listeners: Vec<PreviewListener>,
    repaint: RepaintHandle,
    update_depth: u32,
    repaint_pending: bool,
}

impl PageDisplay {
    pub fn new(repaint: RepaintHandle) -> Self {
        let scaler = Self::make_scaler(&repaint);
        Self {
            layout: Box::new(SinglePageLayout::new()),
            source: None,
            loader: None,
            pages: Vec::new(),
            nominal_sizes: Vec::new(),
            zoom: 1.0,
            fit_mode: FitMode::Manual,
            viewport: Size::ZERO,
            background: Color::GRAY,
            adorner: None,
            cursor: 0,
            horizontal: ScrollBarModel::new(),
            vertical: ScrollBarModel::new(),
            scaler: Some(scaler),
            allow_hi_quality_scale: true,
            listeners: Vec::new(),
            repaint,
            update_depth: 0,
            repaint_pending: false,
        }
    }

    fn make_scaler(repaint: &RepaintHandle) -> PageScaler {
        let scaler = PageScaler::new();
        let repaint = repaint.clone();
        scaler.add_listener(Box::new(move |_page, _target| repaint()));
        scaler
    }

    /// Replace the displayed document.
    ///
    /// The previous document is released first. Page sizes are snapshotted
    /// eagerly; the pages themselves are materialized progressively on a
    /// loader thread and never block the caller.
    pub fn set_page_source(&mut self, source: Arc<dyn PageSource>) {
        self.free_resources();

        self.nominal_sizes = (0..source.page_count())
            .map(|index| source.page_size(index))
            .collect();
        self.scaler = Some(Self::make_scaler(&self.repaint));
        self.loader = Some(PageLoader::start(source.clone(), self.repaint.clone()));
        self.source = Some(source);
        self.cursor = 0;

        self.update_scrollbars();
        self.horizontal.set_value(0);
        self.vertical.set_value(0);
        self.fire(PreviewEvent::CurrentPageChanged);
        self.request_repaint();
    }

    /// Drain pages published by the loader thread. Called automatically at
    /// the top of `paint`; hosts may also call it from their event loop.
    pub fn poll_loaded_pages(&mut self) {
        let Some(loader) = &self.loader else {
            return;
        };

        let mut received = false;
        while let Ok(page) = loader.receiver.try_recv() {
            self.pages.push(page);
            received = true;
        }
        if !received {
            return;
        }

        if self.pages.len() == self.nominal_sizes.len() {
            if let Some(mut loader) = self.loader.take() {
                loader.stop();
            }
        }
        self.update_scrollbars();
        self.fire(PreviewEvent::CurrentPageChanged);
        self.request_repaint();
    }

    pub fn document_state(&self) -> DocumentState {
        if self.source.is_none() {
            DocumentState::NoDocument
        } else if self.pages.len() < self.nominal_sizes.len() {
            DocumentState::Loading
        } else {
            DocumentState::Ready
        }
    }

    /// Set the zoom level explicitly, leaving any sticky fit mode.
    ///
    /// Non-positive values are rejected; positive values outside
    /// `[MIN_ZOOM_LEVEL, MAX_ZOOM_LEVEL]` are clamped; changes smaller than
    /// `ZOOM_EPSILON` are ignored.
    pub fn set_zoom_level(&mut self, zoom: f32) -> Result<(), PreviewError> {
        self.apply_zoom(zoom)?;
        self.fit_mode = FitMode::Manual;
        Ok(())
    }

    fn apply_zoom(&mut self, zoom: f32) -> Result<(), PreviewError> {
        if !(zoom > 0.0) {
            return Err(PreviewError::InvalidZoomLevel(zoom));
        }
        let clamped = zoom.clamp(MIN_ZOOM_LEVEL, MAX_ZOOM_LEVEL);
        if (clamped - self.zoom).abs() < ZOOM_EPSILON {
            return Ok(());
        }

        self.zoom = clamped;
        // scrollbar reconfiguration clamps the old offset into the new range
        self.update_scrollbars();
        self.fire(PreviewEvent::ZoomLevelChanged);
        self.fire(PreviewEvent::CurrentPageChanged);
        self.request_repaint();
        Ok(())
    }

    pub fn zoom_level(&self) -> f32 {
        self.zoom
    }

    pub fn fit_mode(&self) -> FitMode {
        self.fit_mode
    }

    /// Zoom so the current view element fits the viewport on both axes.
    /// Sticky across viewport resizes until a manual zoom.
    pub fn fit_page(&mut self) {
        self.fit_mode = FitMode::FitPage;
        self.apply_fit();
    }

    /// Zoom so the current view element fills the viewport width.
    /// Sticky across viewport resizes until a manual zoom.
    pub fn fit_width(&mut self) {
        self.fit_mode = FitMode::FitWidth;
        self.apply_fit();
    }

    fn apply_fit(&mut self) {
        if self.nominal_sizes.is_empty() || self.viewport.is_empty() {
            return;
        }
        let current = self.current_page();
        let element = self
            .layout
            .view_element_size(1.0, current, &self.nominal_sizes);
        if element.is_empty() {
            return;
        }

        let zoom_width = self.viewport.width as f32 / element.width as f32;
        let zoom = match self.fit_mode {
            FitMode::FitWidth => zoom_width,
            _ => zoom_width.min(self.viewport.height as f32 / element.height as f32),
        };
        let _ = self.apply_zoom(zoom);
        self.goto_page(current);
    }

    /// Tell the display how much room the host gives it.
    pub fn set_viewport_size(&mut self, viewport: Size) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        if self.fit_mode != FitMode::Manual {
            self.apply_fit();
        }
        self.update_scrollbars();
        self.request_repaint();
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport
    }

    /// Navigate to `page_index`, clamped to the document.
    pub fn goto_page(&mut self, page_index: usize) {
        if self.nominal_sizes.is_empty() {
            return;
        }
        let page_index = page_index.min(self.nominal_sizes.len() - 1);
        let scroll =
            self.layout
                .ensure_visible(self.viewport, self.zoom, &self.nominal_sizes, page_index);
        self.cursor = page_index;

        self.update_scrollbars();
        self.horizontal.set_value(scroll.x);
        self.vertical.set_value(scroll.y);
        self.fire(PreviewEvent::CurrentPageChanged);
        self.request_repaint();
    }

    pub fn goto_next_view_element(&mut self) {
        if self.nominal_sizes.is_empty() {
            return;
        }
        let next = self
            .layout
            .next_view_element(self.current_page())
            .min(self.nominal_sizes.len() - 1);
        self.goto_page(next);
    }

    pub fn goto_previous_view_element(&mut self) {
        let previous = self.layout.previous_view_element(self.current_page());
        self.goto_page(previous);
    }

    /// The page the user is most likely reading: the visible page with the
    /// largest visible fraction, first one on a tie.
    pub fn current_page(&self) -> usize {
        let mut best: Option<PageVisibility> = None;
        for pv in self.visible_pages() {
            let better = best
                .map(|b| pv.visible_fraction > b.visible_fraction)
                .unwrap_or(true);
            if better {
                best = Some(pv);
            }
        }
        best.map(|pv| pv.page_index).unwrap_or(self.cursor)
    }

    pub fn visible_pages(&self) -> Vec<PageVisibility> {
        self.layout.visible_pages(
            self.viewport,
            self.zoom,
            &self.nominal_sizes,
            self.scroll(),
            self.pages.len(),
        )
    }

    /// Swap the layout strategy, keeping the current page in view.
    pub fn set_preview_layout(&mut self, layout: Box<dyn PreviewLayout>) {
        let current = self.current_page();
        self.layout = layout;
        self.update_scrollbars();
        self.goto_page(current);
    }

    pub fn set_scroll_x(&mut self, value: i32) {
        if value == self.horizontal.value() {
            return;
        }
        self.horizontal.set_value(value);
        self.fire(PreviewEvent::CurrentPageChanged);
        self.request_repaint();
    }

    pub fn set_scroll_y(&mut self, value: i32) {
        if value == self.vertical.value() {
            return;
        }
        self.vertical.set_value(value);
        self.fire(PreviewEvent::CurrentPageChanged);
        self.request_repaint();
    }

    pub fn scroll(&self) -> Point {
        Point::new(self.horizontal.value(), self.vertical.value())
    }

    /// Wheel input: plain clicks scroll vertically, Ctrl-clicks zoom.
    /// Positive clicks mean wheel-down.
    pub fn handle_mouse_wheel(&mut self, clicks: i32, ctrl_down: bool) {
        if ctrl_down {
            let _ = self.set_zoom_level(self.zoom - clicks as f32 * ZOOM_SCROLL_CHANGE);
        } else {
            let distance = (WHEEL_SCROLL_DISTANCE as f32 * self.zoom) as i32;
            self.set_scroll_y(self.vertical.value() + clicks * distance);
        }
    }

    /// Suppress repaint requests until the matching `end_update`.
    pub fn begin_update(&mut self) {
        self.update_depth += 1;
    }

    pub fn end_update(&mut self) {
        self.update_depth = self.update_depth.saturating_sub(1);
        if self.update_depth == 0 && self.repaint_pending {
            self.repaint_pending = false;
            (self.repaint)();
        }
    }

    /// Paint the preview into `target`.
    ///
    /// Drains freshly loaded pages, fills the background, schedules one
    /// rescale job per visible page whose raster is stale (the first at high
    /// priority) and hands off to the layout for page placement.
    pub fn paint(&mut self, surface: &mut dyn DrawSurface, target: Rect) {
        self.poll_loaded_pages();
        surface.fill_rect(target, self.background);
        if self.pages.is_empty() {
            return;
        }

        let scroll = self.scroll();
        if self.allow_hi_quality_scale {
            if let Some(scaler) = &self.scaler {
                let visible = self.layout.visible_pages(
                    self.viewport,
                    self.zoom,
                    &self.nominal_sizes,
                    scroll,
                    self.pages.len(),
                );
                let mut first = true;
                for pv in &visible {
                    let page = &self.pages[pv.page_index];
                    let resolution = self.nominal_sizes[pv.page_index].scaled(self.zoom);
                    if resolution.is_empty() || page.is_scaled(resolution) {
                        continue;
                    }
                    scaler.enqueue(page.clone(), resolution, first);
                    first = false;
                }
            }
        }

        self.layout.draw(
            surface,
            self.background,
            target,
            self.zoom,
            &self.nominal_sizes,
            scroll,
            &self.pages,
            self.adorner.as_deref(),
        );
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.background = color;
        self.request_repaint();
    }

    pub fn background_color(&self) -> Color {
        self.background
    }

    pub fn set_page_adorner(&mut self, adorner: Option<Box<dyn PageAdorner>>) {
        self.adorner = adorner;
        self.request_repaint();
    }

    /// Turn background rescaling off (pages keep their current raster or
    /// placeholder) or back on.
    pub fn set_allow_hi_quality_scale(&mut self, allow: bool) {
        self.allow_hi_quality_scale = allow;
        if !allow {
            if let Some(scaler) = &self.scaler {
                scaler.clear();
            }
        }
    }

    pub fn add_listener(&mut self, listener: PreviewListener) {
        self.listeners.push(listener);
    }

    /// Total pages in the document, loaded or not.
    pub fn page_count(&self) -> usize {
        self.nominal_sizes.len()
    }

    /// Pages materialized so far.
    pub fn loaded_page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn horizontal_scrollbar(&self) -> &ScrollBarModel {
        &self.horizontal
    }

    pub fn vertical_scrollbar(&self) -> &ScrollBarModel {
        &self.vertical
    }

    pub fn can_scroll_horizontally(&self) -> bool {
        self.horizontal.enabled()
    }

    pub fn can_scroll_vertically(&self) -> bool {
        self.vertical.enabled()
    }

    /// Release the document: stop the loader and scaler, drop page rasters
    /// and the source. Idempotent; also runs on every source swap and on drop.
    pub fn free_resources(&mut self) {
        if let Some(mut loader) = self.loader.take() {
            loader.stop();
        }
        if let Some(mut scaler) = self.scaler.take() {
            scaler.disable();
        }
        for page in self.pages.drain(..) {
            page.free_resources();
        }
        self.nominal_sizes.clear();
        if let Some(source) = self.source.take() {
            source.free_resources();
        }
        self.cursor = 0;
        self.update_scrollbars();
    }

    fn update_scrollbars(&mut self) {
        let needed = self.layout.needed_space(self.zoom, &self.nominal_sizes);
        let unit = (WHEEL_SCROLL_DISTANCE as f32 * self.zoom) as i32;
        self.horizontal.configure(needed.width, self.viewport.width, unit);
        self.vertical.configure(needed.height, self.viewport.height, unit);
    }

    fn fire(&self, event: PreviewEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    fn request_repaint(&mut self) {
        if self.update_depth > 0 {
            self.repaint_pending = true;
        } else {
            (self.repaint)();
        }
    }
}

impl Drop for PageDisplay {
    fn drop(&mut self) {
        self.free_resources();
    }
}
