//! Page and page-source contracts plus the stock buffered page.

use crate::geometry::{Color, Point, Rect, Size};
use crate::raster::Raster;
use crate::surface::DrawSurface;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors raised by a page rescale operation.
///
/// These never reach the view: the background scaler logs and drops failed
/// jobs, and the page keeps showing its previous raster or placeholder.
#[derive(Debug, Error)]
pub enum ScaleError {
    #[error("failed to render page content: {0}")]
    Render(String),

    #[error("invalid target resolution {0:?}")]
    InvalidResolution(Size),
}

/// One renderable document page.
///
/// A page is read on the interactive thread (`draw`, `is_scaled`) while its
/// rescale may run on the scaler worker, so implementations must use interior
/// mutability and replace their raster cache atomically (see [`BufferedPage`]).
pub trait Page: Send + Sync {
    /// Draw the cached raster stretched to `rect`, or a placeholder if no
    /// raster exists yet. The layout has already filled `rect` white.
    fn draw(&self, surface: &mut dyn DrawSurface, rect: Rect);

    /// True iff the cached raster resolution equals `resolution` exactly.
    fn is_scaled(&self, resolution: Size) -> bool;

    /// Re-rasterize at exactly `resolution` and replace the cache on success.
    /// On error the previous cache is left untouched.
    fn hi_quality_scale(&self, resolution: Size) -> Result<(), ScaleError>;

    /// Page size at 100 % zoom, in device pixels at the host screen dpi.
    fn nominal_size(&self) -> Size;

    /// Release the raster buffer. Idempotent.
    fn free_resources(&self);
}

/// Shared handle to a page. Page identity (for scale-job de-duplication)
/// is pointer identity of this handle.
pub type PageRef = Arc<dyn Page>;

/// Returns true if both handles refer to the same page object.
pub fn same_page(a: &PageRef, b: &PageRef) -> bool {
    Arc::ptr_eq(a, b)
}

/// An ordered sequence of page descriptors backed by a document.
///
/// Owns the underlying document resources; `free_resources` releases them
/// explicitly (idempotent). Materializing a page via `page` may be slow and
/// is called from a background loader thread.
pub trait PageSource: Send + Sync {
    fn page_count(&self) -> usize;

    /// Nominal size of the page at `index`, orientation-aware, in device
    /// pixels at the host screen dpi. Cheap metadata.
    fn page_size(&self, index: usize) -> Size;

    /// Materialize the page at `index`.
    fn page(&self, index: usize) -> PageRef;

    fn free_resources(&self);
}

/// Produces page rasters at a requested resolution.
///
/// The expensive part of a page; called on the scaler worker thread.
pub trait PageRenderer: Send + Sync {
    fn render(&self, page_index: usize, resolution: Size) -> Result<Raster, ScaleError>;
}

const PLACEHOLDER_TEXT: &str = "Rendering preview...";
const PLACEHOLDER_FONT_SIZE: f32 = 12.0;

/// Stock [`Page`] implementation with an internal raster cache.
///
/// The cache holds an immutable [`Raster`] behind a mutex; `hi_quality_scale`
/// renders outside the lock and swaps the whole `Arc` in, so drawing during
/// an in-flight rescale simply sees the prior raster (or the placeholder).
pub struct BufferedPage {
    page_index: usize,
    nominal_size: Size,
    renderer: Arc<dyn PageRenderer>,
    cache: Mutex<Option<Arc<Raster>>>,
}

impl BufferedPage {
    pub fn new(page_index: usize, nominal_size: Size, renderer: Arc<dyn PageRenderer>) -> Self {
        Self {
            page_index,
            nominal_size,
            renderer,
            cache: Mutex::new(None),
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    fn cached(&self) -> Option<Arc<Raster>> {
        self.cache.lock().expect("raster cache poisoned").clone()
    }
}

impl Page for BufferedPage {
    fn draw(&self, surface: &mut dyn DrawSurface, rect: Rect) {
        match self.cached() {
            Some(raster) => surface.draw_raster(&raster, rect),
            None => {
                // page is still being rendered; show the status text if it fits
                if surface.text_width(PLACEHOLDER_FONT_SIZE, PLACEHOLDER_TEXT) < rect.width - 10 {
                    surface.draw_text(
                        Point::new(rect.x + 5, rect.y + 5),
                        PLACEHOLDER_FONT_SIZE,
                        Color::BLACK,
                        PLACEHOLDER_TEXT,
                    );
                }
            }
        }
    }

    fn is_scaled(&self, resolution: Size) -> bool {
        self.cached()
            .map(|raster| raster.size() == resolution)
            .unwrap_or(false)
    }

    fn hi_quality_scale(&self, resolution: Size) -> Result<(), ScaleError> {
        if resolution.is_empty() {
            return Err(ScaleError::InvalidResolution(resolution));
        }
        if self.is_scaled(resolution) {
            return Ok(());
        }

        // render without holding the cache lock, then swap the buffer whole
        let raster = self.renderer.render(self.page_index, resolution)?;
        *self.cache.lock().expect("raster cache poisoned") = Some(Arc::new(raster));
        Ok(())
    }

    fn nominal_size(&self) -> Size {
        self.nominal_size
    }

    fn free_resources(&self) {
        *self.cache.lock().expect("raster cache poisoned") = None;
    }
}
