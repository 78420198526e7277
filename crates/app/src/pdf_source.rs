//! Pdfium-backed page source.
//!
//! Adapts a PDF document to the preview's `PageSource` contract: page sizes
//! are snapshotted at load time (converted from 72-dpi points to 96-dpi
//! device pixels) and each page is a `BufferedPage` whose renderer
//! rasterizes through a shared pdfium document handle.

use pdfium_render::prelude::*;
use preview_core::{BufferedPage, PageRef, PageRenderer, PageSource, Raster, ScaleError, Size};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

const SCREEN_DPI: f32 = 96.0;
const PDF_POINTS_PER_INCH: f32 = 72.0;

/// Errors opening a PDF document.
#[derive(Debug, Error)]
pub enum PdfSourceError {
    #[error("failed to initialize pdfium: {0}")]
    Initialization(String),

    #[error("failed to load document: {0}")]
    Load(String),
}

fn points_to_pixels(points: f32) -> i32 {
    (points * SCREEN_DPI / PDF_POINTS_PER_INCH) as i32
}

/// Initialize the pdfium library.
///
/// Search order: the executable's directory (app bundles), the current
/// working directory, then the system library path.
fn init_pdfium() -> Result<Pdfium, PdfSourceError> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()));

    if let Some(ref dir) = exe_dir {
        if let Ok(bindings) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
        {
            return Ok(Pdfium::new(bindings));
        }
    }

    Ok(Pdfium::new(
        Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| PdfSourceError::Initialization(e.to_string()))?,
    ))
}

/// The loaded document, serialized behind a mutex so page rendering can
/// happen on the scaler worker while metadata is read elsewhere.
struct SharedDocument {
    document: Mutex<PdfDocument<'static>>,
}

struct PdfPageRenderer {
    document: Arc<SharedDocument>,
}

impl PageRenderer for PdfPageRenderer {
    fn render(&self, page_index: usize, resolution: Size) -> Result<Raster, ScaleError> {
        let document = self
            .document
            .document
            .lock()
            .map_err(|_| ScaleError::Render("document lock poisoned".into()))?;

        let page = document
            .pages()
            .get(page_index as u16)
            .map_err(|e| ScaleError::Render(e.to_string()))?;

        let config = PdfRenderConfig::new()
            .set_target_width(resolution.width)
            .set_target_height(resolution.height);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| ScaleError::Render(e.to_string()))?;

        // pdfium may adjust a dimension to preserve the aspect ratio
        let actual = Size::new(bitmap.width() as i32, bitmap.height() as i32);
        Ok(Raster::from_rgba(actual, bitmap.as_rgba_bytes().to_vec()))
    }
}

/// A PDF document exposed as a sequence of preview pages.
pub struct PdfPageSource {
    document: Arc<SharedDocument>,
    page_sizes: Vec<Size>,
}

impl PdfPageSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PdfSourceError> {
        // leaked so the document can borrow the bindings for 'static
        let pdfium = Box::leak(Box::new(init_pdfium()?));

        let document = pdfium
            .load_pdf_from_file(path.as_ref(), None)
            .map_err(|e| PdfSourceError::Load(e.to_string()))?;

        let page_sizes = document
            .pages()
            .iter()
            .map(|page| {
                Size::new(
                    points_to_pixels(page.width().value),
                    points_to_pixels(page.height().value),
                )
            })
            .collect();

        Ok(Self {
            document: Arc::new(SharedDocument {
                document: Mutex::new(document),
            }),
            page_sizes,
        })
    }
}

impl PageSource for PdfPageSource {
    fn page_count(&self) -> usize {
        self.page_sizes.len()
    }

    fn page_size(&self, index: usize) -> Size {
        self.page_sizes[index]
    }

    fn page(&self, index: usize) -> PageRef {
        Arc::new(BufferedPage::new(
            index,
            self.page_sizes[index],
            Arc::new(PdfPageRenderer {
                document: self.document.clone(),
            }),
        ))
    }

    fn free_resources(&self) {
        // the document handle is dropped with the last page referencing it
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_sizes_convert_to_screen_pixels() {
        // US Letter: 612 x 792 points
        assert_eq!(points_to_pixels(612.0), 816);
        assert_eq!(points_to_pixels(792.0), 1056);
        // A4: 595 x 842 points
        assert_eq!(points_to_pixels(595.0), 793);
        assert_eq!(points_to_pixels(842.0), 1122);
    }
}
