//! Immutable raster buffers.
//!
//! A [`Raster`] is the unit of exchange between a page's rescale operation
//! (worker thread) and the drawing code (interactive thread). Buffers are
//! never mutated after creation; a page swaps in a whole new `Arc<Raster>`
//! when a rescale finishes, so a concurrent reader only ever sees either the
//! old or the new buffer.

use crate::geometry::Size;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_RASTER_ID: AtomicU64 = AtomicU64::new(1);

/// An immutable RGBA8 pixel buffer at a fixed resolution.
///
/// The `id` is unique per buffer and lets host surfaces cache uploaded
/// textures without hashing pixel data.
#[derive(Debug, Clone)]
pub struct Raster {
    id: u64,
    size: Size,
    pixels: Arc<[u8]>,
}

impl Raster {
    /// Wrap RGBA8 pixel data. `pixels.len()` must be `width * height * 4`.
    pub fn from_rgba(size: Size, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (size.width.max(0) as usize) * (size.height.max(0) as usize) * 4
        );
        Self {
            id: NEXT_RASTER_ID.fetch_add(1, Ordering::Relaxed),
            size,
            pixels: pixels.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}
