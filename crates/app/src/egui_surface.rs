//! `DrawSurface` implementation over an `egui::Painter`.

use eframe::egui;
use preview_core::{Color, DrawSurface, Point, Raster, Rect};
use std::collections::HashMap;

/// Uploaded page textures, keyed by raster id.
///
/// Rasters are immutable and carry unique ids, so a cache hit never needs to
/// compare pixel data. Rescales produce a new raster with a new id; textures
/// for rasters no longer referenced are dropped between frames.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<u64, egui::TextureHandle>,
    used: Vec<u64>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn texture(&mut self, ctx: &egui::Context, raster: &Raster) -> egui::TextureHandle {
        self.used.push(raster.id());
        self.textures
            .entry(raster.id())
            .or_insert_with(|| {
                let size = raster.size();
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [size.width.max(0) as usize, size.height.max(0) as usize],
                    raster.pixels(),
                );
                ctx.load_texture(
                    format!("page-raster-{}", raster.id()),
                    image,
                    egui::TextureOptions::LINEAR,
                )
            })
            .clone()
    }

    /// Drop textures that were not drawn since the previous call.
    pub fn trim(&mut self) {
        let used = std::mem::take(&mut self.used);
        self.textures.retain(|id, _| used.contains(id));
    }
}

fn color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// Paints preview primitives into one egui canvas region.
///
/// Preview coordinates are relative to the canvas; `origin` is the canvas
/// top-left in screen space.
pub struct EguiSurface<'a> {
    ctx: &'a egui::Context,
    painter: &'a egui::Painter,
    origin: egui::Pos2,
    cache: &'a mut TextureCache,
}

impl<'a> EguiSurface<'a> {
    pub fn new(
        ctx: &'a egui::Context,
        painter: &'a egui::Painter,
        origin: egui::Pos2,
        cache: &'a mut TextureCache,
    ) -> Self {
        Self {
            ctx,
            painter,
            origin,
            cache,
        }
    }

    fn screen_rect(&self, rect: Rect) -> egui::Rect {
        egui::Rect::from_min_size(
            self.origin + egui::vec2(rect.x as f32, rect.y as f32),
            egui::vec2(rect.width as f32, rect.height as f32),
        )
    }

    fn screen_pos(&self, point: Point) -> egui::Pos2 {
        self.origin + egui::vec2(point.x as f32, point.y as f32)
    }
}

impl DrawSurface for EguiSurface<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.painter
            .rect_filled(self.screen_rect(rect), 0.0, color32(color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        self.painter.rect_stroke(
            self.screen_rect(rect),
            0.0,
            egui::Stroke::new(1.0, color32(color)),
            egui::StrokeKind::Inside,
        );
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Color) {
        self.painter.line_segment(
            [self.screen_pos(from), self.screen_pos(to)],
            egui::Stroke::new(width, color32(color)),
        );
    }

    fn draw_raster(&mut self, raster: &Raster, rect: Rect) {
        let texture = self.cache.texture(self.ctx, raster);
        self.painter.image(
            texture.id(),
            self.screen_rect(rect),
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }

    fn draw_text(&mut self, pos: Point, font_size: f32, color: Color, text: &str) {
        self.painter.text(
            self.screen_pos(pos),
            egui::Align2::LEFT_TOP,
            text,
            egui::FontId::proportional(font_size),
            color32(color),
        );
    }

    fn text_width(&self, font_size: f32, text: &str) -> i32 {
        self.ctx.fonts(|fonts| {
            fonts
                .layout_no_wrap(
                    text.to_string(),
                    egui::FontId::proportional(font_size),
                    egui::Color32::WHITE,
                )
                .rect
                .width() as i32
        })
    }
}
