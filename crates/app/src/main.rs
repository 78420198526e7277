//! PDF preview demo.
//!
//! An eframe shell around the preview control: open a PDF, page through it
//! with the four layout strategies, zoom and fit, while pages rasterize in
//! the background.

mod egui_surface;
mod pdf_source;
mod recent_files;

use eframe::egui;
use egui_surface::{EguiSurface, TextureCache};
use pdf_source::PdfPageSource;
use preview_core::{
    Color, CompoundAdorner, ContinuousFacingLayout, ContinuousLayout, FacingLayout, PageAdorner,
    PageNumberAdorner, PageSource, PreviewLayout, Rect, ShadowAdorner, SinglePageLayout, Size,
};
use preview_display::{DocumentState, PageDisplay, RepaintHandle, ScrollBarModel};
use recent_files::RecentFiles;
use std::path::PathBuf;
use std::sync::Arc;

const SCROLLBAR_THICKNESS: f32 = 12.0;
const MIN_THUMB_LENGTH: f32 = 24.0;
const ZOOM_STEP: f32 = 0.25;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Preview Demo"),
        ..Default::default()
    };

    eframe::run_native(
        "Preview Demo",
        options,
        Box::new(|cc| Ok(Box::new(PreviewApp::new(cc)))),
    )
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LayoutChoice {
    Single,
    Continuous,
    Facing,
    ContinuousFacing,
}

impl LayoutChoice {
    const ALL: [LayoutChoice; 4] = [
        LayoutChoice::Single,
        LayoutChoice::Continuous,
        LayoutChoice::Facing,
        LayoutChoice::ContinuousFacing,
    ];

    fn label(&self) -> &'static str {
        match self {
            LayoutChoice::Single => "Single page",
            LayoutChoice::Continuous => "Continuous",
            LayoutChoice::Facing => "Facing",
            LayoutChoice::ContinuousFacing => "Continuous facing",
        }
    }

    fn make(&self) -> Box<dyn PreviewLayout> {
        match self {
            LayoutChoice::Single => Box::new(SinglePageLayout::new()),
            LayoutChoice::Continuous => Box::new(ContinuousLayout::new()),
            LayoutChoice::Facing => Box::new(FacingLayout::new()),
            LayoutChoice::ContinuousFacing => Box::new(ContinuousFacingLayout::new()),
        }
    }
}

fn default_adorner() -> Box<dyn PageAdorner> {
    Box::new(CompoundAdorner::new(vec![
        Box::new(ShadowAdorner::default()),
        Box::new(PageNumberAdorner::new(10.0, Color::BLACK)),
    ]))
}

struct PreviewApp {
    display: PageDisplay,
    textures: TextureCache,
    recent: RecentFiles,
    layout_choice: LayoutChoice,
    file_path: Option<PathBuf>,
    error: Option<String>,
}

impl PreviewApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let ctx = cc.egui_ctx.clone();
        let repaint: RepaintHandle = Arc::new(move || ctx.request_repaint());

        let mut display = PageDisplay::new(repaint);
        display.set_page_adorner(Some(default_adorner()));

        let mut recent = RecentFiles::new();
        if let Err(err) = recent.load() {
            log::warn!("could not load recent files: {err}");
        }

        let mut app = Self {
            display,
            textures: TextureCache::new(),
            recent,
            layout_choice: LayoutChoice::Single,
            file_path: None,
            error: None,
        };

        if let Some(path) = std::env::args().nth(1) {
            app.open_file(PathBuf::from(path));
        }
        app
    }

    fn open_file(&mut self, path: PathBuf) {
        match PdfPageSource::open(&path) {
            Ok(source) => {
                log::info!("opened {} ({} pages)", path.display(), source.page_count());
                self.display.set_page_source(Arc::new(source));
                self.recent.add(&path);
                if let Err(err) = self.recent.save() {
                    log::warn!("could not save recent files: {err}");
                }
                self.file_path = Some(path);
                self.error = None;
            }
            Err(err) => {
                log::error!("could not open {}: {err}", path.display());
                self.error = Some(err.to_string());
            }
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open...").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("PDF", &["pdf"])
                    .pick_file()
                {
                    self.open_file(path);
                }
            }

            ui.menu_button("Recent", |ui| {
                let files: Vec<PathBuf> = self.recent.files().to_vec();
                if files.is_empty() {
                    ui.label("No recent files");
                }
                for path in files {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    if ui.button(name).clicked() {
                        self.open_file(path);
                        ui.close_menu();
                    }
                }
                ui.separator();
                if ui.button("Clear list").clicked() {
                    self.recent.clear();
                    if let Err(err) = self.recent.save() {
                        log::warn!("could not save recent files: {err}");
                    }
                    ui.close_menu();
                }
            });

            ui.separator();

            let mut choice = self.layout_choice;
            egui::ComboBox::from_id_salt("layout")
                .selected_text(choice.label())
                .show_ui(ui, |ui| {
                    for candidate in LayoutChoice::ALL {
                        ui.selectable_value(&mut choice, candidate, candidate.label());
                    }
                });
            if choice != self.layout_choice {
                self.layout_choice = choice;
                self.display.set_preview_layout(choice.make());
            }

            ui.separator();

            if ui.button("−").clicked() {
                self.set_zoom(self.display.zoom_level() - ZOOM_STEP);
            }
            ui.label(format!("{:.0} %", self.display.zoom_level() * 100.0));
            if ui.button("+").clicked() {
                self.set_zoom(self.display.zoom_level() + ZOOM_STEP);
            }
            if ui.button("Fit page").clicked() {
                self.display.fit_page();
            }
            if ui.button("Fit width").clicked() {
                self.display.fit_width();
            }

            ui.separator();

            if ui.button("<").clicked() {
                self.display.goto_previous_view_element();
            }
            match self.display.document_state() {
                DocumentState::NoDocument => {
                    ui.label("No document");
                }
                DocumentState::Loading => {
                    ui.label(format!(
                        "Page {} / {} (loading {})",
                        self.display.current_page() + 1,
                        self.display.page_count(),
                        self.display.loaded_page_count(),
                    ));
                }
                DocumentState::Ready => {
                    ui.label(format!(
                        "Page {} / {}",
                        self.display.current_page() + 1,
                        self.display.page_count(),
                    ));
                }
            }
            if ui.button(">").clicked() {
                self.display.goto_next_view_element();
            }
        });
    }

    fn set_zoom(&mut self, zoom: f32) {
        if let Err(err) = self.display.set_zoom_level(zoom) {
            log::warn!("rejected zoom change: {err}");
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_size();
        let canvas_size = egui::vec2(
            (available.x - SCROLLBAR_THICKNESS).max(0.0),
            (available.y - SCROLLBAR_THICKNESS).max(0.0),
        );
        let (response, painter) =
            ui.allocate_painter(canvas_size, egui::Sense::click_and_drag());
        let canvas = response.rect;

        self.display.set_viewport_size(Size::new(
            canvas.width() as i32,
            canvas.height() as i32,
        ));

        if response.hovered() {
            let (scroll, ctrl) = ui.input(|i| (i.raw_scroll_delta.y, i.modifiers.ctrl));
            if scroll != 0.0 {
                let clicks = if scroll > 0.0 { -1 } else { 1 };
                self.display.handle_mouse_wheel(clicks, ctrl);
            }
        }
        if response.dragged() {
            let delta = response.drag_delta();
            let scroll = self.display.scroll();
            self.display.set_scroll_x(scroll.x - delta.x as i32);
            self.display.set_scroll_y(scroll.y - delta.y as i32);
        }

        let ctx = ui.ctx().clone();
        let mut surface = EguiSurface::new(&ctx, &painter, canvas.min, &mut self.textures);
        self.display.paint(
            &mut surface,
            Rect::new(0, 0, canvas.width() as i32, canvas.height() as i32),
        );
        self.textures.trim();

        let vertical_track = egui::Rect::from_min_size(
            egui::pos2(canvas.right(), canvas.top()),
            egui::vec2(SCROLLBAR_THICKNESS, canvas.height()),
        );
        if let Some(value) = scrollbar(
            ui,
            "vscroll",
            vertical_track,
            *self.display.vertical_scrollbar(),
            false,
        ) {
            self.display.set_scroll_y(value);
        }

        let horizontal_track = egui::Rect::from_min_size(
            egui::pos2(canvas.left(), canvas.bottom()),
            egui::vec2(canvas.width(), SCROLLBAR_THICKNESS),
        );
        if let Some(value) = scrollbar(
            ui,
            "hscroll",
            horizontal_track,
            *self.display.horizontal_scrollbar(),
            true,
        ) {
            self.display.set_scroll_x(value);
        }
    }

    fn error_window(&mut self, ctx: &egui::Context) {
        let Some(message) = self.error.clone() else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(&message);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.error = None;
        }
    }
}

/// Draw one scrollbar track + thumb from the display's model.
/// Returns the new scroll value while the thumb is being dragged.
fn scrollbar(
    ui: &mut egui::Ui,
    id: &str,
    track: egui::Rect,
    model: ScrollBarModel,
    horizontal: bool,
) -> Option<i32> {
    if !model.enabled() || model.max() <= 0 {
        return None;
    }

    let track_length = if horizontal {
        track.width()
    } else {
        track.height()
    };
    let thumb_length =
        (model.extent() as f32 / model.max() as f32 * track_length).max(MIN_THUMB_LENGTH);
    let travel = (track_length - thumb_length).max(0.0);
    let scroll_range = (model.max() - model.extent()) as f32;
    let offset = if scroll_range > 0.0 {
        model.value() as f32 / scroll_range * travel
    } else {
        0.0
    };

    let thumb = if horizontal {
        egui::Rect::from_min_size(
            egui::pos2(track.left() + offset, track.top()),
            egui::vec2(thumb_length, track.height()),
        )
    } else {
        egui::Rect::from_min_size(
            egui::pos2(track.left(), track.top() + offset),
            egui::vec2(track.width(), thumb_length),
        )
    };

    ui.painter()
        .rect_filled(track, 0.0, ui.visuals().extreme_bg_color);
    ui.painter()
        .rect_filled(thumb, 4.0, ui.visuals().weak_text_color());

    let response = ui.interact(thumb, ui.id().with(id), egui::Sense::drag());
    if response.dragged() && travel > 0.0 {
        let delta = if horizontal {
            response.drag_delta().x
        } else {
            response.drag_delta().y
        };
        return Some(model.value() + (delta / travel * scroll_range) as i32);
    }
    None
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.toolbar(ui);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.canvas(ui);
        });
        self.error_window(ctx);
    }
}
