/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Main eframe::App implementation
//! Async work (preview decode, upload) pushes into Arc<Mutex<Vec>> queues
//! that are drained every frame.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use eframe::egui;

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::model::{CandidateFile, Generation, PreviewImage, SelectedFile};
use crate::picker;
use crate::preview;
use crate::session::{DecodeJob, Phase, SelectOutcome, Session};
use crate::zoom::fit_size;

#[cfg(target_arch = "wasm32")]
use crate::submit;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::spawn_local;

type PreviewOutcome = (Generation, Result<PreviewImage, AnalyzerError>);
type AnalysisOutcome = (Generation, Result<String, AnalyzerError>);

const PREVIEW_HEIGHT: f32 = 256.0;
const LIGHTBOX_MARGIN: f32 = 32.0;
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 100, 100);
const ACCENT_COLOR: egui::Color32 = egui::Color32::from_rgb(59, 130, 246);

/// User intents collected while drawing, applied after the frame's UI
enum UiAction {
    PickFile,
    Analyze,
    Reset,
    OpenZoom,
    CloseZoom,
}

pub struct ImageAnalyzerApp {
    session: Session,
    config: AnalyzerConfig,
    /// Background decodes push finished previews here
    preview_queue: Arc<Mutex<Vec<PreviewOutcome>>>,
    /// Upload tasks push responses here
    analysis_queue: Arc<Mutex<Vec<AnalysisOutcome>>>,
    /// File picker pushes new files here
    file_queue: Arc<Mutex<Vec<CandidateFile>>>,
    preview_texture: Option<egui::TextureHandle>,
    preview_loaded_for: Option<Generation>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ImageAnalyzerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AnalyzerConfig) -> Self {
        Self {
            session: Session::new(),
            config,
            preview_queue: Arc::new(Mutex::new(Vec::new())),
            analysis_queue: Arc::new(Mutex::new(Vec::new())),
            file_queue: Arc::new(Mutex::new(Vec::new())),
            preview_texture: None,
            preview_loaded_for: None,
        }
    }

    fn offer_files(&mut self, ctx: &egui::Context, files: Vec<CandidateFile>) {
        if let SelectOutcome::Accepted(job) = self.session.select_files(files) {
            self.spawn_decode(ctx, job);
        }
    }

    fn spawn_decode(&self, ctx: &egui::Context, job: DecodeJob) {
        let queue = Arc::clone(&self.preview_queue);
        let ctx = ctx.clone();
        let task = move || {
            let decoded = preview::decode_preview(&job.file.bytes);
            lock(&queue).push((job.generation, decoded));
            ctx.request_repaint();
        };

        #[cfg(not(target_arch = "wasm32"))]
        std::thread::spawn(task);
        #[cfg(target_arch = "wasm32")]
        spawn_local(async move { task() });
    }

    fn start_analysis(&mut self, ctx: &egui::Context) {
        let Some(request) = self.session.begin_analysis(&self.config) else {
            return;
        };
        let queue = Arc::clone(&self.analysis_queue);
        let ctx = ctx.clone();

        #[cfg(not(target_arch = "wasm32"))]
        std::thread::spawn(move || {
            let outcome = crate::submit::send_blocking(&request);
            lock(&queue).push((request.generation, outcome));
            ctx.request_repaint();
        });

        #[cfg(target_arch = "wasm32")]
        spawn_local(async move {
            let outcome = submit::send(&request).await;
            lock(&queue).push((request.generation, outcome));
            ctx.request_repaint();
        });
    }

    fn open_file_dialog(&mut self, ctx: &egui::Context) {
        #[cfg(not(target_arch = "wasm32"))]
        if let Some(file) = picker::pick_file() {
            self.offer_files(ctx, vec![file]);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let file_queue = Arc::clone(&self.file_queue);
            let ctx = ctx.clone();
            spawn_local(async move {
                if let Some(file) = picker::pick_file().await {
                    lock(&file_queue).push(file);
                    ctx.request_repaint();
                }
            });
        }
    }

    /// Drain completion queues (called each frame)
    fn poll_results(&mut self, ctx: &egui::Context) {
        let previews: Vec<PreviewOutcome> = lock(&self.preview_queue).drain(..).collect();
        for (generation, decoded) in previews {
            self.session.apply_preview(generation, decoded);
        }

        let responses: Vec<AnalysisOutcome> = lock(&self.analysis_queue).drain(..).collect();
        for (generation, outcome) in responses {
            self.session.complete_analysis(generation, outcome);
        }

        let files: Vec<CandidateFile> = lock(&self.file_queue).drain(..).collect();
        if !files.is_empty() {
            self.offer_files(ctx, files);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }
        // The drop target only exists while nothing is being analyzed
        if matches!(self.session.phase(), Phase::Empty | Phase::Selected)
            && let Some(file) = picker::from_dropped_first(&dropped)
        {
            self.offer_files(ctx, vec![file]);
        }
    }

    fn handle_escape(&mut self, ctx: &egui::Context) {
        if self.session.escape_bindings() == 0 {
            return;
        }
        let pressed = ctx.input(|i| i.events.iter().any(is_escape_press));
        if pressed {
            self.session.handle_escape();
        }
    }

    /// Keep the texture in sync with the session's decoded preview
    fn update_preview_texture(&mut self, ctx: &egui::Context) {
        let current = self
            .session
            .preview()
            .map(|image| (self.session.generation(), image));

        match current {
            Some((generation, image)) if self.preview_loaded_for != Some(generation) => {
                let name = self
                    .session
                    .file()
                    .map(|f| f.name.clone())
                    .unwrap_or_default();
                self.preview_texture = Some(ctx.load_texture(
                    name,
                    preview::to_color_image(image),
                    egui::TextureOptions::LINEAR,
                ));
                self.preview_loaded_for = Some(generation);
            }
            Some(_) => {}
            None => {
                self.preview_texture = None;
                self.preview_loaded_for = None;
            }
        }
    }

    fn apply(&mut self, ctx: &egui::Context, action: UiAction) {
        match action {
            UiAction::PickFile => self.open_file_dialog(ctx),
            UiAction::Analyze => self.start_analysis(ctx),
            UiAction::Reset => self.session.reset(),
            UiAction::OpenZoom => {
                self.session.open_zoom();
            }
            UiAction::CloseZoom => {
                self.session.close_zoom();
            }
        }
    }
}

impl eframe::App for ImageAnalyzerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_results(ctx);

        // Keep repainting while background work is running
        if self.session.is_loading() || self.session.preview_pending() {
            ctx.request_repaint();
        }

        self.handle_dropped_files(ctx);
        self.handle_escape(ctx);
        self.update_preview_texture(ctx);

        let mut actions = Vec::new();
        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.heading("Image Analyzer");
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(8.0);

                match self.session.file() {
                    None => {
                        if render_drop_zone(ui, hovering) {
                            actions.push(UiAction::PickFile);
                        }
                    }
                    Some(file) => render_selected(
                        ui,
                        file,
                        self.preview_texture.as_ref(),
                        self.session.preview_pending(),
                        self.session.is_loading(),
                        &mut actions,
                    ),
                }

                if let Some(error) = self.session.error() {
                    ui.add_space(12.0);
                    render_error(ui, error);
                }

                if let Some(text) = self.session.result() {
                    ui.add_space(12.0);
                    render_result(ui, text, &mut actions);
                }
            });
        });

        if self.session.is_loading() {
            render_loading_overlay(ctx);
        }

        if self.session.is_zoomed()
            && let Some(texture) = &self.preview_texture
            && render_lightbox(ctx, texture)
        {
            actions.push(UiAction::CloseZoom);
        }

        for action in actions {
            self.apply(ctx, action);
        }
    }
}

/// Any Escape key-down, whatever modifiers are held
fn is_escape_press(event: &egui::Event) -> bool {
    matches!(
        event,
        egui::Event::Key {
            key: egui::Key::Escape,
            pressed: true,
            ..
        }
    )
}

/// Returns true when the zone was clicked
fn render_drop_zone(ui: &mut egui::Ui, hovering: bool) -> bool {
    let (stroke_color, prompt) = if hovering {
        (ACCENT_COLOR, "Drop the image here")
    } else {
        (
            egui::Color32::GRAY,
            "Drag and drop an image, or click to choose one",
        )
    };

    egui::Frame::group(ui.style())
        .stroke(egui::Stroke::new(2.0, stroke_color))
        .inner_margin(egui::Margin::same(48))
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new(prompt).size(18.0).color(egui::Color32::GRAY));
                ui.add_space(6.0);
                ui.label(
                    egui::RichText::new("PNG, JPEG, GIF (up to 5 MB)")
                        .small()
                        .color(egui::Color32::GRAY),
                );
            });
        })
        .response
        .interact(egui::Sense::click())
        .on_hover_cursor(egui::CursorIcon::PointingHand)
        .clicked()
}

fn render_selected(
    ui: &mut egui::Ui,
    file: &SelectedFile,
    texture: Option<&egui::TextureHandle>,
    pending: bool,
    loading: bool,
    actions: &mut Vec<UiAction>,
) {
    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::same(16))
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.strong("Selected image");
            ui.label(egui::RichText::new(&file.name).color(egui::Color32::GRAY));
            ui.add_space(8.0);

            if let Some(texture) = texture {
                let bounds = egui::vec2(ui.available_width(), PREVIEW_HEIGHT);
                let size = fit_size(texture.size_vec2(), bounds);
                let response = ui
                    .vertical_centered(|ui| {
                        ui.add(
                            egui::Image::new(egui::load::SizedTexture::new(texture.id(), size))
                                .sense(egui::Sense::click()),
                        )
                    })
                    .inner
                    .on_hover_text("Click to enlarge")
                    .on_hover_cursor(egui::CursorIcon::ZoomIn);
                if response.clicked() {
                    actions.push(UiAction::OpenZoom);
                }
            } else if pending {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Preparing preview...");
                });
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let label = if loading { "Analyzing..." } else { "Analyze" };
                if ui.add_enabled(!loading, egui::Button::new(label)).clicked() {
                    actions.push(UiAction::Analyze);
                }
                if ui.add_enabled(!loading, egui::Button::new("Cancel")).clicked() {
                    actions.push(UiAction::Reset);
                }
            });
        });
}

fn render_error(ui: &mut egui::Ui, error: &AnalyzerError) {
    egui::Frame::group(ui.style())
        .stroke(egui::Stroke::new(1.0, ERROR_COLOR))
        .inner_margin(egui::Margin::same(12))
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.colored_label(ERROR_COLOR, error.to_string());
        });
}

fn render_result(ui: &mut egui::Ui, text: &str, actions: &mut Vec<UiAction>) {
    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::same(16))
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.strong("Result");
            ui.add_space(6.0);
            ui.add(egui::Label::new(text).wrap().selectable(true));
            ui.add_space(12.0);
            let width = ui.available_width();
            if ui
                .add_sized([width, 32.0], egui::Button::new("Analyze another image"))
                .clicked()
            {
                actions.push(UiAction::Reset);
            }
        });
}

fn render_loading_overlay(ctx: &egui::Context) {
    egui::Modal::new(egui::Id::new("analysis_loading")).show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add(egui::Spinner::new().size(32.0));
            ui.add_space(8.0);
            ui.label("Analyzing image...");
        });
    });
}

/// Full-window preview. Returns true when the user asked to close it.
fn render_lightbox(ctx: &egui::Context, texture: &egui::TextureHandle) -> bool {
    let screen = ctx.content_rect();
    let mut close = false;

    egui::Area::new(egui::Id::new("lightbox"))
        .order(egui::Order::Foreground)
        .fixed_pos(screen.min)
        .show(ctx, |ui| {
            let backdrop = ui.allocate_rect(screen, egui::Sense::click());
            ui.painter()
                .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(230));

            let bounds = screen.shrink(LIGHTBOX_MARGIN);
            let size = fit_size(texture.size_vec2(), bounds.size());
            let image_rect = egui::Rect::from_center_size(bounds.center(), size);
            // Clicks on the image itself must not reach the backdrop
            ui.put(
                image_rect,
                egui::Image::new(egui::load::SizedTexture::new(texture.id(), size))
                    .sense(egui::Sense::click()),
            );

            let close_rect = egui::Rect::from_min_size(
                egui::pos2(screen.right() - 48.0, screen.top() + 16.0),
                egui::vec2(32.0, 32.0),
            );
            let close_button = ui
                .put(close_rect, egui::Button::new(egui::RichText::new("✕").size(18.0)))
                .on_hover_text("Close");

            if close_button.clicked() || backdrop.clicked() {
                close = true;
            }
        });

    close
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: egui::Key, pressed: bool, modifiers: egui::Modifiers) -> egui::Event {
        egui::Event::Key {
            key,
            physical_key: None,
            pressed,
            repeat: false,
            modifiers,
        }
    }

    #[test]
    fn escape_with_modifiers_counts() {
        assert!(is_escape_press(&key(egui::Key::Escape, true, egui::Modifiers::NONE)));
        assert!(is_escape_press(&key(egui::Key::Escape, true, egui::Modifiers::SHIFT)));
        assert!(is_escape_press(&key(egui::Key::Escape, true, egui::Modifiers::CTRL)));
    }

    #[test]
    fn release_and_other_keys_do_not_count() {
        assert!(!is_escape_press(&key(egui::Key::Escape, false, egui::Modifiers::NONE)));
        assert!(!is_escape_press(&key(egui::Key::Enter, true, egui::Modifiers::NONE)));
        assert!(!is_escape_press(&egui::Event::Text("x".into())));
    }
}
