pub mod controller;
pub mod uploader;

use std::{path::Path, path::PathBuf, time::Duration};

use anyhow::Result;
use eframe::{
    egui::{self, Color32, RichText},
    App, Frame,
};
use tracing::warn;

use crate::{
    config::UploadConfig,
    fs_utils::{dropped_to_image_file, read_image_file, SUPPORTED_EXTENSIONS},
    picker::{ImagePicker, INVALID_DROP_NOTICE},
    preview::TexturePreviews,
    ui::{
        fit_within, KeyboardState, APP_TITLE, DROP_HINT, GREETING, INSTRUCTIONS, NO_PREVIEW,
        PLACEHOLDER, SUBTITLE,
    },
};

use self::controller::PageController;

const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);
const PREVIEW_BOX: f32 = 128.0;

pub struct LeafScanApp {
    pub picker: ImagePicker<TexturePreviews>,
    pub controller: PageController,
}

impl LeafScanApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: &UploadConfig,
        initial: Option<PathBuf>,
    ) -> Result<Self> {
        let picker = ImagePicker::new(TexturePreviews::new(cc.egui_ctx.clone()));
        let controller = PageController::new(config)?;

        let mut app = Self { picker, controller };
        if let Some(path) = initial {
            app.open_path(&path);
        }
        Ok(app)
    }

    fn open_path(&mut self, path: &Path) {
        match read_image_file(path) {
            Ok(file) => {
                if let Err(err) = self.picker.select_file(file) {
                    warn!(path = %path.display(), "{err}");
                }
            }
            Err(err) => {
                warn!("{err:#}");
                self.picker.reject(format!("{err:#}"));
            }
        }
    }

    fn open_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Image", SUPPORTED_EXTENSIONS)
            .pick_file()
        {
            self.open_path(&path);
        }
    }

    fn send(&mut self) {
        let busy = self.controller.is_uploading();
        let controller = &mut self.controller;
        self.picker.confirm_send(busy, |file| {
            controller.submit(file);
        });
    }

    fn handle_keyboard(ctx: &egui::Context) -> KeyboardState {
        ctx.input(|input| KeyboardState {
            open: input.modifiers.command && input.key_pressed(egui::Key::O),
            send: input.key_pressed(egui::Key::Enter),
            clear: input.key_pressed(egui::Key::Escape),
        })
    }

    fn handle_file_drag(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|input| {
            (
                !input.raw.hovered_files.is_empty(),
                input.raw.dropped_files.clone(),
            )
        });
        self.picker.set_drag_active(hovering);
        if dropped.is_empty() {
            return;
        }

        let mut files = Vec::with_capacity(dropped.len());
        for entry in &dropped {
            match dropped_to_image_file(entry) {
                Ok(file) => files.push(file),
                Err(err) => {
                    warn!("{err:#}");
                    self.picker.set_drag_active(false);
                    self.picker.reject(INVALID_DROP_NOTICE);
                    return;
                }
            }
        }
        if let Err(err) = self.picker.handle_drop(files) {
            warn!("drop rejected: {err}");
        }
    }

    fn draw_header(ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(16.0);
            ui.label(RichText::new(APP_TITLE).size(30.0).strong());
            ui.add_space(8.0);
            ui.label(RichText::new(SUBTITLE).size(16.0).color(Color32::GRAY));
        });
        ui.add_space(24.0);

        egui::Frame::new()
            .fill(ui.visuals().faint_bg_color)
            .corner_radius(16.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_max_width(420.0);
                ui.label(GREETING);
            });
        ui.add_space(16.0);
    }

    fn draw_result(&self, ui: &mut egui::Ui) {
        let Some(text) = self.controller.result_text() else {
            return;
        };
        egui::Frame::new()
            .fill(ACCENT.gamma_multiply(0.12))
            .corner_radius(16.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new("Analysis Result:").strong().color(ACCENT));
                ui.add_space(6.0);
                egui::ScrollArea::vertical()
                    .max_height(260.0)
                    .show(ui, |ui| {
                        ui.label(RichText::new(text).monospace());
                    });
            });
        ui.add_space(16.0);
    }

    fn draw_preview(&mut self, ui: &mut egui::Ui) {
        let Some(selected) = self.picker.selection() else {
            return;
        };
        let (size, _) = fit_within(selected.preview.size, egui::vec2(PREVIEW_BOX, PREVIEW_BOX));

        let mut remove = false;
        ui.horizontal(|ui| {
            match &selected.preview.texture {
                Some(texture) => {
                    ui.add(
                        egui::Image::new(egui::load::SizedTexture::new(texture.id(), size))
                            .corner_radius(8.0),
                    );
                }
                None => {
                    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
                    ui.painter()
                        .rect_filled(rect, 8.0, ui.visuals().faint_bg_color);
                    ui.painter().text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        NO_PREVIEW,
                        egui::FontId::proportional(13.0),
                        Color32::GRAY,
                    );
                }
            }
            remove = ui.small_button("×").on_hover_text("Remove image").clicked();
        });
        if let Some(label) = self.picker.size_label() {
            ui.label(RichText::new(label).small().color(Color32::GRAY));
        }
        ui.add_space(8.0);

        if remove {
            self.picker.clear();
        }
    }

    fn draw_input_row(&mut self, ui: &mut egui::Ui) {
        let uploading = self.controller.is_uploading();
        let status = self.picker.status_line(PLACEHOLDER);
        let mut open = false;
        let mut send = false;

        let row = egui::Frame::new()
            .stroke(egui::Stroke::new(1.0, Color32::GRAY))
            .corner_radius(24.0)
            .inner_margin(egui::Margin::symmetric(16, 10))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    open = ui
                        .add_enabled(!uploading, egui::Button::new("📷"))
                        .on_hover_text("Choose an image")
                        .clicked();
                    let width = (ui.available_width() - 48.0).max(80.0);
                    ui.add_sized(
                        [width, 24.0],
                        egui::Label::new(RichText::new(status).color(Color32::GRAY)).truncate(),
                    );
                    if uploading {
                        ui.add(egui::Spinner::new());
                    } else {
                        send = ui
                            .add_enabled(self.picker.has_selection(), egui::Button::new("➤"))
                            .on_hover_text("Send image")
                            .clicked();
                    }
                });
            });

        if self.picker.drag_active {
            let rect = row.response.rect;
            let painter = ui.painter();
            painter.rect(
                rect,
                24.0,
                ACCENT.gamma_multiply(0.1),
                egui::Stroke::new(2.0, ACCENT),
                egui::StrokeKind::Inside,
            );
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                DROP_HINT,
                egui::FontId::proportional(16.0),
                ACCENT,
            );
        }

        ui.add_space(6.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(INSTRUCTIONS).small().color(Color32::GRAY));
        });

        if open {
            self.open_dialog();
        }
        if send {
            self.send();
        }
    }

    fn draw_notice(&mut self, ctx: &egui::Context) {
        let Some(message) = self.picker.notice().map(str::to_owned) else {
            return;
        };
        let modal = egui::Modal::new(egui::Id::new("leafscan-notice")).show(ctx, |ui| {
            ui.set_width(280.0);
            ui.label(message);
            ui.add_space(8.0);
            ui.button("OK").clicked()
        });
        if modal.inner || modal.should_close() {
            self.picker.take_notice();
        }
    }
}

impl App for LeafScanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.controller.poll();
        self.handle_file_drag(ctx);

        // Shortcuts stay inactive while a notice is blocking the window
        if self.picker.notice().is_none() {
            let keys = Self::handle_keyboard(ctx);
            if keys.open && !self.controller.is_uploading() {
                self.open_dialog();
            }
            if keys.send {
                self.send();
            }
            if keys.clear {
                self.picker.clear();
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.set_max_width(720.0);
                Self::draw_header(ui);
                self.draw_result(ui);
                self.draw_preview(ui);
                self.draw_input_row(ui);
            });
        });

        self.draw_notice(ctx);

        if self.controller.is_uploading() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
