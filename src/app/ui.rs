use super::{PapersUploader, Screen, UiAction, UploadPage};
use crate::coordinator::{DeleteTarget, WatermarkAction};
use crate::registry::AssetRecord;
use crate::session::ExamKind;
use crate::upload::{UploadSource, UploadStatus};
use crate::utils::file_size::format_size;
use eframe::egui::{self, Color32, RichText};

const ACCENT: Color32 = Color32::from_rgb(99, 102, 241);
const DANGER: Color32 = Color32::from_rgb(237, 51, 59);
const SUCCESS: Color32 = Color32::from_rgb(0, 180, 0);
const MUTED: Color32 = Color32::from_rgb(150, 150, 150);

impl PapersUploader {
    pub fn render(&mut self, ctx: &egui::Context) -> Vec<UiAction> {
        let mut actions = Vec::new();

        match self.screen {
            Screen::Loading => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(40.0);
                        ui.spinner();
                        ui.label("Loading...");
                    });
                });
            }
            Screen::Login => self.render_login(ctx, &mut actions),
            Screen::Upload => {
                if let Some(page) = self.page.as_mut() {
                    render_upload_page(ctx, page, &mut actions);
                }
            }
        }

        actions
    }

    fn render_login(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(20.0);
            ui.vertical_centered(|ui| {
                ui.heading("Papers Admin Login");
                ui.add_space(5.0);
                ui.label(
                    RichText::new("No admin token is stored on this machine")
                        .color(ui.visuals().text_color().gamma_multiply(0.7)),
                );
            });

            ui.add_space(20.0);
            ui.group(|ui| {
                ui.horizontal(|ui| {
                    ui.label("Paste your admin token");
                    ui.label("ℹ").on_hover_text_at_pointer(
                        "Either the bare token, an `Authorization: Bearer …` value,\n\
                        or an admin API request copied as cURL from the browser.",
                    );
                });
                ui.add_space(8.0);
                egui::ScrollArea::vertical()
                    .max_height(120.0)
                    .show(ui, |ui| {
                        ui.add_sized(
                            [ui.available_width(), 100.0],
                            egui::TextEdit::multiline(&mut self.login.token_text)
                                .font(egui::TextStyle::Monospace)
                                .hint_text("Bearer eyJhbGciOi..."),
                        );
                    });
            });

            ui.add_space(10.0);
            ui.vertical_centered(|ui| {
                let can_save = !self.login.token_text.trim().is_empty();
                let button = egui::Button::new("🔑 Save Token").min_size(egui::vec2(200.0, 40.0));
                if ui.add_enabled(can_save, button).clicked() {
                    actions.push(UiAction::SaveToken);
                }
            });

            if let Some(error) = &self.login.error_message {
                ui.add_space(5.0);
                ui.vertical_centered(|ui| {
                    ui.colored_label(DANGER, error);
                });
            }
        });
    }
}

fn render_upload_page(ctx: &egui::Context, page: &mut UploadPage, actions: &mut Vec<UiAction>) {
    egui::SidePanel::left("upload_form")
        .resizable(false)
        .exact_width(ctx.screen_rect().width() * 0.35)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                render_form(ui, page, actions);
                ui.add_space(20.0);
                render_watermark_panel(ui, page, actions);
            });
        });

    egui::CentralPanel::default().show(ctx, |ui| {
        render_assets(ui, page, actions);
    });

    if page.widget.is_open() {
        render_widget_window(ctx, page, actions);
    }
}

fn render_form(ui: &mut egui::Ui, page: &mut UploadPage, actions: &mut Vec<UiAction>) {
    ui.add_space(10.0);
    ui.horizontal(|ui| {
        ui.heading("Upload Papers");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("Sign out").clicked() {
                actions.push(UiAction::SignOut);
            }
        });
    });
    ui.label(RichText::new(format!("Session: {}", page.session.tag())).color(MUTED));
    ui.add_space(10.0);

    let upload_button = egui::Button::new(RichText::new("📤 Upload Files").color(Color32::WHITE))
        .fill(ACCENT)
        .min_size(egui::vec2(160.0, 32.0));
    if ui.add(upload_button).clicked() {
        actions.push(UiAction::OpenWidget);
    }
    ui.add_space(10.0);

    let form = &mut page.session.form;
    egui::Grid::new("paper_form")
        .num_columns(2)
        .spacing([8.0, 8.0])
        .show(ui, |ui| {
            ui.label("Subject:");
            ui.text_edit_singleline(&mut form.subject);
            ui.end_row();

            ui.label("Slot:");
            ui.text_edit_singleline(&mut form.slot);
            ui.end_row();

            ui.label("Year:");
            ui.text_edit_singleline(&mut form.year);
            ui.end_row();

            ui.label("Exam:");
            egui::ComboBox::from_id_source("exam_kind")
                .selected_text(form.exam.label())
                .show_ui(ui, |ui| {
                    for kind in ExamKind::ALL {
                        ui.selectable_value(&mut form.exam, kind, kind.label());
                    }
                });
            ui.end_row();

            ui.label("Is PDF:");
            ui.checkbox(&mut form.is_pdf, "");
            ui.end_row();
        });

    ui.add_space(10.0);
    ui.horizontal(|ui| {
        let label = if page.is_submitting {
            "⏳ Submitting..."
        } else {
            "✅ Complete Upload"
        };
        let button = egui::Button::new(RichText::new(label).color(Color32::WHITE))
            .fill(SUCCESS)
            .min_size(egui::vec2(160.0, 32.0));
        if ui.add_enabled(!page.is_submitting, button).clicked() {
            actions.push(UiAction::CompleteUpload);
        }
    });
}

fn render_watermark_panel(ui: &mut egui::Ui, page: &mut UploadPage, actions: &mut Vec<UiAction>) {
    ui.group(|ui| {
        ui.heading("Upload and Watermark PDF");
        ui.add_space(8.0);

        if let Some(error) = &page.session.error_message {
            ui.horizontal(|ui| {
                ui.colored_label(DANGER, error);
                if ui.small_button("✖").clicked() {
                    actions.push(UiAction::DismissError);
                }
            });
            ui.add_space(8.0);
        }

        ui.label("Select PDF file to upload:");
        ui.horizontal(|ui| {
            if ui.button("📄 Choose PDF").clicked() {
                actions.push(UiAction::PickPdf);
            }
            match &page.watermark.selected {
                Some(file) => {
                    ui.label(format!("{} ({})", file.name, format_size(file.size())));
                }
                None => {
                    ui.label(RichText::new("No file selected").color(MUTED));
                }
            }
        });

        ui.add_space(8.0);
        let busy = page.watermark.in_flight.is_some();
        ui.horizontal(|ui| {
            let label = match page.watermark.in_flight {
                Some(WatermarkAction::Upload) => "⏳ Uploading...",
                _ => "Upload and Watermark PDF",
            };
            if ui.add_enabled(!busy, egui::Button::new(label)).clicked() {
                actions.push(UiAction::UploadPdf);
            }
        });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.link("View Papers").clicked() {
                actions.push(UiAction::ViewPdf);
            }
            let label = match page.watermark.in_flight {
                Some(WatermarkAction::Delete) => "⏳ Deleting...",
                _ => "🗑 Delete PDF",
            };
            let button = egui::Button::new(RichText::new(label).color(Color32::WHITE)).fill(DANGER);
            if ui.add_enabled(!busy, button).clicked() {
                actions.push(UiAction::DeletePdf);
            }
        });
    });
}

fn render_assets(ui: &mut egui::Ui, page: &UploadPage, actions: &mut Vec<UiAction>) {
    ui.add_space(10.0);
    ui.heading("Uploaded Assets:");
    ui.add_space(10.0);

    if page.session.registry.is_empty() {
        ui.label("No files uploaded yet.");
        return;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for (index, record) in page.session.registry.iter().enumerate() {
            render_asset_card(ui, index, record, page.session.is_deleting(&record.public_id), actions);
            ui.add_space(6.0);
        }
    });
}

fn render_asset_card(
    ui: &mut egui::Ui,
    index: usize,
    record: &AssetRecord,
    is_deleting: bool,
    actions: &mut Vec<UiAction>,
) {
    // Raw entries have nothing to show and cannot be deleted.
    let Some(target) = DeleteTarget::from_record(record) else {
        return;
    };

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            let (icon, kind) = if record.is_pdf() {
                ("📄", "PDF")
            } else {
                ("🖼", "Image")
            };
            ui.label(RichText::new(icon).size(24.0));
            ui.vertical(|ui| {
                ui.label(RichText::new(format!("Uploaded {} {}", kind, index + 1)).strong());
                ui.label(RichText::new(&record.public_id).color(MUTED).monospace());
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if is_deleting {
                    ui.spinner();
                } else if ui
                    .add(egui::Button::new(RichText::new("🗑").color(DANGER)))
                    .on_hover_text("Delete asset")
                    .clicked()
                {
                    actions.push(UiAction::DeleteAsset(target));
                }
                if ui.small_button("Open").clicked() {
                    actions.push(UiAction::OpenUrl(record.url.clone()));
                }
            });
        });
    });
}

fn render_widget_window(ctx: &egui::Context, page: &mut UploadPage, actions: &mut Vec<UiAction>) {
    let mut open = true;
    egui::Window::new("Upload Files")
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .show(ctx, |ui| {
            let widget = &page.widget;
            ui.label(format!(
                "Preset: {} | Tag: {}",
                widget.options().upload_preset,
                widget.options().tags.join(", ")
            ));
            ui.label(format!(
                "{} of {} uploads left in this session",
                widget.remaining(),
                widget.options().max_files
            ));
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                for source in widget.options().sources.iter().copied() {
                    let label = match source {
                        UploadSource::Local => "📁 My Files",
                        UploadSource::Camera => "📷 Camera",
                    };
                    let enabled = source.is_available() && widget.can_pick();
                    let mut response = ui.add_enabled(enabled, egui::Button::new(label));
                    if !source.is_available() {
                        response = response.on_disabled_hover_text("Not available on desktop");
                    }
                    if response.clicked() {
                        actions.push(UiAction::PickFile(source));
                    }
                }
            });

            if !widget.file_statuses.is_empty() {
                ui.add_space(8.0);
                egui::Frame::none()
                    .fill(ui.style().visuals.extreme_bg_color)
                    .show(ui, |ui| {
                        for status in &widget.file_statuses {
                            ui.horizontal(|ui| match &status.status {
                                UploadStatus::Processing => {
                                    ui.spinner();
                                    ui.colored_label(MUTED, format!("{} - Uploading...", status.name));
                                }
                                UploadStatus::Success => {
                                    ui.label("✅");
                                    ui.colored_label(SUCCESS, &status.name);
                                }
                                UploadStatus::Error(err) => {
                                    ui.label("❌");
                                    ui.colored_label(DANGER, format!("{} - {}", status.name, err));
                                }
                            });
                        }
                    });
            }

            ui.add_space(8.0);
            if ui.button("Done").clicked() {
                actions.push(UiAction::CloseWidget);
            }
        });

    if !open {
        actions.push(UiAction::CloseWidget);
    }
}
