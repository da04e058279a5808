mod state;
mod ui;

use crate::api::{AdminApi, HttpAdminApi, PdfFile};
use crate::config::AppConfig;
use crate::coordinator::{
    DeleteTarget, DeletionCoordinator, SubmissionCoordinator, WatermarkUploader,
};
use crate::session::{AdminSession, SessionStart, SessionTagger, TokenStore};
use crate::upload::{AssetHostClient, UploadSource, UploadWidgetAdapter, WidgetOptions};
use crate::utils::token_parser::TokenParser;
use eframe::{egui, App};
use rfd::FileDialog;
use state::{AppEvent, LoginState, Screen, UiAction, UploadPage};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{error, info, warn};

pub struct PapersUploader {
    config: AppConfig,
    runtime: Runtime,
    token_store: Box<dyn TokenStore>,
    host: Arc<AssetHostClient>,
    deletion: DeletionCoordinator,
    submission: SubmissionCoordinator,
    watermark: WatermarkUploader,
    token_parser: TokenParser,
    screen: Screen,
    login: LoginState,
    page: Option<UploadPage>,
}

impl PapersUploader {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        runtime: Runtime,
        token_store: Box<dyn TokenStore>,
    ) -> Self {
        info!(api_base = %config.api_base, "Initializing papers uploader");
        let api: Arc<dyn AdminApi> = Arc::new(HttpAdminApi::new(&config));
        Self {
            host: Arc::new(AssetHostClient::new(&config)),
            deletion: DeletionCoordinator::new(Arc::clone(&api)),
            submission: SubmissionCoordinator::new(Arc::clone(&api)),
            watermark: WatermarkUploader::new(api),
            token_parser: TokenParser::new(),
            screen: Screen::Loading,
            login: LoginState::default(),
            page: None,
            config,
            runtime,
            token_store,
        }
    }

    /// Check the stored token and, if present, start a fresh upload page.
    fn mount(&mut self) {
        match SessionTagger::initialize(self.token_store.as_ref()) {
            SessionStart::Ready { token, tag } => {
                let options =
                    WidgetOptions::for_session(&self.config.upload_preset, self.config.max_files, &tag);
                let widget = UploadWidgetAdapter::new(options, tag.clone(), Arc::clone(&self.host));
                let session = AdminSession::new(Some(token), tag);
                self.page = Some(UploadPage::new(session, widget));
                self.screen = Screen::Upload;
            }
            SessionStart::Redirect => {
                self.page = None;
                self.screen = Screen::Login;
            }
        }
    }

    fn save_token(&mut self) {
        let token = match self.token_parser.parse(&self.login.token_text) {
            Ok(token) => token,
            Err(e) => {
                self.login.error_message = Some(e.to_string());
                return;
            }
        };

        if let Err(e) = self.token_store.save(&token) {
            error!(error = %e, "Failed to store token");
            self.login.error_message = Some(e.to_string());
            return;
        }

        self.login = LoginState::default();
        self.mount();
    }

    fn sign_out(&mut self) {
        info!("Signing out");
        if let Err(e) = self.token_store.clear() {
            warn!(error = %e, "Failed to clear stored token");
        }
        self.page = None;
        self.screen = Screen::Login;
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        if self.screen == Screen::Loading {
            self.mount();
            ctx.request_repaint();
        }

        if let Some(page) = &mut self.page {
            // Background tasks cannot wake the UI, so keep polling while any
            // of them may still report back.
            if page.drain_events() || page.is_busy() {
                ctx.request_repaint();
            }
        }
    }

    pub fn handle_action(&mut self, action: UiAction) {
        match action {
            UiAction::SaveToken => self.save_token(),
            UiAction::SignOut => self.sign_out(),
            UiAction::OpenUrl(url) => {
                if let Err(e) = open::that(&url) {
                    warn!(url = %url, error = %e, "Failed to open link");
                }
            }
            UiAction::ViewPdf => {
                let url = self.config.watermarked_pdf_url();
                if let Err(e) = open::that(&url) {
                    warn!(url = %url, error = %e, "Failed to open link");
                }
            }
            action => {
                if let Some(page) = self.page.as_mut() {
                    Self::handle_page_action(
                        page,
                        action,
                        &self.runtime,
                        &self.deletion,
                        &self.submission,
                        &self.watermark,
                    );
                }
            }
        }
    }

    fn handle_page_action(
        page: &mut UploadPage,
        action: UiAction,
        runtime: &Runtime,
        deletion: &DeletionCoordinator,
        submission: &SubmissionCoordinator,
        watermark: &WatermarkUploader,
    ) {
        match action {
            UiAction::OpenWidget => page.widget.open(),
            UiAction::CloseWidget => page.widget.close(),
            UiAction::PickFile(source) => Self::pick_and_upload(page, source, runtime),
            UiAction::CompleteUpload => {
                let Ok(pending) = submission.begin(&page.session) else {
                    return;
                };
                info!(assets = pending.payload().public_ids.len(), "Submitting batch");
                page.is_submitting = true;
                let sender = page.event_sender.clone();
                runtime.spawn(async move {
                    let outcome = pending.send().await;
                    sender.send(AppEvent::Submission(outcome)).unwrap_or_default();
                });
            }
            UiAction::DeleteAsset(target) => Self::start_deletion(page, target, runtime, deletion),
            UiAction::PickPdf => {
                if let Some(path) = FileDialog::new().add_filter("PDF", &["pdf"]).pick_file() {
                    match PdfFile::read(&path) {
                        Ok(file) => page.watermark.selected = Some(file),
                        Err(e) => {
                            error!(path = %path.display(), error = %e, "Failed to read PDF");
                            page.session.error_message = Some(e.to_string());
                        }
                    }
                }
            }
            UiAction::UploadPdf => {
                let file = page.watermark.selected.clone();
                let Ok(pending) = watermark.begin_upload(&mut page.session, file) else {
                    return;
                };
                page.watermark.in_flight = Some(pending.action());
                let sender = page.event_sender.clone();
                runtime.spawn(async move {
                    let outcome = pending.send().await;
                    sender.send(AppEvent::Watermark(outcome)).unwrap_or_default();
                });
            }
            UiAction::DeletePdf => {
                let pending = watermark.begin_delete();
                page.watermark.in_flight = Some(pending.action());
                let sender = page.event_sender.clone();
                runtime.spawn(async move {
                    let outcome = pending.send().await;
                    sender.send(AppEvent::Watermark(outcome)).unwrap_or_default();
                });
            }
            UiAction::DismissError => page.session.error_message = None,
            UiAction::SaveToken | UiAction::SignOut | UiAction::OpenUrl(_) | UiAction::ViewPdf => {}
        }
    }

    fn pick_and_upload(page: &mut UploadPage, source: UploadSource, runtime: &Runtime) {
        if !source.is_available() {
            warn!(?source, "Upload source is not available on this platform");
            return;
        }

        let dialog = FileDialog::new().add_filter(
            "Papers",
            &["jpg", "jpeg", "png", "webp", "gif", "heic", "bmp", "pdf"],
        );
        let paths: Vec<PathBuf> = if page.widget.options().multiple {
            dialog.pick_files().unwrap_or_default()
        } else {
            dialog.pick_file().into_iter().collect()
        };

        for path in paths {
            let sender = page.event_sender.clone();
            if let Err(e) = page.widget.start_upload(path, runtime.handle(), sender) {
                warn!(error = %e, "Upload not started");
                break;
            }
        }
    }

    fn start_deletion(
        page: &mut UploadPage,
        target: DeleteTarget,
        runtime: &Runtime,
        deletion: &DeletionCoordinator,
    ) {
        let Ok(pending) = deletion.begin(&mut page.session, target) else {
            return;
        };
        info!(public_id = %pending.target().public_id, "Deleting asset");
        let sender = page.event_sender.clone();
        runtime.spawn(async move {
            let outcome = pending.send().await;
            sender.send(AppEvent::Deletion(outcome)).unwrap_or_default();
        });
    }
}

impl App for PapersUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        for action in self.render(ctx) {
            self.handle_action(action);
        }
    }
}
