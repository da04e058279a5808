use crate::api::PdfFile;
use crate::coordinator::{
    DeleteTarget, DeletionOutcome, SubmissionOutcome, WatermarkAction, WatermarkOutcome,
};
use crate::session::AdminSession;
use crate::upload::{UploadSource, UploadWidgetAdapter, WidgetEvent};
use derivative::Derivative;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Login,
    Upload,
}

impl Default for Screen {
    fn default() -> Self {
        Self::Loading
    }
}

/// Everything travelling from the runtime back to the UI thread. Upload
/// progress shares the channel with backend responses so they are applied
/// in the order they arrived.
#[derive(Debug)]
pub enum AppEvent {
    Widget(WidgetEvent),
    Deletion(DeletionOutcome),
    Submission(SubmissionOutcome),
    Watermark(WatermarkOutcome),
}

impl From<WidgetEvent> for AppEvent {
    fn from(event: WidgetEvent) -> Self {
        Self::Widget(event)
    }
}

/// Things the operator asked for during the last frame.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    SaveToken,
    SignOut,
    OpenWidget,
    CloseWidget,
    PickFile(UploadSource),
    CompleteUpload,
    DeleteAsset(DeleteTarget),
    OpenUrl(String),
    PickPdf,
    UploadPdf,
    DeletePdf,
    ViewPdf,
    DismissError,
}

#[derive(Default)]
pub struct LoginState {
    pub token_text: String,
    pub error_message: Option<String>,
}

#[derive(Derivative)]
#[derivative(Default)]
pub struct WatermarkState {
    pub selected: Option<PdfFile>,
    pub in_flight: Option<WatermarkAction>,
}

/// One mounted upload page. The channel lives here so responses for a page
/// that was signed out of are dropped with it.
pub struct UploadPage {
    pub session: AdminSession,
    pub widget: UploadWidgetAdapter,
    pub watermark: WatermarkState,
    pub is_submitting: bool,
    pub event_sender: Sender<AppEvent>,
    pub event_receiver: Receiver<AppEvent>,
}

impl UploadPage {
    pub fn new(session: AdminSession, widget: UploadWidgetAdapter) -> Self {
        let (event_sender, event_receiver) = mpsc::channel();
        Self {
            session,
            widget,
            watermark: WatermarkState::default(),
            is_submitting: false,
            event_sender,
            event_receiver,
        }
    }

    /// Whether a background task may still post an event for this page.
    pub fn is_busy(&self) -> bool {
        self.is_submitting
            || self.watermark.in_flight.is_some()
            || !self.session.pending_deletions.is_empty()
            || self.widget.is_uploading()
    }

    /// Apply queued events in arrival order. Returns whether anything changed.
    pub fn drain_events(&mut self) -> bool {
        let mut had_updates = false;

        while let Ok(event) = self.event_receiver.try_recv() {
            had_updates = true;
            self.apply(event);
        }

        had_updates
    }

    fn apply(&mut self, event: AppEvent) {
        // Failures are already logged and put on the banner by the session.
        let _ = match event {
            AppEvent::Widget(event) => {
                self.widget.handle_event(event, &mut self.session.registry);
                Ok(())
            }
            AppEvent::Deletion(outcome) => self.session.apply_deletion(outcome),
            AppEvent::Submission(outcome) => {
                self.is_submitting = false;
                self.session.apply_submission(outcome)
            }
            AppEvent::Watermark(outcome) => {
                self.watermark.in_flight = None;
                self.session.apply_watermark(outcome)
            }
        };
    }
}
