use super::AdminError;
use crate::api::{AdminApi, ApiError, PdfFile};
use crate::session::AdminSession;
use std::sync::Arc;
use tracing::{error, info};

const NO_FILE_MESSAGE: &str = "Please select a PDF file to upload.";
const UPLOAD_FAILED_MESSAGE: &str = "Failed to watermark the PDF.";
const DELETE_FAILED_MESSAGE: &str = "Failed to delete watermarked PDF.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkAction {
    Upload,
    Delete,
}

#[derive(Debug)]
pub enum WatermarkOutcome {
    Uploaded { file: String },
    Deleted,
    Failed {
        action: WatermarkAction,
        error: ApiError,
    },
}

/// Single-PDF watermark flow. Shares only the error banner with the batch
/// upload.
pub struct WatermarkUploader {
    api: Arc<dyn AdminApi>,
}

impl WatermarkUploader {
    pub fn new(api: Arc<dyn AdminApi>) -> Self {
        Self { api }
    }

    pub fn begin_upload(
        &self,
        session: &mut AdminSession,
        file: Option<PdfFile>,
    ) -> Result<PendingWatermark, AdminError> {
        let Some(file) = file else {
            session.error_message = Some(NO_FILE_MESSAGE.to_string());
            return Err(AdminError::Validation(NO_FILE_MESSAGE.to_string()));
        };

        Ok(PendingWatermark {
            api: Arc::clone(&self.api),
            request: Request::Upload(file),
        })
    }

    pub fn begin_delete(&self) -> PendingWatermark {
        PendingWatermark {
            api: Arc::clone(&self.api),
            request: Request::Delete,
        }
    }

    #[cfg(test)]
    pub async fn upload_and_watermark(
        &self,
        session: &mut AdminSession,
        file: Option<PdfFile>,
    ) -> Result<(), AdminError> {
        let pending = self.begin_upload(session, file)?;
        let outcome = pending.send().await;
        session.apply_watermark(outcome)
    }

    #[cfg(test)]
    pub async fn delete_watermarked_file(
        &self,
        session: &mut AdminSession,
    ) -> Result<(), AdminError> {
        let outcome = self.begin_delete().send().await;
        session.apply_watermark(outcome)
    }
}

enum Request {
    Upload(PdfFile),
    Delete,
}

pub struct PendingWatermark {
    api: Arc<dyn AdminApi>,
    request: Request,
}

impl PendingWatermark {
    pub fn action(&self) -> WatermarkAction {
        match self.request {
            Request::Upload(_) => WatermarkAction::Upload,
            Request::Delete => WatermarkAction::Delete,
        }
    }

    pub async fn send(self) -> WatermarkOutcome {
        match self.request {
            Request::Upload(file) => {
                let name = file.name.clone();
                match self.api.watermark_pdf(file).await {
                    Ok(()) => WatermarkOutcome::Uploaded { file: name },
                    Err(error) => WatermarkOutcome::Failed {
                        action: WatermarkAction::Upload,
                        error,
                    },
                }
            }
            Request::Delete => match self.api.delete_watermark().await {
                Ok(()) => WatermarkOutcome::Deleted,
                Err(error) => WatermarkOutcome::Failed {
                    action: WatermarkAction::Delete,
                    error,
                },
            },
        }
    }
}

impl AdminSession {
    pub fn apply_watermark(&mut self, outcome: WatermarkOutcome) -> Result<(), AdminError> {
        match outcome {
            WatermarkOutcome::Uploaded { file } => {
                info!(file = %file, "PDF sent for watermarking");
                Ok(())
            }
            WatermarkOutcome::Deleted => {
                info!("Watermarked PDF deleted");
                Ok(())
            }
            WatermarkOutcome::Failed { action, error } => {
                let message = match action {
                    WatermarkAction::Upload => {
                        error!(error = %error, "Error uploading PDF");
                        UPLOAD_FAILED_MESSAGE
                    }
                    WatermarkAction::Delete => {
                        error!(error = %error, "Error deleting PDF");
                        DELETE_FAILED_MESSAGE
                    }
                };
                self.error_message = Some(message.to_string());
                Err(AdminError::Transport(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeAdminApi};
    use crate::registry::{sample_result, AssetMeta};
    use crate::session::{BearerToken, SessionTag};

    fn session() -> AdminSession {
        let mut session =
            AdminSession::new(Some(BearerToken::new("tok")), SessionTag::from_millis(3));
        session.registry.add(
            "https://x/1.jpg",
            "p1",
            AssetMeta::Structured(sample_result("p1", "https://x/1.jpg", "image")),
        );
        session
    }

    fn pdf() -> PdfFile {
        PdfFile {
            name: "paper.pdf".to_string(),
            bytes: b"%PDF-1.4".to_vec(),
        }
    }

    #[tokio::test]
    async fn no_selection_is_a_validation_error() {
        let api = Arc::new(FakeAdminApi::accepting());
        let uploader = WatermarkUploader::new(api.clone());
        let mut session = session();

        let result = uploader.upload_and_watermark(&mut session, None).await;

        assert!(matches!(result, Err(AdminError::Validation(_))));
        assert_eq!(session.error_message.as_deref(), Some(NO_FILE_MESSAGE));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn upload_sends_the_file_and_leaves_registry_alone() {
        let api = Arc::new(FakeAdminApi::accepting());
        let uploader = WatermarkUploader::new(api.clone());
        let mut session = session();
        let before = session.registry.clone();

        uploader
            .upload_and_watermark(&mut session, Some(pdf()))
            .await
            .unwrap();

        assert_eq!(
            api.calls(),
            vec![Call::Watermark {
                file: "paper.pdf".to_string()
            }]
        );
        assert_eq!(session.registry, before);
        assert!(session.error_message.is_none());
    }

    #[tokio::test]
    async fn failures_surface_their_own_messages() {
        let api = Arc::new(FakeAdminApi::failing(500));
        let uploader = WatermarkUploader::new(api.clone());
        let mut session = session();

        let result = uploader.upload_and_watermark(&mut session, Some(pdf())).await;
        assert!(matches!(result, Err(AdminError::Transport(_))));
        assert_eq!(session.error_message.as_deref(), Some(UPLOAD_FAILED_MESSAGE));

        let result = uploader.delete_watermarked_file(&mut session).await;
        assert!(matches!(result, Err(AdminError::Transport(_))));
        assert_eq!(session.error_message.as_deref(), Some(DELETE_FAILED_MESSAGE));

        assert_eq!(api.calls().len(), 2);
        assert_eq!(session.registry.len(), 1);
    }

    #[tokio::test]
    async fn delete_needs_no_token() {
        let api = Arc::new(FakeAdminApi::accepting());
        let uploader = WatermarkUploader::new(api.clone());
        let mut session = AdminSession::new(None, SessionTag::from_millis(3));

        uploader.delete_watermarked_file(&mut session).await.unwrap();

        assert_eq!(api.calls(), vec![Call::DeleteWatermark]);
    }
}
