use super::AdminError;
use crate::api::{AdminApi, ApiError, BatchPayload};
use crate::session::{AdminSession, BearerToken};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug)]
pub enum SubmissionOutcome {
    Accepted,
    /// The backend answered without `status: true`.
    Rejected,
    Failed(ApiError),
}

pub struct SubmissionCoordinator {
    api: Arc<dyn AdminApi>,
}

impl SubmissionCoordinator {
    pub fn new(api: Arc<dyn AdminApi>) -> Self {
        Self { api }
    }

    /// Snapshot the registry and form into a batch request.
    pub fn begin(&self, session: &AdminSession) -> Result<PendingSubmission, AdminError> {
        let Some(token) = session.token().cloned() else {
            error!("Token not found, batch submission aborted");
            return Err(AdminError::MissingCredential);
        };

        let form = &session.form;
        let payload = BatchPayload {
            public_ids: session.registry.public_ids(),
            urls: session.registry.urls(),
            subject: form.subject.clone(),
            slot: form.slot.clone(),
            year: form.year.clone(),
            exam: form.exam,
            is_pdf: form.is_pdf,
        };

        Ok(PendingSubmission {
            api: Arc::clone(&self.api),
            token,
            payload,
        })
    }

    #[cfg(test)]
    pub async fn complete_upload(&self, session: &mut AdminSession) -> Result<(), AdminError> {
        let pending = self.begin(session)?;
        let outcome = pending.send().await;
        session.apply_submission(outcome)
    }
}

pub struct PendingSubmission {
    api: Arc<dyn AdminApi>,
    token: BearerToken,
    payload: BatchPayload,
}

impl PendingSubmission {
    pub fn payload(&self) -> &BatchPayload {
        &self.payload
    }

    pub async fn send(self) -> SubmissionOutcome {
        match self.api.create_batch(&self.token, &self.payload).await {
            Ok(response) if response.status => SubmissionOutcome::Accepted,
            Ok(_) => SubmissionOutcome::Rejected,
            Err(e) => SubmissionOutcome::Failed(e),
        }
    }
}

impl AdminSession {
    pub fn apply_submission(&mut self, outcome: SubmissionOutcome) -> Result<(), AdminError> {
        match outcome {
            SubmissionOutcome::Accepted => {
                info!(tag = %self.tag(), assets = self.registry.len(), "Batch committed");
                self.reset();
                Ok(())
            }
            SubmissionOutcome::Rejected => {
                warn!(tag = %self.tag(), "Batch was not accepted, keeping assets");
                self.error_message = Some("The server did not accept the batch.".to_string());
                Err(AdminError::Rejected)
            }
            SubmissionOutcome::Failed(e) => {
                error!(error = %e, "Error submitting batch");
                self.error_message = Some("Failed to complete the upload.".to_string());
                Err(AdminError::Transport(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeAdminApi};
    use crate::registry::{sample_result, AssetMeta};
    use crate::session::{ExamKind, PaperForm, SessionTag};

    fn filled_session(token: Option<&str>) -> AdminSession {
        let mut session = AdminSession::new(token.map(BearerToken::new), SessionTag::from_millis(7));
        for (id, url, kind) in [
            ("p1", "https://x/img1.jpg", "image"),
            ("p2", "https://x/doc1.pdf", "pdf"),
        ] {
            session
                .registry
                .add(url, id, AssetMeta::Structured(sample_result(id, url, kind)));
        }
        session.form = PaperForm {
            subject: "Chemistry".to_string(),
            slot: "C1".to_string(),
            year: "2022".to_string(),
            exam: ExamKind::Fat,
            is_pdf: true,
        };
        session
    }

    #[tokio::test]
    async fn accepted_batch_clears_the_session() {
        let api = Arc::new(FakeAdminApi::accepting());
        let coordinator = SubmissionCoordinator::new(api.clone());
        let mut session = filled_session(Some("tok"));

        coordinator.complete_upload(&mut session).await.unwrap();

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        let Call::CreateBatch { token, payload } = &calls[0] else {
            panic!("expected a batch call, got {:?}", calls[0]);
        };
        assert_eq!(token, "tok");
        assert_eq!(payload.public_ids, vec!["p1", "p2"]);
        assert_eq!(payload.urls, vec!["https://x/img1.jpg", "https://x/doc1.pdf"]);
        assert_eq!(payload.subject, "Chemistry");
        assert_eq!(payload.exam, ExamKind::Fat);
        assert!(payload.is_pdf);

        assert!(session.registry.is_empty());
        assert_eq!(session.form.subject, "");
        assert_eq!(session.form.slot, "");
        assert_eq!(session.form.year, "");
        assert_eq!(session.form.exam, ExamKind::Cat1);
    }

    #[tokio::test]
    async fn rejected_batch_keeps_everything() {
        let api = Arc::new(FakeAdminApi::rejecting_batches());
        let coordinator = SubmissionCoordinator::new(api.clone());
        let mut session = filled_session(Some("tok"));
        let registry_before = session.registry.clone();
        let form_before = session.form.clone();

        let result = coordinator.complete_upload(&mut session).await;

        assert!(matches!(result, Err(AdminError::Rejected)));
        assert_eq!(session.registry, registry_before);
        assert_eq!(session.form, form_before);
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn transport_error_keeps_everything() {
        let api = Arc::new(FakeAdminApi::failing(502));
        let coordinator = SubmissionCoordinator::new(api);
        let mut session = filled_session(Some("tok"));
        let registry_before = session.registry.clone();

        let result = coordinator.complete_upload(&mut session).await;

        assert!(matches!(result, Err(AdminError::Transport(_))));
        assert_eq!(session.registry, registry_before);
        assert_eq!(
            session.error_message.as_deref(),
            Some("Failed to complete the upload.")
        );
    }

    #[tokio::test]
    async fn missing_token_sends_nothing() {
        let api = Arc::new(FakeAdminApi::accepting());
        let coordinator = SubmissionCoordinator::new(api.clone());
        let mut session = filled_session(None);
        let registry_before = session.registry.clone();

        let result = coordinator.complete_upload(&mut session).await;

        assert!(matches!(result, Err(AdminError::MissingCredential)));
        assert!(api.calls().is_empty());
        assert_eq!(session.registry, registry_before);
    }

    #[tokio::test]
    async fn uploads_arriving_while_in_flight_are_cleared_with_the_batch() {
        let api = Arc::new(FakeAdminApi::accepting());
        let coordinator = SubmissionCoordinator::new(api);
        let mut session = filled_session(Some("tok"));

        let pending = coordinator.begin(&session).unwrap();
        assert_eq!(pending.payload().public_ids.len(), 2);
        session.registry.add(
            "https://x/late.jpg",
            "late",
            AssetMeta::Structured(sample_result("late", "https://x/late.jpg", "image")),
        );

        let outcome = pending.send().await;
        session.apply_submission(outcome).unwrap();
        assert!(session.registry.is_empty());
    }
}
