use super::AdminError;
use crate::api::{AdminApi, ApiError};
use crate::registry::AssetRecord;
use crate::session::{AdminSession, BearerToken};
use std::sync::Arc;
use tracing::{error, info};

/// What the operator clicked on.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteTarget {
    pub public_id: String,
    pub kind: String,
    pub url: String,
}

impl DeleteTarget {
    /// Raw entries carry no resource kind and cannot be deleted.
    pub fn from_record(record: &AssetRecord) -> Option<Self> {
        record.kind().map(|kind| Self {
            public_id: record.public_id.clone(),
            kind: kind.to_string(),
            url: record.url.clone(),
        })
    }
}

#[derive(Debug)]
pub enum DeletionOutcome {
    /// The backend answered; the response body is not inspected.
    Removed(DeleteTarget),
    Failed { target: DeleteTarget, error: ApiError },
}

pub struct DeletionCoordinator {
    api: Arc<dyn AdminApi>,
}

impl DeletionCoordinator {
    pub fn new(api: Arc<dyn AdminApi>) -> Self {
        Self { api }
    }

    pub fn begin(
        &self,
        session: &mut AdminSession,
        target: DeleteTarget,
    ) -> Result<PendingDeletion, AdminError> {
        let Some(token) = session.token().cloned() else {
            error!(public_id = %target.public_id, "Token not found, delete aborted");
            return Err(AdminError::MissingCredential);
        };

        session.pending_deletions.insert(target.public_id.clone());
        Ok(PendingDeletion {
            api: Arc::clone(&self.api),
            token,
            target,
        })
    }

    #[cfg(test)]
    pub async fn delete_asset(
        &self,
        session: &mut AdminSession,
        target: DeleteTarget,
    ) -> Result<(), AdminError> {
        let pending = self.begin(session, target)?;
        let outcome = pending.send().await;
        session.apply_deletion(outcome)
    }
}

pub struct PendingDeletion {
    api: Arc<dyn AdminApi>,
    token: BearerToken,
    target: DeleteTarget,
}

impl PendingDeletion {
    pub fn target(&self) -> &DeleteTarget {
        &self.target
    }

    pub async fn send(self) -> DeletionOutcome {
        match self
            .api
            .delete_asset(&self.token, &self.target.public_id, &self.target.kind)
            .await
        {
            Ok(()) => DeletionOutcome::Removed(self.target),
            Err(error) => DeletionOutcome::Failed {
                target: self.target,
                error,
            },
        }
    }
}

impl AdminSession {
    pub fn apply_deletion(&mut self, outcome: DeletionOutcome) -> Result<(), AdminError> {
        match outcome {
            DeletionOutcome::Removed(target) => {
                self.pending_deletions.remove(&target.public_id);
                let by_id = self.registry.remove(&target.public_id);
                let by_url = self.registry.remove_url(&target.url);
                info!(
                    public_id = %target.public_id,
                    removed = by_id + by_url,
                    "Asset deleted"
                );
                Ok(())
            }
            DeletionOutcome::Failed { target, error } => {
                self.pending_deletions.remove(&target.public_id);
                error!(public_id = %target.public_id, error = %error, "Error deleting asset");
                self.error_message = Some(format!("Failed to delete asset {}.", target.public_id));
                Err(AdminError::Transport(error))
            }
        }
    }
}
