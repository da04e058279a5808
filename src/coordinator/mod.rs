//! Operations that talk to the admin backend on behalf of a session.
//!
//! Each one is split in three steps so the UI thread stays the only writer:
//! `begin` checks preconditions and builds the request, `send` awaits the
//! backend without touching the session, and `AdminSession::apply_*` folds
//! the outcome back in.

mod deletion;
mod submission;
mod watermark;

pub use deletion::{DeleteTarget, DeletionCoordinator, DeletionOutcome, PendingDeletion};
pub use submission::{PendingSubmission, SubmissionCoordinator, SubmissionOutcome};
pub use watermark::{PendingWatermark, WatermarkAction, WatermarkOutcome, WatermarkUploader};

use crate::api::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Token not found in local storage")]
    MissingCredential,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Transport(#[from] ApiError),

    #[error("The server did not accept the batch")]
    Rejected,
}
