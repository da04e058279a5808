use super::{AdminApi, ApiError, BatchPayload, BatchResponse, PdfFile};
use crate::session::BearerToken;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateBatch { token: String, payload: BatchPayload },
    DeleteAsset { token: String, public_id: String, kind: String },
    Watermark { file: String },
    DeleteWatermark,
}

/// How the fake answers every request.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Ok { batch_status: bool },
    Status(u16),
}

pub struct FakeAdminApi {
    reply: Reply,
    calls: Mutex<Vec<Call>>,
}

impl FakeAdminApi {
    pub fn accepting() -> Self {
        Self::with_reply(Reply::Ok { batch_status: true })
    }

    pub fn rejecting_batches() -> Self {
        Self::with_reply(Reply::Ok {
            batch_status: false,
        })
    }

    pub fn failing(status: u16) -> Self {
        Self::with_reply(Reply::Status(status))
    }

    pub fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn answer(&self) -> Result<bool, ApiError> {
        match self.reply {
            Reply::Ok { batch_status } => Ok(batch_status),
            Reply::Status(code) => Err(ApiError::Status(
                StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            )),
        }
    }
}

#[async_trait]
impl AdminApi for FakeAdminApi {
    async fn create_batch(
        &self,
        token: &BearerToken,
        payload: &BatchPayload,
    ) -> Result<BatchResponse, ApiError> {
        self.record(Call::CreateBatch {
            token: token.as_str().to_string(),
            payload: payload.clone(),
        });
        self.answer().map(|status| BatchResponse { status })
    }

    async fn delete_asset(
        &self,
        token: &BearerToken,
        public_id: &str,
        kind: &str,
    ) -> Result<(), ApiError> {
        self.record(Call::DeleteAsset {
            token: token.as_str().to_string(),
            public_id: public_id.to_string(),
            kind: kind.to_string(),
        });
        self.answer().map(|_| ())
    }

    async fn watermark_pdf(&self, file: PdfFile) -> Result<(), ApiError> {
        self.record(Call::Watermark { file: file.name });
        self.answer().map(|_| ())
    }

    async fn delete_watermark(&self) -> Result<(), ApiError> {
        self.record(Call::DeleteWatermark);
        self.answer().map(|_| ())
    }
}
