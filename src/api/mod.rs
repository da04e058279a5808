mod http;
#[cfg(test)]
pub(crate) mod fake;

pub use http::HttpAdminApi;

use crate::session::{BearerToken, ExamKind};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to send request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request failed with status: {0}")]
    Status(StatusCode),

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

/// Body of the batch-create request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPayload {
    pub public_ids: Vec<String>,
    pub urls: Vec<String>,
    pub subject: String,
    pub slot: String,
    pub year: String,
    pub exam: ExamKind,
    pub is_pdf: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub status: bool,
}

/// A local PDF picked for the watermark flow, held in memory until sent.
#[derive(Clone, PartialEq)]
pub struct PdfFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl PdfFile {
    pub fn read(path: &Path) -> Result<Self, ApiError> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.pdf".to_string());
        Ok(Self { name, bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl std::fmt::Debug for PdfFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfFile")
            .field("name", &self.name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Admin backend endpoints used by the coordinators.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn create_batch(
        &self,
        token: &BearerToken,
        payload: &BatchPayload,
    ) -> Result<BatchResponse, ApiError>;

    /// Delete one asset. The response body carries no contract.
    async fn delete_asset(
        &self,
        token: &BearerToken,
        public_id: &str,
        kind: &str,
    ) -> Result<(), ApiError>;

    async fn watermark_pdf(&self, file: PdfFile) -> Result<(), ApiError>;

    async fn delete_watermark(&self) -> Result<(), ApiError>;
}
