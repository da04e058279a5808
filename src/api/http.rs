use super::{AdminApi, ApiError, BatchPayload, BatchResponse, PdfFile};
use crate::config::AppConfig;
use crate::session::BearerToken;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use tracing::debug;

/// `reqwest` client for the admin backend.
#[derive(Clone)]
pub struct HttpAdminApi {
    client: Client,
    admin_url: String,
    watermark_url: String,
}

impl HttpAdminApi {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            admin_url: config.admin_url(),
            watermark_url: config.watermark_url(),
        }
    }

    #[cfg(test)]
    fn with_client(config: &AppConfig, client: Client) -> Self {
        Self {
            client,
            ..Self::new(config)
        }
    }

    fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(ApiError::Status(status))
        }
    }
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn create_batch(
        &self,
        token: &BearerToken,
        payload: &BatchPayload,
    ) -> Result<BatchResponse, ApiError> {
        debug!(assets = payload.public_ids.len(), "POST {}", self.admin_url);
        let response = self
            .client
            .post(&self.admin_url)
            .bearer_auth(token.as_str())
            .json(payload)
            .send()
            .await?;

        Self::check_status(response)?
            .json::<BatchResponse>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn delete_asset(
        &self,
        token: &BearerToken,
        public_id: &str,
        kind: &str,
    ) -> Result<(), ApiError> {
        debug!(public_id, kind, "DELETE {}", self.admin_url);
        let response = self
            .client
            .delete(&self.admin_url)
            .query(&[("public_id", public_id), ("type", kind)])
            .bearer_auth(token.as_str())
            .send()
            .await?;

        Self::check_status(response)?;
        Ok(())
    }

    async fn watermark_pdf(&self, file: PdfFile) -> Result<(), ApiError> {
        debug!(file = %file.name, "POST {}", self.watermark_url);
        let part = Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.watermark_url)
            .multipart(form)
            .send()
            .await?;

        Self::check_status(response)?;
        Ok(())
    }

    async fn delete_watermark(&self) -> Result<(), ApiError> {
        debug!("DELETE {}", self.watermark_url);
        let response = self.client.delete(&self.watermark_url).send().await?;

        Self::check_status(response)?;
        Ok(())
    }
}
