use crate::config::AppConfig;
use crate::session::SessionTag;
use crate::upload::types::WidgetEvent;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::path::Path;
use std::sync::mpsc::Sender;
use tracing::{debug, warn};

const SUPPORTED_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "webp", "gif", "heic", "bmp", "pdf"];

/// Performs the physical transfer of one file to the asset host with an
/// unsigned preset and reports the result as widget events.
#[derive(Clone)]
pub struct AssetHostClient {
    client: Client,
    upload_url: String,
    upload_preset: String,
}

impl AssetHostClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            upload_url: config.asset_host_upload_url(),
            upload_preset: config.upload_preset.clone(),
        }
    }

    /// Every call emits `Started` followed by exactly one `Success` or
    /// `Failure`, whatever the path looks like.
    pub async fn upload_file<E>(
        &self,
        file_path: &Path,
        tag: &SessionTag,
        events: &Sender<E>,
    ) -> Result<(), String>
    where
        E: From<WidgetEvent>,
    {
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_path.display().to_string());

        events
            .send(
                WidgetEvent::Started {
                    file: file_name.clone(),
                }
                .into(),
            )
            .unwrap_or_default();

        let result = self.transfer(file_path, &file_name, tag).await;
        let event = match &result {
            Ok(payload) => WidgetEvent::Success {
                file: file_name,
                payload: payload.clone(),
            },
            Err(reason) => {
                warn!(file = %file_name, reason = %reason, "Upload to asset host failed");
                WidgetEvent::Failure {
                    file: file_name,
                    reason: reason.clone(),
                }
            }
        };
        events.send(event.into()).unwrap_or_default();

        result.map(|_| ())
    }

    async fn transfer(
        &self,
        file_path: &Path,
        file_name: &str,
        tag: &SessionTag,
    ) -> Result<serde_json::Value, String> {
        if !Self::is_supported_file(file_path) {
            return Err("Unsupported file type".to_string());
        }

        let content = tokio::fs::read(file_path)
            .await
            .map_err(|e| format!("Failed to read file: {}", e))?;

        let form = Form::new()
            .part("file", Part::bytes(content).file_name(file_name.to_string()))
            .text("upload_preset", self.upload_preset.clone())
            .text("tags", tag.as_str().to_string());

        debug!(file = %file_name, tag = %tag, "POST {}", self.upload_url);
        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("Failed to send request: {}", e))?;

        match response.status().as_u16() {
            200 | 201 => response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| format!("Failed to parse upload response: {}", e)),
            400 => Err("Rejected by the asset host (check the upload preset)".to_string()),
            401 | 403 => Err("Upload preset is not allowed for unsigned uploads".to_string()),
            status_code => Err(format!("Upload failed with status: {}", status_code)),
        }
    }

    pub fn is_supported_file(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn only_images_and_pdfs_are_accepted() {
        assert!(AssetHostClient::is_supported_file(Path::new("scan.JPG")));
        assert!(AssetHostClient::is_supported_file(Path::new("dir/paper.pdf")));
        assert!(!AssetHostClient::is_supported_file(Path::new("notes.docx")));
        assert!(!AssetHostClient::is_supported_file(Path::new("README")));
    }

    #[tokio::test]
    async fn unsupported_file_reports_failure_without_network() {
        let client = AssetHostClient::new(&AppConfig::for_tests("http://127.0.0.1:9"));
        let (sender, receiver) = mpsc::channel();

        let result = client
            .upload_file(
                Path::new("notes.docx"),
                &SessionTag::from_millis(1),
                &sender,
            )
            .await;

        assert_eq!(result, Err("Unsupported file type".to_string()));
        let events: Vec<WidgetEvent> = receiver.try_iter().collect();
        assert!(matches!(&events[0], WidgetEvent::Started { file } if file == "notes.docx"));
        assert!(
            matches!(&events[1], WidgetEvent::Failure { reason, .. } if reason == "Unsupported file type")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_utf8_file_name_still_reports_start_and_failure() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let client = AssetHostClient::new(&AppConfig::for_tests("http://127.0.0.1:9"));
        let (sender, receiver) = mpsc::channel();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OsStr::from_bytes(b"pap\xffer.jpg"));

        let result = client
            .upload_file(&path, &SessionTag::from_millis(1), &sender)
            .await;

        assert!(result.is_err());
        let events: Vec<WidgetEvent> = receiver.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], WidgetEvent::Started { file } if file == "pap\u{FFFD}er.jpg"));
        assert!(
            matches!(&events[1], WidgetEvent::Failure { file, reason } if file == "pap\u{FFFD}er.jpg" && reason.starts_with("Failed to read file"))
        );
    }
}
