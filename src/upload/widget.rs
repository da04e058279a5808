use super::asset_host::AssetHostClient;
use super::types::{FileStatus, UploadResult, UploadStatus, WidgetEvent};
use crate::registry::{AssetMeta, AssetRegistry};
use crate::session::SessionTag;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadSource {
    Camera,
    Local,
}

impl UploadSource {
    /// The desktop picker can only serve files from disk.
    pub fn is_available(&self) -> bool {
        matches!(self, UploadSource::Local)
    }
}

/// Options the widget is configured with for one page session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetOptions {
    #[serde(skip)]
    pub upload_preset: String,
    pub sources: Vec<UploadSource>,
    pub multiple: bool,
    pub cropping: bool,
    pub single_upload_auto_close: bool,
    pub max_files: usize,
    pub tags: Vec<String>,
}

impl WidgetOptions {
    pub fn for_session(upload_preset: &str, max_files: usize, tag: &SessionTag) -> Self {
        Self {
            upload_preset: upload_preset.to_string(),
            sources: vec![UploadSource::Camera, UploadSource::Local],
            multiple: false,
            cropping: true,
            single_upload_auto_close: false,
            max_files,
            tags: vec![tag.as_str().to_string()],
        }
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum WidgetError {
    #[error("The upload widget is not open")]
    Closed,

    #[error("At most {0} files can be uploaded per widget session")]
    LimitReached(usize),
}

/// Wraps the asset-host upload into the widget contract: files are picked
/// one at a time, each transfer runs on the runtime, and every successful
/// result is forwarded to the registry in arrival order.
pub struct UploadWidgetAdapter {
    options: WidgetOptions,
    tag: SessionTag,
    host: Arc<AssetHostClient>,
    is_open: bool,
    started: usize,
    uploading: usize,
    pub file_statuses: Vec<FileStatus>,
}

impl UploadWidgetAdapter {
    pub fn new(options: WidgetOptions, tag: SessionTag, host: Arc<AssetHostClient>) -> Self {
        Self {
            options,
            tag,
            host,
            is_open: false,
            started: 0,
            uploading: 0,
            file_statuses: Vec::new(),
        }
    }

    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn open(&mut self) {
        info!(tag = %self.tag, preset = %self.options.upload_preset, "Opening upload widget");
        self.is_open = true;
        self.started = 0;
        self.file_statuses.clear();
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn remaining(&self) -> usize {
        self.options.max_files.saturating_sub(self.started)
    }

    /// Transfers spawned by this widget that have not reported back yet.
    /// Survives reopening, unlike the per-open counter.
    pub fn is_uploading(&self) -> bool {
        self.uploading > 0
    }

    pub fn can_pick(&self) -> bool {
        self.is_open && self.remaining() > 0
    }

    /// Reserve a slot for one file. Split from `start_upload` so the limit
    /// is checked before the transfer is spawned.
    pub fn reserve(&mut self) -> Result<(), WidgetError> {
        if !self.is_open {
            return Err(WidgetError::Closed);
        }
        if self.remaining() == 0 {
            return Err(WidgetError::LimitReached(self.options.max_files));
        }
        self.started += 1;
        Ok(())
    }

    /// Spawn the transfer for one picked file. Progress is reported on
    /// `events`, which may be any channel whose item wraps a `WidgetEvent`.
    pub fn start_upload<E>(
        &mut self,
        path: PathBuf,
        runtime: &Handle,
        events: Sender<E>,
    ) -> Result<(), WidgetError>
    where
        E: From<WidgetEvent> + Send + 'static,
    {
        self.reserve()?;

        self.uploading += 1;
        let host = Arc::clone(&self.host);
        let tag = self.tag.clone();
        runtime.spawn(async move {
            if let Err(reason) = host.upload_file(&path, &tag, &events).await {
                debug!(path = %path.display(), reason = %reason, "Upload task ended with an error");
            }
        });
        Ok(())
    }

    /// Apply one widget event. Only successes touch the registry.
    pub fn handle_event(&mut self, event: WidgetEvent, registry: &mut AssetRegistry) {
        match event {
            WidgetEvent::Started { file } => {
                self.file_statuses.push(FileStatus {
                    name: file,
                    status: UploadStatus::Processing,
                });
            }
            WidgetEvent::Success { file, payload } => {
                self.uploading = self.uploading.saturating_sub(1);
                self.settle(&file, UploadStatus::Success);
                Self::on_success(payload, registry);
                if self.options.single_upload_auto_close {
                    self.close();
                }
            }
            WidgetEvent::Failure { file, reason } => {
                self.uploading = self.uploading.saturating_sub(1);
                self.settle(&file, UploadStatus::Error(reason));
            }
        }
    }

    fn settle(&mut self, name: &str, status: UploadStatus) {
        let pending = self
            .file_statuses
            .iter_mut()
            .find(|s| s.status == UploadStatus::Processing && s.name == name);
        match pending {
            Some(entry) => entry.status = status,
            None => self.file_statuses.push(FileStatus {
                name: name.to_string(),
                status,
            }),
        }
    }

    /// Extract url and id from a success payload and append it.
    pub fn on_success(payload: Value, registry: &mut AssetRegistry) {
        let url = payload
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let public_id = payload
            .get("public_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let meta = match payload {
            Value::String(raw) => AssetMeta::Raw(raw),
            other => match serde_json::from_value::<UploadResult>(other.clone()) {
                Ok(result) => AssetMeta::Structured(result),
                Err(e) => {
                    warn!(error = %e, "Upload result is not a structured asset");
                    AssetMeta::Raw(other.to_string())
                }
            },
        };

        info!(public_id = %public_id, url = %url, "Asset uploaded");
        registry.add(url, public_id, meta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use serde_json::json;

    fn adapter(max_files: usize) -> UploadWidgetAdapter {
        let tag = SessionTag::from_millis(99);
        let options = WidgetOptions::for_session("papers-unsigned", max_files, &tag);
        let host = Arc::new(AssetHostClient::new(&AppConfig::for_tests("http://127.0.0.1:9")));
        UploadWidgetAdapter::new(options, tag, host)
    }

    fn success(public_id: &str, url: &str) -> WidgetEvent {
        let payload = json!({
            "public_id": public_id,
            "url": url,
            "type": "upload",
            "resource_type": "image",
            "format": "jpg",
            "original_filename": public_id,
            "bytes": 1024,
            "tags": ["papers-99"],
        });
        WidgetEvent::Success {
            file: format!("{}.jpg", public_id),
            payload,
        }
    }

    #[test]
    fn options_carry_the_session_tag() {
        let options = WidgetOptions::for_session("papers-unsigned", 5, &SessionTag::from_millis(99));
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({
                "sources": ["camera", "local"],
                "multiple": false,
                "cropping": true,
                "singleUploadAutoClose": false,
                "maxFiles": 5,
                "tags": ["papers-99"],
            })
        );
    }

    #[test]
    fn successes_are_applied_in_arrival_order() {
        let mut widget = adapter(5);
        let mut registry = AssetRegistry::new();

        widget.handle_event(success("p1", "https://x/img1.jpg"), &mut registry);
        widget.handle_event(success("p2", "https://x/doc1.pdf"), &mut registry);
        widget.handle_event(success("p1", "https://x/img1.jpg"), &mut registry);

        assert_eq!(registry.public_ids(), vec!["p1", "p2", "p1"]);
        let first = registry.iter().next().unwrap();
        let AssetMeta::Structured(result) = &first.meta else {
            panic!("expected structured metadata");
        };
        assert_eq!(result.kind, "upload");
        assert_eq!(result.bytes, Some(1024));
        assert_eq!(result.extra.get("tags"), Some(&json!(["papers-99"])));
    }

    #[test]
    fn failures_do_not_touch_the_registry() {
        let mut widget = adapter(5);
        let mut registry = AssetRegistry::new();

        widget.handle_event(
            WidgetEvent::Started {
                file: "bad.docx".to_string(),
            },
            &mut registry,
        );
        widget.handle_event(
            WidgetEvent::Failure {
                file: "bad.docx".to_string(),
                reason: "Unsupported file type".to_string(),
            },
            &mut registry,
        );

        assert!(registry.is_empty());
        assert_eq!(widget.file_statuses.len(), 1);
        assert_eq!(
            widget.file_statuses[0].status,
            UploadStatus::Error("Unsupported file type".to_string())
        );
    }

    #[test]
    fn string_payload_is_recorded_raw() {
        let mut registry = AssetRegistry::new();
        UploadWidgetAdapter::on_success(Value::String("hidden".to_string()), &mut registry);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.assets(), vec![&AssetMeta::Raw("hidden".to_string())]);
        assert_eq!(registry.public_ids(), vec![""]);
    }

    #[test]
    fn limit_is_per_widget_session() {
        let mut widget = adapter(2);
        assert_eq!(widget.reserve(), Err(WidgetError::Closed));

        widget.open();
        assert!(widget.reserve().is_ok());
        assert!(widget.reserve().is_ok());
        assert_eq!(widget.reserve(), Err(WidgetError::LimitReached(2)));
        assert!(!widget.can_pick());

        widget.close();
        widget.open();
        assert_eq!(widget.remaining(), 2);
    }

    #[test]
    fn widget_stays_open_after_a_success() {
        let mut widget = adapter(5);
        let mut registry = AssetRegistry::new();
        widget.open();
        widget.handle_event(success("p1", "https://x/1.jpg"), &mut registry);
        assert!(widget.is_open());
    }
}
