use serde::{Deserialize, Serialize};

/// Result payload the asset host returns for one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub public_id: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Events published by the upload widget, one per picked file.
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    Started { file: String },
    Success { file: String, payload: serde_json::Value },
    Failure { file: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadStatus {
    Processing,
    Success,
    Error(String),
}

/// Per-file line shown in the widget panel.
#[derive(Debug, Clone)]
pub struct FileStatus {
    pub name: String,
    pub status: UploadStatus,
}
