mod asset_host;
mod types;
mod widget;

pub use asset_host::AssetHostClient;
pub use types::{FileStatus, UploadResult, UploadStatus, WidgetEvent};
pub use widget::{UploadSource, UploadWidgetAdapter, WidgetError, WidgetOptions};
