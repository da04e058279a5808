//! Uploaded assets of the current session, in display order.
//!
//! Every entry keeps its url, public id and metadata together, so the url,
//! id and asset views always have the same length and line up per index.

use crate::upload::UploadResult;

/// Metadata recorded for an asset. `Raw` holds a result payload that was
/// not a structured object; such entries can never be targeted for removal.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetMeta {
    Structured(UploadResult),
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetRecord {
    pub url: String,
    pub public_id: String,
    pub meta: AssetMeta,
}

impl AssetRecord {
    pub fn is_pdf(&self) -> bool {
        self.url.to_lowercase().ends_with(".pdf")
    }

    /// Resource kind used by the delete endpoint, if known.
    pub fn kind(&self) -> Option<&str> {
        match &self.meta {
            AssetMeta::Structured(result) => Some(result.kind.as_str()),
            AssetMeta::Raw(_) => None,
        }
    }

    fn is_structured(&self) -> bool {
        matches!(self.meta, AssetMeta::Structured(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetRegistry {
    entries: Vec<AssetRecord>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one asset. Duplicate ids are accepted.
    pub fn add(&mut self, url: impl Into<String>, public_id: impl Into<String>, meta: AssetMeta) {
        self.entries.push(AssetRecord {
            url: url.into(),
            public_id: public_id.into(),
            meta,
        });
    }

    /// Remove every structured entry whose id equals `public_id`.
    /// Returns how many entries were dropped.
    pub fn remove(&mut self, public_id: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !(entry.is_structured() && entry.public_id == public_id));
        before - self.entries.len()
    }

    /// Remove every structured entry whose url equals `url`.
    pub fn remove_url(&mut self, url: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !(entry.is_structured() && entry.url == url));
        before - self.entries.len()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, public_id: &str) -> bool {
        self.entries.iter().any(|entry| entry.public_id == public_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetRecord> {
        self.entries.iter()
    }

    pub fn urls(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.url.clone()).collect()
    }

    pub fn public_ids(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.public_id.clone())
            .collect()
    }

    pub fn assets(&self) -> Vec<&AssetMeta> {
        self.entries.iter().map(|entry| &entry.meta).collect()
    }
}

#[cfg(test)]
pub(crate) fn sample_result(public_id: &str, url: &str, kind: &str) -> UploadResult {
    UploadResult {
        public_id: public_id.to_string(),
        url: url.to_string(),
        kind: kind.to_string(),
        resource_type: None,
        format: None,
        original_filename: None,
        bytes: None,
        extra: serde_json::Map::new(),
    }
}
