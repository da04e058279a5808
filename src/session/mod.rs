mod credential;
mod tagger;

#[cfg(test)]
pub use credential::MemoryTokenStore;
pub use credential::{BearerToken, FileTokenStore, TokenStore};
pub use tagger::{SessionStart, SessionTagger};

use crate::registry::AssetRegistry;
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Label attached to every upload of one visit, `papers-<epoch millis>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTag(String);

impl SessionTag {
    pub fn from_millis(epoch_millis: i64) -> Self {
        Self(format!("papers-{}", epoch_millis))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamKind {
    #[default]
    Cat1,
    Cat2,
    Fat,
}

impl ExamKind {
    pub const ALL: [ExamKind; 3] = [ExamKind::Cat1, ExamKind::Cat2, ExamKind::Fat];

    pub fn label(&self) -> &'static str {
        match self {
            ExamKind::Cat1 => "CAT1",
            ExamKind::Cat2 => "CAT2",
            ExamKind::Fat => "FAT",
        }
    }
}

/// Exam metadata typed in by the operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaperForm {
    pub subject: String,
    pub slot: String,
    pub year: String,
    pub exam: ExamKind,
    pub is_pdf: bool,
}

/// Everything one admin visit works on. Coordinators receive it explicitly;
/// nothing is read from ambient storage after startup.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct AdminSession {
    #[derivative(Debug = "ignore")]
    token: Option<BearerToken>,
    tag: SessionTag,
    pub form: PaperForm,
    pub registry: AssetRegistry,
    pub error_message: Option<String>,
    pub(crate) pending_deletions: HashSet<String>,
}

impl AdminSession {
    pub fn new(token: Option<BearerToken>, tag: SessionTag) -> Self {
        Self {
            token,
            tag,
            form: PaperForm::default(),
            registry: AssetRegistry::new(),
            error_message: None,
            pending_deletions: HashSet::new(),
        }
    }

    pub fn token(&self) -> Option<&BearerToken> {
        self.token.as_ref()
    }

    pub fn tag(&self) -> &SessionTag {
        &self.tag
    }

    pub fn is_deleting(&self, public_id: &str) -> bool {
        self.pending_deletions.contains(public_id)
    }

    /// Empty the registry and the exam fields together. `is_pdf` and the
    /// tag survive.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.form.subject.clear();
        self.form.slot.clear();
        self.form.year.clear();
        self.form.exam = ExamKind::default();
    }
}
