use super::credential::{BearerToken, TokenStore};
use super::SessionTag;
use tracing::{error, info};

/// Result of the mount-time check.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStart {
    Ready { token: BearerToken, tag: SessionTag },
    /// No token: the operator has to go through the login screen.
    Redirect,
}

pub struct SessionTagger;

impl SessionTagger {
    pub fn initialize(store: &dyn TokenStore) -> SessionStart {
        Self::initialize_at(store, chrono::Utc::now().timestamp_millis())
    }

    pub fn initialize_at(store: &dyn TokenStore, epoch_millis: i64) -> SessionStart {
        let token = match store.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                error!("Token not found in local storage, redirecting to login");
                return SessionStart::Redirect;
            }
            Err(e) => {
                error!(error = %e, "Failed to read stored token, redirecting to login");
                return SessionStart::Redirect;
            }
        };

        let tag = SessionTag::from_millis(epoch_millis);
        info!(tag = %tag, "Upload session ready");
        SessionStart::Ready { token, tag }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryTokenStore;

    #[test]
    fn missing_token_redirects() {
        let store = MemoryTokenStore::default();
        assert_eq!(SessionTagger::initialize_at(&store, 1), SessionStart::Redirect);
    }

    #[test]
    fn tag_is_derived_from_the_timestamp() {
        let store = MemoryTokenStore::with_token("tok");
        match SessionTagger::initialize_at(&store, 1_700_000_000_123) {
            SessionStart::Ready { token, tag } => {
                assert_eq!(token.as_str(), "tok");
                assert_eq!(tag.as_str(), "papers-1700000000123");
            }
            SessionStart::Redirect => panic!("expected a ready session"),
        }
    }

    #[test]
    fn live_clock_produces_a_papers_tag() {
        let store = MemoryTokenStore::with_token("tok");
        let SessionStart::Ready { tag, .. } = SessionTagger::initialize(&store) else {
            panic!("expected a ready session");
        };
        let millis = tag.as_str().strip_prefix("papers-").unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
    }
}
