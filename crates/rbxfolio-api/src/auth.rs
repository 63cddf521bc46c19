// Anti-forgery session
//
// Holds the rotating CSRF token shared by every request in the process.
// Upstream hands a fresh token out in a response header of any rejected
// write, so a priming POST to the logout endpoint yields one without
// side effects. Reads are lock-free; refreshes are serialized and
// coalesced by generation.

use std::sync::Arc;

use arc_swap::ArcSwap;
use reqwest::header::HeaderName;
use tokio::sync::Mutex;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;

/// Header carrying the anti-forgery token, both directions.
pub const DEFAULT_TOKEN_HEADER: &str = "x-csrf-token";

/// A point-in-time view of the session token.
///
/// `generation` increases by one on every successful upstream refresh.
/// Callers remember the generation they sent with so a later refresh
/// request can tell whether someone else already rotated the token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSnapshot {
    pub value: Option<String>,
    pub generation: u64,
}

/// Owner of the process-wide anti-forgery token.
pub struct AuthSession {
    http: reqwest::Client,
    token_url: Url,
    header: HeaderName,
    state: ArcSwap<TokenSnapshot>,
    /// Held for the duration of an upstream refresh.
    refresh_lock: Mutex<()>,
}

impl AuthSession {
    /// Create a session that primes against `token_url`.
    ///
    /// No request is made until the first refresh.
    pub fn new(http: reqwest::Client, token_url: Url) -> Self {
        Self {
            http,
            token_url,
            header: HeaderName::from_static(DEFAULT_TOKEN_HEADER),
            state: ArcSwap::from_pointee(TokenSnapshot::default()),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Use a different token header name.
    pub fn with_header_name(mut self, header: &str) -> Result<Self, Error> {
        self.header = HeaderName::try_from(header).map_err(|e| Error::Auth {
            message: format!("invalid token header name {header:?}: {e}"),
        })?;
        Ok(self)
    }

    /// Seed the session with a known token (generation stays at 0).
    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.state.store(Arc::new(TokenSnapshot {
            value: Some(token.into()),
            generation: 0,
        }));
        self
    }

    /// The header name the token travels in.
    pub fn header_name(&self) -> &HeaderName {
        &self.header
    }

    /// The last known token, `None` before the first refresh.
    pub fn current_token(&self) -> Option<String> {
        self.state.load().value.clone()
    }

    /// Token and generation, read atomically.
    pub fn snapshot(&self) -> Arc<TokenSnapshot> {
        self.state.load_full()
    }

    /// Number of successful upstream refreshes so far.
    pub fn generation(&self) -> u64 {
        self.state.load().generation
    }

    /// Obtain a fresh token from upstream.
    ///
    /// Concurrent calls collapse into a single priming request; late
    /// arrivals receive the token the first caller fetched.
    pub async fn refresh(&self) -> Result<String, Error> {
        let observed = self.generation();
        self.refresh_if_stale(observed).await
    }

    /// Refresh unless the token already rotated past `observed`.
    ///
    /// This is the single-flight primitive: a caller whose request was
    /// rejected passes the generation it sent with. If another task has
    /// refreshed in the meantime the stored token is returned as-is.
    pub async fn refresh_if_stale(&self, observed: u64) -> Result<String, Error> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.state.load_full();
        if current.generation != observed {
            if let Some(ref token) = current.value {
                trace!(
                    generation = current.generation,
                    "token already rotated by another task"
                );
                return Ok(token.clone());
            }
        }

        let token = self.fetch_token().await?;
        let generation = current.generation + 1;
        self.state.store(Arc::new(TokenSnapshot {
            value: Some(token.clone()),
            generation,
        }));
        debug!(generation, "anti-forgery token refreshed");
        Ok(token)
    }

    /// Issue the priming request and pull the token out of its headers.
    ///
    /// The response status is irrelevant: upstream answers 403 and still
    /// carries the header.
    async fn fetch_token(&self) -> Result<String, Error> {
        debug!("priming anti-forgery token at {}", self.token_url);

        let resp = self
            .http
            .post(self.token_url.clone())
            .send()
            .await
            .map_err(|e| Error::Auth {
                message: format!("priming request failed: {e}"),
            })?;

        let status = resp.status();
        resp.headers()
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(String::from)
            .ok_or_else(|| Error::Auth {
                message: format!(
                    "priming response (HTTP {status}) carried no {} header",
                    self.header
                ),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn session() -> AuthSession {
        AuthSession::new(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:9/v2/logout").unwrap(),
        )
    }

    #[test]
    fn empty_before_first_refresh() {
        let session = session();
        assert_eq!(session.current_token(), None);
        assert_eq!(session.generation(), 0);
        assert_eq!(session.header_name().as_str(), DEFAULT_TOKEN_HEADER);
    }

    #[test]
    fn seeded_token_is_visible() {
        let session = session().with_token("seed");
        assert_eq!(session.current_token().as_deref(), Some("seed"));
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn rejects_invalid_header_name() {
        assert!(matches!(
            session().with_header_name("bad header"),
            Err(Error::Auth { .. })
        ));
    }
}
