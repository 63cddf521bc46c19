// Shared transport configuration for building the reqwest::Client.
//
// Timeout, user agent and the optional session cookie live here so the
// auth session and the resilient client talk to upstream through the
// same connection pool.

use std::time::Duration;

use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Name of the Roblox session cookie.
pub const SESSION_COOKIE_NAME: &str = ".ROBLOSECURITY";

const DEFAULT_USER_AGENT: &str = concat!("rbxfolio/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout (connect + body).
    pub timeout: Duration,
    pub user_agent: String,
    /// Value of the `.ROBLOSECURITY` cookie, sent on every request.
    pub session_cookie: Option<SecretString>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.into(),
            session_cookie: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// The session cookie, when present, is installed as a sensitive
    /// default `Cookie` header so it never shows up in debug output.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        if let Some(ref cookie) = self.session_cookie {
            let mut value = HeaderValue::from_str(&format!(
                "{SESSION_COOKIE_NAME}={}",
                cookie.expose_secret()
            ))
            .map_err(|e| Error::Auth {
                message: format!("invalid session cookie value: {e}"),
            })?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)
    }

    /// Attach a session cookie.
    pub fn with_session_cookie(mut self, cookie: SecretString) -> Self {
        self.session_cookie = Some(cookie);
        self
    }
}
