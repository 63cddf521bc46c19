// Resilient request execution
//
// Every upstream call goes through one retry loop: classify the response,
// refresh the anti-forgery token on rejection, back off on rate limits and
// server faults, fail fast on every other client error.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::auth::AuthSession;
use crate::error::Error;

/// Body fragment upstream uses to signal a missing or stale token.
pub const DEFAULT_REJECTION_MARKER: &str = "Token Validation Failed";

const BODY_PREVIEW_CHARS: usize = 200;

// ── Retry policy ────────────────────────────────────────────────────

/// Attempt budget and backoff for one `execute` call.
///
/// The delay before retry `n` (1-based) is `base_delay × n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries beyond the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `retry`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(retry)
    }

    /// Total number of times a request may be sent.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

// ── Request description ─────────────────────────────────────────────

/// A replayable description of one upstream request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: Url,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    authenticated: bool,
}

impl ApiRequest {
    /// An unauthenticated GET.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            query: Vec::new(),
            body: None,
            authenticated: false,
        }
    }

    /// A POST with a JSON body. Writes need the anti-forgery token, so the
    /// request is marked authenticated.
    pub fn post_json(url: Url, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            url,
            query: Vec::new(),
            body: Some(body),
            authenticated: true,
        }
    }

    /// Append a query parameter. Empty values are sent as `key=`.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

// ── Response classification ─────────────────────────────────────────

/// How the retry loop treats a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    /// 401/403 carrying the rejection marker: refresh the token and resend.
    TokenRejected,
    RateLimited,
    /// Any other non-success below 500. Terminal.
    ClientError,
    ServerError,
}

/// Classify a response by status and body.
pub fn classify(status: StatusCode, body: &str, rejection_marker: &str) -> ResponseClass {
    if status.is_success() {
        ResponseClass::Success
    } else if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        && body.contains(rejection_marker)
    {
        ResponseClass::TokenRejected
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        ResponseClass::RateLimited
    } else if status.is_server_error() {
        ResponseClass::ServerError
    } else {
        ResponseClass::ClientError
    }
}

// ── Client ──────────────────────────────────────────────────────────

enum Attempt {
    Done(String),
    /// Token rejected; carries the token generation the request was sent with.
    Rejected { generation: u64 },
    Failed(Error),
}

/// HTTP client with bounded retry and transparent token refresh.
///
/// Cheap to share behind an `Arc`; the only mutable state is the token
/// inside the [`AuthSession`].
pub struct ResilientClient {
    http: reqwest::Client,
    auth: Arc<AuthSession>,
    policy: RetryPolicy,
    rejection_marker: String,
}

impl ResilientClient {
    pub fn new(http: reqwest::Client, auth: Arc<AuthSession>) -> Self {
        Self {
            http,
            auth,
            policy: RetryPolicy::default(),
            rejection_marker: DEFAULT_REJECTION_MARKER.into(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_rejection_marker(mut self, marker: impl Into<String>) -> Self {
        self.rejection_marker = marker.into();
        self
    }

    /// The shared anti-forgery session.
    pub fn auth(&self) -> &Arc<AuthSession> {
        &self.auth
    }

    /// The default retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send `request` under the default policy and decode the JSON body.
    pub async fn execute<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, Error> {
        self.execute_with(request, &self.policy).await
    }

    /// Send `request` under `policy` and decode the JSON body.
    ///
    /// Retryable failures are absorbed until the budget runs out, then
    /// surface as [`Error::ExhaustedRetries`]. Token rejections consume an
    /// attempt but skip the backoff.
    pub async fn execute_with<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        policy: &RetryPolicy,
    ) -> Result<T, Error> {
        let mut retry: u32 = 0;

        loop {
            let err = match self.attempt(request).await {
                Attempt::Done(body) => return decode(&body),
                Attempt::Rejected { generation } => {
                    if retry >= policy.max_retries {
                        return Err(exhausted(
                            retry,
                            Error::Auth {
                                message: "anti-forgery token rejected".into(),
                            },
                        ));
                    }
                    debug!(url = %request.url, generation, "token rejected, refreshing");
                    self.auth.refresh_if_stale(generation).await?;
                    retry += 1;
                    continue;
                }
                Attempt::Failed(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }
            if retry >= policy.max_retries {
                return Err(exhausted(retry, err));
            }

            retry += 1;
            let delay = policy.delay_for(retry);
            warn!(
                url = %request.url,
                retry,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "retrying upstream request"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// One send: attach the token, send, read the body, classify.
    async fn attempt(&self, request: &ApiRequest) -> Attempt {
        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let mut generation = 0;
        if request.authenticated {
            let mut snapshot = self.auth.snapshot();
            if snapshot.value.is_none() {
                if let Err(e) = self.auth.refresh_if_stale(snapshot.generation).await {
                    return Attempt::Failed(e);
                }
                snapshot = self.auth.snapshot();
            }
            generation = snapshot.generation;
            if let Some(ref token) = snapshot.value {
                builder = builder.header(self.auth.header_name().clone(), token.as_str());
            }
        }

        debug!("{} {}", request.method, request.url);

        let resp = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => return Attempt::Failed(Error::Transport(e)),
        };
        let status = resp.status();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => return Attempt::Failed(Error::Transport(e)),
        };

        match classify(status, &body, &self.rejection_marker) {
            ResponseClass::Success => Attempt::Done(body),
            ResponseClass::TokenRejected if request.authenticated => {
                Attempt::Rejected { generation }
            }
            ResponseClass::TokenRejected | ResponseClass::ClientError => {
                Attempt::Failed(Error::Client {
                    status: status.as_u16(),
                    message: preview(&body),
                })
            }
            ResponseClass::RateLimited => Attempt::Failed(Error::RateLimited),
            ResponseClass::ServerError => Attempt::Failed(Error::Server {
                status: status.as_u16(),
                message: preview(&body),
            }),
        }
    }
}

/// Terminal error after `retries` retries; the first attempt counts too.
fn exhausted(retries: u32, last: Error) -> Error {
    Error::ExhaustedRetries {
        attempts: retries.saturating_add(1),
        last: Box::new(last),
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
