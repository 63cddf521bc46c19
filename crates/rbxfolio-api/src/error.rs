use thiserror::Error;

/// Top-level error type for the `rbxfolio-api` crate.
///
/// Covers every failure mode of the upstream surface: anti-forgery session,
/// HTTP classification, retry exhaustion, pagination, and decoding.
/// `rbxfolio-core` maps these into aggregation-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// No usable anti-forgery token could be obtained.
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ── HTTP classification ─────────────────────────────────────────
    /// Terminal 4xx from upstream. Never retried.
    #[error("Upstream rejected request (HTTP {status}): {message}")]
    Client { status: u16, message: String },

    /// HTTP 429. Retried with backoff until the budget runs out.
    #[error("Rate limited by upstream")]
    RateLimited,

    /// 5xx from upstream. Retried with backoff until the budget runs out.
    #[error("Upstream server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// A retryable condition persisted past the attempt budget.
    #[error("Gave up after {attempts} attempts: {last}")]
    ExhaustedRetries { attempts: u32, last: Box<Error> },

    // ── Pagination ──────────────────────────────────────────────────
    /// The cursor chain did not terminate within the page cap.
    #[error("Pagination did not terminate after {pages} pages")]
    CrawlOverrun { pages: usize },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the condition may clear up on its own and the
    /// request is worth sending again after a backoff.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited | Self::Server { .. } => true,
            Self::Transport(e) => !e.is_builder() && !e.is_decode(),
            _ => false,
        }
    }

    /// Returns `true` if upstream answered with 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Client { status: 404, .. })
    }

    /// HTTP status carried by this error, if upstream produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::RateLimited => Some(429),
            Self::ExhaustedRetries { last, .. } => last.status(),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
