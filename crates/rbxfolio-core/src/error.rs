// ── Core error types ──
//
// Errors surfaced by an aggregation. Consumers never see raw HTTP
// classification; the `From<rbxfolio_api::Error>` impl folds transport-level
// failures into aggregation-level variants.

use std::time::Duration;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Resolution ───────────────────────────────────────────────────
    #[error("User not found: {identifier}")]
    NotFound { identifier: String },

    // ── Upstream ─────────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Upstream rejected request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Upstream unavailable after {attempts} attempts: {message}")]
    Unavailable { attempts: u32, message: String },

    #[error("Pagination did not terminate after {pages} pages")]
    CrawlOverrun { pages: usize },

    #[error("Aggregation timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// HTTP-equivalent status a front end should report.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Timeout { .. } => 504,
            _ => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<rbxfolio_api::Error> for CoreError {
    fn from(err: rbxfolio_api::Error) -> Self {
        match err {
            rbxfolio_api::Error::Auth { message } => CoreError::AuthenticationFailed { message },
            rbxfolio_api::Error::Client { status, message } => {
                CoreError::Rejected { status, message }
            }
            rbxfolio_api::Error::ExhaustedRetries { attempts, last } => CoreError::Unavailable {
                attempts,
                message: last.to_string(),
            },
            rbxfolio_api::Error::CrawlOverrun { pages } => CoreError::CrawlOverrun { pages },
            rbxfolio_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            rbxfolio_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            e @ (rbxfolio_api::Error::RateLimited
            | rbxfolio_api::Error::Server { .. }
            | rbxfolio_api::Error::Transport(_)) => CoreError::Unavailable {
                attempts: 1,
                message: e.to_string(),
            },
        }
    }
}
