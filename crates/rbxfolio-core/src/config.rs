// ── Runtime aggregation configuration ──
//
// Describes *how* the aggregator talks to upstream and how hard it pushes.
// Carries the session credential but never touches disk: the front end
// builds an `AggregatorConfig` (usually via `rbxfolio-config`) and hands
// it in.

use std::time::Duration;

use rbxfolio_api::auth::DEFAULT_TOKEN_HEADER;
use rbxfolio_api::client::DEFAULT_REJECTION_MARKER;
use rbxfolio_api::pagination::DEFAULT_MAX_PAGES;
use rbxfolio_api::{Endpoints, Paginator, RetryPolicy, TransportConfig};
use secrecy::SecretString;

use crate::error::CoreError;
use crate::fanout::FanOutPolicy;
use crate::model::OwnershipPolicy;

/// Default lifetime of cached upstream results.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default budget for one whole aggregation.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Default per-HTTP-request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything needed to build an [`Aggregator`](crate::Aggregator).
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Upstream base URLs.
    pub endpoints: Endpoints,
    /// `.ROBLOSECURITY` value. Anonymous when `None`.
    pub session_cookie: Option<SecretString>,
    /// Header carrying the anti-forgery token.
    pub token_header: String,
    /// Body fragment identifying a rejected token.
    pub rejection_marker: String,
    /// Per-HTTP-request timeout.
    pub http_timeout: Duration,
    pub user_agent: String,
    pub retry: RetryPolicy,
    /// Page cap for every cursor crawl.
    pub max_pages: usize,
    pub cache_ttl: Duration,
    pub fan_out: FanOutPolicy,
    pub ownership: OwnershipPolicy,
    /// Budget for one whole aggregation.
    pub request_timeout: Duration,
}

impl AggregatorConfig {
    /// Defaults against the given upstream endpoints.
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            endpoints,
            session_cookie: None,
            token_header: DEFAULT_TOKEN_HEADER.into(),
            rejection_marker: DEFAULT_REJECTION_MARKER.into(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            user_agent: TransportConfig::default().user_agent,
            retry: RetryPolicy::default(),
            max_pages: DEFAULT_MAX_PAGES,
            cache_ttl: DEFAULT_CACHE_TTL,
            fan_out: FanOutPolicy::default(),
            ownership: OwnershipPolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Defaults against the production Roblox hosts.
    pub fn roblox() -> Result<Self, CoreError> {
        Ok(Self::new(Endpoints::roblox()?))
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.http_timeout,
            user_agent: self.user_agent.clone(),
            session_cookie: self.session_cookie.clone(),
        }
    }

    pub fn paginator(&self) -> Paginator {
        Paginator::new(self.max_pages)
    }

    /// Reject values that would stall or misbehave at runtime.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_pages == 0 {
            return Err(CoreError::Config {
                message: "max_pages must be at least 1".into(),
            });
        }
        if self.fan_out.concurrency == 0 {
            return Err(CoreError::Config {
                message: "fan-out concurrency must be at least 1".into(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(CoreError::Config {
                message: "request timeout must be positive".into(),
            });
        }
        Ok(())
    }
}
