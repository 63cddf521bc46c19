// Roblox API client
//
// Owns the resilient transport, the paginator and the per-service base
// URLs. Endpoint groups (users, games, groups) are implemented as
// inherent methods in sibling files to keep this module about wiring.

use std::sync::Arc;

use url::Url;

use crate::auth::AuthSession;
use crate::client::{ResilientClient, RetryPolicy};
use crate::error::Error;
use crate::pagination::Paginator;
use crate::transport::TransportConfig;

/// Base URL of each upstream service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub users: Url,
    pub games: Url,
    pub groups: Url,
    /// Priming endpoint for the anti-forgery token.
    pub auth: Url,
}

impl Endpoints {
    /// Production hosts.
    pub fn roblox() -> Result<Self, Error> {
        Ok(Self {
            users: Url::parse("https://users.roblox.com")?,
            games: Url::parse("https://games.roblox.com")?,
            groups: Url::parse("https://groups.roblox.com")?,
            auth: Url::parse("https://auth.roblox.com/v2/logout")?,
        })
    }

    /// Route every service through one host (proxies, mock servers).
    pub fn single_host(base: &Url) -> Result<Self, Error> {
        Ok(Self {
            users: base.clone(),
            games: base.clone(),
            groups: base.clone(),
            auth: join(base, "/v2/logout")?,
        })
    }
}

/// Async client for the Roblox web APIs used by the aggregator.
pub struct RobloxClient {
    api: ResilientClient,
    paginator: Paginator,
    endpoints: Endpoints,
}

impl RobloxClient {
    /// Build the HTTP stack from a transport config.
    ///
    /// One `reqwest::Client` (and its connection pool) is shared between
    /// the anti-forgery session and the retrying client.
    pub fn new(
        endpoints: Endpoints,
        transport: &TransportConfig,
        policy: RetryPolicy,
        paginator: Paginator,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let auth = Arc::new(AuthSession::new(http.clone(), endpoints.auth.clone()));
        let api = ResilientClient::new(http, auth).with_policy(policy);
        Ok(Self::from_parts(api, paginator, endpoints))
    }

    /// Assemble from pre-built parts (custom token header, rejection marker).
    pub fn from_parts(api: ResilientClient, paginator: Paginator, endpoints: Endpoints) -> Self {
        Self {
            api,
            paginator,
            endpoints,
        }
    }

    /// The retrying transport.
    pub fn api(&self) -> &ResilientClient {
        &self.api
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    // ── URL builders ─────────────────────────────────────────────────

    pub(crate) fn users_url(&self, path: &str) -> Result<Url, Error> {
        join(&self.endpoints.users, path)
    }

    pub(crate) fn games_url(&self, path: &str) -> Result<Url, Error> {
        join(&self.endpoints.games, path)
    }

    pub(crate) fn groups_url(&self, path: &str) -> Result<Url, Error> {
        join(&self.endpoints.groups, path)
    }
}

/// Append `path` to `base`, keeping any path prefix `base` already has.
fn join(base: &Url, path: &str) -> Result<Url, Error> {
    let base = base.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Ok(Url::parse(&format!("{base}/{path}"))?)
}
