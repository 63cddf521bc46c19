//! Configuration for the rbxfolio CLI.
//!
//! TOML file + `RBXFOLIO_` environment overrides layered with figment,
//! session cookie resolution (env + keyring + plaintext), and translation
//! to `rbxfolio_core::AggregatorConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use rbxfolio_api::{Endpoints, RetryPolicy};
use rbxfolio_core::{AggregatorConfig, FanOutPolicy, OwnershipPolicy};

/// Keyring service name.
pub const KEYRING_SERVICE: &str = "rbxfolio";

/// Keyring entry holding the session cookie.
pub const KEYRING_COOKIE_ENTRY: &str = "session-cookie";

/// Environment variable checked for the session cookie when the config
/// names none.
pub const DEFAULT_COOKIE_ENV: &str = "ROBLOSECURITY";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// `"owner"` or `"owner-or-delegate"`.
    #[serde(default)]
    pub ownership: OwnershipPolicy,

    /// Budget for one whole aggregation.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub retry: RetrySection,

    #[serde(default)]
    pub crawl: CrawlSection,

    #[serde(default)]
    pub cache: CacheSection,

    #[serde(default)]
    pub fanout: FanOutSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiSection::default(),
            retry: RetrySection::default(),
            crawl: CrawlSection::default(),
            cache: CacheSection::default(),
            fanout: FanOutSection::default(),
            ownership: OwnershipPolicy::default(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    60
}

/// Upstream hosts and transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiSection {
    #[serde(default = "default_users_url")]
    pub users_url: String,

    #[serde(default = "default_games_url")]
    pub games_url: String,

    #[serde(default = "default_groups_url")]
    pub groups_url: String,

    /// Priming endpoint for the anti-forgery token.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    #[serde(default = "default_token_header")]
    pub token_header: String,

    #[serde(default = "default_rejection_marker")]
    pub rejection_marker: String,

    /// Per-HTTP-request timeout.
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,

    pub user_agent: Option<String>,

    /// `.ROBLOSECURITY` value (plaintext; prefer keyring or env var).
    pub session_cookie: Option<String>,

    /// Environment variable holding the session cookie.
    pub session_cookie_env: Option<String>,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            users_url: default_users_url(),
            games_url: default_games_url(),
            groups_url: default_groups_url(),
            auth_url: default_auth_url(),
            token_header: default_token_header(),
            rejection_marker: default_rejection_marker(),
            timeout_secs: default_http_timeout(),
            user_agent: None,
            session_cookie: None,
            session_cookie_env: None,
        }
    }
}

fn default_users_url() -> String {
    "https://users.roblox.com".into()
}
fn default_games_url() -> String {
    "https://games.roblox.com".into()
}
fn default_groups_url() -> String {
    "https://groups.roblox.com".into()
}
fn default_auth_url() -> String {
    "https://auth.roblox.com/v2/logout".into()
}
fn default_token_header() -> String {
    rbxfolio_api::auth::DEFAULT_TOKEN_HEADER.into()
}
fn default_rejection_marker() -> String {
    rbxfolio_api::client::DEFAULT_REJECTION_MARKER.into()
}
fn default_http_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RetrySection {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay(),
        }
    }
}

fn default_max_retries() -> u32 {
    5
}
fn default_base_delay() -> u64 {
    500
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CrawlSection {
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for CrawlSection {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
        }
    }
}

fn default_max_pages() -> usize {
    rbxfolio_api::pagination::DEFAULT_MAX_PAGES
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheSection {
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_ttl() -> u64 {
    300
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FanOutSection {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Minimum gap between branch starts.
    #[serde(default)]
    pub min_interval_ms: u64,
}

impl Default for FanOutSection {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            min_interval_ms: 0,
        }
    }
}

fn default_concurrency() -> usize {
    4
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "rbxfolio", "rbxfolio").map_or_else(
        || PathBuf::from(".rbxfolio.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file at `path`, then `RBXFOLIO_*` variables.
///
/// Nested keys use a double underscore: `RBXFOLIO_RETRY__MAX_RETRIES=2`.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("RBXFOLIO_").split("__"))
}

/// Load the config from `path` (or the platform default) plus environment.
/// A missing file is not an error.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    let config: Config = figment(&path).extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the session cookie: env var, then keyring, then plaintext.
///
/// `None` means anonymous access, which the public endpoints allow.
pub fn resolve_session_cookie(api: &ApiSection) -> Option<SecretString> {
    resolve_session_cookie_with(
        api,
        |name| std::env::var(name).ok(),
        || {
            keyring::Entry::new(KEYRING_SERVICE, KEYRING_COOKIE_ENTRY)
                .and_then(|entry| entry.get_password())
                .ok()
        },
    )
}

fn resolve_session_cookie_with(
    api: &ApiSection,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl FnOnce() -> Option<String>,
) -> Option<SecretString> {
    let env_name = api
        .session_cookie_env
        .as_deref()
        .unwrap_or(DEFAULT_COOKIE_ENV);

    env(env_name)
        .filter(|v| !v.is_empty())
        .or_else(keyring)
        .or_else(|| api.session_cookie.clone())
        .map(SecretString::from)
}

// ── Translation ─────────────────────────────────────────────────────

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    raw.parse().map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL {raw:?}: {e}"),
    })
}

/// Build an `AggregatorConfig`, resolving the session cookie.
pub fn to_aggregator_config(cfg: &Config) -> Result<AggregatorConfig, ConfigError> {
    let mut out = to_aggregator_config_without_cookie(cfg)?;
    out.session_cookie = resolve_session_cookie(&cfg.api);
    Ok(out)
}

fn to_aggregator_config_without_cookie(cfg: &Config) -> Result<AggregatorConfig, ConfigError> {
    let endpoints = Endpoints {
        users: parse_url("api.users_url", &cfg.api.users_url)?,
        games: parse_url("api.games_url", &cfg.api.games_url)?,
        groups: parse_url("api.groups_url", &cfg.api.groups_url)?,
        auth: parse_url("api.auth_url", &cfg.api.auth_url)?,
    };

    if cfg.crawl.max_pages == 0 {
        return Err(ConfigError::Validation {
            field: "crawl.max_pages".into(),
            reason: "must be at least 1".into(),
        });
    }
    if cfg.fanout.concurrency == 0 {
        return Err(ConfigError::Validation {
            field: "fanout.concurrency".into(),
            reason: "must be at least 1".into(),
        });
    }
    if cfg.request_timeout_secs == 0 {
        return Err(ConfigError::Validation {
            field: "request_timeout_secs".into(),
            reason: "must be positive".into(),
        });
    }

    let mut out = AggregatorConfig::new(endpoints);
    out.token_header.clone_from(&cfg.api.token_header);
    out.rejection_marker.clone_from(&cfg.api.rejection_marker);
    out.http_timeout = Duration::from_secs(cfg.api.timeout_secs);
    if let Some(ref agent) = cfg.api.user_agent {
        out.user_agent.clone_from(agent);
    }
    out.retry = RetryPolicy {
        max_retries: cfg.retry.max_retries,
        base_delay: Duration::from_millis(cfg.retry.base_delay_ms),
    };
    out.max_pages = cfg.crawl.max_pages;
    out.cache_ttl = Duration::from_secs(cfg.cache.ttl_secs);
    out.fan_out = FanOutPolicy {
        concurrency: cfg.fanout.concurrency,
        min_interval: Duration::from_millis(cfg.fanout.min_interval_ms),
    };
    out.ownership = cfg.ownership;
    out.request_timeout = Duration::from_secs(cfg.request_timeout_secs);
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn from_toml(raw: &str) -> Config {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(raw))
            .extract()
            .unwrap()
    }

    #[test]
    fn defaults_match_production() {
        let cfg = from_toml("");
        assert_eq!(cfg, Config::default());

        let out = to_aggregator_config_without_cookie(&cfg).unwrap();
        assert_eq!(out.endpoints, Endpoints::roblox().unwrap());
        assert_eq!(out.retry, RetryPolicy::default());
        assert_eq!(out.max_pages, 500);
        assert_eq!(out.ownership, OwnershipPolicy::Owner);
        assert_eq!(out.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn file_overrides_sections() {
        let cfg = from_toml(
            r#"
            ownership = "owner-or-delegate"
            request_timeout_secs = 15

            [retry]
            max_retries = 2
            base_delay_ms = 50

            [fanout]
            concurrency = 8
            min_interval_ms = 250
            "#,
        );

        let out = to_aggregator_config_without_cookie(&cfg).unwrap();
        assert_eq!(out.ownership, OwnershipPolicy::OwnerOrDelegate);
        assert_eq!(out.retry.max_retries, 2);
        assert_eq!(out.retry.base_delay, Duration::from_millis(50));
        assert_eq!(out.fan_out.concurrency, 8);
        assert_eq!(out.fan_out.min_interval, Duration::from_millis(250));
        assert_eq!(out.request_timeout, Duration::from_secs(15));
        // Untouched sections keep their defaults.
        assert_eq!(out.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn rejects_bad_url() {
        let cfg = from_toml("[api]\nusers_url = \"not a url\"");
        let err = to_aggregator_config_without_cookie(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api.users_url"));
    }

    #[test]
    fn rejects_zero_concurrency() {
        let cfg = from_toml("[fanout]\nconcurrency = 0");
        assert!(to_aggregator_config_without_cookie(&cfg).is_err());
    }

    #[test]
    fn save_then_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.crawl.max_pages = 12;

        save_config(&cfg, &path).unwrap();
        let loaded: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&path))
            .extract()
            .unwrap();

        assert_eq!(loaded.crawl.max_pages, 12);
    }

    #[test]
    fn cookie_prefers_env_over_keyring_and_file() {
        let api = ApiSection {
            session_cookie: Some("from-file".into()),
            session_cookie_env: Some("MY_COOKIE".into()),
            ..ApiSection::default()
        };

        let cookie = resolve_session_cookie_with(
            &api,
            |name| (name == "MY_COOKIE").then(|| "from-env".to_string()),
            || Some("from-keyring".into()),
        );

        assert_eq!(cookie.unwrap().expose_secret(), "from-env");
    }

    #[test]
    fn cookie_falls_back_to_keyring_then_file() {
        let api = ApiSection {
            session_cookie: Some("from-file".into()),
            ..ApiSection::default()
        };

        let from_keyring =
            resolve_session_cookie_with(&api, |_| None, || Some("from-keyring".into()));
        assert_eq!(from_keyring.unwrap().expose_secret(), "from-keyring");

        let from_file = resolve_session_cookie_with(&api, |_| Some(String::new()), || None);
        assert_eq!(from_file.unwrap().expose_secret(), "from-file");
    }

    #[test]
    fn no_cookie_is_anonymous() {
        let cookie = resolve_session_cookie_with(&ApiSection::default(), |_| None, || None);
        assert!(cookie.is_none());
    }
}
