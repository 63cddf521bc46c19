//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use rbxfolio_config::ConfigError;
use rbxfolio_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Aggregation ──────────────────────────────────────────────────
    #[error("User '{identifier}' not found")]
    #[diagnostic(
        code(rbxfolio::not_found),
        help("Pass a numeric user id or an exact username. Banned accounts are not resolved.")
    )]
    NotFound { identifier: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(rbxfolio::auth_failed),
        help(
            "Check that the session cookie is current.\n\
             Set ROBLOSECURITY or run: rbxfolio config set-cookie"
        )
    )]
    AuthFailed { message: String },

    #[error("Aggregation timed out after {timeout:?}")]
    #[diagnostic(
        code(rbxfolio::timeout),
        help("Increase the budget with --timeout or request_timeout_secs.")
    )]
    Timeout { timeout: Duration },

    #[error("Upstream error: {message}")]
    #[diagnostic(code(rbxfolio::upstream))]
    Upstream { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(rbxfolio::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(
        code(rbxfolio::config),
        help("Run: rbxfolio config show to inspect the effective configuration.")
    )]
    Config(#[from] ConfigError),

    #[error("Config file already exists at {path}")]
    #[diagnostic(code(rbxfolio::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error("Keyring error: {0}")]
    #[diagnostic(code(rbxfolio::keyring))]
    Keyring(#[from] keyring::Error),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(rbxfolio::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::ConfigExists { .. }
            | Self::Config(ConfigError::Validation { .. }) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { identifier } => CliError::NotFound { identifier },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout { timeout } => CliError::Timeout { timeout },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            other @ (CoreError::Rejected { .. }
            | CoreError::Unavailable { .. }
            | CoreError::CrawlOverrun { .. }
            | CoreError::Internal(_)) => CliError::Upstream {
                message: other.to_string(),
            },
        }
    }
}
