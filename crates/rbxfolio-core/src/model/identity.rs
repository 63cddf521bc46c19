// ── Identity domain types ──

use std::fmt;

use serde::Serialize;

/// A resolved Roblox user. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: u64,
    pub name: String,
    /// Falls back to `name` when upstream omits it.
    pub display_name: String,
}

/// Raw caller input, classified before any lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityQuery {
    /// All ASCII digits and fits in a `u64`: looked up directly.
    Id(u64),
    /// Anything else: resolved through the batch username endpoint.
    Name(String),
}

impl IdentityQuery {
    /// Classify `raw`. Surrounding whitespace is ignored; `None` for blank
    /// input.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = raw.parse() {
                return Some(Self::Id(id));
            }
        }
        Some(Self::Name(raw.to_owned()))
    }
}

impl fmt::Display for IdentityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}
