// ── Output envelopes ──
//
// The JSON documents handed to the front end. Field names are camelCase on
// the wire.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::group::OwnedGroup;
use super::resource::{ResourceEntry, SubResourceEntry};
use crate::error::CoreError;

/// Every game the identity owns, directly or through owned groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceListing {
    pub identity_name: String,
    pub identity_id: u64,
    pub total_resources: usize,
    pub owned_groups: Vec<OwnedGroup>,
    pub resources: Vec<ResourceEntry>,
}

/// Game passes of every owned game.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubResourceListing {
    pub identity_name: String,
    pub identity_id: u64,
    /// Number of entries in `resources`.
    pub total_resources_with_sub_resources: usize,
    pub total_sub_resources: usize,
    pub resources: Vec<SubResourceEntry>,
}

/// Which games a sub-resource listing keeps.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SubResourceView {
    /// Every game, including those with no passes.
    #[default]
    All,
    /// Only games with at least one pass.
    NonEmpty,
}

impl SubResourceView {
    pub fn keeps(self, entry: &SubResourceEntry) -> bool {
        match self {
            Self::All => true,
            Self::NonEmpty => !entry.sub_resources.is_empty(),
        }
    }
}

/// `{ "error": ..., "status": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub status: u16,
}

impl From<&CoreError> for ErrorEnvelope {
    fn from(err: &CoreError) -> Self {
        let error = match err {
            CoreError::NotFound { .. } => "User not found".to_owned(),
            other => other.to_string(),
        };
        Self {
            error,
            status: err.status_code(),
        }
    }
}
