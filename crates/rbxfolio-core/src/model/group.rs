// ── Group ownership ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Rank held by a group's owner.
pub const OWNER_RANK: u8 = 255;

/// Which memberships count as owning the group.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum OwnershipPolicy {
    /// Rank 255 only.
    #[default]
    Owner,
    /// Rank 254 and above: the owner plus the top delegated role.
    OwnerOrDelegate,
}

impl OwnershipPolicy {
    pub fn min_rank(self) -> u8 {
        match self {
            Self::Owner => OWNER_RANK,
            Self::OwnerOrDelegate => OWNER_RANK - 1,
        }
    }

    pub fn accepts(self, rank: u8) -> bool {
        rank >= self.min_rank()
    }
}

/// A group the identity owns under the active policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedGroup {
    pub group_id: u64,
    pub name: String,
    pub member_count: u64,
    /// Name of the identity's role in the group.
    pub role: String,
    pub rank: u8,
}
