// Roblox web API response types
//
// Only the fields the aggregation needs are modelled explicitly. Fields use
// `#[serde(default)]` liberally because the games and groups endpoints
// disagree about which optional fields they send.

use serde::{Deserialize, Serialize};

// ── Response wrappers ────────────────────────────────────────────────

/// Non-paginated list wrapper: `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
pub struct DataList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

// ── Users ────────────────────────────────────────────────────────────

/// Entry from `POST /v1/usernames/users`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernameMatch {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub requested_username: Option<String>,
}

/// User object from `GET /v1/users/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_banned: bool,
}

// ── Games ────────────────────────────────────────────────────────────

/// Who created a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub id: u64,
    /// `"User"` or `"Group"`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl Creator {
    pub fn is_user(&self) -> bool {
        self.kind.eq_ignore_ascii_case("user")
    }
}

/// Reference to a place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRef {
    pub id: u64,
}

/// Game (universe) entry from the v2 user / group game listings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Universe id.
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub creator: Creator,
    #[serde(default)]
    pub root_place: Option<PlaceRef>,
    #[serde(default)]
    pub place_visits: u64,
}

/// Game pass entry from `GET /v1/games/{universeId}/game-passes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePass {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<u64>,
    /// `null` for passes that are not on sale.
    #[serde(default)]
    pub price: Option<u64>,
}

// ── Groups ───────────────────────────────────────────────────────────

/// Entry from `GET /v1/users/{id}/groups/roles`.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupMembership {
    pub group: GroupInfo,
    pub role: GroupRole,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub member_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupRole {
    pub id: u64,
    pub name: String,
    /// 1..=255; the group owner holds 255.
    pub rank: u8,
}
