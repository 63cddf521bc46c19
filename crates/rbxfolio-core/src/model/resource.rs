// ── Resource entries ──
//
// Games (universes) and their game passes as they appear in the output
// envelopes.

use rbxfolio_api::{Creator, GamePass};
use serde::Serialize;

/// One game in a resource listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    /// Universe id.
    pub resource_id: u64,
    /// Root place id, when upstream reports one.
    pub root_resource_id: Option<u64>,
    pub name: String,
    pub creator: Creator,
    /// Lifetime place visits.
    pub metric: u64,
    pub icon_ref: String,
    pub thumbnail_ref: String,
}

impl ResourceEntry {
    pub fn icon_ref_for(resource_id: u64) -> String {
        format!("rbxthumb://type=GameIcon&id={resource_id}&w=150&h=150")
    }

    pub fn thumbnail_ref_for(resource_id: u64) -> String {
        format!("rbxthumb://type=GameThumbnail&id={resource_id}&w=768&h=432")
    }
}

/// A game with its game passes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubResourceEntry {
    pub name: String,
    pub resource_id: u64,
    pub sub_resources: Vec<GamePass>,
}
