// ── API-to-domain type conversions ──
//
// Bridges raw `rbxfolio_api` response types into the output model. Display
// names fall back to the account name; thumbnail references are derived
// from the universe id.

use rbxfolio_api::{Game, GroupMembership, User, UsernameMatch};

use crate::model::{Identity, OwnedGroup, ResourceEntry};

impl From<User> for Identity {
    fn from(user: User) -> Self {
        let display_name = user.display_name.unwrap_or_else(|| user.name.clone());
        Self {
            id: user.id,
            name: user.name,
            display_name,
        }
    }
}

impl From<UsernameMatch> for Identity {
    fn from(found: UsernameMatch) -> Self {
        let display_name = found.display_name.unwrap_or_else(|| found.name.clone());
        Self {
            id: found.id,
            name: found.name,
            display_name,
        }
    }
}

impl From<GroupMembership> for OwnedGroup {
    fn from(membership: GroupMembership) -> Self {
        Self {
            group_id: membership.group.id,
            name: membership.group.name,
            member_count: membership.group.member_count,
            role: membership.role.name,
            rank: membership.role.rank,
        }
    }
}

impl From<Game> for ResourceEntry {
    fn from(game: Game) -> Self {
        Self {
            resource_id: game.id,
            root_resource_id: game.root_place.map(|place| place.id),
            name: game.name,
            creator: game.creator,
            metric: game.place_visits,
            icon_ref: ResourceEntry::icon_ref_for(game.id),
            thumbnail_ref: ResourceEntry::thumbnail_ref_for(game.id),
        }
    }
}
