// Game and game-pass endpoints
//
// All three listings are cursor-paginated. The `*_page` methods fetch one
// page; the `list_*` methods walk the whole cursor chain.

use tracing::debug;

use crate::client::ApiRequest;
use crate::error::Error;
use crate::pagination::Page;
use crate::roblox::client::RobloxClient;
use crate::roblox::models::{Game, GamePass};

const GAMES_PAGE_LIMIT: u32 = 50;
const PASSES_PAGE_LIMIT: u32 = 100;

/// `accessFilter` value selecting public games.
const GROUP_GAMES_PUBLIC: u32 = 2;

impl RobloxClient {
    // ── User games ───────────────────────────────────────────────────

    /// `GET /v2/users/{id}/games`
    pub async fn user_games_page(&self, user_id: u64, cursor: &str) -> Result<Page<Game>, Error> {
        let url = self.games_url(&format!("/v2/users/{user_id}/games"))?;
        let request = ApiRequest::get(url)
            .query("sortOrder", "Asc")
            .query("limit", GAMES_PAGE_LIMIT)
            .query("cursor", cursor);
        self.api().execute(&request).await
    }

    /// Every game listed on the user's profile.
    pub async fn list_user_games(&self, user_id: u64) -> Result<Vec<Game>, Error> {
        debug!(user_id, "listing user games");
        self.paginator()
            .crawl(|cursor| async move { self.user_games_page(user_id, &cursor).await })
            .await
    }

    // ── Group games ──────────────────────────────────────────────────

    /// `GET /v2/groups/{id}/gamesV2`
    pub async fn group_games_page(&self, group_id: u64, cursor: &str) -> Result<Page<Game>, Error> {
        let url = self.games_url(&format!("/v2/groups/{group_id}/gamesV2"))?;
        let request = ApiRequest::get(url)
            .query("accessFilter", GROUP_GAMES_PUBLIC)
            .query("sortOrder", "Asc")
            .query("limit", GAMES_PAGE_LIMIT)
            .query("cursor", cursor);
        self.api().execute(&request).await
    }

    /// Every public game owned by the group.
    pub async fn list_group_games(&self, group_id: u64) -> Result<Vec<Game>, Error> {
        debug!(group_id, "listing group games");
        self.paginator()
            .crawl(|cursor| async move { self.group_games_page(group_id, &cursor).await })
            .await
    }

    // ── Game passes ──────────────────────────────────────────────────

    /// `GET /v1/games/{universeId}/game-passes`
    pub async fn game_passes_page(
        &self,
        universe_id: u64,
        cursor: &str,
    ) -> Result<Page<GamePass>, Error> {
        let url = self.games_url(&format!("/v1/games/{universe_id}/game-passes"))?;
        let request = ApiRequest::get(url)
            .query("limit", PASSES_PAGE_LIMIT)
            .query("sortOrder", "Asc")
            .query("cursor", cursor);
        self.api().execute(&request).await
    }

    /// Every game pass of the universe.
    pub async fn list_game_passes(&self, universe_id: u64) -> Result<Vec<GamePass>, Error> {
        debug!(universe_id, "listing game passes");
        self.paginator()
            .crawl(|cursor| async move { self.game_passes_page(universe_id, &cursor).await })
            .await
    }
}
