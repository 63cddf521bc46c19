// ── Aggregator ──
//
// Walks identity → owned groups → games → game passes and assembles the
// output envelopes. Identity resolution and the level-1 fetches (profile
// games, group roles) decide whether an aggregation succeeds at all. Every
// branch below that is isolated: a failed group or pass listing is logged
// and contributes an empty list.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::try_join;
use rbxfolio_api::{AuthSession, Game, GamePass, GroupMembership, ResilientClient, RobloxClient};
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, TtlCache};
use crate::config::AggregatorConfig;
use crate::error::CoreError;
use crate::fanout::FanOut;
use crate::model::{
    Identity, IdentityQuery, OwnedGroup, OwnershipPolicy, ResourceEntry, ResourceListing,
    SubResourceEntry, SubResourceListing, SubResourceView,
};

/// Shared aggregation engine.
///
/// One instance serves every request in the process: the anti-forgery
/// token, the result caches and the pacer are shared across aggregations.
pub struct Aggregator {
    client: Arc<RobloxClient>,
    identities: TtlCache<Identity>,
    games: TtlCache<Arc<Vec<Game>>>,
    memberships: TtlCache<Arc<Vec<GroupMembership>>>,
    passes: TtlCache<Arc<Vec<GamePass>>>,
    fan_out: FanOut,
    ownership: OwnershipPolicy,
    request_timeout: Duration,
}

impl Aggregator {
    /// Build the HTTP stack described by `config`.
    ///
    /// No request is made until the first aggregation.
    pub fn connect(config: &AggregatorConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let http = config.transport().build_client()?;
        let auth = AuthSession::new(http.clone(), config.endpoints.auth.clone())
            .with_header_name(&config.token_header)?;
        let api = ResilientClient::new(http, Arc::new(auth))
            .with_policy(config.retry.clone())
            .with_rejection_marker(config.rejection_marker.clone());
        let client = RobloxClient::from_parts(api, config.paginator(), config.endpoints.clone());

        debug!(users = %config.endpoints.users, "aggregator connected");
        Ok(Self::with_client(Arc::new(client), config))
    }

    /// Wrap an existing client; transport settings in `config` are ignored.
    pub fn with_client(client: Arc<RobloxClient>, config: &AggregatorConfig) -> Self {
        Self {
            client,
            identities: TtlCache::new(config.cache_ttl),
            games: TtlCache::new(config.cache_ttl),
            memberships: TtlCache::new(config.cache_ttl),
            passes: TtlCache::new(config.cache_ttl),
            fan_out: FanOut::new(config.fan_out.clone()),
            ownership: config.ownership,
            request_timeout: config.request_timeout,
        }
    }

    pub fn client(&self) -> &Arc<RobloxClient> {
        &self.client
    }

    pub fn ownership(&self) -> OwnershipPolicy {
        self.ownership
    }

    /// Drop expired entries from every cache. Runs at the start of every
    /// aggregation.
    pub fn purge_expired(&self) -> usize {
        self.identities.purge_expired()
            + self.games.purge_expired()
            + self.memberships.purge_expired()
            + self.passes.purge_expired()
    }

    // ── Public operations ────────────────────────────────────────────

    /// Resolve a user id or username.
    pub async fn resolve_identity(&self, input: &str) -> Result<Identity, CoreError> {
        self.within_budget(self.identity(input)).await
    }

    /// Every game the identity owns directly or through an owned group.
    pub async fn list_resources(&self, input: &str) -> Result<ResourceListing, CoreError> {
        self.within_budget(async {
            let identity = self.identity(input).await?;
            let (owned_groups, resources) = self.collect_resources(&identity).await?;

            info!(
                user_id = identity.id,
                groups = owned_groups.len(),
                resources = resources.len(),
                "resource listing complete"
            );
            Ok(ResourceListing {
                identity_name: identity.name,
                identity_id: identity.id,
                total_resources: resources.len(),
                owned_groups,
                resources,
            })
        })
        .await
    }

    /// Game passes of every owned game, filtered by `view`.
    pub async fn list_sub_resources(
        &self,
        input: &str,
        view: SubResourceView,
    ) -> Result<SubResourceListing, CoreError> {
        self.within_budget(async {
            let identity = self.identity(input).await?;
            let (_, resources) = self.collect_resources(&identity).await?;

            let entries = self
                .fan_out
                .run(resources, |resource| async move {
                    let passes = self.passes_or_empty(resource.resource_id).await;
                    SubResourceEntry {
                        name: resource.name,
                        resource_id: resource.resource_id,
                        sub_resources: passes.as_ref().clone(),
                    }
                })
                .await;

            let entries: Vec<SubResourceEntry> =
                entries.into_iter().filter(|e| view.keeps(e)).collect();
            let total_sub_resources: usize = entries.iter().map(|e| e.sub_resources.len()).sum();

            info!(
                user_id = identity.id,
                resources = entries.len(),
                passes = total_sub_resources,
                %view,
                "sub-resource listing complete"
            );
            Ok(SubResourceListing {
                identity_name: identity.name,
                identity_id: identity.id,
                total_resources_with_sub_resources: entries.len(),
                total_sub_resources,
                resources: entries,
            })
        })
        .await
    }

    // ── Stages ───────────────────────────────────────────────────────

    async fn within_budget<T>(
        &self,
        work: impl Future<Output = Result<T, CoreError>>,
    ) -> Result<T, CoreError> {
        let swept = self.purge_expired();
        if swept > 0 {
            debug!(swept, "evicted expired cache entries");
        }

        tokio::time::timeout(self.request_timeout, work)
            .await
            .map_err(|_| CoreError::Timeout {
                timeout: self.request_timeout,
            })?
    }

    async fn identity(&self, input: &str) -> Result<Identity, CoreError> {
        let not_found = || CoreError::NotFound {
            identifier: input.trim().to_owned(),
        };
        let query = IdentityQuery::parse(input).ok_or_else(not_found)?;
        debug!(%query, "resolving identity");

        match query {
            IdentityQuery::Id(user_id) => {
                self.identities
                    .get_or_compute(CacheKey::new("user", user_id), move || async move {
                        let user = self.client.get_user(user_id).await?;
                        user.map(Identity::from).ok_or_else(not_found)
                    })
                    .await
            }
            IdentityQuery::Name(name) => {
                let key = CacheKey::new("username", name.to_lowercase());
                self.identities
                    .get_or_compute(key, move || async move {
                        let found = self.client.resolve_username(&name).await?;
                        found.map(Identity::from).ok_or_else(not_found)
                    })
                    .await
            }
        }
    }

    /// Level 1 concurrently, then level 2 through the fan-out.
    async fn collect_resources(
        &self,
        identity: &Identity,
    ) -> Result<(Vec<OwnedGroup>, Vec<ResourceEntry>), CoreError> {
        let (profile, memberships) =
            try_join(self.user_games(identity.id), self.memberships(identity.id)).await?;

        let owned_groups: Vec<OwnedGroup> = memberships
            .iter()
            .filter(|m| self.ownership.accepts(m.role.rank))
            .cloned()
            .map(OwnedGroup::from)
            .collect();
        debug!(
            user_id = identity.id,
            memberships = memberships.len(),
            owned = owned_groups.len(),
            "filtered group memberships"
        );

        let group_games = self
            .fan_out
            .run(owned_groups.iter().map(|g| g.group_id), move |group_id| {
                self.group_games_or_empty(group_id)
            })
            .await;

        let mut resources: Vec<ResourceEntry> = profile
            .iter()
            .filter(|game| game.creator.is_user())
            .cloned()
            .map(ResourceEntry::from)
            .collect();
        for games in group_games {
            resources.extend(games.iter().cloned().map(ResourceEntry::from));
        }

        Ok((owned_groups, resources))
    }

    // ── Cached fetches ───────────────────────────────────────────────

    async fn user_games(&self, user_id: u64) -> Result<Arc<Vec<Game>>, CoreError> {
        self.games
            .get_or_compute(CacheKey::new("user_games", user_id), move || async move {
                Ok(Arc::new(self.client.list_user_games(user_id).await?))
            })
            .await
    }

    async fn memberships(&self, user_id: u64) -> Result<Arc<Vec<GroupMembership>>, CoreError> {
        self.memberships
            .get_or_compute(CacheKey::new("user_groups", user_id), move || async move {
                Ok(Arc::new(self.client.list_group_roles(user_id).await?))
            })
            .await
    }

    async fn group_games_or_empty(&self, group_id: u64) -> Arc<Vec<Game>> {
        let fetched = self
            .games
            .get_or_compute(CacheKey::new("group_games", group_id), move || async move {
                Ok::<_, CoreError>(Arc::new(self.client.list_group_games(group_id).await?))
            })
            .await;

        fetched.unwrap_or_else(|e| {
            warn!(group_id, error = %e, "group games unavailable, continuing without them");
            Arc::default()
        })
    }

    async fn passes_or_empty(&self, universe_id: u64) -> Arc<Vec<GamePass>> {
        let fetched = self
            .passes
            .get_or_compute(CacheKey::new("game_passes", universe_id), move || async move {
                Ok::<_, CoreError>(Arc::new(self.client.list_game_passes(universe_id).await?))
            })
            .await;

        fetched.unwrap_or_else(|e| {
            warn!(universe_id, error = %e, "game passes unavailable, listing game without them");
            Arc::default()
        })
    }
}
