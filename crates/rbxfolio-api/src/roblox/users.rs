// User endpoints
//
// Name resolution goes through the batch lookup (a write-style POST that
// needs the anti-forgery token); id lookup is a plain GET.

use serde_json::json;
use tracing::debug;

use crate::client::ApiRequest;
use crate::error::Error;
use crate::roblox::client::RobloxClient;
use crate::roblox::models::{DataList, User, UsernameMatch};

impl RobloxClient {
    /// Resolve a username to its user, skipping banned accounts.
    ///
    /// `POST /v1/usernames/users`. Returns `None` when nothing matches.
    pub async fn resolve_username(&self, username: &str) -> Result<Option<UsernameMatch>, Error> {
        let url = self.users_url("/v1/usernames/users")?;
        debug!(username, "resolving username");

        let request = ApiRequest::post_json(
            url,
            json!({ "usernames": [username], "excludeBannedUsers": true }),
        );
        let list: DataList<UsernameMatch> = self.api().execute(&request).await?;
        Ok(list.data.into_iter().next())
    }

    /// Fetch a user by id.
    ///
    /// `GET /v1/users/{id}`. Upstream answers 404 for unknown ids, which
    /// maps to `None`.
    pub async fn get_user(&self, user_id: u64) -> Result<Option<User>, Error> {
        let url = self.users_url(&format!("/v1/users/{user_id}"))?;
        debug!(user_id, "fetching user");

        match self.api().execute(&ApiRequest::get(url)).await {
            Ok(user) => Ok(Some(user)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
