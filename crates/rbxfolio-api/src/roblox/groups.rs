// Group endpoints

use tracing::debug;

use crate::client::ApiRequest;
use crate::error::Error;
use crate::roblox::client::RobloxClient;
use crate::roblox::models::{DataList, GroupMembership};

impl RobloxClient {
    /// Every group the user belongs to, with the user's role in each.
    ///
    /// `GET /v1/users/{id}/groups/roles` (not paginated).
    pub async fn list_group_roles(&self, user_id: u64) -> Result<Vec<GroupMembership>, Error> {
        let url = self.groups_url(&format!("/v1/users/{user_id}/groups/roles"))?;
        debug!(user_id, "listing group memberships");

        let list: DataList<GroupMembership> = self.api().execute(&ApiRequest::get(url)).await?;
        Ok(list.data)
    }
}
