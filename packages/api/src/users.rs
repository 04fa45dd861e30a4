//! Backend account endpoints: registration record, profile sync and admin user management.

use serde::Deserialize;
use serde_json::json;

use crate::client::{ApiError, SecureClient};
use crate::models::{Principal, ProfileUpdate, Role, UserRecord, UserUpsert};
use crate::role::RoleResolver;

/// Outcome counters the backend reports for write operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    #[serde(default)]
    pub modified_count: u64,
    #[serde(default)]
    pub deleted_count: u64,
    #[serde(default, rename = "insertedId")]
    pub inserted: Option<serde_json::Value>,
}

impl WriteResult {
    pub fn changed(&self) -> bool {
        self.modified_count > 0 || self.deleted_count > 0 || self.inserted.is_some()
    }
}

/// User endpoints, bundled with the role cache they can make stale.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDirectory {
    client: SecureClient,
    roles: RoleResolver,
}

impl UserDirectory {
    pub fn new(client: SecureClient, roles: RoleResolver) -> Self {
        Self { client, roles }
    }

    /// Record a sign-in with the backend (inserts the account on first sight).
    pub async fn record_sign_in(&self, principal: &Principal) -> Result<WriteResult, ApiError> {
        let body = UserUpsert {
            email: principal.identifier().to_string(),
            name: principal.display_name.clone(),
            photo: principal.photo_url.clone(),
        };
        let result: Option<WriteResult> = self.client.post_json("/users", &body).await?;
        Ok(result.unwrap_or_default())
    }

    pub async fn list(&self, search: &str) -> Result<Vec<UserRecord>, ApiError> {
        let path = format!("/users?searchText={}", urlencoding::encode(search.trim()));
        let users: Option<Vec<UserRecord>> = self.client.get_json(&path).await?;
        Ok(users.unwrap_or_default())
    }

    /// Change a user's role. Their cached role is dropped so guards pick up the change.
    pub async fn set_role(&self, user: &UserRecord, role: Role) -> Result<WriteResult, ApiError> {
        let path = format!("/users/{}/role", urlencoding::encode(user.key()));
        let result: Option<WriteResult> = self
            .client
            .patch_json(&path, &json!({ "role": role }))
            .await?;
        self.roles.invalidate(&user.email);
        tracing::info!(email = %user.email, %role, "Role changed");
        Ok(result.unwrap_or_default())
    }

    pub async fn remove(&self, user: &UserRecord) -> Result<(), ApiError> {
        let path = format!("/users/{}", urlencoding::encode(user.key()));
        self.client.delete(&path).await?;
        self.roles.invalidate(&user.email);
        Ok(())
    }

    /// Mirror a profile change into the backend record.
    pub async fn sync_profile(&self, update: &ProfileUpdate) -> Result<(), ApiError> {
        let body = json!({
            "displayName": update.display_name,
            "photoURL": update.photo_url,
        });
        let _: Option<serde_json::Value> = self.client.patch_json("/users/profile", &body).await?;
        Ok(())
    }
}
