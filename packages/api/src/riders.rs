//! Rider applications: users apply, admins approve or reject.
//!
//! Approving an application promotes the applicant on the backend, so a review
//! drops the applicant's cached role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::{ApiError, SecureClient};
use crate::models::{ReviewStatus, Role};
use crate::role::RoleResolver;
use crate::users::WriteResult;

/// Body of `POST /club-riders` and one row of `GET /admin/rider-applications`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiderApplication {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(default = "requested_role")]
    pub role_request: Role,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
}

fn requested_role() -> Role {
    Role::Rider
}

impl RiderApplication {
    /// A fresh application, stamped now.
    pub fn pending(
        name: String,
        email: String,
        contact: String,
        division: String,
        district: String,
        description: String,
    ) -> Self {
        Self {
            id: None,
            name,
            email,
            contact,
            division,
            district,
            description,
            status: ReviewStatus::Pending,
            role_request: Role::Rider,
            applied_at: Some(Utc::now()),
        }
    }

    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("Name", &self.name),
            ("Email", &self.email),
            ("Contact number", &self.contact),
            ("Division", &self.division),
            ("District", &self.district),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
    }

    /// Case-insensitive match on name or email.
    pub fn matches(&self, search: &str) -> bool {
        let needle = search.trim().to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.email.to_lowercase().contains(&needle)
    }

    pub fn applied_on(&self) -> String {
        self.applied_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Rider application endpoints, bundled with the role cache a review makes stale.
#[derive(Debug, Clone, PartialEq)]
pub struct RiderDesk {
    client: SecureClient,
    roles: RoleResolver,
}

impl RiderDesk {
    pub fn new(client: SecureClient, roles: RoleResolver) -> Self {
        Self { client, roles }
    }

    /// Submit an application. An unchanged result means one was already on file.
    pub async fn apply(&self, application: &RiderApplication) -> Result<WriteResult, ApiError> {
        if let Some(field) = application.missing_field() {
            return Err(ApiError::InvalidRequest(format!("{field} is required")));
        }
        let result: Option<WriteResult> = self
            .client
            .post_json("/club-riders", application)
            .await?;
        Ok(result.unwrap_or_default())
    }

    /// Applications still waiting for a decision.
    pub async fn pending(&self) -> Result<Vec<RiderApplication>, ApiError> {
        let all: Option<Vec<RiderApplication>> =
            self.client.get_json("/admin/rider-applications").await?;
        Ok(all
            .unwrap_or_default()
            .into_iter()
            .filter(|application| application.status == ReviewStatus::Pending)
            .collect())
    }

    /// Approve or reject `application` and drop the applicant's cached role.
    pub async fn review(
        &self,
        application: &RiderApplication,
        status: ReviewStatus,
    ) -> Result<WriteResult, ApiError> {
        let Some(id) = application.id.as_deref() else {
            return Err(ApiError::InvalidRequest("application has no id".to_string()));
        };
        if status == ReviewStatus::Pending {
            return Err(ApiError::InvalidRequest(
                "an application can only be approved or rejected".to_string(),
            ));
        }
        let path = format!("/admin/rider-applications/{}", urlencoding::encode(id));
        let result: Option<WriteResult> = self
            .client
            .patch_json(&path, &json!({ "status": status }))
            .await?;
        self.roles.invalidate(&application.email);
        tracing::info!(email = %application.email, %status, "Rider application reviewed");
        Ok(result.unwrap_or_default())
    }
}
