//! Account records as exchanged with the backend's user endpoints.

use serde::{Deserialize, Serialize};

use super::Role;

/// One row of `GET /users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    #[serde(rename = "displayName", alias = "name", default)]
    pub name: Option<String>,
    #[serde(rename = "photoURL", alias = "photo", default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl UserRecord {
    /// Get display name, falling back to email if name is not set.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }

    pub fn role(&self) -> Role {
        self.role.unwrap_or_default()
    }

    /// Path segment addressing this record: the backend id when known, else the email.
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.email)
    }
}

/// Body of `POST /users`, sent after every sign-in so the backend knows the account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserUpsert {
    pub email: String,
    #[serde(rename = "displayName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}
