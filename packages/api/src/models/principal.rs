//! # Principal — the authenticated identity
//!
//! A [`Principal`] is what the identity provider hands back after a successful
//! sign-in and what it announces through its state-change notifications. It carries
//! the profile fields the UI shows (email, display name, avatar) and a
//! [`TokenSource`] that mints short-lived bearer tokens on demand.
//!
//! Two principals compare equal when their identity fields match; the token
//! source is deliberately left out so that a refreshed principal for the same
//! account does not look like a different user to reactive UI state.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::IdentityError;

/// Something that can produce a fresh bearer token for a principal.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait TokenSource: Send + Sync {
    /// Return a token that is valid for at least the next request.
    async fn id_token(&self) -> Result<String, IdentityError>;
}

/// The authenticated identity.
#[derive(Clone)]
pub struct Principal {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    tokens: Arc<dyn TokenSource>,
}

impl Principal {
    pub fn new(uid: impl Into<String>, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
            photo_url: None,
            tokens,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name;
        self
    }

    pub fn with_photo_url(mut self, url: Option<String>) -> Self {
        self.photo_url = url;
        self
    }

    /// Key used for backend lookups: the email when known, the provider uid otherwise.
    pub fn identifier(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.uid)
    }

    /// Get display name, falling back to the identifier if no name is set.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or_else(|| self.identifier())
    }

    /// Mint a fresh bearer token.
    pub async fn id_token(&self) -> Result<String, IdentityError> {
        self.tokens.id_token().await
    }

    /// Apply a profile update locally, keeping the same token source.
    pub fn apply(mut self, update: &ProfileUpdate) -> Self {
        if let Some(name) = &update.display_name {
            self.display_name = Some(name.clone());
        }
        if let Some(url) = &update.photo_url {
            self.photo_url = Some(url.clone());
        }
        self
    }
}

impl PartialEq for Principal {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
            && self.email == other.email
            && self.display_name == other.display_name
            && self.photo_url == other.photo_url
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("photo_url", &self.photo_url)
            .finish_non_exhaustive()
    }
}

/// Profile fields a signed-in principal may change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Credential obtained from a federated identity provider (e.g. Google sign-in).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederatedCredential {
    /// Provider identifier such as `"google.com"`.
    pub provider_id: String,
    /// The ID token issued by that provider.
    pub id_token: String,
}

impl FederatedCredential {
    pub fn google(id_token: impl Into<String>) -> Self {
        Self {
            provider_id: "google.com".to_string(),
            id_token: id_token.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoTokens;

    #[async_trait::async_trait]
    impl TokenSource for NoTokens {
        async fn id_token(&self) -> Result<String, IdentityError> {
            Err(IdentityError::NotSignedIn)
        }
    }

    #[test]
    fn test_identifier_prefers_email() {
        let principal = Principal::new("uid-1", Arc::new(NoTokens));
        assert_eq!(principal.identifier(), "uid-1");
        assert_eq!(principal.display_name(), "uid-1");

        let principal = principal.with_email("rider@example.com");
        assert_eq!(principal.identifier(), "rider@example.com");
        assert_eq!(principal.display_name(), "rider@example.com");

        let principal = principal.with_display_name(Some("Rida".to_string()));
        assert_eq!(principal.display_name(), "Rida");
    }

    #[test]
    fn test_equality_ignores_token_source() {
        let a = Principal::new("uid-1", Arc::new(NoTokens)).with_email("a@example.com");
        let b = Principal::new("uid-1", Arc::new(NoTokens)).with_email("a@example.com");
        assert_eq!(a, b);
        assert_ne!(a, b.with_display_name(Some("Other".to_string())));
    }

    #[test]
    fn test_apply_profile_update() {
        let principal = Principal::new("uid-1", Arc::new(NoTokens))
            .with_display_name(Some("Old".to_string()));
        let updated = principal.apply(&ProfileUpdate {
            display_name: None,
            photo_url: Some("https://img.example/me.png".to_string()),
        });
        assert_eq!(updated.display_name.as_deref(), Some("Old"));
        assert_eq!(updated.photo_url.as_deref(), Some("https://img.example/me.png"));
    }
}
