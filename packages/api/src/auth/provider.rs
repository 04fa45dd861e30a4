//! The identity-provider seam.

use std::sync::Arc;

use super::IdentityError;
use crate::models::{FederatedCredential, Principal, ProfileUpdate};
use crate::subscription::{Registry, Subscription};

/// Callback invoked with the new principal (or `None`) on every auth-state change.
pub type AuthStateListener = dyn Fn(Option<Principal>) + Send + Sync;

/// External identity provider.
///
/// Providers announce state changes to every subscribed listener in the order the
/// changes happen. Each operation resolves with the resulting principal or rejects
/// with an [`IdentityError`] whose message is fit for display.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait IdentityProvider: Send + Sync {
    /// Register for auth-state notifications. Dropping the handle unsubscribes.
    fn subscribe(&self, listener: Arc<AuthStateListener>) -> Subscription;

    /// The principal the provider currently considers signed in.
    fn current_principal(&self) -> Option<Principal>;

    async fn register(&self, email: &str, password: &str) -> Result<Principal, IdentityError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, IdentityError>;

    async fn sign_in_with_federated(
        &self,
        credential: FederatedCredential,
    ) -> Result<Principal, IdentityError>;

    async fn sign_out(&self) -> Result<(), IdentityError>;

    async fn update_profile(&self, update: ProfileUpdate) -> Result<Principal, IdentityError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError>;
}

/// Listener bookkeeping shared by the provider implementations.
#[derive(Clone, Default)]
pub(crate) struct Listeners {
    registry: Registry<AuthStateListener>,
}

impl Listeners {
    pub(crate) fn add(&self, listener: Arc<AuthStateListener>) -> Subscription {
        self.registry.add(listener)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.registry.len()
    }

    pub(crate) fn notify(&self, principal: Option<Principal>) {
        for listener in self.registry.snapshot() {
            listener(principal.clone());
        }
    }
}

/// Minimal sanity checks applied before an account is created.
pub(crate) fn validate_registration(email: &str, password: &str) -> Result<(), IdentityError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(IdentityError::InvalidEmail);
    }
    if password.len() < 6 {
        return Err(IdentityError::WeakPassword);
    }
    Ok(())
}
