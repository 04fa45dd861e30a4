//! # Session store: the single source of truth for "who is signed in"
//!
//! [`SessionStore`] is an explicitly constructed context object (no process-wide
//! global). The application creates one at start-up, calls [`start`](SessionStore::start)
//! to subscribe to the identity provider, and [`shutdown`](SessionStore::shutdown) on
//! teardown to drop that subscription.
//!
//! ## Loading
//!
//! `loading` starts out `true` and stays so until the provider delivers its first
//! notification. After that it is only `true` while an explicit operation
//! (register, sign in, federated sign in, logout, password reset) is in flight,
//! and returns to `false` when the operation settles, whether it succeeded or not.
//! Notifications that arrive during an operation update the principal but leave
//! `loading` alone until the operation settles.
//!
//! ## Observing
//!
//! [`watch`](SessionStore::watch) hands out a [`tokio::sync::watch::Receiver`] so UI
//! code can mirror the session into reactive state.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::watch;

use super::{AuthStateListener, IdentityError, IdentityProvider};
use crate::models::{FederatedCredential, Principal, ProfileUpdate, Session};
use crate::subscription::Subscription;

/// Cloneable handle to the session state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    provider: Arc<dyn IdentityProvider>,
    state: watch::Sender<Session>,
    tracker: Mutex<LoadTracker>,
    subscription: Mutex<Option<Subscription>>,
}

#[derive(Debug)]
struct LoadTracker {
    awaiting_first: bool,
    in_flight: usize,
}

impl LoadTracker {
    fn loading(&self) -> bool {
        self.awaiting_first || self.in_flight > 0
    }
}

impl SessionStore {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            inner: Arc::new(SessionInner {
                provider,
                state,
                tracker: Mutex::new(LoadTracker {
                    awaiting_first: true,
                    in_flight: 0,
                }),
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Subscribe to the identity provider. Calling this again while subscribed is a no-op.
    pub fn start(&self) {
        let mut slot = lock(&self.inner.subscription);
        if slot.is_some() {
            return;
        }
        let weak: Weak<SessionInner> = Arc::downgrade(&self.inner);
        let listener: Arc<AuthStateListener> = Arc::new(move |principal: Option<Principal>| {
            if let Some(inner) = weak.upgrade() {
                inner.apply_notification(principal);
            }
        });
        tracing::debug!("Subscribing to identity provider");
        // The provider may call back synchronously, which only touches `state`/`tracker`.
        *slot = Some(self.inner.provider.subscribe(listener));
    }

    /// Drop the provider subscription.
    pub fn shutdown(&self) {
        if let Some(subscription) = lock(&self.inner.subscription).take() {
            tracing::debug!("Unsubscribing from identity provider");
            subscription.unsubscribe();
        }
    }

    pub fn is_started(&self) -> bool {
        lock(&self.inner.subscription).is_some()
    }

    pub fn current_principal(&self) -> Option<Principal> {
        self.inner.state.borrow().principal.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Receiver that is notified on every session change.
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.inner.provider
    }

    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, IdentityError> {
        let pending = self.inner.begin("register");
        let result = self.inner.provider.register(email, password).await;
        pending.finish(result.as_ref().ok().map(|p| Some(p.clone())));
        report(&result)
    }

    pub async fn sign_in_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, IdentityError> {
        let pending = self.inner.begin("sign_in");
        let result = self.inner.provider.sign_in(email, password).await;
        pending.finish(result.as_ref().ok().map(|p| Some(p.clone())));
        report(&result)
    }

    pub async fn sign_in_with_federated(
        &self,
        credential: FederatedCredential,
    ) -> Result<Principal, IdentityError> {
        let pending = self.inner.begin("federated_sign_in");
        let result = self.inner.provider.sign_in_with_federated(credential).await;
        pending.finish(result.as_ref().ok().map(|p| Some(p.clone())));
        report(&result)
    }

    pub async fn logout(&self) -> Result<(), IdentityError> {
        let pending = self.inner.begin("logout");
        let result = self.inner.provider.sign_out().await;
        pending.finish(result.as_ref().ok().map(|_| None));
        report(&result)
    }

    /// Update profile fields of the signed-in principal. Does not touch `loading`.
    pub async fn update_user_profile(
        &self,
        update: ProfileUpdate,
    ) -> Result<Principal, IdentityError> {
        let principal = self.inner.provider.update_profile(update).await.map_err(|e| {
            tracing::warn!(operation = "update_profile", error = %e, "Identity operation failed");
            e
        })?;
        self.inner.state.send_modify(|session| {
            session.principal = Some(principal.clone());
        });
        Ok(principal)
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), IdentityError> {
        let pending = self.inner.begin("reset_password");
        let result = self.inner.provider.send_password_reset(email).await;
        pending.finish(None);
        report(&result)
    }
}

impl PartialEq for SessionStore {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionInner {
    fn apply_notification(&self, principal: Option<Principal>) {
        let mut tracker = lock(&self.tracker);
        tracker.awaiting_first = false;
        let loading = tracker.loading();
        tracing::info!(
            signed_in = principal.is_some(),
            loading,
            "Identity state changed"
        );
        self.state.send_modify(|session| {
            session.principal = principal;
            session.loading = loading;
        });
    }

    fn begin(&self, operation: &'static str) -> PendingOperation<'_> {
        let mut tracker = lock(&self.tracker);
        tracker.in_flight += 1;
        self.state.send_if_modified(|session| {
            let changed = !session.loading;
            session.loading = true;
            changed
        });
        tracing::debug!(operation, "Identity operation started");
        PendingOperation {
            session: self,
            operation,
            settled: false,
        }
    }

    /// `principal` is `Some(new_value)` when the operation determined who is signed in.
    fn settle(&self, operation: &'static str, principal: Option<Option<Principal>>) {
        let mut tracker = lock(&self.tracker);
        tracker.in_flight = tracker.in_flight.saturating_sub(1);
        tracker.awaiting_first = false;
        let loading = tracker.loading();
        tracing::debug!(operation, loading, "Identity operation settled");
        self.state.send_modify(|session| {
            if let Some(principal) = principal {
                session.principal = principal;
            }
            session.loading = loading;
        });
    }
}

/// Marks an operation as in flight; settles on `finish` or when dropped mid-way.
struct PendingOperation<'a> {
    session: &'a SessionInner,
    operation: &'static str,
    settled: bool,
}

impl PendingOperation<'_> {
    fn finish(mut self, principal: Option<Option<Principal>>) {
        self.settled = true;
        self.session.settle(self.operation, principal);
    }
}

impl Drop for PendingOperation<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.session.settle(self.operation, None);
        }
    }
}

fn report<T: Clone>(result: &Result<T, IdentityError>) -> Result<T, IdentityError> {
    if let Err(e) = result {
        tracing::warn!(error = %e, "Identity operation failed");
    }
    result.clone()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryIdentityProvider;

    fn store_with(provider: &MemoryIdentityProvider) -> SessionStore {
        SessionStore::new(Arc::new(provider.clone()))
    }

    #[test]
    fn test_loading_until_first_notification() {
        let provider = MemoryIdentityProvider::deferred();
        let store = store_with(&provider);
        assert!(store.is_loading());

        store.start();
        assert!(store.is_started());
        assert!(store.is_loading());
        assert!(store.current_principal().is_none());

        provider.announce();
        assert!(!store.is_loading());
        assert!(store.current_principal().is_none());

        // Later notifications keep loading false.
        provider.announce();
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_notifications_update_principal() {
        let provider = MemoryIdentityProvider::new().with_account("a@example.com", "secret1");
        let store = store_with(&provider);
        store.start();
        assert!(!store.is_loading());

        // A sign-in that bypasses the store still reaches it through the subscription.
        provider.sign_in("a@example.com", "secret1").await.unwrap();
        assert_eq!(store.snapshot().identifier(), Some("a@example.com"));
        assert!(!store.is_loading());

        provider.sign_out().await.unwrap();
        assert!(store.current_principal().is_none());
    }

    #[tokio::test]
    async fn test_operations_flip_loading_and_settle() {
        let provider = MemoryIdentityProvider::new().with_account("a@example.com", "secret1");
        let store = store_with(&provider);
        store.start();

        let mut rx = store.watch();
        rx.borrow_and_update();

        let principal = store.sign_in_user("a@example.com", "secret1").await.unwrap();
        assert_eq!(store.current_principal(), Some(principal));
        assert!(!store.is_loading());
        assert!(rx.has_changed().unwrap());

        store.logout().await.unwrap();
        assert!(store.current_principal().is_none());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_failed_operation_settles_loading() {
        let provider = MemoryIdentityProvider::deferred().with_account("a@example.com", "secret1");
        let store = store_with(&provider);
        store.start();
        assert!(store.is_loading());

        let err = store.sign_in_user("a@example.com", "nope").await.unwrap_err();
        assert_eq!(err, IdentityError::InvalidCredentials);
        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(!store.is_loading());
        assert!(store.current_principal().is_none());

        let err = store.reset_password("ghost@example.com").await.unwrap_err();
        assert_eq!(err, IdentityError::UnknownAccount);
        assert!(!store.is_loading());

        let err = store.register_user("a@example.com", "secret2").await.unwrap_err();
        assert_eq!(err, IdentityError::EmailExists);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_reset_password_settles_on_success() {
        let provider = MemoryIdentityProvider::new().with_account("a@example.com", "secret1");
        let store = store_with(&provider);
        store.start();
        store.reset_password("a@example.com").await.unwrap();
        assert!(!store.is_loading());
        assert_eq!(provider.password_resets(), vec!["a@example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_loading_sequence_observed_through_watch() {
        let provider = MemoryIdentityProvider::deferred().with_account("a@example.com", "secret1");
        let store = store_with(&provider);
        let mut rx = store.watch();
        let mut seen = vec![rx.borrow_and_update().loading];

        store.start();
        provider.announce();
        seen.push(rx.borrow_and_update().loading);

        let pending = store.inner.begin("sign_in");
        seen.push(rx.borrow_and_update().loading);
        drop(pending);
        seen.push(rx.borrow_and_update().loading);

        assert_eq!(seen, vec![true, false, true, false]);
    }

    #[tokio::test]
    async fn test_update_profile_keeps_loading() {
        let provider = MemoryIdentityProvider::new().with_account("a@example.com", "secret1");
        let store = store_with(&provider);
        store.start();
        store.sign_in_user("a@example.com", "secret1").await.unwrap();

        let updated = store
            .update_user_profile(ProfileUpdate {
                display_name: Some("Ada".to_string()),
                photo_url: None,
            })
            .await
            .unwrap();
        assert_eq!(store.current_principal(), Some(updated));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_shutdown_unsubscribes() {
        let provider = MemoryIdentityProvider::new().with_account("a@example.com", "secret1");
        let store = store_with(&provider);
        store.start();
        store.start();
        assert_eq!(provider.subscriber_count(), 1);

        store.shutdown();
        assert_eq!(provider.subscriber_count(), 0);
        assert!(!store.is_started());

        provider.sign_in("a@example.com", "secret1").await.unwrap();
        assert!(store.current_principal().is_none());

        // A fresh start picks the current state back up.
        store.start();
        assert_eq!(store.snapshot().identifier(), Some("a@example.com"));
    }
}
