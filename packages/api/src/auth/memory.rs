//! In-process identity provider backing the session and pipeline tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::provider::{validate_registration, Listeners};
use super::{AuthStateListener, IdentityError, IdentityProvider};
use crate::models::{FederatedCredential, Principal, ProfileUpdate, TokenSource};
use crate::subscription::Subscription;

/// In-memory [`IdentityProvider`] with scripted accounts.
///
/// By default a new subscriber immediately receives the current state, the way a
/// hosted provider does once it has finished initialising. Use
/// [`deferred`](MemoryIdentityProvider::deferred) to hold that first notification
/// back until [`announce`](MemoryIdentityProvider::announce) is called.
#[derive(Clone)]
pub struct MemoryIdentityProvider {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    state: Mutex<MemoryState>,
    listeners: Listeners,
}

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<String, Account>,
    current: Option<(Principal, Arc<MemoryTokens>)>,
    announced: bool,
    password_resets: Vec<String>,
    next_uid: u64,
}

#[derive(Clone)]
struct Account {
    uid: String,
    email: Option<String>,
    password: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
}

struct MemoryTokens {
    uid: String,
    issued: AtomicU64,
    revoked: AtomicBool,
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl TokenSource for MemoryTokens {
    async fn id_token(&self) -> Result<String, IdentityError> {
        if self.revoked.load(Ordering::SeqCst) {
            return Err(IdentityError::TokenExpired);
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(format!("memory.{}.{}", self.uid, n))
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        let provider = Self::deferred();
        provider.lock().announced = true;
        provider
    }

    /// A provider that stays silent towards subscribers until [`announce`](Self::announce).
    pub fn deferred() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                state: Mutex::new(MemoryState::default()),
                listeners: Listeners::default(),
            }),
        }
    }

    /// Seed an email/password account.
    pub fn with_account(self, email: &str, password: &str) -> Self {
        {
            let mut state = self.lock();
            let uid = state.next_uid();
            state.accounts.insert(
                normalize(email),
                Account {
                    uid,
                    email: Some(normalize(email)),
                    password: Some(password.to_string()),
                    display_name: None,
                    photo_url: None,
                },
            );
        }
        self
    }

    /// Finish "initialising": tell every subscriber about the current state.
    pub fn announce(&self) {
        let current = {
            let mut state = self.lock();
            state.announced = true;
            state.current_principal()
        };
        self.inner.listeners.notify(current);
    }

    /// Make every token minted for the current principal fail from now on.
    pub fn revoke_tokens(&self) {
        if let Some((_, tokens)) = &self.lock().current {
            tokens.revoked.store(true, Ordering::SeqCst);
        }
    }

    /// Number of tokens minted for the current principal.
    pub fn issued_tokens(&self) -> u64 {
        self.lock()
            .current
            .as_ref()
            .map(|(_, tokens)| tokens.issued.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Emails a password reset was sent to, oldest first.
    pub fn password_resets(&self) -> Vec<String> {
        self.lock().password_resets.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn activate(&self, account: &Account) -> Principal {
        let tokens = Arc::new(MemoryTokens {
            uid: account.uid.clone(),
            issued: AtomicU64::new(0),
            revoked: AtomicBool::new(false),
        });
        let mut principal = Principal::new(account.uid.clone(), tokens.clone())
            .with_display_name(account.display_name.clone())
            .with_photo_url(account.photo_url.clone());
        principal.email = account.email.clone();

        {
            let mut state = self.lock();
            if let Some((_, previous)) = state.current.take() {
                previous.revoked.store(true, Ordering::SeqCst);
            }
            state.current = Some((principal.clone(), tokens));
            state.announced = true;
        }
        self.inner.listeners.notify(Some(principal.clone()));
        principal
    }
}

impl MemoryState {
    fn next_uid(&mut self) -> String {
        self.next_uid += 1;
        format!("uid-{}", self.next_uid)
    }

    fn current_principal(&self) -> Option<Principal> {
        self.current.as_ref().map(|(principal, _)| principal.clone())
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl IdentityProvider for MemoryIdentityProvider {
    fn subscribe(&self, listener: Arc<AuthStateListener>) -> Subscription {
        let subscription = self.inner.listeners.add(listener.clone());
        let initial = {
            let state = self.lock();
            state.announced.then(|| state.current_principal())
        };
        if let Some(principal) = initial {
            listener(principal);
        }
        subscription
    }

    fn current_principal(&self) -> Option<Principal> {
        self.lock().current_principal()
    }

    async fn register(&self, email: &str, password: &str) -> Result<Principal, IdentityError> {
        validate_registration(email, password)?;
        let account = {
            let mut state = self.lock();
            let key = normalize(email);
            if state.accounts.contains_key(&key) {
                return Err(IdentityError::EmailExists);
            }
            let account = Account {
                uid: state.next_uid(),
                email: Some(key.clone()),
                password: Some(password.to_string()),
                display_name: None,
                photo_url: None,
            };
            state.accounts.insert(key, account.clone());
            account
        };
        Ok(self.activate(&account))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, IdentityError> {
        let account = {
            let state = self.lock();
            let account = state
                .accounts
                .get(&normalize(email))
                .ok_or(IdentityError::UnknownAccount)?;
            if account.password.as_deref() != Some(password) {
                return Err(IdentityError::InvalidCredentials);
            }
            account.clone()
        };
        Ok(self.activate(&account))
    }

    async fn sign_in_with_federated(
        &self,
        credential: FederatedCredential,
    ) -> Result<Principal, IdentityError> {
        if credential.id_token.trim().is_empty() {
            return Err(IdentityError::InvalidCredentials);
        }
        let account = {
            let mut state = self.lock();
            let key = format!("{}:{}", credential.provider_id, credential.id_token);
            if let Some(existing) = state.accounts.get(&key) {
                existing.clone()
            } else {
                let account = Account {
                    uid: state.next_uid(),
                    email: None,
                    password: None,
                    display_name: None,
                    photo_url: None,
                };
                state.accounts.insert(key, account.clone());
                account
            }
        };
        Ok(self.activate(&account))
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        {
            let mut state = self.lock();
            if let Some((_, tokens)) = state.current.take() {
                tokens.revoked.store(true, Ordering::SeqCst);
            }
            state.announced = true;
        }
        self.inner.listeners.notify(None);
        Ok(())
    }

    async fn update_profile(&self, update: ProfileUpdate) -> Result<Principal, IdentityError> {
        let mut state = self.lock();
        let (principal, tokens) = state.current.take().ok_or(IdentityError::NotSignedIn)?;
        let principal = principal.apply(&update);
        if let Some(account) = state
            .accounts
            .values_mut()
            .find(|account| account.uid == principal.uid)
        {
            account.display_name = principal.display_name.clone();
            account.photo_url = principal.photo_url.clone();
        }
        state.current = Some((principal.clone(), tokens));
        Ok(principal)
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        let mut state = self.lock();
        let key = normalize(email);
        if !state.accounts.contains_key(&key) {
            return Err(IdentityError::UnknownAccount);
        }
        state.password_resets.push(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    fn recorder() -> (Arc<StdMutex<Vec<Option<String>>>>, Arc<AuthStateListener>) {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();
        let listener: Arc<AuthStateListener> = Arc::new(move |principal: Option<Principal>| {
            sink.lock()
                .unwrap()
                .push(principal.map(|p| p.identifier().to_string()));
        });
        (seen, listener)
    }

    #[tokio::test]
    async fn test_subscribe_receives_current_state() {
        let provider = MemoryIdentityProvider::new().with_account("a@example.com", "secret1");
        let (seen, listener) = recorder();
        let _sub = provider.subscribe(listener);
        assert_eq!(*seen.lock().unwrap(), vec![None]);

        provider.sign_in("A@example.com", "secret1").await.unwrap();
        provider.sign_out().await.unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![None, Some("a@example.com".to_string()), None]
        );
    }

    #[tokio::test]
    async fn test_deferred_waits_for_announce() {
        let provider = MemoryIdentityProvider::deferred();
        let (seen, listener) = recorder();
        let sub = provider.subscribe(listener);
        assert!(seen.lock().unwrap().is_empty());

        provider.announce();
        assert_eq!(*seen.lock().unwrap(), vec![None]);

        sub.unsubscribe();
        assert_eq!(provider.subscriber_count(), 0);
        provider.announce();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_register_validation_and_duplicates() {
        let provider = MemoryIdentityProvider::new();
        assert_eq!(
            provider.register("not-an-email", "secret1").await.unwrap_err(),
            IdentityError::InvalidEmail
        );
        assert_eq!(
            provider.register("a@example.com", "123").await.unwrap_err(),
            IdentityError::WeakPassword
        );
        let principal = provider.register("a@example.com", "secret1").await.unwrap();
        assert_eq!(principal.email.as_deref(), Some("a@example.com"));
        assert_eq!(provider.current_principal(), Some(principal));
        assert_eq!(
            provider.register("a@example.com", "secret2").await.unwrap_err(),
            IdentityError::EmailExists
        );
    }

    #[tokio::test]
    async fn test_sign_in_errors() {
        let provider = MemoryIdentityProvider::new().with_account("a@example.com", "secret1");
        assert_eq!(
            provider.sign_in("b@example.com", "secret1").await.unwrap_err(),
            IdentityError::UnknownAccount
        );
        assert_eq!(
            provider.sign_in("a@example.com", "wrong").await.unwrap_err(),
            IdentityError::InvalidCredentials
        );
        assert!(provider.current_principal().is_none());
    }

    #[tokio::test]
    async fn test_tokens_are_fresh_and_revoked_on_sign_out() {
        let provider = MemoryIdentityProvider::new().with_account("a@example.com", "secret1");
        let principal = provider.sign_in("a@example.com", "secret1").await.unwrap();
        let first = principal.id_token().await.unwrap();
        let second = principal.id_token().await.unwrap();
        assert_ne!(first, second);
        assert_eq!(provider.issued_tokens(), 2);

        provider.sign_out().await.unwrap();
        assert_eq!(principal.id_token().await.unwrap_err(), IdentityError::TokenExpired);
    }

    #[tokio::test]
    async fn test_federated_sign_in_reuses_account() {
        let provider = MemoryIdentityProvider::new();
        let first = provider
            .sign_in_with_federated(FederatedCredential::google("google-subject"))
            .await
            .unwrap();
        provider.sign_out().await.unwrap();
        let second = provider
            .sign_in_with_federated(FederatedCredential::google("google-subject"))
            .await
            .unwrap();
        assert_eq!(first.uid, second.uid);
    }

    #[tokio::test]
    async fn test_update_profile_and_reset() {
        let provider = MemoryIdentityProvider::new().with_account("a@example.com", "secret1");
        assert_eq!(
            provider.update_profile(ProfileUpdate::default()).await.unwrap_err(),
            IdentityError::NotSignedIn
        );
        provider.sign_in("a@example.com", "secret1").await.unwrap();
        let updated = provider
            .update_profile(ProfileUpdate {
                display_name: Some("Ada".to_string()),
                photo_url: None,
            })
            .await
            .unwrap();
        assert_eq!(updated.display_name(), "Ada");

        provider.send_password_reset("a@example.com").await.unwrap();
        assert_eq!(
            provider.send_password_reset("nobody@example.com").await.unwrap_err(),
            IdentityError::UnknownAccount
        );
        assert_eq!(provider.password_resets(), vec!["a@example.com".to_string()]);
    }
}
