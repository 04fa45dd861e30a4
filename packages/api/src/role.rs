//! # Role resolver
//!
//! Maps a principal identifier to its [`Role`] by asking the backend, never by
//! guessing from data already on hand.
//!
//! - No identifier: `Role::User` immediately, without a network call.
//! - Identifier present: one fetch per distinct identifier. The result is cached as
//!   `(role, fetched_at)` until the identifier changes ([`observe_identity`]) or the
//!   entry is dropped with [`invalidate`].
//! - Concurrent resolves for the same identifier share a single in-flight fetch and
//!   its outcome, failures included.
//! - A response without a role field yields `Role::User`. A failed fetch is logged,
//!   not cached, and also yields `Role::User`, so callers never stay loading. The
//!   next resolve after the failure has settled fetches again.
//! - Every invalidation bumps a revision that UIs can watch through
//!   [`changes`](RoleResolver::changes) to re-resolve.
//!
//! [`observe_identity`]: RoleResolver::observe_identity
//! [`invalidate`]: RoleResolver::invalidate

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio::sync::{watch, OnceCell};

use crate::client::{ApiError, SecureClient};
use crate::models::{Role, RoleResponse};

/// Backend of record for roles.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait RoleSource: Send + Sync {
    /// `Ok(None)` when the backend knows the identifier but reports no role.
    async fn fetch_role(&self, identifier: &str) -> Result<Option<Role>, ApiError>;
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl RoleSource for SecureClient {
    async fn fetch_role(&self, identifier: &str) -> Result<Option<Role>, ApiError> {
        let path = format!("/users/{}/role", urlencoding::encode(identifier));
        let body: Option<RoleResponse> = self.get_json(&path).await?;
        Ok(body.and_then(|body| body.role))
    }
}

/// A resolved role and when it was fetched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedRole {
    pub role: Role,
    pub fetched_at: DateTime<Utc>,
}

/// What a guard needs to know about the role: the value and whether it is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleStatus {
    pub role: Role,
    pub loading: bool,
}

impl RoleStatus {
    pub const fn pending() -> Self {
        Self {
            role: Role::User,
            loading: true,
        }
    }

    pub const fn resolved(role: Role) -> Self {
        Self {
            role,
            loading: false,
        }
    }
}

/// Cloneable, cached role lookup.
#[derive(Clone)]
pub struct RoleResolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    source: Arc<dyn RoleSource>,
    state: Mutex<ResolverState>,
    revision: watch::Sender<u64>,
}

/// Settled result of one fetch, shared by everyone who waited on it.
type Outcome = Result<CachedRole, ApiError>;

#[derive(Default)]
struct ResolverState {
    tracked: Option<String>,
    cache: HashMap<String, CachedRole>,
    in_flight: HashMap<String, Arc<OnceCell<Outcome>>>,
}

impl RoleResolver {
    pub fn new(source: Arc<dyn RoleSource>) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                source,
                state: Mutex::new(ResolverState::default()),
                revision: watch::channel(0).0,
            }),
        }
    }

    /// Resolve the role for `identifier`, fetching at most once per identifier.
    pub async fn resolve(&self, identifier: Option<&str>) -> Role {
        let Some(identifier) = identifier else {
            return Role::User;
        };

        let cell = {
            let mut state = self.lock();
            if let Some(hit) = state.cache.get(identifier) {
                return hit.role;
            }
            state
                .in_flight
                .entry(identifier.to_string())
                .or_default()
                .clone()
        };

        let source = self.inner.source.clone();
        let outcome = cell
            .get_or_init(|| async move {
                tracing::debug!(identifier, "Fetching role");
                let role = source.fetch_role(identifier).await?.unwrap_or_default();
                Ok::<_, ApiError>(CachedRole {
                    role,
                    fetched_at: Utc::now(),
                })
            })
            .await
            .clone();

        let mut state = self.lock();
        // The first waiter back retires the cell. An invalidation while the fetch was
        // running already retired it, and then the result is stale.
        let still_current = state
            .in_flight
            .get(identifier)
            .is_some_and(|registered| Arc::ptr_eq(registered, &cell));
        if still_current {
            state.in_flight.remove(identifier);
        }
        match outcome {
            Ok(entry) => {
                if still_current {
                    state.cache.insert(identifier.to_string(), entry);
                }
                entry.role
            }
            Err(e) => {
                if still_current {
                    tracing::warn!(identifier, error = %e, "Role lookup failed, using default role");
                }
                Role::User
            }
        }
    }

    /// Current status without triggering a fetch.
    pub fn status(&self, identifier: Option<&str>) -> RoleStatus {
        match identifier {
            None => RoleStatus::resolved(Role::User),
            Some(identifier) => match self.cached(identifier) {
                Some(hit) => RoleStatus::resolved(hit.role),
                None => RoleStatus::pending(),
            },
        }
    }

    pub fn cached(&self, identifier: &str) -> Option<CachedRole> {
        self.lock().cache.get(identifier).copied()
    }

    /// Track the signed-in identifier; any change drops every cached role.
    pub fn observe_identity(&self, identifier: Option<&str>) {
        let mut state = self.lock();
        if state.tracked.as_deref() == identifier {
            return;
        }
        tracing::debug!(?identifier, "Identity changed, clearing role cache");
        state.tracked = identifier.map(str::to_string);
        state.cache.clear();
        state.in_flight.clear();
        drop(state);
        self.bump();
    }

    /// Forget the role for one identifier so the next resolve fetches again.
    pub fn invalidate(&self, identifier: &str) {
        let mut state = self.lock();
        state.cache.remove(identifier);
        state.in_flight.remove(identifier);
        drop(state);
        self.bump();
    }

    /// Counter bumped on every invalidation.
    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    /// Receiver that wakes whenever cached roles are dropped.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    fn bump(&self) {
        self.inner.revision.send_modify(|revision| *revision += 1);
    }

    fn lock(&self) -> MutexGuard<'_, ResolverState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PartialEq for RoleResolver {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for RoleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("RoleResolver")
            .field("tracked", &state.tracked)
            .field("cached", &state.cache.len())
            .field("in_flight", &state.in_flight.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FakeTransport;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Role source that counts fetches and can hold them until released.
    struct GatedSource {
        fetches: AtomicUsize,
        active: AtomicUsize,
        peak: AtomicUsize,
        gate: Notify,
        gated: bool,
        answer: Result<Option<Role>, ApiError>,
    }

    impl GatedSource {
        fn new(answer: Result<Option<Role>, ApiError>) -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                gate: Notify::new(),
                gated: false,
                answer,
            }
        }

        fn gated(mut self) -> Self {
            self.gated = true;
            self
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }

        /// Most fetches that were ever running at the same time.
        fn peak(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl RoleSource for GatedSource {
        async fn fetch_role(&self, _identifier: &str) -> Result<Option<Role>, ApiError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let running = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(running, Ordering::SeqCst);
            if self.gated {
                self.gate.notified().await;
            }
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    #[tokio::test]
    async fn test_no_identifier_is_user_without_fetch() {
        let source = Arc::new(GatedSource::new(Ok(Some(Role::Admin))));
        let resolver = RoleResolver::new(source.clone());
        assert_eq!(resolver.resolve(None).await, Role::User);
        assert_eq!(resolver.status(None), RoleStatus::resolved(Role::User));
        assert_eq!(source.fetches(), 0);
    }

    #[tokio::test]
    async fn test_result_is_memoized() {
        let source = Arc::new(GatedSource::new(Ok(Some(Role::Rider))));
        let resolver = RoleResolver::new(source.clone());
        assert_eq!(resolver.status(Some("r@example.com")), RoleStatus::pending());

        assert_eq!(resolver.resolve(Some("r@example.com")).await, Role::Rider);
        assert_eq!(resolver.resolve(Some("r@example.com")).await, Role::Rider);
        assert_eq!(source.fetches(), 1);
        assert_eq!(
            resolver.status(Some("r@example.com")),
            RoleStatus::resolved(Role::Rider)
        );
        assert!(resolver.cached("r@example.com").unwrap().fetched_at <= Utc::now());
    }

    #[tokio::test]
    async fn test_concurrent_resolves_share_one_fetch() {
        let source = Arc::new(GatedSource::new(Ok(Some(Role::Admin))).gated());
        let resolver = RoleResolver::new(source.clone());

        let release = async {
            // Let every resolver reach the shared in-flight fetch first.
            for _ in 0..5 {
                tokio::task::yield_now().await;
            }
            source.gate.notify_one();
        };
        let (a, b, c, ()) = tokio::join!(
            resolver.resolve(Some("x@example.com")),
            resolver.resolve(Some("x@example.com")),
            resolver.resolve(Some("x@example.com")),
            release,
        );
        assert_eq!((a, b, c), (Role::Admin, Role::Admin, Role::Admin));
        assert_eq!(source.fetches(), 1);
        assert_eq!(source.peak(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_resolves_share_one_failed_fetch() {
        let failure = Err(ApiError::Network("connection reset".to_string()));
        let source = Arc::new(GatedSource::new(failure).gated());
        let resolver = RoleResolver::new(source.clone());

        let release = async {
            for _ in 0..5 {
                tokio::task::yield_now().await;
            }
            source.gate.notify_one();
        };
        let (a, b, c, ()) = tokio::join!(
            resolver.resolve(Some("x@example.com")),
            resolver.resolve(Some("x@example.com")),
            resolver.resolve(Some("x@example.com")),
            release,
        );
        assert_eq!((a, b, c), (Role::User, Role::User, Role::User));
        assert_eq!(source.fetches(), 1);
        assert_eq!(source.peak(), 1);
        assert_eq!(resolver.status(Some("x@example.com")), RoleStatus::pending());

        // Once the failure has settled, the next resolve retries on its own.
        source.gate.notify_one();
        assert_eq!(resolver.resolve(Some("x@example.com")).await, Role::User);
        assert_eq!(source.fetches(), 2);
        assert_eq!(source.peak(), 1);
    }

    #[tokio::test]
    async fn test_resolve_during_failed_fetch_joins_it() {
        let failure = Err(ApiError::Network("connection reset".to_string()));
        let source = Arc::new(GatedSource::new(failure).gated());
        let resolver = RoleResolver::new(source.clone());

        let late = async {
            tokio::task::yield_now().await;
            let joined = resolver.resolve(Some("x@example.com"));
            source.gate.notify_one();
            joined.await
        };
        let (first, second) = tokio::join!(resolver.resolve(Some("x@example.com")), late);
        assert_eq!((first, second), (Role::User, Role::User));
        assert_eq!(source.fetches(), 1);
        assert_eq!(source.peak(), 1);
    }

    #[tokio::test]
    async fn test_missing_role_field_defaults_to_user() {
        let transport = FakeTransport::new();
        transport.respond(200, "{}");
        let client = SecureClient::new("http://api.test", Arc::new(transport.clone()));
        let resolver = RoleResolver::new(Arc::new(client));

        assert_eq!(resolver.resolve(Some("x@example.com")).await, Role::User);
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://api.test/users/x%40example.com/role");
        assert_eq!(
            resolver.status(Some("x@example.com")),
            RoleStatus::resolved(Role::User)
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_user_and_is_not_cached() {
        let transport = FakeTransport::new();
        transport.respond(500, "boom").respond(200, r#"{"role":"admin"}"#);
        let client = SecureClient::new("http://api.test", Arc::new(transport.clone()));
        let resolver = RoleResolver::new(Arc::new(client));

        assert_eq!(resolver.resolve(Some("x@example.com")).await, Role::User);
        assert_eq!(resolver.status(Some("x@example.com")), RoleStatus::pending());
        assert_eq!(resolver.resolve(Some("x@example.com")).await, Role::Admin);
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_identity_change_invalidates_cache() {
        let source = Arc::new(GatedSource::new(Ok(Some(Role::Rider))));
        let resolver = RoleResolver::new(source.clone());

        resolver.observe_identity(Some("a@example.com"));
        resolver.resolve(Some("a@example.com")).await;
        resolver.observe_identity(Some("a@example.com"));
        assert!(resolver.cached("a@example.com").is_some());

        resolver.observe_identity(None);
        assert!(resolver.cached("a@example.com").is_none());

        resolver.observe_identity(Some("a@example.com"));
        resolver.resolve(Some("a@example.com")).await;
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn test_manual_invalidation_refetches() {
        let source = Arc::new(GatedSource::new(Ok(None)));
        let resolver = RoleResolver::new(source.clone());
        resolver.resolve(Some("a@example.com")).await;
        resolver.invalidate("a@example.com");
        assert_eq!(resolver.status(Some("a@example.com")), RoleStatus::pending());
        assert_eq!(resolver.resolve(Some("a@example.com")).await, Role::User);
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn test_invalidation_bumps_revision() {
        let source = Arc::new(GatedSource::new(Ok(Some(Role::Rider))));
        let resolver = RoleResolver::new(source);
        let mut changes = resolver.changes();
        assert_eq!(resolver.revision(), 0);

        resolver.invalidate("a@example.com");
        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), 1);

        resolver.observe_identity(Some("a@example.com"));
        resolver.observe_identity(Some("a@example.com"));
        assert_eq!(resolver.revision(), 2);
        assert_eq!(*changes.borrow_and_update(), 2);
    }

    #[tokio::test]
    async fn test_invalidation_during_fetch_discards_result() {
        let source = Arc::new(GatedSource::new(Ok(Some(Role::Admin))).gated());
        let resolver = RoleResolver::new(source.clone());

        let invalidate = async {
            tokio::task::yield_now().await;
            resolver.observe_identity(Some("someone-else@example.com"));
            source.gate.notify_one();
        };
        let (role, ()) = tokio::join!(resolver.resolve(Some("a@example.com")), invalidate);
        assert_eq!(role, Role::Admin);
        assert!(resolver.cached("a@example.com").is_none());
    }
}
