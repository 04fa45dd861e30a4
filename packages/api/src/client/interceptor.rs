//! Request/response interceptors and their scoped registration.

use std::sync::{Arc, Mutex};

use super::{ApiError, ApiRequest};
use crate::auth::SessionStore;
use crate::navigation::{Navigator, LOGIN_PATH};
use crate::subscription::{Registry, Subscription};

/// Runs on every outgoing request, in registration order.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait RequestInterceptor: Send + Sync {
    /// Returning an error aborts this request only.
    async fn on_request(&self, request: ApiRequest) -> Result<ApiRequest, ApiError>;
}

/// Observes failed requests. The error is always handed back to the caller afterwards.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait ResponseInterceptor: Send + Sync {
    async fn on_error(&self, error: &ApiError);
}

/// Interceptors attached to one client.
#[derive(Clone, Default)]
pub struct Interceptors {
    request: Registry<dyn RequestInterceptor>,
    response: Registry<dyn ResponseInterceptor>,
}

impl Interceptors {
    pub fn register_request(&self, interceptor: Arc<dyn RequestInterceptor>) -> Subscription {
        self.request.add(interceptor)
    }

    pub fn register_response(&self, interceptor: Arc<dyn ResponseInterceptor>) -> Subscription {
        self.response.add(interceptor)
    }

    pub fn request_interceptors(&self) -> Vec<Arc<dyn RequestInterceptor>> {
        self.request.snapshot()
    }

    pub fn response_interceptors(&self) -> Vec<Arc<dyn ResponseInterceptor>> {
        self.response.snapshot()
    }

    /// `(request, response)` interceptor counts.
    pub fn counts(&self) -> (usize, usize) {
        (self.request.len(), self.response.len())
    }
}

/// Attaches a freshly minted bearer token when someone is signed in.
pub struct BearerToken {
    session: SessionStore,
}

impl BearerToken {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl RequestInterceptor for BearerToken {
    async fn on_request(&self, mut request: ApiRequest) -> Result<ApiRequest, ApiError> {
        let Some(principal) = self.session.current_principal() else {
            return Ok(request);
        };
        let token = principal.id_token().await.map_err(|e| {
            tracing::warn!(url = %request.url, error = %e, "Could not mint bearer token");
            ApiError::Credential(e)
        })?;
        request.set_bearer(&token)?;
        Ok(request)
    }
}

/// On a 401: end the session, then send the client to the login view.
pub struct LogoutOnUnauthorized {
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl LogoutOnUnauthorized {
    pub fn new(session: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl ResponseInterceptor for LogoutOnUnauthorized {
    async fn on_error(&self, error: &ApiError) {
        if !error.is_unauthorized() {
            return;
        }
        tracing::info!("Backend rejected credentials, signing out");
        if let Err(e) = self.session.logout().await {
            tracing::warn!(error = %e, "Sign-out after 401 failed");
        }
        self.navigator.navigate(LOGIN_PATH);
    }
}

/// The pair of registrations made by [`SecureClient::install`](super::SecureClient::install).
///
/// Dropping it (or calling [`eject`](InstalledInterceptors::eject)) removes both
/// interceptors, so a remount never ends up with duplicates.
#[derive(Debug)]
pub struct InstalledInterceptors {
    registrations: Mutex<Vec<Subscription>>,
}

impl InstalledInterceptors {
    pub(crate) fn new(registrations: Vec<Subscription>) -> Self {
        Self {
            registrations: Mutex::new(registrations),
        }
    }

    pub fn eject(&self) {
        let registrations =
            std::mem::take(&mut *self.registrations.lock().unwrap_or_else(|e| e.into_inner()));
        for registration in registrations {
            registration.unsubscribe();
        }
    }
}
