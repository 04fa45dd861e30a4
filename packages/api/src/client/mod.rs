//! # Authenticated request pipeline
//!
//! [`SecureClient`] sends every backend call through the same steps:
//!
//! 1. Each registered [`RequestInterceptor`] runs in order. [`BearerToken`] mints a
//!    fresh token for the signed-in principal and sets `Authorization: Bearer <token>`;
//!    with nobody signed in the request goes out unmodified. An interceptor error
//!    aborts this request only.
//! 2. The request is handed to the [`HttpTransport`]. Non-success statuses become
//!    [`ApiError::Status`].
//! 3. On failure every [`ResponseInterceptor`] sees the error before it is returned to
//!    the caller. [`LogoutOnUnauthorized`] signs out and redirects to the login view on a
//!    401; all other statuses pass through untouched.
//!
//! Interceptors are not baked into the client. [`SecureClient::install`] registers the
//! standard pair and returns an [`InstalledInterceptors`] guard that ejects them again,
//! so their lifetime follows whatever owns the guard (typically the root component).

mod error;
mod interceptor;
mod transport;

pub use error::ApiError;
pub use interceptor::{
    BearerToken, InstalledInterceptors, Interceptors, LogoutOnUnauthorized, RequestInterceptor,
    ResponseInterceptor,
};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport, RequestBody};

#[cfg(test)]
pub(crate) use transport::fake::FakeTransport;

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::SessionStore;
use crate::navigation::Navigator;

/// HTTP client for the backend REST API.
#[derive(Clone)]
pub struct SecureClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    interceptors: Interceptors,
}

impl SecureClient {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            interceptors: Interceptors::default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    /// Register bearer-token injection and 401 handling for `session`.
    pub fn install(
        &self,
        session: &SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> InstalledInterceptors {
        let request = self
            .interceptors
            .register_request(Arc::new(BearerToken::new(session.clone())));
        let response = self
            .interceptors
            .register_response(Arc::new(LogoutOnUnauthorized::new(session.clone(), navigator)));
        InstalledInterceptors::new(vec![request, response])
    }

    /// Absolute URL for a path relative to the API base.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn request(&self, method: Method, path: &str) -> ApiRequest {
        ApiRequest::new(method, self.url(path))
    }

    /// Run `request` through the pipeline.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let result = self.dispatch(request).await;
        if let Err(error) = &result {
            for interceptor in self.interceptors.response_interceptors() {
                interceptor.on_error(error).await;
            }
        }
        result
    }

    async fn dispatch(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        for interceptor in self.interceptors.request_interceptors() {
            request = interceptor.on_request(request).await?;
        }
        let method = request.method.clone();
        let url = request.url.clone();
        tracing::debug!(%method, %url, authenticated = request.bearer().is_some(), "Sending request");
        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(%method, %url, error = %e, "Request failed");
            e
        })?;
        tracing::debug!(%method, %url, status = %response.status, "Received response");
        response.error_for_status()
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path)).await?.json()
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::POST, path).json(serde_json::to_value(body)?);
        self.send(request).await?.json()
    }

    pub async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::PATCH, path).json(serde_json::to_value(body)?);
        self.send(request).await?.json()
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

impl PartialEq for SecureClient {
    fn eq(&self, other: &Self) -> bool {
        self.base_url == other.base_url && Arc::ptr_eq(&self.transport, &other.transport)
    }
}

impl std::fmt::Debug for SecureClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureClient")
            .field("base_url", &self.base_url)
            .field("interceptors", &self.interceptors.counts())
            .finish_non_exhaustive()
    }
}
