//! Identity provider backed by the hosted identity-toolkit REST API.
//!
//! Email/password and federated sign-in exchange credentials for an ID token and a
//! refresh token. The ID token is handed out as the bearer token until it is within
//! [`REFRESH_MARGIN_SECS`] of expiry, after which the refresh token is traded for a
//! new one. Signing out is local: the token pair is dropped and can no longer mint.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::provider::{validate_registration, Listeners};
use super::{AuthStateListener, IdentityError, IdentityProvider};
use crate::client::{ApiError, ApiRequest, HttpTransport};
use crate::models::{FederatedCredential, Principal, ProfileUpdate, TokenSource};
use crate::subscription::Subscription;

/// Tokens closer than this to expiry are refreshed before use.
pub const REFRESH_MARGIN_SECS: i64 = 60;

const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Where the identity-toolkit endpoints live and which project key to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityEndpoints {
    pub api_key: String,
    /// Base of the `accounts:*` endpoints.
    pub accounts_url: String,
    /// Secure-token refresh endpoint.
    pub token_url: String,
}

impl IdentityEndpoints {
    pub const DEFAULT_ACCOUNTS_URL: &'static str = "https://identitytoolkit.googleapis.com/v1";
    pub const DEFAULT_TOKEN_URL: &'static str = "https://securetoken.googleapis.com/v1/token";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            accounts_url: Self::DEFAULT_ACCOUNTS_URL.to_string(),
            token_url: Self::DEFAULT_TOKEN_URL.to_string(),
        }
    }

    pub fn with_urls(mut self, accounts_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        self.accounts_url = accounts_url.into().trim_end_matches('/').to_string();
        self.token_url = token_url.into();
        self
    }

    fn account_method(&self, method: &str) -> String {
        format!(
            "{}/accounts:{method}?key={}",
            self.accounts_url,
            urlencoding::encode(&self.api_key)
        )
    }

    fn refresh(&self) -> String {
        format!("{}?key={}", self.token_url, urlencoding::encode(&self.api_key))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default, alias = "profilePicture")]
    photo_url: Option<String>,
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Send `request` and decode the JSON answer, mapping failures to [`IdentityError`].
async fn exchange<T: DeserializeOwned>(
    transport: &dyn HttpTransport,
    request: ApiRequest,
) -> Result<T, IdentityError> {
    let response = transport.send(request).await.map_err(|e| match e {
        ApiError::Network(message) => IdentityError::Network(message),
        other => IdentityError::Network(other.to_string()),
    })?;
    if !response.is_success() {
        return Err(match serde_json::from_str::<ErrorEnvelope>(&response.body) {
            Ok(envelope) => IdentityError::from_code(&envelope.error.message),
            Err(_) => IdentityError::Provider(format!(
                "Identity provider answered {}",
                response.status
            )),
        });
    }
    response
        .json()
        .map_err(|e| IdentityError::Provider(format!("Unexpected identity response: {e}")))
}

fn expiry(expires_in: Option<&str>) -> DateTime<Utc> {
    let seconds = expires_in
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_EXPIRES_IN);
    Utc::now() + Duration::seconds(seconds)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

struct TokenState {
    id_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
    revoked: bool,
}

/// Token pair of the signed-in account.
struct RestTokens {
    endpoints: Arc<IdentityEndpoints>,
    transport: Arc<dyn HttpTransport>,
    state: Mutex<TokenState>,
}

impl RestTokens {
    fn new(
        endpoints: Arc<IdentityEndpoints>,
        transport: Arc<dyn HttpTransport>,
        id_token: String,
        refresh_token: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            endpoints,
            transport,
            state: Mutex::new(TokenState {
                id_token,
                refresh_token,
                expires_at,
                revoked: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TokenState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn revoke(&self) {
        self.lock().revoked = true;
    }

    fn refresh_token(&self) -> Option<String> {
        let state = self.lock();
        (!state.revoked).then(|| state.refresh_token.clone())
    }
}

/// Trade a refresh token for a new token pair.
async fn refresh(
    endpoints: &IdentityEndpoints,
    transport: &dyn HttpTransport,
    refresh_token: &str,
) -> Result<RefreshResponse, IdentityError> {
    tracing::debug!("Refreshing identity token");
    let request = ApiRequest::post(endpoints.refresh()).form(vec![
        ("grant_type".to_string(), "refresh_token".to_string()),
        ("refresh_token".to_string(), refresh_token.to_string()),
    ]);
    exchange(transport, request).await
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl TokenSource for RestTokens {
    async fn id_token(&self) -> Result<String, IdentityError> {
        let refresh_token = {
            let state = self.lock();
            if state.revoked {
                return Err(IdentityError::TokenExpired);
            }
            if state.expires_at - Utc::now() > Duration::seconds(REFRESH_MARGIN_SECS) {
                return Ok(state.id_token.clone());
            }
            state.refresh_token.clone()
        };

        let fresh = refresh(&self.endpoints, self.transport.as_ref(), &refresh_token).await?;
        let mut state = self.lock();
        if state.revoked {
            return Err(IdentityError::TokenExpired);
        }
        state.id_token = fresh.id_token;
        state.refresh_token = fresh.refresh_token;
        state.expires_at = expiry(fresh.expires_in.as_deref());
        Ok(state.id_token.clone())
    }
}

/// [`IdentityProvider`] talking to the identity-toolkit REST API.
#[derive(Clone)]
pub struct RestIdentityProvider {
    inner: Arc<RestInner>,
}

struct RestInner {
    endpoints: Arc<IdentityEndpoints>,
    transport: Arc<dyn HttpTransport>,
    state: Mutex<RestState>,
    listeners: Listeners,
}

struct RestState {
    current: Option<(Principal, Arc<RestTokens>)>,
    announced: bool,
}

impl RestIdentityProvider {
    /// A provider that starts signed out and tells subscribers so immediately.
    pub fn new(endpoints: IdentityEndpoints, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            inner: Arc::new(RestInner {
                endpoints: Arc::new(endpoints),
                transport,
                state: Mutex::new(RestState {
                    current: None,
                    announced: true,
                }),
                listeners: Listeners::default(),
            }),
        }
    }

    /// Hold the first notification back until [`restore`](Self::restore) has run.
    pub fn with_pending_restore(self) -> Self {
        self.lock().announced = false;
        self
    }

    /// Resume a persisted sign-in from its refresh token, then announce the result.
    ///
    /// A refresh token the provider no longer accepts ends in the signed-out state.
    pub async fn restore(&self, refresh_token: Option<String>) -> Option<Principal> {
        let restored = match refresh_token {
            Some(token) => match self.resume(&token).await {
                Ok(principal) => Some(principal),
                Err(e) => {
                    tracing::warn!(error = %e, "Could not restore previous sign-in");
                    None
                }
            },
            None => None,
        };
        if restored.is_none() {
            self.lock().announced = true;
            self.inner.listeners.notify(None);
        }
        restored
    }

    /// Refresh token of the signed-in account, for persisting across reloads.
    pub fn refresh_token(&self) -> Option<String> {
        self.lock()
            .current
            .as_ref()
            .and_then(|(_, tokens)| tokens.refresh_token())
    }

    pub fn endpoints(&self) -> &IdentityEndpoints {
        &self.inner.endpoints
    }

    async fn resume(&self, refresh_token: &str) -> Result<Principal, IdentityError> {
        let fresh = refresh(
            &self.inner.endpoints,
            self.inner.transport.as_ref(),
            refresh_token,
        )
        .await?;
        let lookup: LookupResponse = self
            .post("lookup", json!({ "idToken": fresh.id_token }))
            .await?;
        let account = lookup
            .users
            .into_iter()
            .next()
            .ok_or(IdentityError::UnknownAccount)?;
        let tokens = self.tokens(fresh.id_token, fresh.refresh_token, fresh.expires_in.as_deref());
        Ok(self.activate(account, tokens))
    }

    async fn post<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, IdentityError> {
        let request = ApiRequest::post(self.inner.endpoints.account_method(method)).json(body);
        exchange(self.inner.transport.as_ref(), request).await
    }

    fn tokens(
        &self,
        id_token: String,
        refresh_token: String,
        expires_in: Option<&str>,
    ) -> Arc<RestTokens> {
        Arc::new(RestTokens::new(
            self.inner.endpoints.clone(),
            self.inner.transport.clone(),
            id_token,
            refresh_token,
            expiry(expires_in),
        ))
    }

    fn authenticated(&self, response: AuthResponse) -> Principal {
        let tokens = self.tokens(
            response.id_token,
            response.refresh_token,
            response.expires_in.as_deref(),
        );
        let account = AccountInfo {
            local_id: response.local_id,
            email: response.email,
            display_name: response.display_name,
            photo_url: response.photo_url,
        };
        self.activate(account, tokens)
    }

    fn activate(&self, account: AccountInfo, tokens: Arc<RestTokens>) -> Principal {
        let mut principal = Principal::new(account.local_id, tokens.clone())
            .with_display_name(non_empty(account.display_name))
            .with_photo_url(non_empty(account.photo_url));
        principal.email = non_empty(account.email);

        {
            let mut state = self.lock();
            if let Some((_, previous)) = state.current.take() {
                previous.revoke();
            }
            state.current = Some((principal.clone(), tokens));
            state.announced = true;
        }
        tracing::info!(uid = %principal.uid, "Signed in");
        self.inner.listeners.notify(Some(principal.clone()));
        principal
    }

    fn lock(&self) -> MutexGuard<'_, RestState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl IdentityProvider for RestIdentityProvider {
    fn subscribe(&self, listener: Arc<AuthStateListener>) -> Subscription {
        let subscription = self.inner.listeners.add(listener.clone());
        let initial = {
            let state = self.lock();
            state
                .announced
                .then(|| state.current.as_ref().map(|(principal, _)| principal.clone()))
        };
        if let Some(principal) = initial {
            listener(principal);
        }
        subscription
    }

    fn current_principal(&self) -> Option<Principal> {
        self.lock()
            .current
            .as_ref()
            .map(|(principal, _)| principal.clone())
    }

    async fn register(&self, email: &str, password: &str) -> Result<Principal, IdentityError> {
        validate_registration(email, password)?;
        let response: AuthResponse = self
            .post(
                "signUp",
                json!({ "email": email.trim(), "password": password, "returnSecureToken": true }),
            )
            .await?;
        Ok(self.authenticated(response))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, IdentityError> {
        let response: AuthResponse = self
            .post(
                "signInWithPassword",
                json!({ "email": email.trim(), "password": password, "returnSecureToken": true }),
            )
            .await?;
        Ok(self.authenticated(response))
    }

    async fn sign_in_with_federated(
        &self,
        credential: FederatedCredential,
    ) -> Result<Principal, IdentityError> {
        let post_body = format!(
            "id_token={}&providerId={}",
            urlencoding::encode(&credential.id_token),
            urlencoding::encode(&credential.provider_id)
        );
        let response: AuthResponse = self
            .post(
                "signInWithIdp",
                json!({
                    "postBody": post_body,
                    "requestUri": "http://localhost",
                    "returnSecureToken": true,
                    "returnIdpCredential": true,
                }),
            )
            .await?;
        Ok(self.authenticated(response))
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        {
            let mut state = self.lock();
            if let Some((_, tokens)) = state.current.take() {
                tokens.revoke();
            }
            state.announced = true;
        }
        tracing::info!("Signed out");
        self.inner.listeners.notify(None);
        Ok(())
    }

    async fn update_profile(&self, update: ProfileUpdate) -> Result<Principal, IdentityError> {
        let (principal, tokens) = self
            .lock()
            .current
            .clone()
            .ok_or(IdentityError::NotSignedIn)?;
        let id_token = tokens.id_token().await?;

        let mut body = json!({ "idToken": id_token, "returnSecureToken": false });
        if let Some(name) = &update.display_name {
            body["displayName"] = json!(name);
        }
        if let Some(photo) = &update.photo_url {
            body["photoUrl"] = json!(photo);
        }
        let _: AccountInfo = self.post("update", body).await?;

        let updated = principal.apply(&update);
        let mut state = self.lock();
        match &mut state.current {
            Some((current, _)) if current.uid == updated.uid => *current = updated.clone(),
            _ => return Err(IdentityError::NotSignedIn),
        }
        Ok(updated)
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        let _: serde_json::Value = self
            .post(
                "sendOobCode",
                json!({ "requestType": "PASSWORD_RESET", "email": email.trim() }),
            )
            .await?;
        Ok(())
    }
}
