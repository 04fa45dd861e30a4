//! Runtime settings: backend base URL, image host and identity provider keys.
//!
//! Native builds layer defaults, an optional `config.toml` and the environment
//! (`API_URL`, `IMAGEHOST_KEY`, `IDENTITY_KEY`, ...) after loading `.env`.
//! The browser has no environment, so wasm builds bake the same keys in at compile time.

#[cfg(not(target_arch = "wasm32"))]
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::auth::IdentityEndpoints;

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_IMAGEHOST_URL: &str = "https://api.imgbb.com/1/upload";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Api {
    pub url: String,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageHostSettings {
    pub key: String,
    pub url: String,
}

impl Default for ImageHostSettings {
    fn default() -> Self {
        Self {
            key: String::new(),
            url: DEFAULT_IMAGEHOST_URL.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Identity {
    pub key: String,
    pub url: String,
    /// Secure-token refresh endpoint.
    pub refresh: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            key: String::new(),
            url: IdentityEndpoints::DEFAULT_ACCOUNTS_URL.into(),
            refresh: IdentityEndpoints::DEFAULT_TOKEN_URL.into(),
        }
    }
}

impl Identity {
    pub fn endpoints(&self) -> IdentityEndpoints {
        IdentityEndpoints::new(self.key.clone()).with_urls(self.url.clone(), self.refresh.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Settings {
    pub api: Api,
    pub imagehost: ImageHostSettings,
    pub identity: Identity,
}

impl Settings {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!(error = %e, "No .env file loaded");
        }
        let config = Config::builder()
            .set_default("api.url", DEFAULT_API_URL)?
            .set_default("imagehost.key", "")?
            .set_default("imagehost.url", DEFAULT_IMAGEHOST_URL)?
            .set_default("identity.key", "")?
            .set_default("identity.url", IdentityEndpoints::DEFAULT_ACCOUNTS_URL)?
            .set_default("identity.refresh", IdentityEndpoints::DEFAULT_TOKEN_URL)?
            .add_source(
                File::with_name("config.toml")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::default().separator("_"))
            .build()?;

        config.try_deserialize()
    }

    /// Settings baked in by the build environment, for targets without a process environment.
    pub fn from_build_env() -> Self {
        let mut settings = Self::default();
        if let Some(url) = option_env!("API_URL") {
            settings.api.url = url.into();
        }
        if let Some(key) = option_env!("IMAGEHOST_KEY") {
            settings.imagehost.key = key.into();
        }
        if let Some(url) = option_env!("IMAGEHOST_URL") {
            settings.imagehost.url = url.into();
        }
        if let Some(key) = option_env!("IDENTITY_KEY") {
            settings.identity.key = key.into();
        }
        if let Some(url) = option_env!("IDENTITY_URL") {
            settings.identity.url = url.into();
        }
        if let Some(url) = option_env!("IDENTITY_REFRESH") {
            settings.identity.refresh = url.into();
        }
        settings
    }

    /// Settings for the current target.
    pub fn load() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        {
            match Self::new() {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!(error = %e, "Invalid settings, using build defaults");
                    Self::from_build_env()
                }
            }
        }
        #[cfg(target_arch = "wasm32")]
        {
            Self::from_build_env()
        }
    }
}
