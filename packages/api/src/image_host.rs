//! Profile-photo uploads to the external image host.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;

use crate::client::{ApiError, ApiRequest, HttpTransport};
use crate::settings::ImageHostSettings;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: UploadedImage,
}

#[derive(Debug, Deserialize)]
struct UploadedImage {
    display_url: String,
}

/// Client for the image host. Uploads are anonymous and keyed by the host API key.
#[derive(Clone)]
pub struct ImageHost {
    settings: ImageHostSettings,
    transport: Arc<dyn HttpTransport>,
}

impl ImageHost {
    pub fn new(settings: ImageHostSettings, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            settings,
            transport,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.settings.key.trim().is_empty()
    }

    /// Upload raw image bytes and return the public display URL.
    pub async fn upload(&self, bytes: &[u8]) -> Result<String, ApiError> {
        if bytes.is_empty() {
            return Err(ApiError::InvalidRequest("No image selected".to_string()));
        }
        if !self.is_configured() {
            return Err(ApiError::InvalidRequest(
                "Image uploads are not configured".to_string(),
            ));
        }
        let url = format!(
            "{}?key={}",
            self.settings.url,
            urlencoding::encode(&self.settings.key)
        );
        let request =
            ApiRequest::post(url).form(vec![("image".to_string(), STANDARD.encode(bytes))]);
        tracing::debug!(size = bytes.len(), "Uploading image");
        let response = self.transport.send(request).await?.error_for_status()?;
        let uploaded: UploadResponse = response.json()?;
        Ok(uploaded.data.display_url)
    }
}

impl PartialEq for ImageHost {
    fn eq(&self, other: &Self) -> bool {
        self.settings == other.settings && Arc::ptr_eq(&self.transport, &other.transport)
    }
}

impl std::fmt::Debug for ImageHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHost")
            .field("url", &self.settings.url)
            .field("configured", &self.is_configured())
            .finish()
    }
}
