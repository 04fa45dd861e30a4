use reqwest::StatusCode;

use crate::auth::IdentityError;

/// Failure of a backend call made through the request pipeline.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("request failed with status {status}")]
    Status { status: StatusCode, body: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    #[error("could not decode response: {0}")]
    Decode(String),

    /// A bearer token could not be minted for the signed-in principal.
    #[error("could not obtain credentials: {0}")]
    Credential(#[from] IdentityError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
