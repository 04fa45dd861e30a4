//! Errors raised by identity-provider operations.

/// Failure of a register/sign-in/sign-out/profile/reset operation.
///
/// The `Display` text is meant to be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("The email address is badly formatted")]
    InvalidEmail,
    #[error("Password should be at least 6 characters")]
    WeakPassword,
    #[error("An account with this email already exists")]
    EmailExists,
    #[error("No account found for this email")]
    UnknownAccount,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("This account has been disabled")]
    UserDisabled,
    #[error("Too many attempts, try again later")]
    TooManyAttempts,
    #[error("Not signed in")]
    NotSignedIn,
    #[error("Your session has expired, please sign in again")]
    TokenExpired,
    #[error("Could not reach the identity provider: {0}")]
    Network(String),
    #[error("{0}")]
    Provider(String),
}

impl IdentityError {
    /// Map an identity-toolkit error code (e.g. `"EMAIL_EXISTS"` or
    /// `"WEAK_PASSWORD : Password should be at least 6 characters"`) to an error.
    pub fn from_code(message: &str) -> Self {
        let code = message.split(':').next().unwrap_or_default().trim();
        match code {
            "INVALID_EMAIL" | "MISSING_EMAIL" => Self::InvalidEmail,
            "WEAK_PASSWORD" | "MISSING_PASSWORD" => Self::WeakPassword,
            "EMAIL_EXISTS" => Self::EmailExists,
            "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => Self::UnknownAccount,
            "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" => {
                Self::InvalidCredentials
            }
            "USER_DISABLED" => Self::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyAttempts,
            "TOKEN_EXPIRED" | "INVALID_ID_TOKEN" | "INVALID_REFRESH_TOKEN" => Self::TokenExpired,
            _ => Self::Provider(message.to_string()),
        }
    }
}
