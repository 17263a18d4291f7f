use std::fmt;

/// Message shown for any authentication error without a dedicated entry.
pub const GENERIC_AUTH_MESSAGE: &str = "Authentication error occurred";

/// Message shown when signing out fails.
pub const LOGOUT_ERROR_MESSAGE: &str = "Logout error";

/// Error codes reported by the identity provider.
///
/// Known codes map to fixed user-facing messages; everything else keeps the
/// raw code in `Other` and falls back to [`GENERIC_AUTH_MESSAGE`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuthErrorCode {
    UserNotFound,
    WrongPassword,
    InvalidEmail,
    UserDisabled,
    TooManyRequests,
    NetworkRequestFailed,
    InvalidCredential,
    Other(String),
}

impl AuthErrorCode {
    /// Parses a provider code, with or without the `auth/` prefix.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        let bare = code.strip_prefix("auth/").unwrap_or(code);
        match bare {
            "user-not-found" => AuthErrorCode::UserNotFound,
            "wrong-password" => AuthErrorCode::WrongPassword,
            "invalid-email" => AuthErrorCode::InvalidEmail,
            "user-disabled" => AuthErrorCode::UserDisabled,
            "too-many-requests" => AuthErrorCode::TooManyRequests,
            "network-request-failed" => AuthErrorCode::NetworkRequestFailed,
            "invalid-credential" => AuthErrorCode::InvalidCredential,
            other => AuthErrorCode::Other(other.to_string()),
        }
    }

    /// Translates a Firebase REST error string (e.g. `INVALID_PASSWORD`,
    /// `TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account...`).
    pub fn from_rest_message(message: &str) -> Self {
        let head = message
            .split(" : ")
            .next()
            .unwrap_or(message)
            .trim();
        match head {
            "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => AuthErrorCode::UserNotFound,
            "INVALID_PASSWORD" => AuthErrorCode::WrongPassword,
            "INVALID_EMAIL" | "MISSING_EMAIL" => AuthErrorCode::InvalidEmail,
            "USER_DISABLED" => AuthErrorCode::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthErrorCode::TooManyRequests,
            "INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" => {
                AuthErrorCode::InvalidCredential
            }
            "TOKEN_EXPIRED" => AuthErrorCode::Other("user-token-expired".to_string()),
            "INVALID_REFRESH_TOKEN" => AuthErrorCode::Other("invalid-user-token".to_string()),
            other => AuthErrorCode::Other(other.to_ascii_lowercase().replace('_', "-")),
        }
    }

    /// Returns the code without the `auth/` prefix.
    pub fn as_str(&self) -> &str {
        match self {
            AuthErrorCode::UserNotFound => "user-not-found",
            AuthErrorCode::WrongPassword => "wrong-password",
            AuthErrorCode::InvalidEmail => "invalid-email",
            AuthErrorCode::UserDisabled => "user-disabled",
            AuthErrorCode::TooManyRequests => "too-many-requests",
            AuthErrorCode::NetworkRequestFailed => "network-request-failed",
            AuthErrorCode::InvalidCredential => "invalid-credential",
            AuthErrorCode::Other(code) => code,
        }
    }

    /// Returns the user-facing message for this code.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthErrorCode::UserNotFound => "User not found",
            AuthErrorCode::WrongPassword => "Incorrect password",
            AuthErrorCode::InvalidEmail => "Invalid email address",
            AuthErrorCode::UserDisabled => "This user has been disabled",
            AuthErrorCode::TooManyRequests => "Too many attempts, please try again later",
            AuthErrorCode::NetworkRequestFailed => "Network connection error",
            AuthErrorCode::InvalidCredential => "Invalid credentials",
            AuthErrorCode::Other(_) => GENERIC_AUTH_MESSAGE,
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "auth/{}", self.as_str())
    }
}

/// Categories of provider errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The provider rejected the request with an auth error code.
    Auth,
    /// The request never got a response.
    Network,
    /// The request exceeded the configured timeout.
    Timeout,
    /// The response could not be decoded.
    Parse,
    /// Local session storage failed.
    Storage,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderErrorKind::Auth => write!(f, "auth"),
            ProviderErrorKind::Network => write!(f, "network"),
            ProviderErrorKind::Timeout => write!(f, "timeout"),
            ProviderErrorKind::Parse => write!(f, "parse"),
            ProviderErrorKind::Storage => write!(f, "storage"),
        }
    }
}

/// Structured error from the identity provider.
#[derive(Debug, Clone)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub code: AuthErrorCode,
    /// One-line summary for logs.
    pub message: String,
}

impl ProviderError {
    pub fn auth(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Auth,
            code,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Network,
            code: AuthErrorCode::NetworkRequestFailed,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Timeout,
            code: AuthErrorCode::NetworkRequestFailed,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Parse,
            code: AuthErrorCode::Other("internal-error".to_string()),
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Storage,
            code: AuthErrorCode::Other("internal-error".to_string()),
            message: message.into(),
        }
    }

    /// No signed-in user to issue a token for.
    pub fn no_current_user() -> Self {
        Self::auth(
            AuthErrorCode::Other("no-current-user".to_string()),
            "no user is signed in",
        )
    }

    pub fn user_message(&self) -> &'static str {
        self.code.user_message()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.kind, self.message)
    }
}

impl std::error::Error for ProviderError {}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Failure result of a login or logout, ready to show to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure {
    /// Provider code, when the provider reported one.
    pub code: Option<AuthErrorCode>,
    pub message: String,
}

impl AuthFailure {
    /// Maps a sign-in error through the message table.
    pub fn from_sign_in(err: &ProviderError) -> Self {
        Self {
            code: Some(err.code.clone()),
            message: err.user_message().to_string(),
        }
    }

    /// Generic failure for sign-out, regardless of cause.
    pub fn logout() -> Self {
        Self {
            code: None,
            message: LOGOUT_ERROR_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AuthFailure {}
