//! Identity Toolkit and Secure Token wire types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInResponse {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    /// Seconds, encoded as a string.
    pub expires_in: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub grant_type: &'static str,
    pub refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Error envelope shared by both APIs.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

/// Parses the `expiresIn` field; defaults to one hour when malformed.
pub(crate) fn parse_expires_in(raw: &str) -> u64 {
    raw.trim().parse().unwrap_or(3600)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_request_shape() {
        let body = serde_json::to_value(SignInRequest {
            email: "a@example.com",
            password: "pw",
            return_secure_token: true,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "email": "a@example.com",
                "password": "pw",
                "returnSecureToken": true
            })
        );
    }

    #[test]
    fn test_error_envelope() {
        let parsed: ErrorEnvelope = serde_json::from_str(
            r#"{"error":{"code":400,"message":"INVALID_PASSWORD","errors":[]}}"#,
        )
        .unwrap();
        assert_eq!(parsed.error.message, "INVALID_PASSWORD");
    }

    #[test]
    fn test_expires_in() {
        assert_eq!(parse_expires_in("3600"), 3600);
        assert_eq!(parse_expires_in(" 120 "), 120);
        assert_eq!(parse_expires_in("soon"), 3600);
    }
}
