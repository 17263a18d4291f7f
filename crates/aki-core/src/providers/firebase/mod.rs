//! Firebase Authentication over its REST API.
//!
//! Email/password sign-in goes through the Identity Toolkit API and id tokens
//! are refreshed through the Secure Token API. The signed-in session is kept
//! in memory and, when enabled, mirrored to `session.json` so the next start
//! restores it.

mod store;
mod types;

use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
pub use store::{SessionStore, StoredSession};
use tracing::{debug, info, warn};

use self::types::{
    ErrorEnvelope, RefreshRequest, RefreshResponse, SignInRequest, SignInResponse,
    parse_expires_in,
};
use crate::auth::{
    AuthErrorCode, AuthStateSubscription, Identity, IdentityProvider, ProviderError,
    ProviderResult, Subscribers,
};
use crate::config::Config;

#[derive(Debug, Default)]
struct Inner {
    session: Option<StoredSession>,
    subscribers: Subscribers,
}

/// Firebase-backed [`IdentityProvider`].
#[derive(Debug)]
pub struct FirebaseAuth {
    http: reqwest::Client,
    api_key: String,
    identity_base_url: String,
    token_base_url: String,
    store: Option<SessionStore>,
    inner: Mutex<Inner>,
}

impl FirebaseAuth {
    /// Creates the provider from config, restoring a persisted session when
    /// `persist_session` is enabled.
    ///
    /// # Errors
    /// Returns an error if no API key is configured.
    pub fn new(config: &Config) -> Result<Self> {
        let store = config
            .persist_session
            .then(SessionStore::default_location);
        Self::with_store(config, store)
    }

    /// Creates the provider with an explicit session store (`None` keeps the
    /// session in memory only).
    ///
    /// # Errors
    /// Returns an error if no API key is configured.
    pub fn with_store(config: &Config, store: Option<SessionStore>) -> Result<Self> {
        let api_key = config.firebase.effective_api_key().context(
            "Firebase API key is not configured (set [firebase].api_key or AKI_FIREBASE_API_KEY)",
        )?;

        let session = match store.as_ref().map(SessionStore::load) {
            Some(Ok(session)) => session,
            Some(Err(e)) => {
                warn!("Ignoring unreadable session file: {e:#}");
                None
            }
            None => None,
        };
        if let Some(session) = &session {
            debug!(uid = %session.uid, "Restored persisted session");
        }

        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            identity_base_url: config.firebase.effective_identity_base_url(),
            token_base_url: config.firebase.effective_token_base_url(),
            store,
            inner: Mutex::new(Inner {
                session,
                subscribers: Subscribers::default(),
            }),
        })
    }

    /// Currently signed-in user, if any.
    pub fn current_identity(&self) -> Option<Identity> {
        self.lock().session.as_ref().map(StoredSession::identity)
    }

    /// Snapshot of the current session (tokens included).
    pub fn current_session(&self) -> Option<StoredSession> {
        self.lock().session.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, session: &StoredSession) {
        if let Some(store) = &self.store
            && let Err(e) = store.save(session)
        {
            warn!("Failed to persist session: {e:#}");
        }
    }

    /// Replaces the current session and notifies subscribers if the user changed.
    fn set_session(&self, session: Option<StoredSession>) {
        self.replace_session(session, false);
    }

    /// Like [`Self::set_session`], but `always_notify` also announces an
    /// unchanged user. A fresh sign-in must reach subscribers even when the
    /// same user was already present without a usable token.
    fn replace_session(&self, session: Option<StoredSession>, always_notify: bool) {
        let mut inner = self.lock();
        let before = inner.session.as_ref().map(|s| s.uid.clone());
        let after = session.as_ref().map(|s| s.uid.clone());
        inner.session = session;
        if always_notify || before != after {
            let identity = inner.session.as_ref().map(StoredSession::identity);
            inner.subscribers.emit(identity.as_ref());
        }
    }

    async fn post_sign_in(&self, email: &str, password: &str) -> ProviderResult<SignInResponse> {
        let url = format!("{}/v1/accounts:signInWithPassword", self.identity_base_url);
        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("sign-in request failed: {e}")))?;
        decode(response).await
    }

    async fn post_refresh(&self, refresh_token: &str) -> ProviderResult<RefreshResponse> {
        let url = format!("{}/v1/token", self.token_base_url);
        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .form(&RefreshRequest {
                grant_type: "refresh_token",
                refresh_token,
            })
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("token refresh request failed: {e}")))?;
        decode(response).await
    }
}

/// Decodes a success body or maps the error envelope to an auth code.
async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> ProviderResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::network(format!("failed to read response: {e}")))?;

    if !status.is_success() {
        return Err(match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => ProviderError::auth(
                AuthErrorCode::from_rest_message(&envelope.error.message),
                format!("HTTP {status}: {}", envelope.error.message),
            ),
            Err(_) => ProviderError::parse(format!("HTTP {status}: {body}")),
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| ProviderError::parse(format!("unexpected response body: {e}")))
}

/// Refresh failures after which the stored user can no longer be used.
fn ends_session(code: &AuthErrorCode) -> bool {
    matches!(code, AuthErrorCode::UserDisabled | AuthErrorCode::UserNotFound)
        || matches!(code.as_str(), "user-token-expired" | "invalid-user-token")
}

impl IdentityProvider for FirebaseAuth {
    fn subscribe(&self) -> AuthStateSubscription {
        let mut inner = self.lock();
        let current = inner.session.as_ref().map(StoredSession::identity);
        inner.subscribers.add(current)
    }

    async fn id_token(&self, identity: &Identity, force_refresh: bool) -> ProviderResult<String> {
        let refresh_token = {
            let inner = self.lock();
            let Some(session) = inner.session.as_ref().filter(|s| s.uid == identity.uid) else {
                return Err(ProviderError::no_current_user());
            };
            if !force_refresh && !session.is_expired() {
                return Ok(session.id_token.clone());
            }
            session.refresh_token.clone()
        };

        debug!(uid = %identity.uid, force_refresh, "Refreshing id token");
        let refreshed = match self.post_refresh(&refresh_token).await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                if ends_session(&e.code) {
                    info!(uid = %identity.uid, "Stored credentials rejected, signing out");
                    if let Some(store) = &self.store
                        && let Err(err) = store.clear()
                    {
                        warn!("Failed to remove session file: {err:#}");
                    }
                    self.set_session(None);
                }
                return Err(e);
            }
        };

        let updated = {
            let mut inner = self.lock();
            let Some(session) = inner.session.as_mut().filter(|s| s.uid == identity.uid) else {
                return Err(ProviderError::no_current_user());
            };
            if let Some(user_id) = &refreshed.user_id
                && user_id != &session.uid
            {
                warn!("Token refresh returned a different user id");
            }
            session.id_token = refreshed.id_token;
            session.refresh_token = refreshed.refresh_token;
            session.expires = store::expiry_from_now(parse_expires_in(&refreshed.expires_in));
            session.clone()
        };
        self.persist(&updated);
        Ok(updated.id_token)
    }

    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> ProviderResult<Identity> {
        let response = self.post_sign_in(email, password).await?;

        let session = StoredSession {
            uid: response.local_id,
            email: response.email.or_else(|| Some(email.to_string())),
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires: store::expiry_from_now(parse_expires_in(&response.expires_in)),
        };
        let identity = session.identity();
        info!(uid = %identity.uid, "Signed in");

        self.persist(&session);
        self.replace_session(Some(session), true);
        Ok(identity)
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        if let Some(store) = &self.store {
            store
                .clear()
                .map_err(|e| ProviderError::storage(format!("{e:#}")))?;
        }
        self.set_session(None);
        info!("Signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use tempfile::tempdir;
    use tokio::sync::mpsc;
    use tokio::time::timeout;
    use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::{SessionController, SessionMode, SessionUpdate, spawn_session};
    use crate::config::FirebaseConfig;

    fn config_for(server: &MockServer) -> Config {
        Config {
            firebase: FirebaseConfig {
                api_key: Some("test-key".to_string()),
                identity_base_url: Some(server.uri()),
                token_base_url: Some(server.uri()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn mount_sign_in(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .and(query_param("key", "test-key"))
            .and(body_json(json!({
                "email": "alice@example.com",
                "password": "hunter22",
                "returnSecureToken": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "identitytoolkit#VerifyPasswordResponse",
                "localId": "uid-alice",
                "email": "alice@example.com",
                "idToken": "id-1",
                "refreshToken": "refresh-1",
                "expiresIn": "3600",
                "registered": true
            })))
            .mount(server)
            .await;
    }

    fn rest_error(message: &str) -> ResponseTemplate {
        ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": message, "errors": [] }
        }))
    }

    #[tokio::test]
    async fn test_sign_in_emits_and_persists() {
        let server = MockServer::start().await;
        mount_sign_in(&server).await;
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let auth = FirebaseAuth::with_store(&config_for(&server), Some(store.clone())).unwrap();

        let mut sub = auth.subscribe();
        assert_eq!(sub.recv().await.unwrap().identity, None);

        let identity = auth
            .sign_in_with_email_and_password("alice@example.com", "hunter22")
            .await
            .unwrap();

        assert_eq!(identity.uid, "uid-alice");
        assert_eq!(sub.recv().await.unwrap().identity, Some(identity));
        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.id_token, "id-1");
        assert_eq!(saved.refresh_token, "refresh-1");
    }

    #[tokio::test]
    async fn test_sign_in_error_maps_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(rest_error("INVALID_PASSWORD"))
            .mount(&server)
            .await;
        let auth = FirebaseAuth::with_store(&config_for(&server), None).unwrap();
        let mut sub = auth.subscribe();
        sub.recv().await.unwrap();

        let err = auth
            .sign_in_with_email_and_password("alice@example.com", "wrong")
            .await
            .unwrap_err();

        assert_eq!(err.code, AuthErrorCode::WrongPassword);
        assert_eq!(err.user_message(), "Incorrect password");
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_network_error() {
        let config = Config {
            firebase: FirebaseConfig {
                api_key: Some("test-key".to_string()),
                identity_base_url: Some("http://127.0.0.1:9".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let auth = FirebaseAuth::with_store(&config, None).unwrap();

        let err = auth
            .sign_in_with_email_and_password("alice@example.com", "hunter22")
            .await
            .unwrap_err();

        assert_eq!(err.code, AuthErrorCode::NetworkRequestFailed);
    }

    #[tokio::test]
    async fn test_id_token_cached_until_forced() {
        let server = MockServer::start().await;
        mount_sign_in(&server).await;
        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .and(query_param("key", "test-key"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id_token": "id-2",
                "refresh_token": "refresh-2",
                "expires_in": "3600",
                "token_type": "Bearer",
                "user_id": "uid-alice"
            })))
            .expect(1)
            .mount(&server)
            .await;
        let auth = FirebaseAuth::with_store(&config_for(&server), None).unwrap();
        let identity = auth
            .sign_in_with_email_and_password("alice@example.com", "hunter22")
            .await
            .unwrap();

        assert_eq!(auth.id_token(&identity, false).await.unwrap(), "id-1");
        assert_eq!(auth.id_token(&identity, true).await.unwrap(), "id-2");
        assert_eq!(auth.current_session().unwrap().refresh_token, "refresh-2");
    }

    #[tokio::test]
    async fn test_rejected_refresh_token_signs_out() {
        let server = MockServer::start().await;
        mount_sign_in(&server).await;
        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .respond_with(rest_error("INVALID_REFRESH_TOKEN"))
            .mount(&server)
            .await;
        let auth = FirebaseAuth::with_store(&config_for(&server), None).unwrap();
        let identity = auth
            .sign_in_with_email_and_password("alice@example.com", "hunter22")
            .await
            .unwrap();
        let mut sub = auth.subscribe();
        sub.recv().await.unwrap();

        assert!(auth.id_token(&identity, true).await.is_err());

        assert_eq!(sub.recv().await.unwrap().identity, None);
        assert_eq!(auth.current_identity(), None);
    }

    #[tokio::test]
    async fn test_token_for_other_user_is_rejected() {
        let server = MockServer::start().await;
        let auth = FirebaseAuth::with_store(&config_for(&server), None).unwrap();

        let err = auth
            .id_token(&Identity::new("someone", None), false)
            .await
            .unwrap_err();

        assert_eq!(err.code.as_str(), "no-current-user");
    }

    #[tokio::test]
    async fn test_restores_and_clears_persisted_session() {
        let server = MockServer::start().await;
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store
            .save(&StoredSession {
                uid: "uid-alice".to_string(),
                email: Some("alice@example.com".to_string()),
                id_token: "id-1".to_string(),
                refresh_token: "refresh-1".to_string(),
                expires: u64::MAX,
            })
            .unwrap();

        let auth = FirebaseAuth::with_store(&config_for(&server), Some(store.clone())).unwrap();
        let mut sub = auth.subscribe();
        let restored = sub.recv().await.unwrap().identity.unwrap();
        assert_eq!(restored.uid, "uid-alice");
        assert_eq!(auth.id_token(&restored, false).await.unwrap(), "id-1");

        auth.sign_out().await.unwrap();

        assert_eq!(sub.recv().await.unwrap().identity, None);
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_in_as_same_user_notifies_again() {
        let server = MockServer::start().await;
        mount_sign_in(&server).await;
        let auth = FirebaseAuth::with_store(&config_for(&server), None).unwrap();
        let mut sub = auth.subscribe();
        sub.recv().await.unwrap();

        auth.sign_in_with_email_and_password("alice@example.com", "hunter22")
            .await
            .unwrap();
        auth.sign_in_with_email_and_password("alice@example.com", "hunter22")
            .await
            .unwrap();

        assert_eq!(sub.recv().await.unwrap().identity.unwrap().uid, "uid-alice");
        assert_eq!(sub.recv().await.unwrap().identity.unwrap().uid, "uid-alice");
    }

    #[tokio::test]
    async fn test_sign_in_recovers_restored_session_with_failed_refresh() {
        let server = MockServer::start().await;
        mount_sign_in(&server).await;
        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store
            .save(&StoredSession {
                uid: "uid-alice".to_string(),
                email: Some("alice@example.com".to_string()),
                id_token: "stale".to_string(),
                refresh_token: "refresh-0".to_string(),
                expires: 0,
            })
            .unwrap();
        let auth = Arc::new(FirebaseAuth::with_store(&config_for(&server), Some(store)).unwrap());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_session(SessionController::new(auth), tx);

        let startup = rx.recv().await.unwrap();
        let SessionUpdate::AuthState { mode, identity } = startup else {
            panic!("expected startup state, got {startup:?}");
        };
        assert_eq!(mode, SessionMode::SignedOut);
        assert_eq!(identity.unwrap().uid, "uid-alice");

        handle
            .client()
            .login("alice@example.com".to_string(), "hunter22".to_string());

        assert!(matches!(
            rx.recv().await.unwrap(),
            SessionUpdate::LoginFinished(Ok(_))
        ));
        let next = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("no auth state after login")
            .unwrap();
        let SessionUpdate::AuthState { mode, .. } = next else {
            panic!("expected auth state, got {next:?}");
        };
        assert_eq!(mode, SessionMode::SignedIn);
        handle.shutdown().await;
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        if std::env::var("AKI_FIREBASE_API_KEY").is_ok() {
            return;
        }
        let err = FirebaseAuth::with_store(&Config::default(), None).unwrap_err();
        assert!(err.to_string().contains("API key"));
    }
}
