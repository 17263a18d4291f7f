//! Session controller.
//!
//! Owns the session record and drives it from auth-state notifications:
//! a present identity triggers token acquisition, an absent one clears the
//! token. Login and logout only talk to the provider; the resulting state
//! change arrives later as a notification.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::errors::{AuthFailure, ProviderError, ProviderResult};
use super::provider::IdentityProvider;
use super::session::{Identity, Session, SessionMode, TokenAction};

/// Decides the session mode for every auth event and manages the token.
pub struct SessionController<P> {
    provider: Arc<P>,
    session: Session,
    request_timeout: Option<Duration>,
}

impl<P: IdentityProvider> SessionController<P> {
    /// Creates a controller in the signed-out state.
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            session: Session::new(),
            request_timeout: None,
        }
    }

    /// Bounds every provider call. `None` waits indefinitely.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn mode(&self) -> SessionMode {
        self.session.mode()
    }

    /// True iff both identity and token are set.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Applies one auth-state notification and returns the resulting mode.
    ///
    /// Acquires a token exactly once when the identity is present.
    pub async fn handle_auth_state(&mut self, identity: Option<Identity>) -> SessionMode {
        let previous = self.session.mode();
        match self.session.observe(identity) {
            TokenAction::Acquire => {
                self.acquire_token().await;
            }
            TokenAction::Cleared => {}
        }

        let mode = self.session.mode();
        if mode == previous {
            debug!(mode = mode.label(), "Auth state re-notified");
        } else {
            info!(from = previous.label(), to = mode.label(), "Session mode changed");
        }
        mode
    }

    /// Requests a token for the current identity.
    ///
    /// Failures are logged and leave the token cleared; they never propagate.
    pub async fn acquire_token(&mut self) -> Option<String> {
        let identity = self.session.identity()?.clone();
        let result = self
            .bounded(self.provider.id_token(&identity, false))
            .await;
        self.store_token_result(&identity, result, "Error getting auth token")
    }

    /// Forces a token refresh when authenticated.
    ///
    /// Returns `None` without contacting the provider when signed out.
    pub async fn get_valid_token(&mut self) -> Option<String> {
        if !self.is_authenticated() {
            return None;
        }
        let identity = self.session.identity()?.clone();
        let result = self.bounded(self.provider.id_token(&identity, true)).await;
        self.store_token_result(&identity, result, "Error refreshing token")
    }

    /// Signs in with email and password.
    ///
    /// Does not touch the session: the provider's notification drives it.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthFailure> {
        let result = self
            .bounded(
                self.provider
                    .sign_in_with_email_and_password(email, password),
            )
            .await;
        match result {
            Ok(identity) => {
                info!(uid = %identity.uid, "Signed in");
                Ok(identity)
            }
            Err(err) => {
                warn!(code = %err.code, kind = %err.kind, "Sign-in failed: {}", err.message);
                Err(AuthFailure::from_sign_in(&err))
            }
        }
    }

    /// Signs out. Does not retry; the session is left untouched on failure.
    pub async fn logout(&self) -> Result<(), AuthFailure> {
        match self.bounded(self.provider.sign_out()).await {
            Ok(()) => {
                info!("Signed out");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Sign-out failed");
                Err(AuthFailure::logout())
            }
        }
    }

    fn store_token_result(
        &mut self,
        identity: &Identity,
        result: ProviderResult<String>,
        context: &str,
    ) -> Option<String> {
        match result {
            Ok(token) => {
                self.session.store_token(Some(token.clone()));
                Some(token)
            }
            Err(err) => {
                warn!(uid = %identity.uid, error = %err, "{context}");
                self.session.store_token(None);
                None
            }
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = ProviderResult<T>>,
    ) -> ProviderResult<T> {
        let Some(limit) = self.request_timeout else {
            return call.await;
        };
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::timeout(format!(
                "no response from provider after {}s",
                limit.as_secs()
            ))),
        }
    }
}
