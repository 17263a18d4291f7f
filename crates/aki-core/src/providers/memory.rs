//! In-process identity provider.
//!
//! Keeps a user table in memory and lets callers script failures and delays.
//! Used to drive the session controller without a network.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::auth::{
    AuthErrorCode, AuthStateSubscription, Identity, IdentityProvider, ProviderError,
    ProviderResult, Subscribers,
};

#[derive(Debug, Clone)]
struct MemoryUser {
    uid: String,
    password: String,
    disabled: bool,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<String, MemoryUser>,
    current: Option<Identity>,
    token: Option<String>,
    token_seq: u64,
    subscribers: Subscribers,
    sign_in_error: Option<AuthErrorCode>,
    sign_in_delay: Option<Duration>,
    token_failure: bool,
    sign_out_failure: bool,
    sign_in_calls: usize,
    sign_out_calls: usize,
    token_requests: Vec<bool>,
}

/// Scriptable in-memory provider.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    inner: Mutex<Inner>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user and returns its identity.
    pub fn add_user(&self, email: &str, password: &str) -> Identity {
        let mut inner = self.lock();
        let uid = format!("uid-{}", inner.users.len() + 1);
        inner.users.insert(
            email.to_string(),
            MemoryUser {
                uid: uid.clone(),
                password: password.to_string(),
                disabled: false,
            },
        );
        Identity::new(uid, Some(email.to_string()))
    }

    #[must_use]
    pub fn with_user(self, email: &str, password: &str) -> Self {
        self.add_user(email, password);
        self
    }

    pub fn disable_user(&self, email: &str) {
        if let Some(user) = self.lock().users.get_mut(email) {
            user.disabled = true;
        }
    }

    /// Makes every sign-in fail with `code` until cleared with `None`.
    pub fn set_sign_in_error(&self, code: Option<AuthErrorCode>) {
        self.lock().sign_in_error = code;
    }

    /// Delays sign-in responses (simulates a slow or hung provider).
    pub fn set_sign_in_delay(&self, delay: Option<Duration>) {
        self.lock().sign_in_delay = delay;
    }

    pub fn set_token_failure(&self, fail: bool) {
        self.lock().token_failure = fail;
    }

    pub fn set_sign_out_failure(&self, fail: bool) {
        self.lock().sign_out_failure = fail;
    }

    /// Pushes an arbitrary notification to subscribers without changing
    /// the signed-in user.
    pub fn emit(&self, identity: Option<&Identity>) {
        self.lock().subscribers.emit(identity);
    }

    pub fn current(&self) -> Option<Identity> {
        self.lock().current.clone()
    }

    pub fn sign_in_calls(&self) -> usize {
        self.lock().sign_in_calls
    }

    pub fn sign_out_calls(&self) -> usize {
        self.lock().sign_out_calls
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// `force_refresh` flag of every token request, in call order.
    pub fn token_requests(&self) -> Vec<bool> {
        self.lock().token_requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdentityProvider for MemoryProvider {
    fn subscribe(&self) -> AuthStateSubscription {
        let mut inner = self.lock();
        let current = inner.current.clone();
        inner.subscribers.add(current)
    }

    async fn id_token(&self, identity: &Identity, force_refresh: bool) -> ProviderResult<String> {
        let mut inner = self.lock();
        inner.token_requests.push(force_refresh);
        if inner.token_failure {
            return Err(ProviderError::network("token endpoint unavailable"));
        }
        if inner.current.as_ref().map(|c| c.uid.as_str()) != Some(identity.uid.as_str()) {
            return Err(ProviderError::no_current_user());
        }
        if force_refresh || inner.token.is_none() {
            inner.token_seq += 1;
            inner.token = Some(format!("token-{}-{}", identity.uid, inner.token_seq));
        }
        inner
            .token
            .clone()
            .ok_or_else(ProviderError::no_current_user)
    }

    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> ProviderResult<Identity> {
        let delay = {
            let mut inner = self.lock();
            inner.sign_in_calls += 1;
            inner.sign_in_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.lock();
        if let Some(code) = inner.sign_in_error.clone() {
            return Err(ProviderError::auth(code, "scripted sign-in failure"));
        }
        if !email.contains('@') {
            return Err(ProviderError::auth(AuthErrorCode::InvalidEmail, "INVALID_EMAIL"));
        }
        let Some(user) = inner.users.get(email).cloned() else {
            return Err(ProviderError::auth(
                AuthErrorCode::UserNotFound,
                "EMAIL_NOT_FOUND",
            ));
        };
        if user.disabled {
            return Err(ProviderError::auth(AuthErrorCode::UserDisabled, "USER_DISABLED"));
        }
        if user.password != password {
            return Err(ProviderError::auth(
                AuthErrorCode::WrongPassword,
                "INVALID_PASSWORD",
            ));
        }

        let identity = Identity::new(user.uid, Some(email.to_string()));
        inner.current = Some(identity.clone());
        inner.token = None;
        inner.subscribers.emit(Some(&identity));
        Ok(identity)
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        let mut inner = self.lock();
        inner.sign_out_calls += 1;
        if inner.sign_out_failure {
            return Err(ProviderError::network("sign-out request failed"));
        }
        inner.current = None;
        inner.token = None;
        inner.subscribers.emit(None);
        Ok(())
    }
}
