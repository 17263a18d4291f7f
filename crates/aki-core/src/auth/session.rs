//! Session record.
//!
//! The session pairs the provider's current identity with the credential token
//! derived from it. The mode is never stored: it is computed from both fields.

use serde::{Deserialize, Serialize};

/// Opaque handle for an authenticated principal, issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-assigned user id.
    pub uid: String,
    /// Email address, when the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>, email: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            email,
        }
    }

    /// Returns the email if known, else the uid.
    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.uid)
    }
}

/// Signed-in status derived from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    #[default]
    SignedOut,
    SignedIn,
}

/// Which interface the UI shows for a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interface {
    /// Email/password form.
    Login,
    /// Record lookup with the options menu.
    Query,
}

impl SessionMode {
    /// Render dispatch: the interface to display in this mode.
    pub fn interface(self) -> Interface {
        match self {
            SessionMode::SignedOut => Interface::Login,
            SessionMode::SignedIn => Interface::Query,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionMode::SignedOut => "signed-out",
            SessionMode::SignedIn => "signed-in",
        }
    }
}

/// What the controller must do with the token after an identity update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAction {
    /// Identity is present: a token has to be (re)acquired.
    Acquire,
    /// Identity is absent: the token was cleared with it.
    Cleared,
}

/// The process-wide session record.
///
/// Invariant: `token` is `Some` only while `identity` is `Some`.
#[derive(Debug, Clone, Default)]
pub struct Session {
    identity: Option<Identity>,
    token: Option<String>,
}

impl Session {
    /// Creates a signed-out session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn mode(&self) -> SessionMode {
        if self.is_authenticated() {
            SessionMode::SignedIn
        } else {
            SessionMode::SignedOut
        }
    }

    /// True iff both the identity and the token are set.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some() && self.token.is_some()
    }

    /// Applies an auth-state notification.
    ///
    /// Clears the token in the same step when the identity goes away or
    /// changes to a different principal.
    pub fn observe(&mut self, identity: Option<Identity>) -> TokenAction {
        match identity {
            Some(identity) => {
                let same_principal = self
                    .identity
                    .as_ref()
                    .is_some_and(|current| current.uid == identity.uid);
                if !same_principal {
                    self.token = None;
                }
                self.identity = Some(identity);
                TokenAction::Acquire
            }
            None => {
                self.identity = None;
                self.token = None;
                TokenAction::Cleared
            }
        }
    }

    /// Stores the outcome of a token acquisition.
    ///
    /// A token is dropped when there is no identity to attach it to.
    pub fn store_token(&mut self, token: Option<String>) {
        self.token = if self.identity.is_some() { token } else { None };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Identity {
        Identity::new("uid-alice", Some("alice@example.com".to_string()))
    }

    #[test]
    fn test_new_session_is_signed_out() {
        let session = Session::new();
        assert_eq!(session.mode(), SessionMode::SignedOut);
        assert!(session.identity().is_none());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_is_authenticated_all_combinations() {
        let both = Session {
            identity: Some(alice()),
            token: Some("tok".to_string()),
        };
        let identity_only = Session {
            identity: Some(alice()),
            token: None,
        };
        // Not reachable through the public API, checked for completeness.
        let token_only = Session {
            identity: None,
            token: Some("tok".to_string()),
        };
        let neither = Session::default();

        assert!(both.is_authenticated());
        assert!(!identity_only.is_authenticated());
        assert!(!token_only.is_authenticated());
        assert!(!neither.is_authenticated());

        assert_eq!(both.mode(), SessionMode::SignedIn);
        assert_eq!(identity_only.mode(), SessionMode::SignedOut);
        assert_eq!(token_only.mode(), SessionMode::SignedOut);
    }

    #[test]
    fn test_sign_out_clears_token_in_same_step() {
        let mut session = Session::new();
        session.observe(Some(alice()));
        session.store_token(Some("tok".to_string()));
        assert!(session.is_authenticated());

        assert_eq!(session.observe(None), TokenAction::Cleared);
        assert!(session.identity().is_none());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_store_token_without_identity_is_dropped() {
        let mut session = Session::new();
        session.store_token(Some("tok".to_string()));
        assert!(session.token().is_none());
    }

    #[test]
    fn test_renotification_keeps_token_for_same_principal() {
        let mut session = Session::new();
        session.observe(Some(alice()));
        session.store_token(Some("tok".to_string()));

        assert_eq!(session.observe(Some(alice())), TokenAction::Acquire);
        assert_eq!(session.token(), Some("tok"));
    }

    #[test]
    fn test_principal_switch_drops_previous_token() {
        let mut session = Session::new();
        session.observe(Some(alice()));
        session.store_token(Some("tok".to_string()));

        session.observe(Some(Identity::new("uid-bob", None)));
        assert!(session.token().is_none());
        assert_eq!(session.identity().map(|i| i.uid.as_str()), Some("uid-bob"));
    }

    #[test]
    fn test_interface_dispatch() {
        assert_eq!(SessionMode::SignedOut.interface(), Interface::Login);
        assert_eq!(SessionMode::SignedIn.interface(), Interface::Query);
    }

    #[test]
    fn test_display_name_falls_back_to_uid() {
        assert_eq!(alice().display_name(), "alice@example.com");
        assert_eq!(Identity::new("uid-x", None).display_name(), "uid-x");
    }
}
