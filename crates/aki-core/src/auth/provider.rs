//! Identity provider contract.
//!
//! The provider owns sign-in, sign-out and token issuance. Sign-in state
//! changes are pushed to subscribers over a channel, in the order they happen.

use std::future::Future;

use tokio::sync::mpsc;

use super::errors::ProviderResult;
use super::session::Identity;

/// Auth-state notification: the provider's current identity, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStateEvent {
    pub identity: Option<Identity>,
}

/// Receiving end of an auth-state subscription.
///
/// Dropping the subscription (or calling [`unsubscribe`](Self::unsubscribe))
/// stops delivery; the provider prunes closed subscribers on its next emit.
#[derive(Debug)]
pub struct AuthStateSubscription {
    rx: mpsc::UnboundedReceiver<AuthStateEvent>,
}

impl AuthStateSubscription {
    /// Waits for the next notification. Returns `None` once the provider is gone
    /// or the subscription was closed.
    pub async fn recv(&mut self) -> Option<AuthStateEvent> {
        self.rx.recv().await
    }

    /// Returns the next queued notification without waiting.
    pub fn try_recv(&mut self) -> Option<AuthStateEvent> {
        self.rx.try_recv().ok()
    }

    pub fn unsubscribe(mut self) {
        self.rx.close();
    }
}

/// Subscriber list kept by providers.
///
/// Providers hold this behind the same lock as their sign-in state so that
/// a new subscriber's initial notification and later emits cannot interleave.
#[derive(Debug, Default)]
pub struct Subscribers {
    senders: Vec<mpsc::UnboundedSender<AuthStateEvent>>,
}

impl Subscribers {
    /// Registers a subscriber and queues the current state as its first event.
    pub fn add(&mut self, current: Option<Identity>) -> AuthStateSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(AuthStateEvent { identity: current });
        self.senders.push(tx);
        AuthStateSubscription { rx }
    }

    /// Sends a notification to every live subscriber.
    pub fn emit(&mut self, identity: Option<&Identity>) {
        self.senders.retain(|tx| !tx.is_closed());
        for tx in &self.senders {
            let _ = tx.send(AuthStateEvent {
                identity: identity.cloned(),
            });
        }
    }

    pub fn len(&self) -> usize {
        self.senders.iter().filter(|tx| !tx.is_closed()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Capabilities the session controller needs from an identity provider.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Subscribes to auth-state changes. The current state is delivered first.
    fn subscribe(&self) -> AuthStateSubscription;

    /// Returns an id token for `identity`, refreshing it when `force_refresh`
    /// is set or the cached one has expired.
    fn id_token(
        &self,
        identity: &Identity,
        force_refresh: bool,
    ) -> impl Future<Output = ProviderResult<String>> + Send;

    fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = ProviderResult<Identity>> + Send;

    fn sign_out(&self) -> impl Future<Output = ProviderResult<()>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_subscriber_gets_current_state_first() {
        let mut subscribers = Subscribers::default();
        let identity = Identity::new("uid-1", None);
        let mut sub = subscribers.add(Some(identity.clone()));

        subscribers.emit(None);

        assert_eq!(sub.recv().await.unwrap().identity, Some(identity));
        assert_eq!(sub.recv().await.unwrap().identity, None);
    }

    #[test]
    fn test_unsubscribed_receivers_are_pruned() {
        let mut subscribers = Subscribers::default();
        let keep = subscribers.add(None);
        let gone = subscribers.add(None);
        assert_eq!(subscribers.len(), 2);

        gone.unsubscribe();
        subscribers.emit(None);

        assert_eq!(subscribers.len(), 1);
        drop(keep);
        assert!(subscribers.is_empty());
    }
}
