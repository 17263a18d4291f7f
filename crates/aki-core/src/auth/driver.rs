//! Session driver.
//!
//! A single task owns the [`SessionController`] and is the only consumer of
//! the provider's auth-state subscription. UI code talks to it through a
//! [`SessionClient`] and receives [`SessionUpdate`]s on a channel.
//!
//! Notifications are applied strictly in arrival order. A notification that
//! arrives while a command is running is queued and applied right after it,
//! so the most recent notification always wins.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::controller::SessionController;
use super::errors::AuthFailure;
use super::provider::{AuthStateSubscription, IdentityProvider};
use super::session::{Identity, SessionMode};

/// Requests handled by the session task.
#[derive(Debug)]
pub enum SessionCommand {
    Login { email: String, password: String },
    Logout,
    /// Force-refreshes the token and replies with it (`None` when signed out).
    ValidToken {
        reply: oneshot::Sender<Option<String>>,
    },
}

/// Updates published by the session task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// Sent after every auth-state notification has been applied, and after
    /// any command that changed the session mode.
    AuthState {
        mode: SessionMode,
        identity: Option<Identity>,
    },
    LoginFinished(Result<Identity, AuthFailure>),
    LogoutFinished(Result<(), AuthFailure>),
}

/// Cloneable command sender for the session task.
#[derive(Debug, Clone)]
pub struct SessionClient {
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionClient {
    pub fn login(&self, email: String, password: String) {
        let _ = self.commands.send(SessionCommand::Login { email, password });
    }

    pub fn logout(&self) {
        let _ = self.commands.send(SessionCommand::Logout);
    }

    /// Returns a freshly refreshed token, or `None` when not authenticated.
    pub async fn valid_token(&self) -> Option<String> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::ValidToken { reply })
            .ok()?;
        rx.await.ok().flatten()
    }
}

/// Owner handle for the session task.
#[derive(Debug)]
pub struct SessionHandle {
    client: SessionClient,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn client(&self) -> SessionClient {
        self.client.clone()
    }

    /// Stops the task and unsubscribes from the provider.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }

    /// Requests a stop without waiting for it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Spawns the session task.
///
/// Subscribes before spawning, so the provider's startup state is the first
/// notification the task applies.
pub fn spawn_session<P: IdentityProvider>(
    controller: SessionController<P>,
    updates: mpsc::UnboundedSender<SessionUpdate>,
) -> SessionHandle {
    let subscription = controller.provider().subscribe();
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run(
        controller,
        subscription,
        commands_rx,
        updates,
        cancel.clone(),
    ));

    SessionHandle {
        client: SessionClient {
            commands: commands_tx,
        },
        cancel,
        task,
    }
}

async fn run<P: IdentityProvider>(
    mut controller: SessionController<P>,
    mut subscription: AuthStateSubscription,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    updates: mpsc::UnboundedSender<SessionUpdate>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = subscription.recv() => {
                let Some(event) = event else { break };
                let mode = controller.handle_auth_state(event.identity).await;
                let identity = controller.session().identity().cloned();
                let _ = updates.send(SessionUpdate::AuthState { mode, identity });
            }
            command = commands.recv() => {
                let Some(command) = command else { break };
                let before = controller.mode();
                handle_command(&mut controller, command, &updates).await;
                // A failed refresh can drop the token without any notification
                let mode = controller.mode();
                if mode != before {
                    let identity = controller.session().identity().cloned();
                    let _ = updates.send(SessionUpdate::AuthState { mode, identity });
                }
            }
        }
    }

    subscription.unsubscribe();
    debug!("Session task stopped");
}

async fn handle_command<P: IdentityProvider>(
    controller: &mut SessionController<P>,
    command: SessionCommand,
    updates: &mpsc::UnboundedSender<SessionUpdate>,
) {
    match command {
        SessionCommand::Login { email, password } => {
            let result = controller.login(&email, &password).await;
            let _ = updates.send(SessionUpdate::LoginFinished(result));
        }
        SessionCommand::Logout => {
            let result = controller.logout().await;
            let _ = updates.send(SessionUpdate::LogoutFinished(result));
        }
        SessionCommand::ValidToken { reply } => {
            let token = controller.get_valid_token().await;
            let _ = reply.send(token);
        }
    }
}
