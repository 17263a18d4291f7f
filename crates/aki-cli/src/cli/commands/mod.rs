//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod query;
pub mod ui;

use std::sync::Arc;

use aki_core::auth::{IdentityProvider, SessionController};
use aki_core::config::Config;
use aki_core::providers::FirebaseAuth;
use anyhow::Result;

/// Builds a signed-out controller over the configured Firebase project.
fn controller(config: &Config) -> Result<SessionController<FirebaseAuth>> {
    let provider = Arc::new(FirebaseAuth::new(config)?);
    Ok(SessionController::new(provider).with_request_timeout(config.request_timeout()))
}

/// Builds a controller and applies the provider's startup state, so a
/// restored session comes back with a token.
async fn restored_controller(config: &Config) -> Result<SessionController<FirebaseAuth>> {
    let mut controller = controller(config)?;
    let mut subscription = controller.provider().subscribe();
    if let Some(event) = subscription.recv().await {
        controller.handle_auth_state(event.identity).await;
    }
    subscription.unsubscribe();
    Ok(controller)
}
