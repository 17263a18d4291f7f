//! Full-screen terminal UI for aki.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};

use aki_core::auth::{IdentityProvider, SessionController, spawn_session};
use aki_core::config::Config;
use aki_core::records::DocumentStore;
use anyhow::Result;
pub use features::{login, query};
pub use runtime::TuiRuntime;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::state::AppState;

/// Runs the interactive UI until the user quits.
///
/// The session task is started before the terminal is taken over, so the
/// provider's startup state is the first thing the UI applies.
///
/// # Errors
/// Returns an error if stderr is not a terminal or terminal I/O fails.
pub async fn run_interactive<P: IdentityProvider>(
    config: &Config,
    controller: SessionController<P>,
) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "Interactive mode requires a terminal.\n\
             Use `aki query <USERNAME>` for non-interactive lookups."
        );
    }

    let records = match DocumentStore::new(config) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("Lookups disabled: {e:#}");
            None
        }
    };

    let (updates_tx, updates_rx) = mpsc::unbounded_channel();
    let handle = spawn_session(controller, updates_tx);
    info!("Session task started");

    let result = TuiRuntime::new(
        AppState::from_config(config),
        handle.client(),
        updates_rx,
        records,
    )
    .and_then(|mut runtime| runtime.run());

    handle.shutdown().await;
    result
}
