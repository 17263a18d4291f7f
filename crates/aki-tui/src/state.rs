//! Application state composition.
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── screen: Screen         (login form or query screen)
//! │   ├── mode / identity        (last auth state from the session task)
//! │   └── settings               (collection, add-data page)
//! └── overlay: Option<Overlay>   (modal overlays)
//! ```
//!
//! State is split between `TuiState` and `Option<Overlay>` so that overlay
//! handlers can get `&mut self` and read `TuiState` simultaneously.

use aki_core::auth::{Identity, Interface, SessionMode};
use aki_core::config::Config;

use crate::login::LoginState;
use crate::overlays::Overlay;
use crate::query::QueryState;

/// The screen selected by the current interface.
#[derive(Debug, Clone)]
pub enum Screen {
    Login(LoginState),
    Query(QueryState),
}

impl Screen {
    /// Builds a fresh screen for `interface`.
    pub fn for_interface(interface: Interface) -> Self {
        match interface {
            Interface::Login => Screen::Login(LoginState::new()),
            Interface::Query => Screen::Query(QueryState::new()),
        }
    }

    pub fn interface(&self) -> Interface {
        match self {
            Screen::Login(_) => Interface::Login,
            Screen::Query(_) => Interface::Query,
        }
    }
}

/// Non-overlay UI state.
#[derive(Debug)]
pub struct TuiState {
    pub screen: Screen,
    pub mode: SessionMode,
    pub identity: Option<Identity>,
    /// Firestore collection shown in the query prompt.
    pub collection: String,
    /// Page opened by "Add New Data".
    pub add_data_url: Option<String>,
    pub should_quit: bool,
    /// Last issued lookup sequence number.
    pub query_seq: u64,
}

impl TuiState {
    pub fn new(collection: impl Into<String>, add_data_url: Option<String>) -> Self {
        let mode = SessionMode::default();
        Self {
            screen: Screen::for_interface(mode.interface()),
            mode,
            identity: None,
            collection: collection.into(),
            add_data_url,
            should_quit: false,
            query_seq: 0,
        }
    }
}

/// Combined application state for the TUI.
#[derive(Debug)]
pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    pub fn new(collection: impl Into<String>, add_data_url: Option<String>) -> Self {
        Self {
            tui: TuiState::new(collection, add_data_url),
            overlay: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.collection.clone(), config.effective_add_data_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_login_screen() {
        let app = AppState::new("users", None);
        assert_eq!(app.tui.mode, SessionMode::SignedOut);
        assert_eq!(app.tui.screen.interface(), Interface::Login);
        assert!(app.overlay.is_none());
    }

    #[test]
    fn test_screen_matches_interface() {
        assert_eq!(
            Screen::for_interface(Interface::Query).interface(),
            Interface::Query
        );
        assert_eq!(
            Screen::for_interface(Interface::Login).interface(),
            Interface::Login
        );
    }
}
