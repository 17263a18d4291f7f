//! Overlay modules for the TUI.
//!
//! Overlays are modal UI components that temporarily take over keyboard input.
//! Each overlay is self-contained: it owns its state, key handler, and render function.
//!
//! ## Module Structure
//!
//! - `options.rs`: Options menu (Ctrl+O or F2 on the query screen)
//! - `notice.rs`: Modal message, dismissed with Enter
//! - `render_utils.rs`: Shared rendering utilities for overlays

pub mod notice;
pub mod options;
pub mod render_utils;

use crossterm::event::KeyEvent;
pub use notice::NoticeState;
pub use options::{ADD_DATA_UNAVAILABLE, OptionsItem, OptionsState};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::effects::UiEffect;

/// Requests to open a new overlay.
#[derive(Debug)]
pub enum OverlayRequest {
    Options,
    Notice(String),
}

/// Transition returned by overlay key handlers.
#[derive(Debug)]
pub enum OverlayTransition {
    Stay,
    Close,
    Open(OverlayRequest),
}

/// Update returned by overlay key handlers.
#[derive(Debug)]
pub struct OverlayUpdate {
    pub transition: OverlayTransition,
    pub effects: Vec<UiEffect>,
}

impl OverlayUpdate {
    fn new(transition: OverlayTransition) -> Self {
        Self {
            transition,
            effects: Vec::new(),
        }
    }

    pub fn stay() -> Self {
        Self::new(OverlayTransition::Stay)
    }

    pub fn close() -> Self {
        Self::new(OverlayTransition::Close)
    }

    pub fn open(request: OverlayRequest) -> Self {
        Self::new(OverlayTransition::Open(request))
    }

    #[must_use]
    pub fn with_ui_effects(mut self, effects: Vec<UiEffect>) -> Self {
        self.effects = effects;
        self
    }
}

#[derive(Debug)]
pub enum Overlay {
    Options(OptionsState),
    Notice(NoticeState),
}

impl Overlay {
    pub fn from_request(request: OverlayRequest) -> Self {
        match request {
            OverlayRequest::Options => Overlay::Options(OptionsState::open()),
            OverlayRequest::Notice(message) => Overlay::Notice(NoticeState::open(message)),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        match self {
            Overlay::Options(o) => o.render(frame, area),
            Overlay::Notice(n) => n.render(frame, area),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, add_data_url: Option<&str>) -> OverlayUpdate {
        match self {
            Overlay::Options(o) => o.handle_key(key, add_data_url),
            Overlay::Notice(n) => n.handle_key(key),
        }
    }
}

/// Routes a key to the active overlay, if any, and applies its transition.
///
/// Returns `None` when no overlay is open.
pub fn handle_overlay_key(
    overlay: &mut Option<Overlay>,
    key: KeyEvent,
    add_data_url: Option<&str>,
) -> Option<Vec<UiEffect>> {
    let update = overlay.as_mut()?.handle_key(key, add_data_url);
    match update.transition {
        OverlayTransition::Stay => {}
        OverlayTransition::Close => *overlay = None,
        OverlayTransition::Open(request) => *overlay = Some(Overlay::from_request(request)),
    }
    Some(update.effects)
}
