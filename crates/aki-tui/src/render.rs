//! Top-level render function.
//!
//! Pure: reads state, draws the screen selected by the current interface,
//! then the active overlay on top.

use aki_core::auth::Identity;
use ratatui::Frame;

use crate::login::render_login;
use crate::query::{QueryView, render_query};
use crate::state::{AppState, Screen};

pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();

    match &app.tui.screen {
        Screen::Login(state) => render_login(frame, state, area),
        Screen::Query(state) => render_query(
            frame,
            &QueryView {
                state,
                collection: &app.tui.collection,
                signed_in_as: app.tui.identity.as_ref().map(Identity::display_name),
                focused: app.overlay.is_none(),
            },
            area,
        ),
    }

    if let Some(overlay) = &app.overlay {
        overlay.render(frame, area);
    }
}
