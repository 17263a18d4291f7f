//! Login form reducer.

use aki_core::auth::{AuthFailure, Identity};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

use super::state::{EMPTY_FIELDS_MESSAGE, LoginState};
use crate::effects::UiEffect;

/// Handles a key while the login screen is shown.
pub fn handle_key(state: &mut LoginState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Enter => submit(state),
        KeyCode::Tab | KeyCode::Down => {
            state.focus = state.focus.next();
            vec![]
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.focus = state.focus.prev();
            vec![]
        }
        _ => {
            if let Some(field) = state.focused_field_mut() {
                field.handle_key(key);
            }
            vec![]
        }
    }
}

/// Pastes text into the focused field.
pub fn handle_paste(state: &mut LoginState, text: &str) {
    if let Some(field) = state.focused_field_mut() {
        field.insert_str(text);
    }
}

/// Validates the form and requests a login.
///
/// The email is trimmed, the password is sent as typed. Empty fields show an
/// inline error without contacting the provider.
pub fn submit(state: &mut LoginState) -> Vec<UiEffect> {
    if !state.can_submit() {
        return vec![];
    }

    let email = state.email.value().trim().to_string();
    let password = state.password.value().to_string();
    if email.is_empty() || password.is_empty() {
        state.error = Some(EMPTY_FIELDS_MESSAGE.to_string());
        return vec![];
    }

    debug!("Submitting login form");
    state.error = None;
    state.loading = true;
    vec![UiEffect::SubmitLogin { email, password }]
}

/// Applies the login result: stops the indicator and shows the mapped message
/// on failure. Success needs nothing here, the auth-state update swaps screens.
pub fn handle_login_finished(state: &mut LoginState, result: &Result<Identity, AuthFailure>) {
    state.loading = false;
    if let Err(failure) = result {
        state.error = Some(failure.message.clone());
    }
}
