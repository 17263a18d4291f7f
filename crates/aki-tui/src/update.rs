//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use aki_core::auth::errors::GENERIC_AUTH_MESSAGE;
use aki_core::auth::{SessionMode, SessionUpdate};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::overlays::{self, NoticeState, Overlay, OptionsState};
use crate::state::{AppState, Screen, TuiState};
use crate::{login, query};

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => vec![],
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::Session(session_update) => {
            handle_session_update(app, session_update);
            vec![]
        }
        UiEvent::QueryFinished { seq, result } => {
            if let Screen::Query(state) = &mut app.tui.screen {
                query::handle_query_finished(state, seq, result);
            }
            vec![]
        }
    }
}

/// Applies an update from the session task.
///
/// Every auth-state update rebuilds the screen for the reported mode, the
/// same way a page re-renders on each sign-in state notification.
fn handle_session_update(app: &mut AppState, session_update: SessionUpdate) {
    match session_update {
        SessionUpdate::AuthState { mode, identity } => {
            debug!(mode = mode.label(), "Rendering interface");
            // Signed out with a user present means the token could not be obtained
            let token_failed = mode == SessionMode::SignedOut && identity.is_some();
            app.tui.mode = mode;
            app.tui.identity = identity;
            app.tui.screen = Screen::for_interface(mode.interface());
            app.overlay = None;
            if token_failed && let Screen::Login(state) = &mut app.tui.screen {
                state.error = Some(GENERIC_AUTH_MESSAGE.to_string());
            }
        }
        SessionUpdate::LoginFinished(result) => {
            if let Screen::Login(state) = &mut app.tui.screen {
                login::handle_login_finished(state, &result);
            }
        }
        SessionUpdate::LogoutFinished(Ok(())) => {}
        SessionUpdate::LogoutFinished(Err(failure)) => {
            app.overlay = Some(Overlay::Notice(NoticeState::open(failure.message)));
        }
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Paste(text) => {
            if app.overlay.is_none() {
                match &mut app.tui.screen {
                    Screen::Login(state) => login::handle_paste(state, &text),
                    Screen::Query(state) => query::handle_paste(state, &text),
                }
            }
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('c' | 'q')) {
        return vec![UiEffect::Quit];
    }

    // Try to dispatch to the active overlay
    if let Some(effects) =
        overlays::handle_overlay_key(&mut app.overlay, key, app.tui.add_data_url.as_deref())
    {
        return effects;
    }

    let TuiState {
        screen, query_seq, ..
    } = &mut app.tui;
    match screen {
        Screen::Login(state) => login::handle_key(state, key),
        Screen::Query(_) if is_options_toggle(key) => {
            app.overlay = Some(Overlay::Options(OptionsState::open()));
            vec![]
        }
        Screen::Query(state) => query::handle_key(state, key, || {
            *query_seq += 1;
            *query_seq
        }),
    }
}

fn is_options_toggle(key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    matches!(key.code, KeyCode::F(2)) || (ctrl && key.code == KeyCode::Char('o'))
}

#[cfg(test)]
mod tests {
    use aki_core::auth::{AuthFailure, Identity, SessionMode};
    use aki_core::records::Record;

    use super::*;
    use crate::query::QueryFailure;

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn ctrl(c: char) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::CONTROL,
        )))
    }

    fn type_text(app: &mut AppState, text: &str) {
        for c in text.chars() {
            update(app, key(KeyCode::Char(c)));
        }
    }

    fn alice() -> Identity {
        Identity::new("uid-alice", Some("alice@example.com".to_string()))
    }

    fn signed_in(app: &mut AppState) {
        update(
            app,
            UiEvent::Session(SessionUpdate::AuthState {
                mode: SessionMode::SignedIn,
                identity: Some(alice()),
            }),
        );
    }

    fn login_state(app: &AppState) -> &login::LoginState {
        match &app.tui.screen {
            Screen::Login(state) => state,
            Screen::Query(_) => panic!("expected login screen"),
        }
    }

    fn query_state(app: &AppState) -> &query::QueryState {
        match &app.tui.screen {
            Screen::Query(state) => state,
            Screen::Login(_) => panic!("expected query screen"),
        }
    }

    #[test]
    fn test_login_with_empty_email_does_not_submit() {
        let mut app = AppState::new("users", None);
        update(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "hunter22");

        let effects = update(&mut app, key(KeyCode::Enter));

        assert!(effects.is_empty());
        assert_eq!(
            login_state(&app).error.as_deref(),
            Some("Please enter both email and password")
        );
    }

    #[test]
    fn test_login_submit_then_failure() {
        let mut app = AppState::new("users", None);
        type_text(&mut app, "alice@example.com");
        update(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "wrong");

        let effects = update(&mut app, key(KeyCode::Enter));
        assert_eq!(
            effects,
            vec![UiEffect::SubmitLogin {
                email: "alice@example.com".to_string(),
                password: "wrong".to_string(),
            }]
        );
        assert!(login_state(&app).loading);

        update(
            &mut app,
            UiEvent::Session(SessionUpdate::LoginFinished(Err(AuthFailure {
                code: None,
                message: "Incorrect password".to_string(),
            }))),
        );

        let state = login_state(&app);
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Incorrect password"));
    }

    #[test]
    fn test_auth_state_switches_screens() {
        let mut app = AppState::new("users", None);
        signed_in(&mut app);
        assert_eq!(app.tui.mode, SessionMode::SignedIn);
        assert!(matches!(app.tui.screen, Screen::Query(_)));

        update(
            &mut app,
            UiEvent::Session(SessionUpdate::AuthState {
                mode: SessionMode::SignedOut,
                identity: None,
            }),
        );
        assert!(matches!(app.tui.screen, Screen::Login(_)));
        assert!(app.tui.identity.is_none());
    }

    #[test]
    fn test_identity_without_token_stays_on_login() {
        let mut app = AppState::new("users", None);
        update(
            &mut app,
            UiEvent::Session(SessionUpdate::AuthState {
                mode: SessionMode::SignedOut,
                identity: Some(alice()),
            }),
        );
        assert_eq!(
            login_state(&app).error.as_deref(),
            Some("Authentication error occurred")
        );
    }

    #[test]
    fn test_plain_sign_out_shows_no_error() {
        let mut app = AppState::new("users", None);
        update(
            &mut app,
            UiEvent::Session(SessionUpdate::AuthState {
                mode: SessionMode::SignedOut,
                identity: None,
            }),
        );
        assert_eq!(login_state(&app).error, None);
    }

    #[test]
    fn test_login_form_is_fresh_after_sign_out() {
        let mut app = AppState::new("users", None);
        type_text(&mut app, "alice@example.com");
        signed_in(&mut app);
        update(
            &mut app,
            UiEvent::Session(SessionUpdate::AuthState {
                mode: SessionMode::SignedOut,
                identity: None,
            }),
        );
        assert!(login_state(&app).email.is_empty());
    }

    #[test]
    fn test_query_roundtrip() {
        let mut app = AppState::new("users", None);
        signed_in(&mut app);
        type_text(&mut app, "bob");

        let effects = update(&mut app, key(KeyCode::Enter));
        assert_eq!(
            effects,
            vec![UiEffect::RunQuery {
                seq: 1,
                username: "bob".to_string()
            }]
        );
        assert!(query_state(&app).loading);

        update(
            &mut app,
            UiEvent::QueryFinished {
                seq: 1,
                result: Ok(vec![Record::default(), Record::default()]),
            },
        );
        let state = query_state(&app);
        assert!(!state.loading);
        assert_eq!(state.row_count(), 2);
    }

    #[test]
    fn test_query_result_for_replaced_screen_is_dropped() {
        let mut app = AppState::new("users", None);
        signed_in(&mut app);
        type_text(&mut app, "bob");
        update(&mut app, key(KeyCode::Enter));
        signed_in(&mut app);

        update(
            &mut app,
            UiEvent::QueryFinished {
                seq: 1,
                result: Err(QueryFailure::NotAuthenticated),
            },
        );

        let state = query_state(&app);
        assert_eq!(state.error, None);
        assert!(!state.loading);
    }

    #[test]
    fn test_options_logout() {
        let mut app = AppState::new("users", None);
        signed_in(&mut app);

        update(&mut app, ctrl('o'));
        assert!(matches!(app.overlay, Some(Overlay::Options(_))));

        update(&mut app, key(KeyCode::Down));
        let effects = update(&mut app, key(KeyCode::Enter));

        assert_eq!(effects, vec![UiEffect::Logout]);
        assert!(app.overlay.is_none());
    }

    #[test]
    fn test_options_add_new_data_opens_page() {
        let mut app = AppState::new(
            "users",
            Some("https://aki.example.com/add-data.html".to_string()),
        );
        signed_in(&mut app);
        update(&mut app, key(KeyCode::F(2)));

        let effects = update(&mut app, key(KeyCode::Enter));

        assert_eq!(
            effects,
            vec![UiEffect::OpenBrowser {
                url: "https://aki.example.com/add-data.html".to_string()
            }]
        );
    }

    #[test]
    fn test_options_not_available_on_login_screen() {
        let mut app = AppState::new("users", None);
        update(&mut app, key(KeyCode::F(2)));
        assert!(app.overlay.is_none());
    }

    #[test]
    fn test_failed_logout_shows_notice() {
        let mut app = AppState::new("users", None);
        signed_in(&mut app);

        update(
            &mut app,
            UiEvent::Session(SessionUpdate::LogoutFinished(Err(AuthFailure::logout()))),
        );

        let Some(Overlay::Notice(notice)) = &app.overlay else {
            panic!("expected a notice");
        };
        assert_eq!(notice.message, "Logout error");
        assert!(matches!(app.tui.screen, Screen::Query(_)));

        update(&mut app, key(KeyCode::Enter));
        assert!(app.overlay.is_none());
    }

    #[test]
    fn test_ctrl_c_quits_everywhere() {
        let mut app = AppState::new("users", None);
        assert_eq!(update(&mut app, ctrl('c')), vec![UiEffect::Quit]);
        signed_in(&mut app);
        update(&mut app, ctrl('o'));
        assert_eq!(update(&mut app, ctrl('c')), vec![UiEffect::Quit]);
    }

    #[test]
    fn test_paste_into_query_input() {
        let mut app = AppState::new("users", None);
        signed_in(&mut app);
        update(&mut app, UiEvent::Terminal(Event::Paste("bob".to_string())));
        assert_eq!(query_state(&app).username.value(), "bob");
    }
}
