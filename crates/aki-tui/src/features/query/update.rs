//! Query screen reducer.

use aki_core::records::Record;
use crossterm::event::{KeyCode, KeyEvent};

use super::state::{EMPTY_USERNAME_MESSAGE, QueryFailure, QueryState};
use crate::effects::UiEffect;

const PAGE: isize = 10;

/// Handles a key while the query screen is shown (no overlay open).
///
/// `next_seq` supplies the sequence number for a new lookup.
pub fn handle_key(
    state: &mut QueryState,
    key: KeyEvent,
    next_seq: impl FnOnce() -> u64,
) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Enter => execute(state, next_seq()),
        KeyCode::Up => {
            state.scroll_by(-1);
            vec![]
        }
        KeyCode::Down => {
            state.scroll_by(1);
            vec![]
        }
        KeyCode::PageUp => {
            state.scroll_by(-PAGE);
            vec![]
        }
        KeyCode::PageDown => {
            state.scroll_by(PAGE);
            vec![]
        }
        _ => {
            state.username.handle_key(key);
            vec![]
        }
    }
}

pub fn handle_paste(state: &mut QueryState, text: &str) {
    state.username.insert_str(text);
}

/// Starts a lookup for the entered username.
pub fn execute(state: &mut QueryState, seq: u64) -> Vec<UiEffect> {
    if state.loading {
        return vec![];
    }

    let username = state.username.value().trim().to_string();
    if username.is_empty() {
        state.error = Some(EMPTY_USERNAME_MESSAGE.to_string());
        return vec![];
    }

    state.error = None;
    state.loading = true;
    state.pending = Some(seq);
    vec![UiEffect::RunQuery { seq, username }]
}

/// Applies a finished lookup. Results for a superseded lookup are ignored.
pub fn handle_query_finished(
    state: &mut QueryState,
    seq: u64,
    result: Result<Vec<Record>, QueryFailure>,
) {
    if state.pending != Some(seq) {
        return;
    }
    state.pending = None;
    state.loading = false;
    state.scroll = 0;
    match result {
        Ok(records) => {
            state.error = None;
            state.results = Some(records);
        }
        Err(failure) => {
            state.results = None;
            state.error = Some(failure.to_string());
        }
    }
}
