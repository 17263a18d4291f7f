//! Events consumed by the reducer.

use aki_core::auth::SessionUpdate;
use aki_core::records::Record;
use crossterm::event::Event;

use crate::query::QueryFailure;

#[derive(Debug)]
pub enum UiEvent {
    /// Periodic tick (drives redraws).
    Tick,
    /// Raw terminal input.
    Terminal(Event),
    /// Published by the session task.
    Session(SessionUpdate),
    /// A record lookup finished.
    QueryFinished {
        seq: u64,
        result: Result<Vec<Record>, QueryFailure>,
    },
}
