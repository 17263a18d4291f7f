use std::fmt;

use aki_core::records::Record;

use crate::common::TextField;

pub const EMPTY_USERNAME_MESSAGE: &str = "Please enter a username";
pub const NOT_AUTHENTICATED_MESSAGE: &str = "Not authenticated";
pub const NO_DATA_MESSAGE: &str = "No data to display";

/// Why a lookup produced no table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryFailure {
    /// No valid token could be obtained.
    NotAuthenticated,
    /// No document store is configured.
    NotConfigured,
    /// The request failed.
    Failed(String),
}

impl fmt::Display for QueryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryFailure::NotAuthenticated => f.write_str(NOT_AUTHENTICATED_MESSAGE),
            QueryFailure::NotConfigured => {
                f.write_str("Database is not configured (set [firebase].project_id)")
            }
            QueryFailure::Failed(message) => write!(f, "Error loading data: {message}"),
        }
    }
}

/// Query screen state. Rebuilt whenever the signed-in screen is shown.
#[derive(Debug, Clone, Default)]
pub struct QueryState {
    pub username: TextField,
    /// "Loading..." is shown while set.
    pub loading: bool,
    pub error: Option<String>,
    /// `None` until the first lookup finishes; the table stays hidden.
    pub results: Option<Vec<Record>>,
    /// First visible result row.
    pub scroll: usize,
    /// Sequence number of the lookup in flight. Results for any other
    /// sequence are stale and dropped.
    pub pending: Option<u64>,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.results.as_ref().map_or(0, Vec::len)
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.row_count().saturating_sub(1);
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }
}
