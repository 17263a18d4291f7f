//! Effect handlers for the TUI runtime.
//!
//! Handlers are pure async functions that return a `UiEvent`. The runtime
//! spawns them with `spawn_effect` and sends the result to the inbox.

use aki_core::auth::SessionClient;
use aki_core::records::{DocumentStore, Record};
use tracing::{debug, warn};

use crate::events::UiEvent;
use crate::query::QueryFailure;

/// Force-refreshes the token and looks up records for `username`.
pub async fn run_query(
    session: SessionClient,
    records: Option<DocumentStore>,
    seq: u64,
    username: String,
) -> UiEvent {
    let result = query_records(&session, records.as_ref(), &username).await;
    UiEvent::QueryFinished { seq, result }
}

async fn query_records(
    session: &SessionClient,
    records: Option<&DocumentStore>,
    username: &str,
) -> Result<Vec<Record>, QueryFailure> {
    let Some(token) = session.valid_token().await else {
        return Err(QueryFailure::NotAuthenticated);
    };
    let Some(records) = records else {
        return Err(QueryFailure::NotConfigured);
    };

    match records.find_by_username(&token, username).await {
        Ok(rows) => {
            debug!(rows = rows.len(), collection = records.collection(), "Query finished");
            Ok(rows)
        }
        Err(e) => {
            warn!("Query failed: {e:#}");
            Err(QueryFailure::Failed(format!("{e:#}")))
        }
    }
}
