//! Record lookup against Cloud Firestore.
//!
//! Runs a structured `runQuery` filtered on `username == <input>` and flattens
//! each matching document into a display [`Record`].

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::config::Config;

/// One row of a lookup result. Every field is a display string; missing
/// fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "type")]
    pub kind: String,
    pub username: String,
    pub password: String,
    pub date: String,
    pub notes: String,
    pub extra: String,
}

impl Record {
    pub const HEADERS: [&'static str; 6] = ["Type", "Username", "Password", "Date", "Notes", "Extra"];

    /// Cells in [`Self::HEADERS`] order.
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.kind,
            &self.username,
            &self.password,
            &self.date,
            &self.notes,
            &self.extra,
        ]
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        let field = |name: &str| fields.get(name).map(display_value).unwrap_or_default();
        Self {
            kind: field("type"),
            username: field("username"),
            password: field("password"),
            date: field("date"),
            notes: field("notes"),
            extra: field("extra"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryRow {
    #[serde(default)]
    document: Option<Document>,
}

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Renders a Firestore typed value (`{"stringValue": "..."}` etc.) as text.
fn display_value(value: &Value) -> String {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return String::new();
    };
    match (kind.as_str(), inner) {
        ("nullValue", _) => String::new(),
        ("timestampValue", Value::String(raw)) => format_timestamp(raw),
        ("arrayValue", array) => array
            .get("values")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .map(display_value)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default(),
        ("mapValue", map) => map
            .get("fields")
            .map(Value::to_string)
            .unwrap_or_default(),
        (_, Value::String(s)) => s.clone(),
        (_, other) => other.to_string(),
    }
}

fn format_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw).map_or_else(
        |_| raw.to_string(),
        |ts| ts.with_timezone(&Utc).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// Client for the configured Firestore collection.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    collection: String,
}

impl DocumentStore {
    /// # Errors
    /// Returns an error if no project id is configured.
    pub fn new(config: &Config) -> Result<Self> {
        let project_id = config.firebase.effective_project_id().context(
            "Firebase project id is not configured (set [firebase].project_id or AKI_FIREBASE_PROJECT_ID)",
        )?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.firebase.effective_firestore_base_url(),
            project_id,
            collection: config.collection.clone(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn run_query_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents:runQuery",
            self.base_url, self.project_id
        )
    }

    /// Returns every record whose `username` equals `username` exactly.
    ///
    /// # Errors
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn find_by_username(&self, token: &str, username: &str) -> Result<Vec<Record>> {
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": self.collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "username" },
                        "op": "EQUAL",
                        "value": { "stringValue": username }
                    }
                }
            }
        });

        let response = self
            .http
            .post(self.run_query_url())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .context("Failed to send query request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Query failed (HTTP {status}): {body}");
        }

        let rows: Vec<QueryRow> = response
            .json()
            .await
            .context("Failed to parse query response")?;

        let records: Vec<Record> = rows
            .into_iter()
            .filter_map(|row| row.document)
            .map(|doc| Record::from_fields(&doc.fields))
            .collect();
        debug!(
            collection = %self.collection,
            count = records.len(),
            "Query finished"
        );
        Ok(records)
    }
}
