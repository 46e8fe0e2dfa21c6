//! Query dispatcher: maps an extension query to a search scope, runs the
//! search and folds every hit into a card attachment.

mod format;

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::ExtensionError;
use crate::extension::protocol::{Activity, InvokeResponse, QueryParameter, QueryRequest, ResponseEnvelope};
use crate::telemetry::{Severity, Telemetry};
use crate::tickets::SearchBackend;
use crate::SearchScope;

pub use self::format::{card_pair, format_card, status_label, CardPair, PREVIEW_TITLE_CHARS};

/// Parameter carrying the text typed into the command box.
pub const SEARCH_TEXT_PARAMETER: &str = "searchText";

/// Suffix appended to every query so the backend does prefix matching.
pub const WILDCARD_SUFFIX: char = '*';

/// Result of handling one activity.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Respond(InvokeResponse),
    /// Not a query activity; the transport sends nothing back.
    Ignore,
}

/// Map a command id to its search scope. Unknown ids have no scope.
pub fn scope_for_command(command_id: &str) -> Option<SearchScope> {
    match command_id {
        "recents" => Some(SearchScope::RecentTickets),
        "openrequests" => Some(SearchScope::OpenTickets),
        "assignedrequests" => Some(SearchScope::AssignedTickets),
        _ => None,
    }
}

/// Value of the first `searchText` parameter (ASCII case-insensitive name), or `""`.
/// Entries without a name are skipped.
pub fn extract_query_text(parameters: &[QueryParameter]) -> String {
    parameters
        .iter()
        .find(|p| {
            p.name
                .as_deref()
                .is_some_and(|name| name.eq_ignore_ascii_case(SEARCH_TEXT_PARAMETER))
        })
        .map(|p| value_as_text(&p.value))
        .unwrap_or_default()
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Decode the activity body into a query request.
pub fn parse_query_request(activity: &Activity) -> Result<QueryRequest, ExtensionError> {
    let body = activity.value.clone().unwrap_or(Value::Null);
    serde_json::from_value(body).map_err(ExtensionError::MalformedRequest)
}

/// Handles `composeExtension/query` activities.
///
/// Stateless apart from the injected collaborators, so one instance can serve
/// any number of concurrent activities.
#[derive(Clone)]
pub struct QueryDispatcher {
    backend: Arc<dyn SearchBackend>,
    telemetry: Arc<dyn Telemetry>,
}

impl QueryDispatcher {
    pub fn new(backend: Arc<dyn SearchBackend>, telemetry: Arc<dyn Telemetry>) -> Self {
        Self { backend, telemetry }
    }

    /// Handle one activity. Failures are reported to telemetry and returned unchanged.
    pub async fn handle_query(&self, activity: &Activity) -> Result<QueryOutcome, ExtensionError> {
        if !activity.is_query() {
            debug!(
                activity_type = %activity.activity_type,
                name = activity.name.as_deref().unwrap_or(""),
                "Ignoring non-query activity"
            );
            return Ok(QueryOutcome::Ignore);
        }

        match self.run_query(activity).await {
            Ok(response) => Ok(QueryOutcome::Respond(response)),
            Err(e) => {
                self.telemetry
                    .trace(&format!("Extension query failed: {}", e), Severity::Error);
                self.telemetry.track_exception(&e);
                Err(e)
            }
        }
    }

    async fn run_query(&self, activity: &Activity) -> Result<InvokeResponse, ExtensionError> {
        let start = Instant::now();
        let request = parse_query_request(activity)?;
        let mut query = extract_query_text(&request.parameters);
        query.push(WILDCARD_SUFFIX);
        let options = request.query_options;

        let records = match scope_for_command(&request.command_id) {
            Some(scope) => self
                .backend
                .search(scope, &query, options.count, options.skip)
                .await
                .map_err(ExtensionError::Backend)?,
            None => {
                debug!(command_id = %request.command_id, "Unknown command, returning no results");
                Vec::new()
            }
        };

        let attachments: Vec<_> = records
            .iter()
            .map(|record| card_pair(record).into_attachment())
            .collect();

        debug!(command_id = %request.command_id, query = %query, "Extension query text");
        info!(
            command_id = %request.command_id,
            count = ?options.count,
            skip = ?options.skip,
            results = attachments.len(),
            elapsed_ms = format_args!("{:.1}", start.elapsed().as_secs_f64() * 1000.0),
            "Extension query answered"
        );

        Ok(InvokeResponse::ok(ResponseEnvelope::list(attachments)))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod handlers_test_utils;

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
