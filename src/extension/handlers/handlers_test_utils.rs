//! Shared test helpers for dispatcher tests: a scripted backend and a
//! telemetry sink that records what it was told.

use super::*;
use crate::error::BackendError;
use crate::{parse_timestamp, TicketRecord};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;

/// One recorded backend call: (scope, query, count, skip).
pub(crate) type SearchCall = (SearchScope, String, Option<u32>, Option<u32>);

/// Backend that returns a fixed result (or failure) and records every call.
pub(crate) struct ScriptedBackend {
    records: Vec<TicketRecord>,
    failure: Option<String>,
    pub(crate) calls: Mutex<Vec<SearchCall>>,
}

impl ScriptedBackend {
    pub(crate) fn returning(records: Vec<TicketRecord>) -> Arc<Self> {
        Arc::new(Self { records, failure: None, calls: Mutex::new(Vec::new()) })
    }

    pub(crate) fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            records: Vec::new(),
            failure: Some(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn search(
        &self,
        scope: SearchScope,
        query: &str,
        count: Option<u32>,
        skip: Option<u32>,
    ) -> Result<Vec<TicketRecord>, BackendError> {
        self.calls.lock().unwrap().push((scope, query.to_string(), count, skip));
        tokio::task::yield_now().await;
        match &self.failure {
            Some(msg) => Err(msg.clone().into()),
            None => Ok(self.records.clone()),
        }
    }
}

/// Telemetry that keeps traces and exception kinds in memory.
#[derive(Default)]
pub(crate) struct RecordingTelemetry {
    pub(crate) traces: Mutex<Vec<(String, Severity)>>,
    pub(crate) exceptions: Mutex<Vec<String>>,
}

impl Telemetry for RecordingTelemetry {
    fn trace(&self, message: &str, severity: Severity) {
        self.traces.lock().unwrap().push((message.to_string(), severity));
    }

    fn track_exception(&self, error: &ExtensionError) {
        self.exceptions.lock().unwrap().push(error.kind().to_string());
    }
}

pub(crate) fn ticket(title: Option<&str>, who: &str, status: i32, date: Option<&str>) -> TicketRecord {
    TicketRecord {
        title: title.map(|t| t.to_string()),
        assigned_to_name: who.to_string(),
        status,
        date_created: date.and_then(parse_timestamp),
    }
}

/// Query activity for `command_id` with a `searchText` parameter and paging window.
pub(crate) fn query_activity(command_id: &str, text: &str, count: Option<u32>, skip: Option<u32>) -> Activity {
    Activity::query(json!({
        "commandId": command_id,
        "parameters": [{ "name": "searchText", "value": text }],
        "queryOptions": { "count": count, "skip": skip }
    }))
}

pub(crate) fn make_dispatcher(
    backend: Arc<ScriptedBackend>,
) -> (QueryDispatcher, Arc<RecordingTelemetry>) {
    let telemetry = Arc::new(RecordingTelemetry::default());
    let dispatcher = QueryDispatcher::new(backend, telemetry.clone());
    (dispatcher, telemetry)
}
