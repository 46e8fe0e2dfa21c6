//! # ticket-search — messaging-extension ticket search
//!
//! Answers `composeExtension/query` activities from a chat client's command box:
//! picks a search scope from the command id, runs the search against a ticket
//! backend, and renders every hit as a preview/detail card pair.
//!
//! ## Library usage
//!
//! The crate ships as a stdio service binary, but the dispatcher, formatter and
//! in-memory ticket index are exposed as a library for embedding and benchmarking.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub mod error;
pub mod extension;
pub mod telemetry;
pub mod tickets;

pub use error::{BackendError, ExtensionError};
pub use extension::handlers::{
    card_pair, extract_query_text, format_card, scope_for_command, CardPair, QueryDispatcher,
    QueryOutcome,
};
pub use telemetry::{Severity, Telemetry, TracingTelemetry};
pub use tickets::{SearchBackend, TicketIndex};

/// Ticket status code for an open ticket. Every other code renders as closed.
pub const STATUS_OPEN: i32 = 0;

/// Ticket status code for a closed ticket.
pub const STATUS_CLOSED: i32 = 1;

// ─── Core public types ───────────────────────────────────────────────

/// Named subset of the ticket index a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchScope {
    RecentTickets,
    OpenTickets,
    AssignedTickets,
}

impl SearchScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchScope::RecentTickets => "recent",
            SearchScope::OpenTickets => "open",
            SearchScope::AssignedTickets => "assigned",
        }
    }
}

impl std::fmt::Display for SearchScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A help-desk ticket as returned by the search backend.
///
/// `status` stays a raw integer: `0` is open, anything else is treated as closed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TicketRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub assigned_to_name: String,
    #[serde(default)]
    pub status: i32,
    #[serde(default, deserialize_with = "deserialize_date_created")]
    pub date_created: Option<DateTime<Utc>>,
}

impl TicketRecord {
    pub fn is_open(&self) -> bool {
        self.status == STATUS_OPEN
    }
}

// ─── Timestamps ──────────────────────────────────────────────────────

/// Render a creation timestamp: date only at midnight UTC, date and time otherwise.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    if ts.time() == NaiveTime::MIN {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Parse a creation timestamp from RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS`
/// (taken as UTC), or a plain `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

fn deserialize_date_created<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid dateCreated '{}'", s))),
    }
}

// ─── Tokenizer ───────────────────────────────────────────────────────

/// Tokenize text into lowercase tokens.
///
/// Splits on non-alphanumeric characters (except `_`),
/// filters by minimum length, and lowercases all tokens.
///
/// # Examples
///
/// ```
/// use ticket_search::tokenize;
///
/// let tokens = tokenize("VPN access request", 2);
/// assert_eq!(tokens, vec!["vpn", "access", "request"]);
/// ```
#[must_use]
pub fn tokenize(text: &str, min_len: usize) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|s| s.chars().count() >= min_len)
        .map(|s| s.to_lowercase())
        .collect()
}


// ─── Property-based tests (proptest) ─────────────────────────────────
