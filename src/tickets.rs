//! Ticket search backend: the async trait the dispatcher consumes and an
//! in-memory inverted index that implements it.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{BackendError, ExtensionError};
use crate::{tokenize, SearchScope, TicketRecord};

/// Page size used when the client does not send `count`.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Search backend consumed by the query dispatcher.
///
/// A trailing `*` on the query requests prefix matching of the last term.
/// Results come back in the backend's own order; callers must not reorder them.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(
        &self,
        scope: SearchScope,
        query: &str,
        count: Option<u32>,
        skip: Option<u32>,
    ) -> Result<Vec<TicketRecord>, BackendError>;
}

/// In-memory ticket index.
///
/// Title tokens live in a `BTreeMap` so a prefix lookup is a range scan.
/// The index is immutable after construction and safe to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct TicketIndex {
    tickets: Vec<TicketRecord>,
    /// token (lowercased) → ticket ids, ascending
    tokens: BTreeMap<String, Vec<u32>>,
    /// ticket ids, newest `dateCreated` first, undated last
    by_recency: Vec<u32>,
    assignee: Option<String>,
    page_size: u32,
}

/// Aggregate counts printed by the `tickets` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSummary {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    pub untitled: usize,
    pub assignees: BTreeSet<String>,
}

impl TicketIndex {
    pub fn new(tickets: Vec<TicketRecord>) -> Self {
        let mut tokens: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        for (id, ticket) in tickets.iter().enumerate() {
            let Some(title) = ticket.title.as_deref() else { continue };
            for token in tokenize(title, 1) {
                let ids = tokens.entry(token).or_default();
                if ids.last() != Some(&(id as u32)) {
                    ids.push(id as u32);
                }
            }
        }

        let mut by_recency: Vec<u32> = (0..tickets.len() as u32).collect();
        by_recency.sort_by_key(|&id| std::cmp::Reverse(tickets[id as usize].date_created));

        Self {
            tickets,
            tokens,
            by_recency,
            assignee: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the user whose tickets the `AssignedTickets` scope returns.
    pub fn with_assignee(mut self, assignee: Option<String>) -> Self {
        self.assignee = assignee.filter(|a| !a.trim().is_empty());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Build an index from a JSON array of ticket records.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tickets: Vec<TicketRecord> = serde_json::from_str(json)?;
        Ok(Self::new(tickets))
    }

    /// Load a ticket file (JSON array of records) from disk.
    pub async fn load(path: &Path) -> Result<Self, ExtensionError> {
        let start = Instant::now();
        let raw = tokio::fs::read_to_string(path).await?;
        let index = Self::from_json(&raw).map_err(|e| ExtensionError::TicketLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        info!(
            path = %path.display(),
            tickets = index.len(),
            tokens = index.tokens.len(),
            elapsed_ms = format_args!("{:.1}", start.elapsed().as_secs_f64() * 1000.0),
            "Ticket index loaded"
        );
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn assignee(&self) -> Option<&str> {
        self.assignee.as_deref()
    }

    pub fn summary(&self) -> TicketSummary {
        let open = self.tickets.iter().filter(|t| t.is_open()).count();
        TicketSummary {
            total: self.tickets.len(),
            open,
            closed: self.tickets.len() - open,
            untitled: self.tickets.iter().filter(|t| t.title.is_none()).count(),
            assignees: self
                .tickets
                .iter()
                .filter(|t| !t.assigned_to_name.is_empty())
                .map(|t| t.assigned_to_name.clone())
                .collect(),
        }
    }

    /// Ticket ids whose title matches every query term. `None` means "no terms, match all".
    fn matching_ids(&self, query: &str) -> Option<HashSet<u32>> {
        let (text, prefix) = match query.strip_suffix('*') {
            Some(stripped) => (stripped, true),
            None => (query, false),
        };
        let terms = tokenize(text, 1);
        if terms.is_empty() {
            return None;
        }

        let last = terms.len() - 1;
        let mut result: Option<HashSet<u32>> = None;
        for (i, term) in terms.iter().enumerate() {
            let ids: HashSet<u32> = if prefix && i == last {
                self.tokens
                    .range::<str, _>((std::ops::Bound::Included(term.as_str()), std::ops::Bound::Unbounded))
                    .take_while(|(token, _)| token.starts_with(term.as_str()))
                    .flat_map(|(_, ids)| ids.iter().copied())
                    .collect()
            } else {
                self.tokens
                    .get(term)
                    .map(|ids| ids.iter().copied().collect())
                    .unwrap_or_default()
            };
            result = Some(match result {
                Some(acc) => acc.intersection(&ids).copied().collect(),
                None => ids,
            });
        }
        result
    }

    fn in_scope(&self, scope: SearchScope, ticket: &TicketRecord) -> bool {
        match scope {
            SearchScope::RecentTickets => true,
            SearchScope::OpenTickets => ticket.is_open(),
            SearchScope::AssignedTickets => self
                .assignee
                .as_deref()
                .is_some_and(|a| a.to_lowercase() == ticket.assigned_to_name.to_lowercase()),
        }
    }

    /// Synchronous search: scope filter, title match, recency order, then skip/count.
    pub fn search_tickets(
        &self,
        scope: SearchScope,
        query: &str,
        count: Option<u32>,
        skip: Option<u32>,
    ) -> Vec<TicketRecord> {
        let matches = self.matching_ids(query);
        let skip = skip.unwrap_or(0) as usize;
        let count = count.unwrap_or(self.page_size) as usize;

        self.by_recency
            .iter()
            .filter(|&&id| matches.as_ref().is_none_or(|m| m.contains(&id)))
            .map(|&id| &self.tickets[id as usize])
            .filter(|t| self.in_scope(scope, t))
            .skip(skip)
            .take(count)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SearchBackend for TicketIndex {
    async fn search(
        &self,
        scope: SearchScope,
        query: &str,
        count: Option<u32>,
        skip: Option<u32>,
    ) -> Result<Vec<TicketRecord>, BackendError> {
        let start = Instant::now();
        let results = self.search_tickets(scope, query, count, skip);
        debug!(
            scope = %scope,
            query = %query,
            hits = results.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Ticket search"
        );
        Ok(results)
    }
}
