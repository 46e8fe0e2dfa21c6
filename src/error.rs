//! Unified error type for the ticket search service.

use thiserror::Error;

/// Opaque failure raised by a search backend. The dispatcher never inspects it.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// All errors that can occur while serving extension queries.
#[derive(Error, Debug)]
pub enum ExtensionError {
    /// The activity body is missing or could not be decoded into a query request
    #[error("Malformed query request: {0}")]
    MalformedRequest(#[source] serde_json::Error),

    /// The search backend failed
    #[error("Search backend failed: {0}")]
    Backend(#[source] BackendError),

    /// I/O error (ticket file read, stdio)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to load the ticket file
    #[error("Failed to load tickets from {path}: {message}")]
    TicketLoad {
        path: String,
        message: String,
    },

    /// Argument validation error
    #[error("{0}")]
    InvalidArgs(String),
}

impl ExtensionError {
    /// Short, stable name of the failure kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtensionError::MalformedRequest(_) => "MalformedRequest",
            ExtensionError::Backend(_) => "Backend",
            ExtensionError::Io(_) => "Io",
            ExtensionError::TicketLoad { .. } => "TicketLoad",
            ExtensionError::InvalidArgs(_) => "InvalidArgs",
        }
    }
}
