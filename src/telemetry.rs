//! Telemetry collaborator: trace messages and exception records.
//!
//! Passed into the dispatcher explicitly so the query path has no hidden global state.
//! Implementations must be fire-and-forget: they never fail and never block the caller.

use tracing::{debug, error, info, warn};

use crate::error::ExtensionError;

/// Severity of a trace message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Verbose,
    Information,
    Warning,
    Error,
    Critical,
}

pub trait Telemetry: Send + Sync {
    /// Record a free-form trace message.
    fn trace(&self, message: &str, severity: Severity);

    /// Record a structured exception.
    fn track_exception(&self, error: &ExtensionError);
}

/// Telemetry backed by `tracing` events (stderr via the subscriber installed at startup).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn trace(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Verbose => debug!(target: "telemetry", "{}", message),
            Severity::Information => info!(target: "telemetry", "{}", message),
            Severity::Warning => warn!(target: "telemetry", "{}", message),
            Severity::Error | Severity::Critical => error!(target: "telemetry", "{}", message),
        }
    }

    fn track_exception(&self, err: &ExtensionError) {
        let source = std::error::Error::source(err).map(|s| s.to_string());
        error!(
            target: "telemetry",
            kind = err.kind(),
            error = %err,
            source = source.as_deref().unwrap_or(""),
            "Exception tracked"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_telemetry_never_panics_without_subscriber() {
        let telemetry = TracingTelemetry;
        for severity in [
            Severity::Verbose,
            Severity::Information,
            Severity::Warning,
            Severity::Error,
            Severity::Critical,
        ] {
            telemetry.trace("severity check", severity);
        }
        telemetry.track_exception(&ExtensionError::InvalidArgs("bad".to_string()));
    }

    #[test]
    fn test_telemetry_is_object_safe() {
        let shared: std::sync::Arc<dyn Telemetry> = std::sync::Arc::new(TracingTelemetry);
        shared.trace("shared", Severity::Information);
    }
}
