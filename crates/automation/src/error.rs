//! Error types for automation jobs.

use thiserror::Error;

/// Failure of one automation step or of the channel to the target.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AutomationError {
    /// An expected element was absent on the target.
    #[error("target element not found: {0}")]
    TargetNotFound(String),

    /// A bounded wait ran out of attempts.
    #[error("timed out waiting for {what} after {attempts} attempts")]
    Timeout { what: String, attempts: u32 },

    /// The record has no prompt to submit yet.
    #[error("design {0} has no prompt; run analysis first")]
    MissingPrompt(String),

    /// The target could not be reached or the connection dropped.
    #[error("connection error: {0}")]
    Connection(String),

    /// The target answered with something unusable.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The job task panicked or was aborted.
    #[error("job panicked: {0}")]
    Panicked(String),
}

impl AutomationError {
    /// Whether the failure came from the transport rather than the page.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
