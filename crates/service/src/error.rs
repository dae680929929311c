//! Typed error enum for the service layer.
//!
//! Unifies storage, LLM and automation failures into a single error type.

use designflow_automation::AutomationError;
use designflow_llm::LlmError;
use designflow_storage::StorageError;
use thiserror::Error;

/// Service-layer error unifying storage, LLM and automation failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed (DB, not found, duplicate, etc.).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Inference call failed.
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    /// Automation job could not be accepted or run.
    #[error("automation: {0}")]
    Automation(#[from] AutomationError),

    /// Caller provided invalid input (missing scrape field, malformed action).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No design with the given id.
    #[error("design not found: {0}")]
    NotFound(String),
}

impl ServiceError {
    /// Whether this error represents a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Storage(StorageError::NotFound { .. }))
    }

    /// Whether this error represents a duplicate/conflict.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_duplicate())
    }
}

impl From<designflow_core::Error> for ServiceError {
    fn from(err: designflow_core::Error) -> Self {
        match err {
            designflow_core::Error::InvalidInput(msg) => Self::InvalidInput(msg),
        }
    }
}
