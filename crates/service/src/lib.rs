//! Service layer for designflow
//!
//! Centralizes business logic between HTTP/CLI handlers and storage, llm and automation.

#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]

mod automation_service;
mod design_service;
mod dispatcher;
mod enrichment_service;
mod error;

#[cfg(test)]
mod test_support;

pub use automation_service::{AutomationService, BulkSubmission, RejectedJob, SubmittedJob};
pub use design_service::DesignService;
pub use dispatcher::{Action, Dispatcher};
pub use enrichment_service::{EnrichOutcome, EnrichmentFailure, EnrichmentReport, EnrichmentService};
pub use error::ServiceError;
