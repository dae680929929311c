//! HTTP API server for designflow.
//!
//! Inbound triggers arrive on `POST /api/actions`; the other routes are read-only.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(clippy::single_call_fn, reason = "HTTP handlers are called once from router")]

pub mod api_error;
mod handlers;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

use designflow_service::{AutomationService, DesignService, Dispatcher};

/// Shared application state for all HTTP handlers.
pub struct AppState {
    /// Routes `{"action": ...}` payloads to the services below
    pub dispatcher: Arc<Dispatcher>,
    /// Read access for the listing routes
    pub design_service: Arc<DesignService>,
    /// Queue status
    pub automation_service: Arc<AutomationService>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/actions", post(handlers::actions::dispatch_action))
        .route("/api/designs", get(handlers::designs::list_designs))
        .route("/api/designs/{id}", get(handlers::designs::get_design))
        .route("/api/automation/status", get(handlers::automation::automation_status))
        // The browser extension posts from its own origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
