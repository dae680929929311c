use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use designflow_core::Ack;

use crate::AppState;

/// Every trigger is acknowledged with `200`; failures travel inside the ack,
/// including bodies that are not JSON at all.
pub async fn dispatch_action(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Json<Ack> {
    match payload {
        Ok(Json(payload)) => Json(state.dispatcher.dispatch_value(payload).await),
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Rejected action body");
            Json(Ack::error(format!("invalid action: {}", rejection.body_text())))
        },
    }
}
