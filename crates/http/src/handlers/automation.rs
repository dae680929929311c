use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use designflow_automation::QueueSnapshot;

use crate::AppState;

pub async fn automation_status(State(state): State<Arc<AppState>>) -> Json<QueueSnapshot> {
    Json(state.automation_service.status())
}
