use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use designflow_core::DesignRecord;

use crate::AppState;
use crate::api_error::ApiError;

pub async fn list_designs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DesignRecord>>, ApiError> {
    Ok(Json(state.design_service.list().await?))
}

pub async fn get_design(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DesignRecord>, ApiError> {
    Ok(Json(state.design_service.get(&id).await?))
}
