use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub name: String,
    pub version: String,
    pub uptime: u64,
    pub database_ok: bool,
}

/// GET /system/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let database_ok = state.store.ping().await.is_ok();
    let name = state.config.read().await.app.name.clone();

    Ok(Json(ApiResponse::success(SystemStatus {
        name,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        database_ok,
    })))
}
