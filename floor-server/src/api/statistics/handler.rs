//! Statistics API Handlers

use axum::{Json, extract::State};

use crate::core::ServerState;
use crate::db::repository::statistics;
use crate::utils::AppResult;
use shared::models::DashboardStats;

/// GET /api/statistics - 管理后台概览
pub async fn dashboard(State(state): State<ServerState>) -> AppResult<Json<DashboardStats>> {
    let stats = statistics::dashboard(&state.pool).await?;
    Ok(Json(stats))
}
