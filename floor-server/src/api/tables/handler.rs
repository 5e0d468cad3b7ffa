//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::core::ServerState;
use crate::db::repository::dining_table::{self, NewTable, TableChanges};
use crate::db::repository::{RepoError, user};
use crate::utils::validation::validate_positive;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{
    DiningTable, DiningTableCreate, DiningTableUpdate, MessageResponse, ServerAssignment,
    TableStatus, TableStatusUpdate,
};

fn table_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::TableNotFound).with_detail("table_id", id)
}

fn number_exists(number: i64) -> AppError {
    AppError::new(ErrorCode::TableNumberExists).with_detail("number", number)
}

/// 桌号唯一约束冲突映射为业务错误
fn map_number_conflict(number: Option<i64>) -> impl FnOnce(RepoError) -> AppError {
    move |e| match (e, number) {
        (RepoError::Duplicate(_), Some(n)) => number_exists(n),
        (other, _) => other.into(),
    }
}

/// 被分配的用户必须存在且为 server / admin
async fn ensure_server(state: &ServerState, server_id: i64) -> AppResult<()> {
    match user::find_by_id(&state.pool, server_id).await? {
        Some(u) if u.role.can_serve_tables() => Ok(()),
        _ => Err(AppError::new(ErrorCode::InvalidServer).with_detail("server_id", server_id)),
    }
}

async fn reload(state: &ServerState, id: i64) -> AppResult<DiningTable> {
    dining_table::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| table_not_found(id))
}

/// GET /api/tables - 获取所有桌台
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DiningTable>>> {
    let tables = dining_table::find_all(&state.pool).await?;
    Ok(Json(tables))
}

/// GET /api/tables/{id} - 获取单个桌台
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DiningTable>> {
    Ok(Json(reload(&state, id).await?))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<(StatusCode, Json<DiningTable>)> {
    validate_positive(payload.number, "number")?;
    validate_positive(payload.capacity, "capacity")?;
    let status = match payload.status.as_deref() {
        Some(s) => s.parse::<TableStatus>()?,
        None => TableStatus::default(),
    };
    if let Some(server_id) = payload.server_id {
        ensure_server(&state, server_id).await?;
    }
    if dining_table::number_taken(&state.pool, payload.number, None).await? {
        return Err(number_exists(payload.number));
    }

    let table = dining_table::create(
        &state.pool,
        NewTable {
            number: payload.number,
            capacity: payload.capacity,
            status,
            x_position: payload.x_position.unwrap_or(0),
            y_position: payload.y_position.unwrap_or(0),
            server_id: payload.server_id,
        },
    )
    .await
    .map_err(map_number_conflict(Some(payload.number)))?;

    tracing::info!(table_id = table.id, number = table.number, "Table created");
    state.publish_table(table.id).await;

    Ok((StatusCode::CREATED, Json(table)))
}

/// PUT /api/tables/{id} - 部分更新桌台
///
/// `server_id` 缺失表示不修改，`null` 表示取消分配
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    if !dining_table::exists(&state.pool, id).await? {
        return Err(table_not_found(id));
    }
    if let Some(number) = payload.number {
        validate_positive(number, "number")?;
        if dining_table::number_taken(&state.pool, number, Some(id)).await? {
            return Err(number_exists(number));
        }
    }
    if let Some(capacity) = payload.capacity {
        validate_positive(capacity, "capacity")?;
    }
    let status = payload
        .status
        .as_deref()
        .map(str::parse::<TableStatus>)
        .transpose()?;
    if let Some(Some(server_id)) = payload.server_id {
        ensure_server(&state, server_id).await?;
    }

    let table = dining_table::update(
        &state.pool,
        id,
        TableChanges {
            number: payload.number,
            capacity: payload.capacity,
            status,
            x_position: payload.x_position,
            y_position: payload.y_position,
            server_id: payload.server_id,
        },
    )
    .await
    .map_err(map_number_conflict(payload.number))?;

    state.publish_table(id).await;
    Ok(Json(table))
}

/// DELETE /api/tables/{id} - 删除桌台
///
/// 有未完成订单时拒绝删除；历史订单保留 (table_id 置空)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    if !dining_table::exists(&state.pool, id).await? {
        return Err(table_not_found(id));
    }
    let active = dining_table::count_active_orders(&state.pool, id).await?;
    if active > 0 {
        return Err(AppError::new(ErrorCode::TableHasOrders)
            .with_detail("table_id", id)
            .with_detail("active_orders", active));
    }

    dining_table::delete(&state.pool, id).await?;
    tracing::info!(table_id = id, "Table deleted");
    state.publish_table_removed(id);

    Ok(Json(MessageResponse::new("Table deleted successfully")))
}

/// PUT /api/tables/{id}/server - 分配服务员
pub async fn assign_server(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ServerAssignment>,
) -> AppResult<Json<DiningTable>> {
    if !dining_table::exists(&state.pool, id).await? {
        return Err(table_not_found(id));
    }
    if let Some(server_id) = payload.server_id {
        ensure_server(&state, server_id).await?;
    }

    dining_table::set_server(&state.pool, id, payload.server_id).await?;
    let table = reload(&state, id).await?;

    tracing::info!(table_id = id, server_id = ?payload.server_id, "Table server assigned");
    state.publish_table(id).await;
    Ok(Json(table))
}

/// PUT /api/tables/{id}/status - 修改占用状态
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TableStatusUpdate>,
) -> AppResult<Json<DiningTable>> {
    let status: TableStatus = payload.status.parse()?;
    if !dining_table::set_status(&state.pool, id, status).await? {
        return Err(table_not_found(id));
    }
    let table = reload(&state, id).await?;

    state.publish_table(id).await;
    Ok(Json(table))
}
