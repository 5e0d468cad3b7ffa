//! Order API Handlers
//!
//! 事务流程在 [`crate::orders::service`]，这里只负责解析请求和广播桌台

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{order, payment};
use crate::orders::{OrderOutcome, service};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{
    AddItemsRequest, AddItemsResponse, Order, OrderCreate, OrderDetail, OrderItem,
    OrderItemStatus, OrderStatus, Payment, PaymentCreate, PaymentResponse, StatusUpdate,
};

/// 提交后广播受影响的桌台
async fn publish<T>(state: &ServerState, outcome: OrderOutcome<T>) -> T {
    if let Some(table_id) = outcome.table_changed {
        state.publish_table(table_id).await;
    }
    outcome.data
}

/// GET /api/orders - 全部订单 (最新在前)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    let orders = order::find_all(&state.pool).await?;
    Ok(Json(orders))
}

/// GET /api/orders/active - 厨房队列 (最早在前)
pub async fn list_active(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    let orders = order::find_active(&state.pool).await?;
    Ok(Json(orders))
}

/// GET /api/orders/table/{table_id} - 桌台历史订单
pub async fn list_by_table(
    State(state): State<ServerState>,
    Path(table_id): Path<i64>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = order::find_by_table(&state.pool, table_id).await?;
    Ok(Json(orders))
}

/// GET /api/orders/table/{table_id}/active - 桌台当前订单 (含明细)
pub async fn active_by_table(
    State(state): State<ServerState>,
    Path(table_id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let active = order::find_active_by_table(&state.pool, table_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::NoActiveOrder).with_detail("table_id", table_id))?;
    let detail = service::load_detail(&state.pool, active.id).await?;
    Ok(Json(detail))
}

/// GET /api/orders/{id} - 订单详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = service::load_detail(&state.pool, id).await?;
    Ok(Json(detail))
}

/// POST /api/orders - 下单
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<OrderDetail>)> {
    let outcome = service::create_order(&state.pool, payload).await?;
    let detail = publish(&state, outcome).await;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// POST /api/orders/{id}/items - 加菜
pub async fn add_items(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AddItemsRequest>,
) -> AppResult<Json<AddItemsResponse>> {
    let outcome = service::add_items(&state.pool, id, payload.items).await?;
    Ok(Json(publish(&state, outcome).await))
}

/// GET /api/orders/{id}/payments - 订单支付记录
pub async fn list_payments(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Payment>>> {
    if order::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", id));
    }
    let payments = payment::find_by_order(&state.pool, id).await?;
    Ok(Json(payments))
}

/// PUT /api/orders/{id}/status - 修改订单状态
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusUpdate>,
) -> AppResult<Json<Order>> {
    let target: OrderStatus = payload.status.parse()?;
    let outcome = service::update_order_status(&state.pool, id, target).await?;
    Ok(Json(publish(&state, outcome).await))
}

/// PUT /api/orders/{id}/item/{item_id}/status - 修改明细状态 (厨房)
pub async fn update_item_status(
    State(state): State<ServerState>,
    Path((id, item_id)): Path<(i64, i64)>,
    Json(payload): Json<StatusUpdate>,
) -> AppResult<Json<OrderItem>> {
    let target: OrderItemStatus = payload.status.parse()?;
    let outcome = service::update_item_status(&state.pool, id, item_id, target).await?;
    Ok(Json(publish(&state, outcome).await))
}

/// POST /api/orders/{id}/payment - 结账
pub async fn process_payment(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentCreate>,
) -> AppResult<Json<PaymentResponse>> {
    let outcome = service::process_payment(&state.pool, id, payload, current.id).await?;
    Ok(Json(publish(&state, outcome).await))
}
