//! 事务性订单流程
//!
//! 每个流程在单个 SQLite 事务内完成，任一步失败整体回滚。
//! 返回值携带受影响的桌台 id，由调用方在提交后广播。

use sqlx::{SqliteConnection, SqlitePool};

use super::{lifecycle, money};
use crate::db::repository::{RepoError, RepoResult, dining_table, menu_item, order, payment};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{
    AddItemsResponse, Order, OrderCreate, OrderDetail, OrderItem, OrderItemInput, OrderItemStatus,
    OrderStatus, PaymentCreate, PaymentMethod, PaymentResponse, TableStatus,
};

/// 流程结果 + 需要广播的桌台
#[derive(Debug)]
pub struct OrderOutcome<T> {
    pub data: T,
    pub table_changed: Option<i64>,
}

impl<T> OrderOutcome<T> {
    fn new(data: T, table_changed: Option<i64>) -> Self {
        Self {
            data,
            table_changed,
        }
    }
}

/// 终态订单释放桌台的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRelease {
    /// 桌台已置为 available
    Released(i64),
    /// 同桌仍有未完成订单
    StillOccupied(i64),
    /// 订单没有关联桌台
    NoTable,
}

impl TableRelease {
    pub fn released_table(&self) -> Option<i64> {
        match self {
            TableRelease::Released(id) => Some(*id),
            _ => None,
        }
    }
}

fn order_not_found(order_id: i64) -> AppError {
    AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id)
}

fn validate_items(items: &[OrderItemInput]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    for item in items {
        money::validate_quantity(item.quantity)?;
        validate_optional_text(&item.notes, "notes", MAX_NOTE_LEN)?;
    }
    Ok(())
}

/// 写入订单明细，单价取自当前菜单
async fn insert_items(
    conn: &mut SqliteConnection,
    order_id: i64,
    items: &[OrderItemInput],
    now: i64,
) -> AppResult<Vec<OrderItem>> {
    let mut inserted = Vec::with_capacity(items.len());
    for input in items {
        let price = menu_item::find_price(&mut *conn, input.menu_item_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::MenuItemNotFound,
                    format!("Menu item with ID {} not found", input.menu_item_id),
                )
                .with_detail("menu_item_id", input.menu_item_id)
            })?;
        let item = order::insert_item(
            &mut *conn,
            order_id,
            input.menu_item_id,
            input.quantity,
            price,
            input.notes.as_deref(),
            now,
        )
        .await?;
        inserted.push(item);
    }
    Ok(inserted)
}

/// 按未取消明细重算总额
async fn recompute_total(conn: &mut SqliteConnection, order_id: i64, now: i64) -> RepoResult<f64> {
    let lines = order::billable_lines(&mut *conn, order_id).await?;
    let total = money::order_total(&lines);
    order::set_total(&mut *conn, order_id, total, now).await?;
    Ok(total)
}

/// 订单进入终态后，若同桌没有其他未完成订单则释放桌台
async fn release_table(
    conn: &mut SqliteConnection,
    table_id: Option<i64>,
    order_id: i64,
) -> RepoResult<TableRelease> {
    let Some(table_id) = table_id else {
        return Ok(TableRelease::NoTable);
    };
    let others = order::count_other_active(&mut *conn, table_id, order_id).await?;
    if others > 0 {
        tracing::debug!(table_id, order_id, others, "Table keeps other active orders");
        return Ok(TableRelease::StillOccupied(table_id));
    }
    dining_table::set_status(&mut *conn, table_id, TableStatus::Available).await?;
    tracing::info!(table_id, order_id, "Table released");
    Ok(TableRelease::Released(table_id))
}

/// 订单 + 明细 (含菜品信息)
pub async fn load_detail(pool: &SqlitePool, order_id: i64) -> AppResult<OrderDetail> {
    let order = order::find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    let items = order::find_items_detail(pool, order_id).await?;
    Ok(OrderDetail { order, items })
}

/// 下单
///
/// 校验桌台和菜品、写入订单与明细、计算总额、将桌台置为 occupied。
pub async fn create_order(pool: &SqlitePool, req: OrderCreate) -> AppResult<OrderOutcome<OrderDetail>> {
    validate_items(&req.items)?;
    validate_optional_text(&req.notes, "notes", MAX_NOTE_LEN)?;

    let mut tx = pool.begin().await.map_err(RepoError::from)?;

    if !dining_table::exists(&mut *tx, req.table_id).await? {
        return Err(AppError::new(ErrorCode::TableNotFound).with_detail("table_id", req.table_id));
    }
    let open = dining_table::count_active_orders(&mut *tx, req.table_id).await?;
    if open > 0 {
        tracing::warn!(table_id = req.table_id, open, "Table already has active orders");
    }

    let now = shared::util::now_millis();
    let order_id = order::insert_order(&mut *tx, req.table_id, req.notes.as_deref(), now).await?;
    insert_items(&mut tx, order_id, &req.items, now).await?;
    let total = recompute_total(&mut tx, order_id, now).await?;
    dining_table::set_status(&mut *tx, req.table_id, TableStatus::Occupied).await?;

    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(
        order_id,
        table_id = req.table_id,
        items = req.items.len(),
        total,
        "Order created"
    );

    let detail = load_detail(pool, order_id).await?;
    Ok(OrderOutcome::new(detail, Some(req.table_id)))
}

/// 向未完成订单追加明细
///
/// 已上齐 (served) 的订单回到 pending。
pub async fn add_items(
    pool: &SqlitePool,
    order_id: i64,
    items: Vec<OrderItemInput>,
) -> AppResult<OrderOutcome<AddItemsResponse>> {
    validate_items(&items)?;

    let mut tx = pool.begin().await.map_err(RepoError::from)?;

    let current = order::find_by_id(&mut *tx, order_id)
        .await?
        .filter(|o| o.status.is_active())
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::OrderNotFound, "Order not found or already completed")
                .with_detail("order_id", order_id)
        })?;

    let now = shared::util::now_millis();
    let inserted = insert_items(&mut tx, order_id, &items, now).await?;
    if current.status == OrderStatus::Served {
        order::set_status(&mut *tx, order_id, OrderStatus::Pending, now).await?;
    }
    let total = recompute_total(&mut tx, order_id, now).await?;

    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(order_id, added = inserted.len(), total, "Items added to order");

    Ok(OrderOutcome::new(
        AddItemsResponse {
            message: "Items added to order successfully".to_string(),
            items: inserted,
        },
        None,
    ))
}

/// 修改订单状态 (员工操作)
pub async fn update_order_status(
    pool: &SqlitePool,
    order_id: i64,
    target: OrderStatus,
) -> AppResult<OrderOutcome<Order>> {
    let mut tx = pool.begin().await.map_err(RepoError::from)?;

    let current = order::find_by_id(&mut *tx, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;

    let has_payment = target == OrderStatus::Paid && payment::has_completed(&mut *tx, order_id).await?;
    lifecycle::validate_order_transition(current.status, target, has_payment)?;

    let now = shared::util::now_millis();
    order::set_status(&mut *tx, order_id, target, now).await?;

    let release = if target.is_terminal() {
        release_table(&mut tx, current.table_id, order_id).await?
    } else {
        TableRelease::NoTable
    };

    tx.commit().await.map_err(RepoError::from)?;

    match target {
        OrderStatus::Cancelled => tracing::info!(order_id, from = %current.status, "Order cancelled"),
        OrderStatus::Paid => tracing::info!(order_id, "Order marked paid"),
        _ => tracing::debug!(order_id, from = %current.status, to = %target, "Order status updated"),
    }

    let updated = order::find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    Ok(OrderOutcome::new(updated, release.released_table()))
}

/// 修改明细状态 (厨房操作)，并按明细汇总订单状态
pub async fn update_item_status(
    pool: &SqlitePool,
    order_id: i64,
    item_id: i64,
    target: OrderItemStatus,
) -> AppResult<OrderOutcome<OrderItem>> {
    let mut tx = pool.begin().await.map_err(RepoError::from)?;

    let current = order::find_by_id(&mut *tx, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    if current.status.is_terminal() {
        return Err(AppError::with_message(
            ErrorCode::OrderClosed,
            format!("Cannot update items of a {} order", current.status),
        )
        .with_detail("order_id", order_id));
    }

    let item = order::find_item(&mut *tx, order_id, item_id)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::OrderItemNotFound)
                .with_detail("order_id", order_id)
                .with_detail("item_id", item_id)
        })?;
    lifecycle::validate_item_transition(item.status, target)?;

    let now = shared::util::now_millis();
    order::set_item_status(&mut *tx, item_id, target).await?;

    if target == OrderItemStatus::Cancelled {
        recompute_total(&mut tx, order_id, now).await?;
    }
    if matches!(
        target,
        OrderItemStatus::Ready | OrderItemStatus::Served | OrderItemStatus::Cancelled
    ) {
        let statuses = order::item_statuses(&mut *tx, order_id).await?;
        if let Some(next) = lifecycle::rollup(current.status, &statuses) {
            order::set_status(&mut *tx, order_id, next, now).await?;
            tracing::info!(order_id, from = %current.status, to = %next, "Order status rolled up from items");
        }
    }

    tx.commit().await.map_err(RepoError::from)?;

    let updated = order::find_item(pool, order_id, item_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound))?;
    Ok(OrderOutcome::new(updated, None))
}

/// 结账
///
/// 写入 completed 支付记录、订单置为 paid、按需释放桌台。
/// `processed_by` 缺省为当前登录用户。
pub async fn process_payment(
    pool: &SqlitePool,
    order_id: i64,
    req: PaymentCreate,
    operator_id: i64,
) -> AppResult<OrderOutcome<PaymentResponse>> {
    let mut tx = pool.begin().await.map_err(RepoError::from)?;

    let current = order::find_by_id(&mut *tx, order_id)
        .await?
        .filter(|o| o.status != OrderStatus::Paid)
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::OrderNotFound, "Order not found or already paid")
                .with_detail("order_id", order_id)
        })?;
    if current.status == OrderStatus::Cancelled {
        return Err(AppError::with_message(
            ErrorCode::OrderAlreadyCancelled,
            "Cannot pay for a cancelled order",
        ));
    }

    // 订单存在且可支付后再校验请求体
    let method: PaymentMethod = req.payment_method.parse()?;
    money::validate_payment_amount(req.amount)?;
    if !money::is_payment_sufficient(req.amount, current.total) {
        return Err(AppError::with_message(
            ErrorCode::PaymentInsufficientAmount,
            format!(
                "Payment amount {:.2} is less than the order total {:.2}",
                req.amount, current.total
            ),
        )
        .with_detail("required", current.total)
        .with_detail("received", req.amount));
    }

    let now = shared::util::now_millis();
    let processed_by = req.processed_by.or(Some(operator_id));
    let recorded = payment::insert(&mut *tx, order_id, req.amount, method, processed_by, now).await?;

    lifecycle::validate_order_transition(current.status, OrderStatus::Paid, true)?;
    order::set_status(&mut *tx, order_id, OrderStatus::Paid, now).await?;
    let release = release_table(&mut tx, current.table_id, order_id).await?;

    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(
        order_id,
        payment_id = recorded.id,
        amount = recorded.amount,
        method = %method,
        "Order paid"
    );

    Ok(OrderOutcome::new(
        PaymentResponse {
            message: "Payment processed successfully".to_string(),
            payment: recorded,
        },
        release.released_table(),
    ))
}
