//! 订单与明细状态机
//!
//! 订单: pending → preparing → ready → served → paid，
//! pending / preparing 可取消。paid 与 cancelled 为终态。
//!
//! 明细: pending → preparing → ready → served，
//! pending / preparing 可取消。served 与 cancelled 之后不可再变。

use shared::models::{OrderItemStatus, OrderStatus};

use crate::utils::{AppError, AppResult, ErrorCode};

/// 校验订单状态变更
///
/// 非终态之间允许前进或由员工回退修正；进入 `paid` 需已有完成的支付。
pub fn validate_order_transition(
    current: OrderStatus,
    target: OrderStatus,
    has_completed_payment: bool,
) -> AppResult<()> {
    match (current, target) {
        (OrderStatus::Paid, OrderStatus::Cancelled) => Err(AppError::with_message(
            ErrorCode::OrderAlreadyPaid,
            "Cannot cancel a paid order",
        )),
        (OrderStatus::Paid | OrderStatus::Cancelled, _) => Err(AppError::with_message(
            ErrorCode::OrderClosed,
            format!("Order is already {current}"),
        )
        .with_detail("status", current.as_str())),
        (_, OrderStatus::Paid) if !has_completed_payment => Err(AppError::with_message(
            ErrorCode::OrderPaymentMissing,
            "Cannot mark order as paid without a completed payment",
        )),
        (OrderStatus::Ready | OrderStatus::Served, OrderStatus::Cancelled) => {
            Err(AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                format!("Cannot cancel an order that is already {current}"),
            )
            .with_detail("from", current.as_str())
            .with_detail("to", target.as_str()))
        }
        _ => Ok(()),
    }
}

/// 校验明细状态变更
pub fn validate_item_transition(current: OrderItemStatus, target: OrderItemStatus) -> AppResult<()> {
    if current == target {
        return Ok(());
    }
    if current.is_final() {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            format!("Order item is already {current}"),
        )
        .with_detail("from", current.as_str())
        .with_detail("to", target.as_str()));
    }
    if target == OrderItemStatus::Cancelled && current == OrderItemStatus::Ready {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            "Cannot cancel an item that is already ready",
        ));
    }
    Ok(())
}

/// 由明细状态推导订单状态
///
/// 返回 `None` 表示订单状态不变：订单已终态、全部明细已取消、
/// 或推导结果与当前状态相同。
pub fn rollup(current: OrderStatus, items: &[OrderItemStatus]) -> Option<OrderStatus> {
    if current.is_terminal() {
        return None;
    }
    if items.iter().all(|s| *s == OrderItemStatus::Cancelled) {
        return None;
    }

    let all_served = items
        .iter()
        .all(|s| matches!(s, OrderItemStatus::Served | OrderItemStatus::Cancelled));
    let all_ready = items.iter().all(|s| {
        matches!(
            s,
            OrderItemStatus::Ready | OrderItemStatus::Served | OrderItemStatus::Cancelled
        )
    });

    let derived = if all_served {
        OrderStatus::Served
    } else if all_ready {
        OrderStatus::Ready
    } else {
        return None;
    };

    (derived != current).then_some(derived)
}
