//! Order Model

use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Order status
///
/// pending → preparing → ready → served → paid, 或从 pending/preparing 取消
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Served,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// paid / cancelled 为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "served" => Ok(OrderStatus::Served),
            "paid" => Ok(OrderStatus::Paid),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(AppError::with_message(
                ErrorCode::InvalidOrderStatus,
                "Invalid status. Must be one of: pending, preparing, ready, served, paid, cancelled",
            )
            .with_detail("status", other)),
        }
    }
}

/// Order item status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderItemStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Served,
    Cancelled,
}

impl OrderItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderItemStatus::Pending => "pending",
            OrderItemStatus::Preparing => "preparing",
            OrderItemStatus::Ready => "ready",
            OrderItemStatus::Served => "served",
            OrderItemStatus::Cancelled => "cancelled",
        }
    }

    /// served / cancelled 之后不可再变
    pub fn is_final(&self) -> bool {
        matches!(self, OrderItemStatus::Served | OrderItemStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderItemStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderItemStatus::Pending),
            "preparing" => Ok(OrderItemStatus::Preparing),
            "ready" => Ok(OrderItemStatus::Ready),
            "served" => Ok(OrderItemStatus::Served),
            "cancelled" => Ok(OrderItemStatus::Cancelled),
            other => Err(AppError::with_message(
                ErrorCode::InvalidItemStatus,
                "Invalid status. Must be one of: pending, preparing, ready, served, cancelled",
            )
            .with_detail("status", other)),
        }
    }
}

/// Order entity (订单)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// 桌台被删除后为 None
    pub table_id: Option<i64>,
    pub table_number: Option<i64>,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub total: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order item row (订单明细)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: Option<i64>,
    pub quantity: i64,
    /// 下单时的菜品单价快照
    pub unit_price: f64,
    pub notes: Option<String>,
    pub status: OrderItemStatus,
    pub created_at: i64,
}

/// Order item joined with its menu item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItemDetail {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: Option<i64>,
    pub quantity: i64,
    pub unit_price: f64,
    pub notes: Option<String>,
    pub status: OrderItemStatus,
    pub created_at: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Order with its items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
}

/// One line of a create / add-items payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub menu_item_id: i64,
    pub quantity: i64,
    pub notes: Option<String>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub table_id: i64,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

/// POST /api/orders/{id}/items payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddItemsRequest {
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

/// POST /api/orders/{id}/items response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddItemsResponse {
    pub message: String,
    pub items: Vec<OrderItem>,
}

/// Order / item status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_terminal() {
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Served.is_active());
    }

    #[test]
    fn test_status_parse_errors() {
        let err = "done".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidOrderStatus);
        let err = "paid".parse::<OrderItemStatus>().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidItemStatus);
    }

    #[test]
    fn test_order_detail_flattens() {
        let detail = OrderDetail {
            order: Order {
                id: 5,
                table_id: Some(3),
                table_number: Some(3),
                status: OrderStatus::Pending,
                notes: None,
                total: 25.98,
                created_at: 1,
                updated_at: 1,
            },
            items: vec![],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], 5);
        assert_eq!(json["status"], "pending");
        assert!(json["items"].as_array().unwrap().is_empty());
    }
}
