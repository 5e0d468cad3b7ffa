//! Dashboard statistics

use serde::{Deserialize, Serialize};

/// Admin dashboard aggregate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_orders: i64,
    /// 未完成 (非 paid / cancelled) 订单数
    pub active_orders: i64,
    /// 已支付订单总额
    pub total_revenue: f64,
    pub menu_items: i64,
    pub tables: i64,
}
