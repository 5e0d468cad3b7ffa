//! 订单领域逻辑
//!
//! - [`lifecycle`]: 订单 / 明细状态机与状态汇总 (纯函数)
//! - [`money`]: 金额计算 (rust_decimal)
//! - [`service`]: 事务性订单流程 (下单、加菜、改状态、支付)

pub mod lifecycle;
pub mod money;
pub mod service;

pub use service::{OrderOutcome, TableRelease};
