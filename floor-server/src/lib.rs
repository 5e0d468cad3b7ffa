//! Floor Server - 餐厅点餐与桌台管理服务
//!
//! # 架构概述
//!
//! - **数据库** (`db`): SQLite (sqlx) 存储与迁移
//! - **认证** (`auth`): JWT + Argon2 认证，基于角色的路由守卫
//! - **订单** (`orders`): 订单状态机、明细汇总、金额计算
//! - **实时推送** (`live`): 桌台状态广播
//! - **HTTP API** (`api`): RESTful 接口 + `/ws` WebSocket
//!
//! # 模块结构
//!
//! ```text
//! floor-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、角色守卫
//! ├── db/            # 连接池、仓储、种子数据
//! ├── orders/        # 订单生命周期与事务流程
//! ├── live/          # 桌台广播 hub
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、校验
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod live;
pub mod orders;
pub mod utils;

// Re-export 公共类型
pub use api::build_app;
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use live::TableHub;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    ________
   / ____/ /___  ____  _____
  / /_  / / __ \/ __ \/ ___/
 / __/ / / /_/ / /_/ / /
/_/   /_/\____/\____/_/
        floor-server v{}
    "#,
        env!("CARGO_PKG_VERSION")
    );
}
