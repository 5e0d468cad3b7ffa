use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::{DbService, repository::dining_table, seed};
use crate::live::TableHub;
use crate::utils::AppError;
use shared::live::TableEvent;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc / 连接池句柄实现浅拷贝，clone 成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | tables | TableHub | 桌台实时广播 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 桌台广播 hub (`/ws` 订阅)
    pub tables: TableHub,
}

impl ServerState {
    /// 使用现有连接池创建状态
    ///
    /// 测试中配合 [`DbService::in_memory`] 使用
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            pool,
            jwt_service,
            tables: TableHub::new(),
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 创建工作目录
    /// 2. 打开数据库并执行迁移
    /// 3. 写入示例数据 / 创建管理员 (按配置)
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            AppError::internal(format!(
                "Failed to create work dir {}: {}",
                config.work_dir, e
            ))
        })?;

        let db = DbService::new(&config.database_path).await?;

        if config.seed_sample_data {
            seed::seed_sample_data(&db.pool).await?;
        }
        if let Some(admin) = &config.admin {
            seed::bootstrap_admin(&db.pool, admin).await?;
        }

        Ok(Self::new(config.clone(), db.pool))
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 广播桌台最新状态 (含服务员姓名)
    ///
    /// 读取失败只记录日志，不影响调用方的响应
    pub async fn publish_table(&self, table_id: i64) {
        match dining_table::find_by_id(&self.pool, table_id).await {
            Ok(Some(table)) => self.tables.publish(TableEvent::TableUpdated { table }),
            Ok(None) => {
                tracing::warn!(table_id, "Table vanished before broadcast");
            }
            Err(e) => {
                tracing::warn!(table_id, error = %e, "Failed to load table for broadcast");
            }
        }
    }

    /// 广播桌台删除
    pub fn publish_table_removed(&self, table_id: i64) {
        self.tables.publish(TableEvent::TableRemoved { table_id });
    }
}
