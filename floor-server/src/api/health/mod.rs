//! 健康检查
//!
//! | 路径 | 说明 |
//! |------|------|
//! | GET /health | 存活探针，不访问数据库 |
//! | GET /health/detailed | 数据库往返 + `/ws` 在线连接数 |
//!
//! 两个路由都不需要认证。数据库不可用时 `/health/detailed` 仍返回 200，
//! `status` 变为 `degraded`。

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

static STARTED_AT: OnceLock<Instant> = OnceLock::new();

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/detailed", get(detailed_health))
}

/// 记录监听开始的时间，`uptime_seconds` 从这里算起
pub fn mark_started() {
    STARTED_AT.get_or_init(Instant::now);
}

fn uptime() -> Duration {
    STARTED_AT.get_or_init(Instant::now).elapsed()
}

#[derive(Debug, Serialize)]
pub struct Liveness {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DatabaseCheck {
    Ok { latency_ms: u64 },
    Error { message: String },
}

#[derive(Debug, Serialize)]
pub struct Readiness {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    live_connections: usize,
    database: DatabaseCheck,
}

/// GET /health
pub async fn health() -> Json<Liveness> {
    Json(Liveness {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health/detailed
pub async fn detailed_health(State(state): State<ServerState>) -> Json<Readiness> {
    let probe = Instant::now();
    let database = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.pool)
        .await
    {
        Ok(_) => DatabaseCheck::Ok {
            latency_ms: probe.elapsed().as_millis() as u64,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Health probe could not reach the database");
            DatabaseCheck::Error {
                message: format!("Database error: {e}"),
            }
        }
    };

    let status = match database {
        DatabaseCheck::Ok { .. } => "healthy",
        DatabaseCheck::Error { .. } => "degraded",
    };

    Json(Readiness {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: uptime().as_secs(),
        live_connections: state.tables.receiver_count(),
        database,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_detailed_reports_live_connections() {
        let pool = DbService::in_memory().await.unwrap().pool;
        let state = ServerState::new(Config::default(), pool);
        let _rx = state.tables.subscribe();

        let Json(report) = detailed_health(State(state)).await;
        assert_eq!(report.status, "healthy");
        assert_eq!(report.live_connections, 1);
        assert!(matches!(report.database, DatabaseCheck::Ok { .. }));
    }

    #[test]
    fn test_database_check_wire_format() {
        let json = serde_json::to_value(DatabaseCheck::Error {
            message: "locked".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "locked");
    }
}
