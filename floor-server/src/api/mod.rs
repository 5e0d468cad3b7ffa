//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册、登录、用户管理
//! - [`menu`] - 菜单与分类
//! - [`tables`] - 桌台管理
//! - [`orders`] - 订单、厨房状态、结账
//! - [`statistics`] - 管理后台统计
//! - [`ws`] - 桌台实时推送

pub mod auth;
pub mod health;
pub mod menu;
pub mod orders;
pub mod statistics;
pub mod tables;
pub mod ws;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::require_auth;
use crate::core::ServerState;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Health API - public route
        .merge(health::router())
        // Auth API - register/login public, user management admin
        .merge(auth::router())
        // Menu API - reads public, writes admin
        .merge(menu::router())
        // Tables API
        .merge(tables::router())
        // Orders API
        .merge(orders::router())
        // Statistics API - admin
        .merge(statistics::router())
        // Table broadcast - unauthenticated
        .merge(ws::router())
}

/// Build a fully configured application with all middleware and state
///
/// This is used by both the HTTP server and integration tests
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router()
        // ========== Tower HTTP Middleware ==========
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // ========== Application Middleware ==========
        // Request ID - Generate unique ID for each request
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        // Decode bearer token - injects CurrentUser, role guards run per route
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
}
