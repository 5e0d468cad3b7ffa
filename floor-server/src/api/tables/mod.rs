//! Dining Table API 模块
//!
//! 所有写操作都会把最新桌台推送到 `/ws`

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{require_admin, require_staff};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    // 顾客扫码选桌也会修改状态，所以 /status 不设守卫
    let public_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", put(handler::update_status));

    let staff_routes = Router::new()
        .route("/{id}/server", put(handler::assign_server))
        .layer(middleware::from_fn(require_staff));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .layer(middleware::from_fn(require_admin));

    public_routes.merge(staff_routes).merge(manage_routes)
}
