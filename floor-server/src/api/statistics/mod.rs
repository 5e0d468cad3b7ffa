//! Statistics API 模块

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/statistics",
        get(handler::dashboard).layer(middleware::from_fn(require_admin)),
    )
}
