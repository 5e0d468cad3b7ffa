//! Menu API 模块
//!
//! 读取公开，菜品与分类的增删改需要 admin

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/menu", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list_items))
        .route("/categories", get(handler::list_categories))
        .route("/category/{id}", get(handler::list_by_category))
        .route("/item/{id}", get(handler::get_item));

    let manage_routes = Router::new()
        .route("/item", post(handler::create_item))
        .route(
            "/item/{id}",
            put(handler::update_item).delete(handler::delete_item),
        )
        .route("/category", post(handler::create_category))
        .route(
            "/category/{id}",
            put(handler::update_category).delete(handler::delete_category),
        )
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
