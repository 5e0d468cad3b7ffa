//! Order API 模块
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | /api/orders | GET | staff |
//! | /api/orders | POST | 公共 |
//! | /api/orders/active | GET | staff |
//! | /api/orders/table/{id} | GET | 公共 |
//! | /api/orders/table/{id}/active | GET | 公共 |
//! | /api/orders/{id} | GET | 公共 |
//! | /api/orders/{id}/items | POST | 公共 |
//! | /api/orders/{id}/payments | GET | staff |
//! | /api/orders/{id}/status | PUT | staff |
//! | /api/orders/{id}/item/{item_id}/status | PUT | kitchen |
//! | /api/orders/{id}/payment | POST | server |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{require_kitchen, require_server, require_staff};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    let public_routes = Router::new()
        .route("/", post(handler::create))
        .route("/table/{table_id}", get(handler::list_by_table))
        .route("/table/{table_id}/active", get(handler::active_by_table))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/items", post(handler::add_items));

    let staff_routes = Router::new()
        .route("/", get(handler::list))
        .route("/active", get(handler::list_active))
        .route("/{id}/payments", get(handler::list_payments))
        .route("/{id}/status", put(handler::update_status))
        .layer(middleware::from_fn(require_staff));

    let kitchen_routes = Router::new()
        .route(
            "/{id}/item/{item_id}/status",
            put(handler::update_item_status),
        )
        .layer(middleware::from_fn(require_kitchen));

    let server_routes = Router::new()
        .route("/{id}/payment", post(handler::process_payment))
        .layer(middleware::from_fn(require_server));

    public_routes
        .merge(staff_routes)
        .merge(kitchen_routes)
        .merge(server_routes)
}
