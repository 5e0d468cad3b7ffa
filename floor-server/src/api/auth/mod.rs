//! Authentication Routes
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | /api/auth/register | POST | 公共 |
//! | /api/auth/login | POST | 公共 |
//! | /api/auth/me | GET | 已登录 |
//! | /api/auth/users | GET | admin |
//! | /api/auth/users/{id} | GET / PUT / DELETE | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{require_admin, require_login};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    let public_routes = Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login));

    let session_routes = Router::new()
        .route("/me", get(handler::me))
        .layer(middleware::from_fn(require_login));

    let admin_routes = Router::new()
        .route("/users", get(handler::list_users))
        .route(
            "/users/{id}",
            get(handler::get_user)
                .put(handler::update_user)
                .delete(handler::delete_user),
        )
        .layer(middleware::from_fn(require_admin));

    public_routes.merge(session_routes).merge(admin_routes)
}
