//! CurrentUser Extractor
//!
//! 处理函数通过参数直接获取当前用户

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppError;
use crate::auth::{AuthRejection, CurrentUser};
use crate::core::ServerState;

/// 从请求扩展中读取 [`require_auth`](crate::auth::require_auth) 注入的用户
///
/// - 令牌无效: 返回解析时的错误 (401)
/// - 无令牌: 401 Unauthorized
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        match parts.extensions.get::<AuthRejection>() {
            Some(AuthRejection(err)) => Err(err.clone()),
            None => Err(AppError::unauthorized()),
        }
    }
}
