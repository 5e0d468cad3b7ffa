//! 认证中间件
//!
//! 为 JWT 认证和基于角色的授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::models::UserRole;

use crate::AppError;
use crate::auth::permissions::{ADMIN_ROLES, ANY_ROLE, KITCHEN_ROLES, SERVER_ROLES, STAFF_ROLES};
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::ErrorCode;

/// 令牌解析失败的原因，留给角色守卫返回
///
/// 公共路由不关心令牌是否有效，所以 [`require_auth`] 不直接拒绝请求
#[derive(Debug, Clone)]
pub struct AuthRejection(pub AppError);

/// 认证中间件 - 解析令牌
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// - 验证成功: 注入 [`CurrentUser`] (`req.extensions_mut().insert(user)`)
/// - 验证失败: 注入 [`AuthRejection`]，由路由上的角色守卫返回 401
/// - 无令牌: 直接放行，受保护路由由角色守卫返回 401
///
/// # 跳过解析的请求
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径 (`/health`, `/ws`)
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 允许 CORS 预检的 OPTIONS 请求
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // 非 API 路由跳过
    if !req.uri().path().starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(header) = auth_header else {
        return Ok(next.run(req).await);
    };

    let outcome = match JwtService::extract_from_header(header) {
        Some(token) => {
            let jwt_service = state.get_jwt_service();
            jwt_service
                .validate_token(token)
                .and_then(CurrentUser::try_from)
                .map_err(|e| {
                    security_log!(
                        "WARN",
                        "auth_failed",
                        error = format!("{}", e),
                        uri = format!("{:?}", req.uri())
                    );
                    match e {
                        JwtError::ExpiredToken => AppError::token_expired(),
                        _ => AppError::invalid_token("Invalid token"),
                    }
                })
        }
        None => Err(AppError::invalid_token("Invalid authorization header")),
    };

    match outcome {
        Ok(user) => {
            req.extensions_mut().insert(user);
        }
        Err(err) => {
            req.extensions_mut().insert(AuthRejection(err));
        }
    }

    Ok(next.run(req).await)
}

/// 校验请求中的用户角色
fn authorize(req: &Request, roles: &[UserRole], code: ErrorCode) -> Result<(), AppError> {
    let Some(user) = req.extensions().get::<CurrentUser>() else {
        if let Some(AuthRejection(err)) = req.extensions().get::<AuthRejection>() {
            return Err(err.clone());
        }
        security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
        return Err(AppError::unauthorized());
    };

    if !user.has_any_role(roles) {
        security_log!(
            "WARN",
            "role_denied",
            user_id = user.id,
            user_role = user.role.as_str(),
            uri = format!("{:?}", req.uri())
        );
        return Err(AppError::new(code));
    }

    Ok(())
}

/// 登录守卫 - 任意角色
pub async fn require_login(req: Request, next: Next) -> Result<Response, AppError> {
    authorize(&req, ANY_ROLE, ErrorCode::PermissionDenied)?;
    Ok(next.run(req).await)
}

/// 管理员守卫
///
/// 非管理员返回 403 Forbidden
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    authorize(&req, ADMIN_ROLES, ErrorCode::AdminRequired)?;
    Ok(next.run(req).await)
}

/// 厨房守卫 - kitchen / admin
pub async fn require_kitchen(req: Request, next: Next) -> Result<Response, AppError> {
    authorize(&req, KITCHEN_ROLES, ErrorCode::RoleRequired)?;
    Ok(next.run(req).await)
}

/// 服务员守卫 - server / admin
pub async fn require_server(req: Request, next: Next) -> Result<Response, AppError> {
    authorize(&req, SERVER_ROLES, ErrorCode::RoleRequired)?;
    Ok(next.run(req).await)
}

/// 员工守卫 - admin / staff / server / kitchen
pub async fn require_staff(req: Request, next: Next) -> Result<Response, AppError> {
    authorize(&req, STAFF_ROLES, ErrorCode::RoleRequired)?;
    Ok(next.run(req).await)
}
