//! Authentication Handlers
//!
//! Handles registration, login and user management

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::auth::{CurrentUser, hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_email, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{
    AuthResponse, LoginRequest, MessageResponse, RegisterRequest, User, UserRole, UserUpdate,
};

/// `{ "user": ... }`
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: User,
}

/// `{ "users": [...] }`
#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<User>,
}

/// `{ "message": ..., "user": ... }`
#[derive(Debug, Serialize)]
pub struct UserUpdated {
    pub message: String,
    pub user: User,
}

fn user_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::UserNotFound).with_detail("user_id", id)
}

fn email_exists(email: &str) -> AppError {
    AppError::with_message(ErrorCode::UserEmailExists, "User with this email already exists")
        .with_detail("email", email)
}

fn issue_token(state: &ServerState, user: &User) -> AppResult<String> {
    state
        .get_jwt_service()
        .generate_token(user)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))
}

/// POST /api/auth/register - 注册
///
/// 角色缺省为 staff
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
    validate_email(&req.email)?;
    validate_required_text(&req.password, "password", MAX_PASSWORD_LEN)?;
    let role = match req.role.as_deref() {
        Some(role) => role.parse::<UserRole>()?,
        None => UserRole::default(),
    };

    if user::email_taken(&state.pool, &req.email, None).await? {
        return Err(email_exists(&req.email));
    }

    let password_hash = hash_password(&req.password)?;
    let created = user::create(&state.pool, &req.name, &req.email, &password_hash, role)
        .await
        .map_err(|e| match e {
            crate::db::repository::RepoError::Duplicate(_) => email_exists(&req.email),
            other => other.into(),
        })?;
    let token = issue_token(&state, &created)?;

    tracing::info!(user_id = created.id, role = %created.role, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user: created,
            token,
        }),
    ))
}

/// POST /api/auth/login - 登录
///
/// 邮箱不存在与密码错误返回相同的错误
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let credentials = user::find_credentials_by_email(&state.pool, &req.email).await?;

    let Some(credentials) = credentials else {
        security_log!("WARN", "login_failed", reason = "user_not_found", email = req.email.clone());
        return Err(AppError::invalid_credentials());
    };
    if !verify_password(&req.password, &credentials.password_hash) {
        security_log!(
            "WARN",
            "login_failed",
            reason = "invalid_password",
            user_id = credentials.id
        );
        return Err(AppError::invalid_credentials());
    }

    let logged_in: User = credentials.into();
    let token = issue_token(&state, &logged_in)?;

    tracing::info!(user_id = logged_in.id, role = %logged_in.role, "User logged in successfully");

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: logged_in,
        token,
    }))
}

/// GET /api/auth/me - 当前用户
pub async fn me(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<UserEnvelope>> {
    let found = user::find_by_id(&state.pool, current.id)
        .await?
        .ok_or_else(|| user_not_found(current.id))?;
    Ok(Json(UserEnvelope { user: found }))
}

/// GET /api/auth/users - 全部用户
pub async fn list_users(State(state): State<ServerState>) -> AppResult<Json<UserList>> {
    let users = user::find_all(&state.pool).await?;
    Ok(Json(UserList { users }))
}

/// GET /api/auth/users/{id}
pub async fn get_user(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UserEnvelope>> {
    let found = user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    Ok(Json(UserEnvelope { user: found }))
}

/// PUT /api/auth/users/{id} - 部分更新
pub async fn update_user(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<UserUpdated>> {
    if payload.is_empty() {
        return Err(AppError::validation("No fields provided for update"));
    }
    if user::find_by_id(&state.pool, id).await?.is_none() {
        return Err(user_not_found(id));
    }

    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(email) = &payload.email {
        validate_email(email)?;
        if user::email_taken(&state.pool, email, Some(id)).await? {
            return Err(email_exists(email));
        }
    }
    let role = payload
        .role
        .as_deref()
        .map(str::parse::<UserRole>)
        .transpose()?;
    let password_hash = match &payload.password {
        Some(password) => {
            validate_required_text(password, "password", MAX_PASSWORD_LEN)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let updated = user::update(
        &state.pool,
        id,
        payload.name.as_deref(),
        payload.email.as_deref(),
        password_hash.as_deref(),
        role,
    )
    .await?;

    tracing::info!(user_id = id, "User updated");

    Ok(Json(UserUpdated {
        message: "User updated successfully".to_string(),
        user: updated,
    }))
}

/// DELETE /api/auth/users/{id}
///
/// 不能删除自己的账号
pub async fn delete_user(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    if current.id == id {
        return Err(AppError::with_message(
            ErrorCode::UserCannotDeleteSelf,
            "Cannot delete your own account",
        ));
    }
    if !user::delete(&state.pool, id).await? {
        return Err(user_not_found(id));
    }

    tracing::info!(user_id = id, deleted_by = current.id, "User deleted");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
