//! Menu API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::core::ServerState;
use crate::db::repository::{category, menu_item};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_price,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{
    Category, CategoryCreate, CategoryUpdate, MenuItem, MenuItemCreate, MenuItemUpdate,
    MessageResponse,
};

fn item_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::MenuItemNotFound).with_detail("menu_item_id", id)
}

fn category_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::CategoryNotFound).with_detail("category_id", id)
}

async fn ensure_category(state: &ServerState, id: i64) -> AppResult<()> {
    match category::find_by_id(&state.pool, id).await? {
        Some(_) => Ok(()),
        None => Err(category_not_found(id)),
    }
}

// =========================================================================
// Menu items
// =========================================================================

/// GET /api/menu - 全部菜品 (按分类、名称排序)
pub async fn list_items(State(state): State<ServerState>) -> AppResult<Json<Vec<MenuItem>>> {
    let items = menu_item::find_all(&state.pool).await?;
    Ok(Json(items))
}

/// GET /api/menu/category/{id} - 某分类下的菜品
pub async fn list_by_category(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<MenuItem>>> {
    let items = menu_item::find_by_category(&state.pool, id).await?;
    Ok(Json(items))
}

/// GET /api/menu/item/{id}
pub async fn get_item(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuItem>> {
    let item = menu_item::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| item_not_found(id))?;
    Ok(Json(item))
}

/// POST /api/menu/item - 创建菜品
pub async fn create_item(
    State(state): State<ServerState>,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<(StatusCode, Json<MenuItem>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    validate_price(payload.price)?;
    ensure_category(&state, payload.category_id).await?;

    let item = menu_item::create(&state.pool, payload).await?;
    tracing::info!(menu_item_id = item.id, name = %item.name, "Menu item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/menu/item/{id} - 部分更新
pub async fn update_item(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemUpdate>,
) -> AppResult<Json<MenuItem>> {
    if menu_item::find_by_id(&state.pool, id).await?.is_none() {
        return Err(item_not_found(id));
    }
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    if let Some(price) = payload.price {
        validate_price(price)?;
    }
    if let Some(category_id) = payload.category_id {
        ensure_category(&state, category_id).await?;
    }

    let item = menu_item::update(&state.pool, id, payload).await?;
    Ok(Json(item))
}

/// DELETE /api/menu/item/{id}
pub async fn delete_item(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    if !menu_item::delete(&state.pool, id).await? {
        return Err(item_not_found(id));
    }
    tracing::info!(menu_item_id = id, "Menu item deleted");
    Ok(Json(MessageResponse::new("Menu item deleted successfully")))
}

// =========================================================================
// Categories
// =========================================================================

/// GET /api/menu/categories
pub async fn list_categories(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    let categories = category::find_all(&state.pool).await?;
    Ok(Json(categories))
}

/// POST /api/menu/category
pub async fn create_category(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<(StatusCode, Json<Category>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let created = category::create(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/menu/category/{id}
pub async fn update_category(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    if category::find_by_id(&state.pool, id).await?.is_none() {
        return Err(category_not_found(id));
    }
    let updated = category::update(&state.pool, id, payload).await?;
    Ok(Json(updated))
}

/// DELETE /api/menu/category/{id}
///
/// 仍有菜品引用时拒绝删除
pub async fn delete_category(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    if category::find_by_id(&state.pool, id).await?.is_none() {
        return Err(category_not_found(id));
    }
    let in_use = category::count_menu_items(&state.pool, id).await?;
    if in_use > 0 {
        return Err(AppError::new(ErrorCode::CategoryHasItems)
            .with_detail("category_id", id)
            .with_detail("menu_items", in_use));
    }

    category::delete(&state.pool, id).await?;
    tracing::info!(category_id = id, "Category deleted");
    Ok(Json(MessageResponse::new("Category deleted successfully")))
}
