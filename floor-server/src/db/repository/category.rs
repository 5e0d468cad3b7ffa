//! Category Repository

use super::{RepoError, RepoResult};
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use sqlx::SqlitePool;

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let rows = sqlx::query_as::<_, Category>(
        "SELECT id, name, description FROM categories ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let row = sqlx::query_as::<_, Category>(
        "SELECT id, name, description FROM categories WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: CategoryCreate) -> RepoResult<Category> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO categories (name, description) VALUES (?1, ?2) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.description)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CategoryUpdate) -> RepoResult<Category> {
    let rows = sqlx::query(
        "UPDATE categories SET name = COALESCE(?1, name), description = COALESCE(?2, description) WHERE id = ?3",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Category {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
}

/// 引用该分类的菜品数量
pub async fn count_menu_items(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items WHERE category_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// 删除分类，仍被菜品引用时返回 Validation
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    if count_menu_items(pool, id).await? > 0 {
        return Err(RepoError::Validation(format!(
            "Category {id} still has menu items"
        )));
    }
    let rows = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_category_crud() {
        let pool = DbService::in_memory().await.unwrap().pool;
        let cat = create(
            &pool,
            CategoryCreate {
                name: "Pizza".into(),
                description: None,
            },
        )
        .await
        .unwrap();

        let updated = update(
            &pool,
            cat.id,
            CategoryUpdate {
                name: None,
                description: Some("Wood-fired".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Pizza");
        assert_eq!(updated.description.as_deref(), Some("Wood-fired"));

        assert!(delete(&pool, cat.id).await.unwrap());
        assert!(!delete(&pool, cat.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_referenced_category_rejected() {
        let pool = DbService::in_memory().await.unwrap().pool;
        let cat = create(
            &pool,
            CategoryCreate {
                name: "Drinks".into(),
                description: None,
            },
        )
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO menu_items (name, price, category_id, created_at) VALUES ('Cola', 2.5, ?, 0)",
        )
        .bind(cat.id)
        .execute(&pool)
        .await
        .unwrap();

        let err = delete(&pool, cat.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert!(find_by_id(&pool, cat.id).await.unwrap().is_some());
    }
}
