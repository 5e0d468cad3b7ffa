//! Menu Item Repository

use super::{RepoError, RepoResult};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use sqlx::{Sqlite, SqlitePool};

const MENU_ITEM_SELECT: &str = "SELECT m.id, m.name, m.description, m.price, m.category_id, c.name AS category_name, m.image_url, m.is_available, m.created_at FROM menu_items m LEFT JOIN categories c ON m.category_id = c.id";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<MenuItem>> {
    let sql = format!("{MENU_ITEM_SELECT} ORDER BY m.category_id, m.name");
    let rows = sqlx::query_as::<_, MenuItem>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_category(pool: &SqlitePool, category_id: i64) -> RepoResult<Vec<MenuItem>> {
    let sql = format!("{MENU_ITEM_SELECT} WHERE m.category_id = ? ORDER BY m.name");
    let rows = sqlx::query_as::<_, MenuItem>(&sql)
        .bind(category_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
) -> RepoResult<Option<MenuItem>> {
    let sql = format!("{MENU_ITEM_SELECT} WHERE m.id = ?");
    let row = sqlx::query_as::<_, MenuItem>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

/// 当前单价，下单时快照到订单明细
pub async fn find_price(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
) -> RepoResult<Option<f64>> {
    let price: Option<f64> = sqlx::query_scalar("SELECT price FROM menu_items WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(price)
}

pub async fn create(pool: &SqlitePool, data: MenuItemCreate) -> RepoResult<MenuItem> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO menu_items (name, description, price, category_id, image_url, is_available, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.category_id)
    .bind(&data.image_url)
    .bind(data.is_available.unwrap_or(true))
    .bind(now)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu item".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: MenuItemUpdate) -> RepoResult<MenuItem> {
    let rows = sqlx::query(
        "UPDATE menu_items SET name = COALESCE(?1, name), description = COALESCE(?2, description), price = COALESCE(?3, price), category_id = COALESCE(?4, category_id), image_url = COALESCE(?5, image_url), is_available = COALESCE(?6, is_available) WHERE id = ?7",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.category_id)
    .bind(&data.image_url)
    .bind(data.is_available)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu item {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Menu item {id} not found")))
}

/// 删除菜品；已下单的明细保留 (menu_item_id 置空)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM menu_items WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::category;
    use shared::models::CategoryCreate;

    async fn setup() -> (SqlitePool, i64) {
        let pool = DbService::in_memory().await.unwrap().pool;
        let cat = category::create(
            &pool,
            CategoryCreate {
                name: "Pizza".into(),
                description: None,
            },
        )
        .await
        .unwrap();
        (pool, cat.id)
    }

    fn item(name: &str, price: f64, category_id: i64) -> MenuItemCreate {
        MenuItemCreate {
            name: name.into(),
            description: None,
            price,
            category_id,
            image_url: None,
            is_available: None,
        }
    }

    #[tokio::test]
    async fn test_create_joins_category_name() {
        let (pool, cat_id) = setup().await;
        let created = create(&pool, item("Margherita", 12.99, cat_id)).await.unwrap();
        assert_eq!(created.category_name.as_deref(), Some("Pizza"));
        assert!(created.is_available);
        assert_eq!(find_price(&pool, created.id).await.unwrap(), Some(12.99));
    }

    #[tokio::test]
    async fn test_list_order_and_filter() {
        let (pool, cat_id) = setup().await;
        create(&pool, item("Pepperoni", 14.99, cat_id)).await.unwrap();
        create(&pool, item("Margherita", 12.99, cat_id)).await.unwrap();

        let all = find_all(&pool).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Margherita");

        let by_cat = find_by_category(&pool, cat_id).await.unwrap();
        assert_eq!(by_cat.len(), 2);
        assert!(find_by_category(&pool, cat_id + 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (pool, cat_id) = setup().await;
        let created = create(&pool, item("Calzone", 11.0, cat_id)).await.unwrap();
        let updated = update(
            &pool,
            created.id,
            MenuItemUpdate {
                is_available: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!updated.is_available);
        assert_eq!(updated.price, 11.0);

        assert!(delete(&pool, created.id).await.unwrap());
        assert!(find_by_id(&pool, created.id).await.unwrap().is_none());
    }
}
