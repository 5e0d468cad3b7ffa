//! 启动时的示例数据与管理员引导

use sqlx::SqlitePool;

use super::repository::{RepoResult, user};
use crate::auth::hash_password;
use crate::core::AdminBootstrap;
use crate::utils::AppResult;
use shared::models::UserRole;

/// (桌号, 座位数, x, y)
const SAMPLE_TABLES: [(i64, i64, i64, i64); 5] = [
    (1, 2, 100, 100),
    (2, 4, 200, 100),
    (3, 6, 300, 100),
    (4, 2, 100, 200),
    (5, 4, 200, 200),
];

/// (名称, 描述, 价格, 图片)
const SAMPLE_PIZZAS: [(&str, &str, f64, &str); 3] = [
    (
        "Margherita",
        "Classic pizza with tomato sauce, mozzarella, and basil",
        12.99,
        "https://images.unsplash.com/photo-1574071318508-1cdbab80d002",
    ),
    (
        "Pepperoni",
        "Pizza with tomato sauce, mozzarella, and pepperoni",
        14.99,
        "https://images.unsplash.com/photo-1628840042765-356cda07504e",
    ),
    (
        "Vegetarian",
        "Pizza with tomato sauce, mozzarella, bell peppers, mushrooms, and onions",
        13.99,
        "https://images.unsplash.com/photo-1511689660979-10d2b1aada49",
    ),
];

/// 写入示例桌台和菜单
///
/// 只在对应表为空时写入，重复启动不会产生重复数据
pub async fn seed_sample_data(pool: &SqlitePool) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    let tables: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tables")
        .fetch_one(&mut *tx)
        .await?;
    if tables == 0 {
        for (number, capacity, x, y) in SAMPLE_TABLES {
            sqlx::query(
                "INSERT INTO tables (number, capacity, x_position, y_position) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(number)
            .bind(capacity)
            .bind(x)
            .bind(y)
            .execute(&mut *tx)
            .await?;
        }
        tracing::info!(count = SAMPLE_TABLES.len(), "Seeded sample tables");
    }

    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items")
        .fetch_one(&mut *tx)
        .await?;
    if items == 0 {
        let category_id: i64 = sqlx::query_scalar(
            "INSERT INTO categories (name, description) VALUES ('Pizza', 'Stone-baked pizzas') RETURNING id",
        )
        .fetch_one(&mut *tx)
        .await?;
        let now = shared::util::now_millis();
        for (name, description, price, image_url) in SAMPLE_PIZZAS {
            sqlx::query(
                "INSERT INTO menu_items (name, description, price, category_id, image_url, is_available, created_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
            )
            .bind(name)
            .bind(description)
            .bind(price)
            .bind(category_id)
            .bind(image_url)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tracing::info!(count = SAMPLE_PIZZAS.len(), "Seeded sample menu");
    }

    tx.commit().await?;
    Ok(())
}

/// 没有任何管理员时创建配置中的管理员账号
pub async fn bootstrap_admin(pool: &SqlitePool, admin: &AdminBootstrap) -> AppResult<()> {
    if user::exists_with_role(pool, UserRole::Admin).await? {
        return Ok(());
    }
    if user::find_by_email(pool, &admin.email).await?.is_some() {
        tracing::warn!(email = %admin.email, "Bootstrap admin email already used by a non-admin account");
        return Ok(());
    }

    let hash = hash_password(&admin.password)?;
    let created = user::create(pool, &admin.name, &admin.email, &hash, UserRole::Admin).await?;
    tracing::info!(user_id = created.id, email = %created.email, "Bootstrap admin created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::{dining_table, menu_item};

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let pool = DbService::in_memory().await.unwrap().pool;
        seed_sample_data(&pool).await.unwrap();
        seed_sample_data(&pool).await.unwrap();

        let tables = dining_table::find_all(&pool).await.unwrap();
        assert_eq!(tables.len(), 5);
        assert_eq!(tables[2].capacity, 6);
        assert_eq!((tables[4].x_position, tables[4].y_position), (200, 200));

        let menu = menu_item::find_all(&pool).await.unwrap();
        assert_eq!(menu.len(), 3);
        assert!(menu.iter().all(|m| m.category_name.as_deref() == Some("Pizza")));
    }

    #[tokio::test]
    async fn test_bootstrap_admin_once() {
        let pool = DbService::in_memory().await.unwrap().pool;
        let admin = AdminBootstrap {
            email: "admin@example.com".into(),
            password: "change-me-please".into(),
            name: "Admin".into(),
        };
        bootstrap_admin(&pool, &admin).await.unwrap();
        bootstrap_admin(&pool, &admin).await.unwrap();

        let users = user::find_all(&pool).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, UserRole::Admin);

        let creds = user::find_credentials_by_email(&pool, "admin@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(crate::auth::verify_password("change-me-please", &creds.password_hash));
    }
}
