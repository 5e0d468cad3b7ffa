//! Dashboard statistics

use super::RepoResult;
use shared::models::DashboardStats;
use sqlx::SqlitePool;

pub async fn dashboard(pool: &SqlitePool) -> RepoResult<DashboardStats> {
    let (total_orders, active_orders, total_revenue): (i64, i64, f64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN status NOT IN ('paid', 'cancelled') THEN 1 ELSE 0 END), 0), CAST(COALESCE(SUM(CASE WHEN status = 'paid' THEN total ELSE 0.0 END), 0.0) AS REAL) FROM orders",
    )
    .fetch_one(pool)
    .await?;
    let menu_items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items")
        .fetch_one(pool)
        .await?;
    let tables: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tables")
        .fetch_one(pool)
        .await?;

    Ok(DashboardStats {
        total_orders,
        active_orders,
        total_revenue: crate::orders::money::round_money(total_revenue),
        menu_items,
        tables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_dashboard_counts() {
        let pool = DbService::in_memory().await.unwrap().pool;
        let empty = dashboard(&pool).await.unwrap();
        assert_eq!(empty.total_orders, 0);
        assert_eq!(empty.total_revenue, 0.0);

        sqlx::query(
            "INSERT INTO orders (status, total, created_at, updated_at) VALUES ('paid', 20.5, 0, 0), ('paid', 10.25, 0, 0), ('pending', 99.0, 0, 0), ('cancelled', 5.0, 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO tables (number, capacity) VALUES (1, 2)")
            .execute(&pool)
            .await
            .unwrap();

        let stats = dashboard(&pool).await.unwrap();
        assert_eq!(stats.total_orders, 4);
        assert_eq!(stats.active_orders, 1);
        assert_eq!(stats.total_revenue, 30.75);
        assert_eq!(stats.tables, 1);
        assert_eq!(stats.menu_items, 0);
    }
}
