//! Order Repository
//!
//! 订单与订单明细。写操作都接受 `impl sqlx::Executor`，由
//! [`crate::orders::service`] 在同一事务内组合调用。

use super::RepoResult;
use shared::models::{Order, OrderItem, OrderItemDetail, OrderItemStatus, OrderStatus};
use sqlx::{Sqlite, SqlitePool};

const ORDER_SELECT: &str = "SELECT o.id, o.table_id, t.number AS table_number, o.status, o.notes, o.total, o.created_at, o.updated_at FROM orders o LEFT JOIN tables t ON o.table_id = t.id";

const ITEM_COLUMNS: &str = "id, order_id, menu_item_id, quantity, unit_price, notes, status, created_at";

/// 全部订单，最新在前
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let sql = format!("{ORDER_SELECT} ORDER BY o.created_at DESC, o.id DESC");
    let rows = sqlx::query_as::<_, Order>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

/// 厨房队列：pending / preparing / ready，最早在前
pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "{ORDER_SELECT} WHERE o.status IN ('pending', 'preparing', 'ready') ORDER BY o.created_at, o.id"
    );
    let rows = sqlx::query_as::<_, Order>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_table(pool: &SqlitePool, table_id: i64) -> RepoResult<Vec<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE o.table_id = ? ORDER BY o.created_at DESC, o.id DESC");
    let rows = sqlx::query_as::<_, Order>(&sql)
        .bind(table_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// 桌台最近一张未完成订单
pub async fn find_active_by_table(pool: &SqlitePool, table_id: i64) -> RepoResult<Option<Order>> {
    let sql = format!(
        "{ORDER_SELECT} WHERE o.table_id = ? AND o.status NOT IN ('paid', 'cancelled') ORDER BY o.created_at DESC, o.id DESC LIMIT 1"
    );
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(table_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_id(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE o.id = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

/// 订单明细，附带菜品名称/描述/图片 (菜品已删除时为 null)
pub async fn find_items_detail(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    order_id: i64,
) -> RepoResult<Vec<OrderItemDetail>> {
    let rows = sqlx::query_as::<_, OrderItemDetail>(
        "SELECT oi.id, oi.order_id, oi.menu_item_id, oi.quantity, oi.unit_price, oi.notes, oi.status, oi.created_at, m.name, m.description, m.image_url FROM order_items oi LEFT JOIN menu_items m ON oi.menu_item_id = m.id WHERE oi.order_id = ? ORDER BY oi.id",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn insert_order(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    table_id: i64,
    notes: Option<&str>,
    now: i64,
) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (table_id, status, notes, total, created_at, updated_at) VALUES (?1, 'pending', ?2, 0, ?3, ?3) RETURNING id",
    )
    .bind(table_id)
    .bind(notes)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

pub async fn insert_item(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    order_id: i64,
    menu_item_id: i64,
    quantity: i64,
    unit_price: f64,
    notes: Option<&str>,
    now: i64,
) -> RepoResult<OrderItem> {
    let sql = format!(
        "INSERT INTO order_items (order_id, menu_item_id, quantity, unit_price, notes, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6) RETURNING {ITEM_COLUMNS}"
    );
    let item = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .bind(menu_item_id)
        .bind(quantity)
        .bind(unit_price)
        .bind(notes)
        .bind(now)
        .fetch_one(conn)
        .await?;
    Ok(item)
}

/// 按订单查找明细，不属于该订单时返回 None
pub async fn find_item(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    order_id: i64,
    item_id: i64,
) -> RepoResult<Option<OrderItem>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE id = ? AND order_id = ?");
    let row = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(item_id)
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

pub async fn item_statuses(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    order_id: i64,
) -> RepoResult<Vec<OrderItemStatus>> {
    let rows: Vec<OrderItemStatus> =
        sqlx::query_scalar("SELECT status FROM order_items WHERE order_id = ? ORDER BY id")
            .bind(order_id)
            .fetch_all(conn)
            .await?;
    Ok(rows)
}

pub async fn set_item_status(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    item_id: i64,
    status: OrderItemStatus,
) -> RepoResult<()> {
    sqlx::query("UPDATE order_items SET status = ? WHERE id = ?")
        .bind(status)
        .bind(item_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn set_status(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    order_id: i64,
    status: OrderStatus,
    now: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// 未取消明细的 (单价, 数量)，用于重算总额
pub async fn billable_lines(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    order_id: i64,
) -> RepoResult<Vec<(f64, i64)>> {
    let rows: Vec<(f64, i64)> = sqlx::query_as(
        "SELECT unit_price, quantity FROM order_items WHERE order_id = ? AND status != 'cancelled'",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn set_total(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    order_id: i64,
    total: f64,
    now: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE orders SET total = ?, updated_at = ? WHERE id = ?")
        .bind(total)
        .bind(now)
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// 同桌其他未完成订单数
pub async fn count_other_active(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    table_id: i64,
    except_order_id: i64,
) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders WHERE table_id = ? AND id != ? AND status NOT IN ('paid', 'cancelled')",
    )
    .bind(table_id)
    .bind(except_order_id)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn setup() -> (SqlitePool, i64, i64) {
        let pool = DbService::in_memory().await.unwrap().pool;
        let table_id: i64 =
            sqlx::query_scalar("INSERT INTO tables (number, capacity) VALUES (3, 4) RETURNING id")
                .fetch_one(&pool)
                .await
                .unwrap();
        let category_id: i64 =
            sqlx::query_scalar("INSERT INTO categories (name) VALUES ('Pizza') RETURNING id")
                .fetch_one(&pool)
                .await
                .unwrap();
        let menu_item_id: i64 = sqlx::query_scalar(
            "INSERT INTO menu_items (name, price, category_id, created_at) VALUES ('Margherita', 12.99, ?, 0) RETURNING id",
        )
        .bind(category_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        (pool, table_id, menu_item_id)
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let (pool, table_id, menu_item_id) = setup().await;
        let order_id = insert_order(&pool, table_id, Some("window"), 1_000).await.unwrap();
        let item = insert_item(&pool, order_id, menu_item_id, 2, 12.99, None, 1_000)
            .await
            .unwrap();
        assert_eq!(item.status, OrderItemStatus::Pending);

        let order = find_by_id(&pool, order_id).await.unwrap().unwrap();
        assert_eq!(order.table_number, Some(3));
        assert_eq!(order.status, OrderStatus::Pending);

        let details = find_items_detail(&pool, order_id).await.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].name.as_deref(), Some("Margherita"));

        assert!(find_item(&pool, order_id, item.id).await.unwrap().is_some());
        assert!(find_item(&pool, order_id + 1, item.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_active_queries() {
        let (pool, table_id, _) = setup().await;
        let first = insert_order(&pool, table_id, None, 1_000).await.unwrap();
        let second = insert_order(&pool, table_id, None, 2_000).await.unwrap();
        set_status(&pool, first, OrderStatus::Paid, 3_000).await.unwrap();

        let active = find_active_by_table(&pool, table_id).await.unwrap().unwrap();
        assert_eq!(active.id, second);
        assert_eq!(count_other_active(&pool, table_id, second).await.unwrap(), 0);
        assert_eq!(count_other_active(&pool, table_id, first).await.unwrap(), 1);

        let history = find_by_table(&pool, table_id).await.unwrap();
        assert_eq!(history[0].id, second);
        assert_eq!(find_active(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_billable_lines_skip_cancelled() {
        let (pool, table_id, menu_item_id) = setup().await;
        let order_id = insert_order(&pool, table_id, None, 0).await.unwrap();
        insert_item(&pool, order_id, menu_item_id, 2, 12.99, None, 0)
            .await
            .unwrap();
        let dropped = insert_item(&pool, order_id, menu_item_id, 1, 12.99, None, 0)
            .await
            .unwrap();
        set_item_status(&pool, dropped.id, OrderItemStatus::Cancelled)
            .await
            .unwrap();

        let lines = billable_lines(&pool, order_id).await.unwrap();
        assert_eq!(lines, vec![(12.99, 2)]);
        assert_eq!(
            item_statuses(&pool, order_id).await.unwrap(),
            vec![OrderItemStatus::Pending, OrderItemStatus::Cancelled]
        );
    }

    #[tokio::test]
    async fn test_deleted_menu_item_keeps_line() {
        let (pool, table_id, menu_item_id) = setup().await;
        let order_id = insert_order(&pool, table_id, None, 0).await.unwrap();
        insert_item(&pool, order_id, menu_item_id, 1, 12.99, None, 0)
            .await
            .unwrap();
        sqlx::query("DELETE FROM menu_items WHERE id = ?")
            .bind(menu_item_id)
            .execute(&pool)
            .await
            .unwrap();

        let details = find_items_detail(&pool, order_id).await.unwrap();
        assert_eq!(details[0].menu_item_id, None);
        assert_eq!(details[0].name, None);
        assert_eq!(details[0].unit_price, 12.99);
    }
}
