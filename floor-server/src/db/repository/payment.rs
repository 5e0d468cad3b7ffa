//! Payment Repository

use super::RepoResult;
use shared::models::{Payment, PaymentMethod};
use sqlx::{Sqlite, SqlitePool};

const PAYMENT_COLUMNS: &str = "id, order_id, amount, payment_method, status, processed_by, created_at";

pub async fn insert(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    order_id: i64,
    amount: f64,
    method: PaymentMethod,
    processed_by: Option<i64>,
    now: i64,
) -> RepoResult<Payment> {
    let sql = format!(
        "INSERT INTO payments (order_id, amount, payment_method, status, processed_by, created_at) VALUES (?1, ?2, ?3, 'completed', ?4, ?5) RETURNING {PAYMENT_COLUMNS}"
    );
    let payment = sqlx::query_as::<_, Payment>(&sql)
        .bind(order_id)
        .bind(amount)
        .bind(method)
        .bind(processed_by)
        .bind(now)
        .fetch_one(conn)
        .await?;
    Ok(payment)
}

pub async fn find_by_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<Payment>> {
    let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE order_id = ? ORDER BY id");
    let rows = sqlx::query_as::<_, Payment>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// 订单是否已有完成的支付
pub async fn has_completed(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    order_id: i64,
) -> RepoResult<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM payments WHERE order_id = ? AND status = 'completed' LIMIT 1",
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(found.is_some())
}
