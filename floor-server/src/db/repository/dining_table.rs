//! Dining Table Repository

use super::{RepoError, RepoResult};
use shared::models::{DiningTable, TableStatus};
use sqlx::{Sqlite, SqlitePool};

const TABLE_SELECT: &str = "SELECT t.id, t.number, t.capacity, t.status, t.x_position, t.y_position, t.server_id, u.name AS server_name FROM tables t LEFT JOIN users u ON t.server_id = u.id";

/// 新建桌台的已校验字段
#[derive(Debug, Clone)]
pub struct NewTable {
    pub number: i64,
    pub capacity: i64,
    pub status: TableStatus,
    pub x_position: i64,
    pub y_position: i64,
    pub server_id: Option<i64>,
}

/// 部分更新，`server_id: Some(None)` 表示取消分配
#[derive(Debug, Clone, Default)]
pub struct TableChanges {
    pub number: Option<i64>,
    pub capacity: Option<i64>,
    pub status: Option<TableStatus>,
    pub x_position: Option<i64>,
    pub y_position: Option<i64>,
    pub server_id: Option<Option<i64>>,
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<DiningTable>> {
    let sql = format!("{TABLE_SELECT} ORDER BY t.number");
    let rows = sqlx::query_as::<_, DiningTable>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
) -> RepoResult<Option<DiningTable>> {
    let sql = format!("{TABLE_SELECT} WHERE t.id = ?");
    let row = sqlx::query_as::<_, DiningTable>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

pub async fn exists(conn: impl sqlx::Executor<'_, Database = Sqlite>, id: i64) -> RepoResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM tables WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}

/// 桌号是否已被其他桌台占用
pub async fn number_taken(pool: &SqlitePool, number: i64, except_id: Option<i64>) -> RepoResult<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM tables WHERE number = ?1 AND (?2 IS NULL OR id != ?2) LIMIT 1",
    )
    .bind(number)
    .bind(except_id)
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}

pub async fn create(pool: &SqlitePool, data: NewTable) -> RepoResult<DiningTable> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO tables (number, capacity, status, x_position, y_position, server_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
    )
    .bind(data.number)
    .bind(data.capacity)
    .bind(data.status)
    .bind(data.x_position)
    .bind(data.y_position)
    .bind(data.server_id)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create table".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: TableChanges) -> RepoResult<DiningTable> {
    // ?6 标记 server_id 是否出现在请求中
    let rows = sqlx::query(
        "UPDATE tables SET number = COALESCE(?1, number), capacity = COALESCE(?2, capacity), status = COALESCE(?3, status), x_position = COALESCE(?4, x_position), y_position = COALESCE(?5, y_position), server_id = CASE WHEN ?6 THEN ?7 ELSE server_id END WHERE id = ?8",
    )
    .bind(data.number)
    .bind(data.capacity)
    .bind(data.status)
    .bind(data.x_position)
    .bind(data.y_position)
    .bind(data.server_id.is_some())
    .bind(data.server_id.flatten())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Table {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Table {id} not found")))
}

/// 更新占用状态，返回是否命中
pub async fn set_status(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
    status: TableStatus,
) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE tables SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn set_server(pool: &SqlitePool, id: i64, server_id: Option<i64>) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE tables SET server_id = ? WHERE id = ?")
        .bind(server_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// 桌台上未完成 (非 paid / cancelled) 的订单数
pub async fn count_active_orders(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders WHERE table_id = ? AND status NOT IN ('paid', 'cancelled')",
    )
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM tables WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::user;
    use shared::models::UserRole;

    fn new_table(number: i64) -> NewTable {
        NewTable {
            number,
            capacity: 4,
            status: TableStatus::Available,
            x_position: 0,
            y_position: 0,
            server_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_by_number() {
        let pool = DbService::in_memory().await.unwrap().pool;
        create(&pool, new_table(7)).await.unwrap();
        create(&pool, new_table(2)).await.unwrap();

        let all = find_all(&pool).await.unwrap();
        assert_eq!(all.iter().map(|t| t.number).collect::<Vec<_>>(), vec![2, 7]);
        assert!(number_taken(&pool, 7, None).await.unwrap());
        assert!(!number_taken(&pool, 7, Some(all[1].id)).await.unwrap());

        let err = create(&pool, new_table(2)).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_server_name_join_and_unassign() {
        let pool = DbService::in_memory().await.unwrap().pool;
        let server = user::create(&pool, "Sam", "sam@example.com", "hash", UserRole::Server)
            .await
            .unwrap();
        let table = create(&pool, new_table(1)).await.unwrap();

        let assigned = update(
            &pool,
            table.id,
            TableChanges {
                server_id: Some(Some(server.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(assigned.server_name.as_deref(), Some("Sam"));

        // server_id 缺失时保持不变
        let moved = update(
            &pool,
            table.id,
            TableChanges {
                x_position: Some(120),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(moved.server_id, Some(server.id));
        assert_eq!(moved.x_position, 120);

        let cleared = update(
            &pool,
            table.id,
            TableChanges {
                server_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(cleared.server_id, None);
        assert_eq!(cleared.server_name, None);
    }

    #[tokio::test]
    async fn test_set_status_and_missing_table() {
        let pool = DbService::in_memory().await.unwrap().pool;
        let table = create(&pool, new_table(3)).await.unwrap();

        assert!(set_status(&pool, table.id, TableStatus::Reserved).await.unwrap());
        let reloaded = find_by_id(&pool, table.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, TableStatus::Reserved);

        assert!(!set_status(&pool, 999, TableStatus::Occupied).await.unwrap());
        let err = update(&pool, 999, TableChanges::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
        assert_eq!(count_active_orders(&pool, table.id).await.unwrap(), 0);
    }
}
