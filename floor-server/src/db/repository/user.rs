//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{User, UserCredentials, UserRole};
use sqlx::SqlitePool;

const USER_SELECT: &str = "SELECT id, name, email, role, created_at FROM users";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let sql = format!("{USER_SELECT} ORDER BY name");
    let rows = sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE email = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// 登录用：包含密码哈希
pub async fn find_credentials_by_email(
    pool: &SqlitePool,
    email: &str,
) -> RepoResult<Option<UserCredentials>> {
    let row = sqlx::query_as::<_, UserCredentials>(
        "SELECT id, name, email, role, password_hash, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// 邮箱是否已被其他用户占用
pub async fn email_taken(pool: &SqlitePool, email: &str, except_id: Option<i64>) -> RepoResult<bool> {
    let exists: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM users WHERE email = ?1 AND (?2 IS NULL OR id != ?2) LIMIT 1",
    )
    .bind(email)
    .bind(except_id)
    .fetch_optional(pool)
    .await?;
    Ok(exists.is_some())
}

pub async fn exists_with_role(pool: &SqlitePool, role: UserRole) -> RepoResult<bool> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE role = ? LIMIT 1")
        .bind(role)
        .fetch_optional(pool)
        .await?;
    Ok(exists.is_some())
}

pub async fn create(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: UserRole,
) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(now)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Partial update; `password_hash` is already hashed by the caller
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    name: Option<&str>,
    email: Option<&str>,
    password_hash: Option<&str>,
    role: Option<UserRole>,
) -> RepoResult<User> {
    let rows = sqlx::query(
        "UPDATE users SET name = COALESCE(?1, name), email = COALESCE(?2, email), password_hash = COALESCE(?3, password_hash), role = COALESCE(?4, role) WHERE id = ?5",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn pool() -> SqlitePool {
        DbService::in_memory().await.unwrap().pool
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = pool().await;
        let user = create(&pool, "Ana", "ana@example.com", "hash", UserRole::Kitchen)
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::Kitchen);

        let found = find_by_email(&pool, "ana@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);

        let creds = find_credentials_by_email(&pool, "ana@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.password_hash, "hash");
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let pool = pool().await;
        create(&pool, "Ana", "ana@example.com", "h", UserRole::Staff)
            .await
            .unwrap();
        let err = create(&pool, "Other", "ana@example.com", "h", UserRole::Staff)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
        assert!(email_taken(&pool, "ana@example.com", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_email_taken_ignores_self() {
        let pool = pool().await;
        let user = create(&pool, "Ana", "ana@example.com", "h", UserRole::Staff)
            .await
            .unwrap();
        assert!(!email_taken(&pool, "ana@example.com", Some(user.id)).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_partial() {
        let pool = pool().await;
        let user = create(&pool, "Ana", "ana@example.com", "h", UserRole::Staff)
            .await
            .unwrap();
        let updated = update(&pool, user.id, None, None, None, Some(UserRole::Server))
            .await
            .unwrap();
        assert_eq!(updated.name, "Ana");
        assert_eq!(updated.role, UserRole::Server);

        let err = update(&pool, 999, Some("x"), None, None, None).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_ordered_by_name() {
        let pool = pool().await;
        create(&pool, "Zoe", "z@example.com", "h", UserRole::Staff).await.unwrap();
        create(&pool, "Abe", "a@example.com", "h", UserRole::Admin).await.unwrap();
        let users = find_all(&pool).await.unwrap();
        assert_eq!(users[0].name, "Abe");
        assert!(exists_with_role(&pool, UserRole::Admin).await.unwrap());
        assert!(!exists_with_role(&pool, UserRole::Kitchen).await.unwrap());
    }
}
