use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub hashed_password: String,
    pub is_chirpy_red: bool,
}

pub async fn create_user(
    pool: &PgPool,
    email: &str,
    hashed_password: &str,
) -> Result<UserRecord, DatabaseError> {
    let now = Utc::now();
    let user = sqlx::query_as::<_, UserRecord>(
        r#"
        INSERT INTO users (id, created_at, updated_at, email, hashed_password)
        VALUES ($1, $2, $2, $3, $4)
        RETURNING id, created_at, updated_at, email, hashed_password, is_chirpy_red
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(now)
    .bind(email)
    .bind(hashed_password)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserRecord>, DatabaseError> {
    let user = sqlx::query_as::<_, UserRecord>(
        r#"
        SELECT id, created_at, updated_at, email, hashed_password, is_chirpy_red
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Replaces email and password hash. Errors with `NotFound` if the user no
/// longer exists.
pub async fn update_user_credentials(
    pool: &PgPool,
    user_id: Uuid,
    email: &str,
    hashed_password: &str,
) -> Result<UserRecord, DatabaseError> {
    sqlx::query_as::<_, UserRecord>(
        r#"
        UPDATE users
        SET email = $2, hashed_password = $3, updated_at = $4
        WHERE id = $1
        RETURNING id, created_at, updated_at, email, hashed_password, is_chirpy_red
        "#,
    )
    .bind(user_id)
    .bind(email)
    .bind(hashed_password)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound("user".to_string()))
}

pub async fn upgrade_to_chirpy_red(pool: &PgPool, user_id: Uuid) -> Result<(), DatabaseError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET is_chirpy_red = TRUE, updated_at = $2
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound("user".to_string()));
    }
    Ok(())
}

/// Deletes every user. Chirps and refresh tokens go with them.
pub async fn delete_all_users(pool: &PgPool) -> Result<u64, DatabaseError> {
    let result = sqlx::query("DELETE FROM users").execute(pool).await?;
    Ok(result.rows_affected())
}
