use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct ChirpRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

/// Listing order by `created_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

pub async fn create_chirp(
    pool: &PgPool,
    user_id: Uuid,
    body: &str,
) -> Result<ChirpRecord, DatabaseError> {
    let chirp = sqlx::query_as::<_, ChirpRecord>(
        r#"
        INSERT INTO chirps (id, created_at, updated_at, body, user_id)
        VALUES ($1, $2, $2, $3, $4)
        RETURNING id, created_at, updated_at, body, user_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(Utc::now())
    .bind(body)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(chirp)
}

pub async fn get_chirp(pool: &PgPool, chirp_id: Uuid) -> Result<Option<ChirpRecord>, DatabaseError> {
    let chirp = sqlx::query_as::<_, ChirpRecord>(
        "SELECT id, created_at, updated_at, body, user_id FROM chirps WHERE id = $1",
    )
    .bind(chirp_id)
    .fetch_optional(pool)
    .await?;

    Ok(chirp)
}

/// All chirps, or only those by `author_id`, ordered by creation time.
pub async fn list_chirps(
    pool: &PgPool,
    author_id: Option<Uuid>,
    order: SortOrder,
) -> Result<Vec<ChirpRecord>, DatabaseError> {
    let query = match order {
        SortOrder::Asc => {
            r#"
            SELECT id, created_at, updated_at, body, user_id
            FROM chirps
            WHERE $1::uuid IS NULL OR user_id = $1
            ORDER BY created_at ASC
            "#
        }
        SortOrder::Desc => {
            r#"
            SELECT id, created_at, updated_at, body, user_id
            FROM chirps
            WHERE $1::uuid IS NULL OR user_id = $1
            ORDER BY created_at DESC
            "#
        }
    };

    let chirps = sqlx::query_as::<_, ChirpRecord>(query)
        .bind(author_id)
        .fetch_all(pool)
        .await?;

    Ok(chirps)
}

pub async fn delete_chirp(pool: &PgPool, chirp_id: Uuid) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM chirps WHERE id = $1")
        .bind(chirp_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_parsing() {
        let asc: SortOrder = serde_json::from_str("\"asc\"").unwrap();
        let desc: SortOrder = serde_json::from_str("\"desc\"").unwrap();

        assert_eq!(asc, SortOrder::Asc);
        assert_eq!(desc, SortOrder::Desc);
        assert_eq!(SortOrder::default(), SortOrder::Asc);
        assert!(serde_json::from_str::<SortOrder>("\"sideways\"").is_err());
    }
}
