/// Postgres-backed refresh token store
///
/// Tokens are stored as their SHA-256 digest, so a leaked table cannot be
/// replayed against the refresh endpoint. Every operation is a single-row
/// statement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{RefreshTokenRecord, RefreshTokenStore};
use crate::error::{AppError, DatabaseError};

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl RefreshTokenStore for PgPool {
    async fn create_refresh_token(
        &self,
        token: &str,
        record: &RefreshTokenRecord,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token_hash, user_id, created_at, updated_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $3, $4, $5)
            "#,
        )
        .bind(hash_token(token))
        .bind(record.user_id)
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.revoked_at)
        .execute(self)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }

    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError> {
        let row = sqlx::query_as::<_, (Uuid, DateTime<Utc>, DateTime<Utc>, Option<DateTime<Utc>>)>(
            r#"
            SELECT user_id, created_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(hash_token(token))
        .fetch_optional(self)
        .await
        .map_err(DatabaseError::from)?;

        Ok(row.map(|(user_id, created_at, expires_at, revoked_at)| RefreshTokenRecord {
            user_id,
            created_at,
            expires_at,
            revoked_at,
        }))
    }

    async fn revoke_refresh_token(
        &self,
        token: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $1, updated_at = $1
            WHERE token_hash = $2 AND revoked_at IS NULL
            "#,
        )
        .bind(revoked_at)
        .bind(hash_token(token))
        .execute(self)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::make_refresh_token;

    #[test]
    fn test_token_hashing() {
        let token = make_refresh_token();
        let hash1 = hash_token(&token);
        let hash2 = hash_token(&token);

        assert_eq!(hash1, hash2);
        assert_ne!(token, hash1);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_tokens_different_hashes() {
        assert_ne!(hash_token(&make_refresh_token()), hash_token(&make_refresh_token()));
    }
}
