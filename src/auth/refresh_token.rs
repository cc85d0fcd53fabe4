/// Refresh Token Management
///
/// Refresh tokens are 32 random bytes from the OS CSPRNG, hex-encoded. The
/// server keeps one record per token with its owner, creation time, expiry
/// and an optional revocation time. A token is usable only while it is
/// neither revoked nor expired; refreshing does not rotate it.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Uuid;

use crate::auth::jwt::make_jwt;
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};

const REFRESH_TOKEN_BYTES: usize = 32;

/// Server-side state of a refresh token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Lifecycle state derived from the record's timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    Revoked,
    Expired,
}

impl RefreshTokenRecord {
    pub fn new(user_id: Uuid, created_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            user_id,
            created_at,
            expires_at: created_at + ttl,
            revoked_at: None,
        }
    }

    /// Revocation wins over expiry.
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.revoked_at.is_some() {
            RefreshTokenState::Revoked
        } else if now >= self.expires_at {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }
}

/// Persistence for refresh tokens.
///
/// Implementations must make a revoke visible to every lookup that starts
/// after the revoke call returns.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn create_refresh_token(
        &self,
        token: &str,
        record: &RefreshTokenRecord,
    ) -> Result<(), AppError>;

    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError>;

    /// Marks the token revoked at `revoked_at`. A token that is already
    /// revoked keeps its original timestamp; unknown tokens are ignored.
    async fn revoke_refresh_token(
        &self,
        token: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<(), AppError>;
}

/// Generate a new refresh token (64 lowercase hex characters)
pub fn make_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Create and persist a refresh token for `user_id`. Returns the plaintext
/// token, which is handed to the client.
pub async fn issue_refresh_token<S>(
    store: &S,
    user_id: Uuid,
    ttl: Duration,
) -> Result<String, AppError>
where
    S: RefreshTokenStore + ?Sized,
{
    let token = make_refresh_token();
    let record = RefreshTokenRecord::new(user_id, Utc::now(), ttl);
    store.create_refresh_token(&token, &record).await?;

    tracing::debug!(user_id = %user_id, expires_at = %record.expires_at, "Refresh token issued");
    Ok(token)
}

/// Exchange a refresh token for a new access token.
///
/// # Errors
/// - `RefreshTokenNotFound` if the store has no record of the token
/// - `RefreshTokenRevoked` if it was revoked (checked before expiry)
/// - `RefreshTokenExpired` if `now >= expires_at`
pub async fn refresh_access_token<S>(
    store: &S,
    token: &str,
    settings: &AuthSettings,
) -> Result<String, AppError>
where
    S: RefreshTokenStore + ?Sized,
{
    let record = store
        .get_refresh_token(token)
        .await?
        .ok_or(AuthError::RefreshTokenNotFound)?;

    match record.state_at(Utc::now()) {
        RefreshTokenState::Revoked => {
            tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
            Err(AuthError::RefreshTokenRevoked.into())
        }
        RefreshTokenState::Expired => {
            tracing::info!(user_id = %record.user_id, "Refresh token expired");
            Err(AuthError::RefreshTokenExpired.into())
        }
        RefreshTokenState::Active => {
            Ok(make_jwt(record.user_id, &settings.secret, settings.access_token_ttl())?)
        }
    }
}

/// Permanently revoke a refresh token.
pub async fn revoke_refresh_token<S>(store: &S, token: &str) -> Result<(), AppError>
where
    S: RefreshTokenStore + ?Sized,
{
    store.revoke_refresh_token(token, Utc::now()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::validate_jwt;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryStore {
        records: Mutex<HashMap<String, RefreshTokenRecord>>,
    }

    impl InMemoryStore {
        fn insert(&self, token: &str, record: RefreshTokenRecord) {
            self.records.lock().unwrap().insert(token.to_string(), record);
        }
    }

    #[async_trait]
    impl RefreshTokenStore for InMemoryStore {
        async fn create_refresh_token(
            &self,
            token: &str,
            record: &RefreshTokenRecord,
        ) -> Result<(), AppError> {
            self.insert(token, record.clone());
            Ok(())
        }

        async fn get_refresh_token(
            &self,
            token: &str,
        ) -> Result<Option<RefreshTokenRecord>, AppError> {
            Ok(self.records.lock().unwrap().get(token).cloned())
        }

        async fn revoke_refresh_token(
            &self,
            token: &str,
            revoked_at: DateTime<Utc>,
        ) -> Result<(), AppError> {
            if let Some(record) = self.records.lock().unwrap().get_mut(token) {
                record.revoked_at.get_or_insert(revoked_at);
            }
            Ok(())
        }
    }

    fn settings() -> AuthSettings {
        AuthSettings {
            secret: "test-secret".to_string(),
            polka_key: "polka".to_string(),
            access_token_ttl_seconds: 3600,
            refresh_token_ttl_days: 60,
            bcrypt_cost: 4,
        }
    }

    fn assert_auth_error(result: Result<String, AppError>, expected: AuthError) {
        match result {
            Err(AppError::Auth(err)) => assert_eq!(err, expected),
            other => panic!("expected {:?}, got {:?}", expected, other),
        }
    }

    #[test]
    fn test_make_refresh_token() {
        let token = make_refresh_token();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(token, make_refresh_token());
    }

    #[test]
    fn test_state_precedence() {
        let now = Utc::now();
        let mut record = RefreshTokenRecord::new(Uuid::new_v4(), now - Duration::days(61), Duration::days(60));
        assert_eq!(record.state_at(now), RefreshTokenState::Expired);

        record.revoked_at = Some(now - Duration::days(30));
        assert_eq!(record.state_at(now), RefreshTokenState::Revoked);
    }

    #[test]
    fn test_state_expires_exactly_at_expiry() {
        let created = Utc::now();
        let record = RefreshTokenRecord::new(Uuid::new_v4(), created, Duration::days(60));

        assert_eq!(record.state_at(created), RefreshTokenState::Active);
        assert_eq!(record.state_at(record.expires_at), RefreshTokenState::Expired);
    }

    #[tokio::test]
    async fn test_issued_token_refreshes_to_owner() {
        let store = InMemoryStore::default();
        let settings = settings();
        let user_id = Uuid::new_v4();

        let token = issue_refresh_token(&store, user_id, settings.refresh_token_ttl())
            .await
            .unwrap();
        let record = store.get_refresh_token(&token).await.unwrap().unwrap();
        assert_eq!(record.expires_at - record.created_at, Duration::days(60));
        assert!(record.revoked_at.is_none());

        let access_token = refresh_access_token(&store, &token, &settings).await.unwrap();
        assert_eq!(validate_jwt(&access_token, &settings.secret).unwrap(), user_id);

        // Not rotated: the same refresh token keeps working.
        assert!(refresh_access_token(&store, &token, &settings).await.is_ok());
    }

    #[tokio::test]
    async fn test_revoked_token_is_rejected() {
        let store = InMemoryStore::default();
        let settings = settings();

        let token = issue_refresh_token(&store, Uuid::new_v4(), settings.refresh_token_ttl())
            .await
            .unwrap();
        revoke_refresh_token(&store, &token).await.unwrap();

        assert_auth_error(
            refresh_access_token(&store, &token, &settings).await,
            AuthError::RefreshTokenRevoked,
        );
    }

    #[tokio::test]
    async fn test_revocation_keeps_first_timestamp() {
        let store = InMemoryStore::default();
        let token = issue_refresh_token(&store, Uuid::new_v4(), Duration::days(60))
            .await
            .unwrap();

        revoke_refresh_token(&store, &token).await.unwrap();
        let first = store.get_refresh_token(&token).await.unwrap().unwrap().revoked_at;
        revoke_refresh_token(&store, &token).await.unwrap();
        let second = store.get_refresh_token(&token).await.unwrap().unwrap().revoked_at;

        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected_without_revocation() {
        let store = InMemoryStore::default();
        let token = make_refresh_token();
        store.insert(
            &token,
            RefreshTokenRecord::new(
                Uuid::new_v4(),
                Utc::now() - Duration::days(61),
                Duration::days(60),
            ),
        );

        assert_auth_error(
            refresh_access_token(&store, &token, &settings()).await,
            AuthError::RefreshTokenExpired,
        );
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let store = InMemoryStore::default();

        assert_auth_error(
            refresh_access_token(&store, &make_refresh_token(), &settings()).await,
            AuthError::RefreshTokenNotFound,
        );
    }

    #[tokio::test]
    async fn test_revoking_unknown_token_is_not_an_error() {
        let store = InMemoryStore::default();
        assert!(revoke_refresh_token(&store, "missing").await.is_ok());
    }
}
