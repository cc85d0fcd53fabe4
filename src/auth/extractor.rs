/// Request extractors for protected handlers.
///
/// List the extractor before any body extractor in a handler's arguments:
/// actix-web resolves arguments in order, so a request with bad credentials
/// is rejected before its body is read and before any mutation happens.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::extract::{get_api_key, get_bearer_token};
use crate::auth::jwt::validate_jwt;
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};

/// The principal behind a valid `Authorization: Bearer <access token>` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl AuthenticatedUser {
    /// Fails with `Forbidden` unless this user is `owner_id`.
    pub fn ensure_owns(&self, owner_id: Uuid) -> Result<(), AuthError> {
        if self.user_id == owner_id {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }

    fn from_http_request(req: &HttpRequest) -> Result<Self, AppError> {
        let settings = auth_settings(req)?;
        let token = get_bearer_token(req.headers())?;
        let user_id = validate_jwt(&token, &settings.secret)?;
        Ok(Self { user_id })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_http_request(req))
    }
}

/// A webhook request carrying the configured `Authorization: ApiKey <key>`
#[derive(Debug, Clone, Copy)]
pub struct WebhookCaller;

impl WebhookCaller {
    fn from_http_request(req: &HttpRequest) -> Result<Self, AppError> {
        let settings = auth_settings(req)?;
        let key = get_api_key(req.headers())?;
        if key != settings.polka_key {
            return Err(AuthError::InvalidApiKey.into());
        }
        Ok(Self)
    }
}

impl FromRequest for WebhookCaller {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_http_request(req))
    }
}

fn auth_settings(req: &HttpRequest) -> Result<&AuthSettings, AppError> {
    req.app_data::<web::Data<AuthSettings>>()
        .map(|data| data.get_ref())
        .ok_or_else(|| AppError::Internal("AuthSettings not registered as app data".to_string()))
}
