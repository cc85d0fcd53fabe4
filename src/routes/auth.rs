/// Authentication Routes
///
/// Login, access token refresh and refresh token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;
use sqlx::PgPool;

use crate::auth::{
    get_bearer_token, issue_refresh_token, make_jwt, refresh_access_token, revoke_refresh_token,
    verify_login, DummyPasswordHash,
};
use crate::configuration::AuthSettings;
use crate::db::users;
use crate::error::{AppError, AuthError};
use crate::routes::users::{CredentialsRequest, UserResponse};

#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/login
///
/// Returns the user with a 1 hour access token and a 60 day refresh token.
///
/// # Errors
/// - 401: unknown email or wrong password (indistinguishable)
pub async fn login(
    form: web::Json<CredentialsRequest>,
    pool: web::Data<PgPool>,
    auth: web::Data<AuthSettings>,
    dummy_hash: web::Data<DummyPasswordHash>,
) -> Result<HttpResponse, AppError> {
    let CredentialsRequest { email, password } = form.into_inner();

    let user = users::get_user_by_email(pool.get_ref(), email.trim()).await?;

    // An unknown email still costs one bcrypt verification
    let stored_hash = user.as_ref().map(|u| u.hashed_password.clone());
    let dummy = dummy_hash.into_inner();
    web::block(move || verify_login(&password, stored_hash.as_deref(), &dummy)).await??;

    let user = user.ok_or(AuthError::InvalidCredentials)?;

    let token = make_jwt(user.id, &auth.secret, auth.access_token_ttl())?;
    let refresh_token = issue_refresh_token(pool.get_ref(), user.id, auth.refresh_token_ttl()).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: user.into(),
        token,
        refresh_token,
    }))
}

/// POST /api/refresh
///
/// Exchanges `Authorization: Bearer <refresh token>` for a new access token.
/// The refresh token itself is left unchanged.
///
/// # Errors
/// - 401: header missing/malformed, or token unknown, revoked or expired
pub async fn refresh(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    auth: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = get_bearer_token(req.headers())?;

    let token = refresh_access_token(pool.get_ref(), &refresh_token, auth.get_ref()).await?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// POST /api/revoke
///
/// Permanently revokes `Authorization: Bearer <refresh token>`.
///
/// # Errors
/// - 401: header missing/malformed
/// - 500: store failure
pub async fn revoke(req: HttpRequest, pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let refresh_token = get_bearer_token(req.headers())?;

    revoke_refresh_token(pool.get_ref(), &refresh_token).await?;

    tracing::info!("Refresh token revoked");
    Ok(HttpResponse::NoContent().finish())
}
