/// User Routes
///
/// Registration and credential updates. Password hashing is CPU-bound and
/// runs on actix's blocking pool.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{hash_password, AuthenticatedUser};
use crate::configuration::AuthSettings;
use crate::db::{users, UserRecord};
use crate::error::AppError;
use crate::validators::{is_valid_email, validate_password};

/// Body of `POST /api/users`, `PUT /api/users` and `POST /api/login`
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user; never includes the password hash
#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// Validates the credentials and returns `(email, password_hash)`.
async fn prepare_credentials(
    credentials: CredentialsRequest,
    cost: u32,
) -> Result<(String, String), AppError> {
    let email = is_valid_email(&credentials.email)?;
    validate_password(&credentials.password)?;

    let password = credentials.password;
    let password_hash = web::block(move || hash_password(&password, cost)).await??;

    Ok((email, password_hash))
}

/// POST /api/users
///
/// # Errors
/// - 400: invalid email or empty password
/// - 409: email already registered
pub async fn create_user(
    form: web::Json<CredentialsRequest>,
    pool: web::Data<PgPool>,
    auth: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let (email, password_hash) = prepare_credentials(form.into_inner(), auth.bcrypt_cost).await?;

    let user = users::create_user(pool.get_ref(), &email, &password_hash).await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// PUT /api/users
///
/// Replaces the authenticated user's email and password.
///
/// # Errors
/// - 401: missing or invalid access token
/// - 400: invalid email or empty password
/// - 409: email belongs to another user
pub async fn update_user(
    user: AuthenticatedUser,
    form: web::Json<CredentialsRequest>,
    pool: web::Data<PgPool>,
    auth: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let (email, password_hash) = prepare_credentials(form.into_inner(), auth.bcrypt_cost).await?;

    let updated =
        users::update_user_credentials(pool.get_ref(), user.user_id, &email, &password_hash)
            .await?;

    tracing::info!(user_id = %updated.id, "User credentials updated");
    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}
