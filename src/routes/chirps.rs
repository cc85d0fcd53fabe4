use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::db::{chirps, SortOrder};
use crate::error::{AppError, DatabaseError, ValidationError};
use crate::validators::validate_chirp_body;

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<Uuid>,
    #[serde(default)]
    pub sort: SortOrder,
}

fn parse_chirp_id(raw: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidFormat("chirp_id".to_string()))
}

/// POST /api/chirps
pub async fn create_chirp(
    user: AuthenticatedUser,
    form: web::Json<CreateChirpRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let body = validate_chirp_body(&form.body)?;

    let chirp = chirps::create_chirp(pool.get_ref(), user.user_id, &body).await?;

    tracing::info!(chirp_id = %chirp.id, user_id = %user.user_id, "Chirp created");
    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps?author_id=<uuid>&sort=asc|desc
pub async fn list_chirps(
    query: web::Query<ListChirpsQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let chirps = chirps::list_chirps(pool.get_ref(), query.author_id, query.sort).await?;
    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;

    let chirp = chirps::get_chirp(pool.get_ref(), chirp_id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("chirp".to_string()))?;

    Ok(HttpResponse::Ok().json(chirp))
}

/// DELETE /api/chirps/{chirp_id}
///
/// Only the author may delete a chirp; anyone else gets 403.
pub async fn delete_chirp(
    user: AuthenticatedUser,
    path: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;

    let chirp = chirps::get_chirp(pool.get_ref(), chirp_id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("chirp".to_string()))?;

    user.ensure_owns(chirp.user_id)?;

    chirps::delete_chirp(pool.get_ref(), chirp_id).await?;

    tracing::info!(chirp_id = %chirp_id, user_id = %user.user_id, "Chirp deleted");
    Ok(HttpResponse::NoContent().finish())
}
