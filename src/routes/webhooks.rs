/// Polka payment webhooks
///
/// Polka authenticates with `Authorization: ApiKey <key>`. Only
/// `user.upgraded` changes anything; other events are acknowledged so Polka
/// stops retrying them.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::WebhookCaller;
use crate::db::users;
use crate::error::{AppError, ValidationError};

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct PolkaEvent {
    pub event: String,
    #[serde(default)]
    pub data: PolkaEventData,
}

#[derive(Deserialize, Default)]
pub struct PolkaEventData {
    pub user_id: Option<Uuid>,
}

/// POST /api/polka/webhooks
///
/// # Errors
/// - 401: missing or wrong API key
/// - 400: `user.upgraded` without a user id
/// - 404: user does not exist
pub async fn polka_webhook(
    _caller: WebhookCaller,
    payload: web::Json<PolkaEvent>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    if payload.event != USER_UPGRADED {
        tracing::debug!(event = %payload.event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = payload
        .data
        .user_id
        .ok_or_else(|| ValidationError::EmptyField("data.user_id".to_string()))?;

    users::upgrade_to_chirpy_red(pool.get_ref(), user_id).await?;

    tracing::info!(user_id = %user_id, "User upgraded to Chirpy Red");
    Ok(HttpResponse::NoContent().finish())
}
