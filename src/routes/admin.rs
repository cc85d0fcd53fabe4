/// Operational endpoints: file server metrics and the development reset.

use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::configuration::{ApplicationSettings, Platform};
use crate::db::users;
use crate::error::{AppError, AuthError};
use crate::metrics::HitCounter;

fn metrics_page(hits: u64) -> String {
    format!(
        r#"<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>
"#,
        hits
    )
}

/// GET /admin/metrics
pub async fn metrics(counter: web::Data<HitCounter>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(metrics_page(counter.get()))
}

/// POST /admin/reset
///
/// Zeroes the hit counter and deletes every user (and, by cascade, every
/// chirp and refresh token). Refused with 403 outside the `dev` platform.
pub async fn reset(
    application: web::Data<ApplicationSettings>,
    counter: web::Data<HitCounter>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    if application.platform != Platform::Dev {
        tracing::warn!(platform = ?application.platform, "Reset refused outside the dev platform");
        return Err(AuthError::Forbidden.into());
    }

    counter.reset();
    let deleted = users::delete_all_users(pool.get_ref()).await?;
    tracing::info!(deleted_users = deleted, "Development reset completed");

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(format!(
            "Reset website hits to {}\nand deleted all users from database",
            counter.get()
        )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_page_contains_count() {
        let page = metrics_page(42);
        assert!(page.contains("Chirpy has been visited 42 times!"));
        assert!(page.contains("<h1>Welcome, Chirpy Admin</h1>"));
    }
}
