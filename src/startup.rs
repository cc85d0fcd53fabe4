use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;

use crate::auth::DummyPasswordHash;
use crate::configuration::{ApplicationSettings, AuthSettings};
use crate::error::{AppError, ValidationError};
use crate::metrics::HitCounter;
use crate::middleware::{HitCounterMiddleware, RequestLogger};
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login, metrics,
    polka_webhook, refresh, reset, revoke, update_user,
};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    application: ApplicationSettings,
    auth: AuthSettings,
) -> Result<Server, std::io::Error> {
    let dummy_hash = DummyPasswordHash::new(auth.bcrypt_cost)
        .map(web::Data::new)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let connection = web::Data::new(connection);
    let auth = web::Data::new(auth);
    let static_dir = application.static_dir.clone();
    let application = web::Data::new(application);
    let hits = web::Data::new(HitCounter::new());

    let server = HttpServer::new(move || {
        // Malformed JSON bodies and query strings become 400s in the API error format
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            AppError::from(ValidationError::InvalidFormat(err.to_string())).into()
        });
        let query_config = web::QueryConfig::default().error_handler(|err, _req| {
            AppError::from(ValidationError::InvalidFormat(err.to_string())).into()
        });

        App::new()
            .wrap(RequestLogger)
            .app_data(connection.clone())
            .app_data(auth.clone())
            .app_data(dummy_hash.clone())
            .app_data(application.clone())
            .app_data(hits.clone())
            .app_data(json_config)
            .app_data(query_config)
            .route("/api/healthz", web::get().to(health_check))
            .route("/admin/metrics", web::get().to(metrics))
            .route("/admin/reset", web::post().to(reset))
            .service(
                web::resource("/api/users")
                    .route(web::post().to(create_user))
                    .route(web::put().to(update_user)),
            )
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))
            .service(
                web::resource("/api/chirps")
                    .route(web::post().to(create_chirp))
                    .route(web::get().to(list_chirps)),
            )
            .service(
                web::resource("/api/chirps/{chirp_id}")
                    .route(web::get().to(get_chirp))
                    .route(web::delete().to(delete_chirp)),
            )
            .route("/api/polka/webhooks", web::post().to(polka_webhook))
            // Static files are counted by the hit counter; nothing else is
            .service(
                web::scope("/app")
                    .wrap(HitCounterMiddleware::new(hits.clone()))
                    .service(fs::Files::new("", &static_dir).index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
