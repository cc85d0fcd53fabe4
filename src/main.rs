use chirpy::configuration::{get_configuration, TelemetrySettings};
use chirpy::startup::run;
use chirpy::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let configuration = get_configuration();

    // Logging must be up before a configuration error can be reported
    match &configuration {
        Ok(config) => init_telemetry(&config.telemetry),
        Err(_) => init_telemetry(&TelemetrySettings::default()),
    }

    let configuration = match configuration {
        Ok(config) => {
            tracing::info!(platform = ?config.application.platform, "Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read configuration");
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    tracing::info!("Attempting to connect to database");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create connection pool");
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to run database migrations");
            std::io::Error::new(std::io::ErrorKind::Other, "Database migration error")
        })?;

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!(address = %address, "Server listening");

    let server = run(listener, pool, configuration.application, configuration.auth)?;
    server.await
}
