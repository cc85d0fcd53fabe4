use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::configuration::TelemetrySettings;

/// Initialise structured logging.
///
/// `RUST_LOG` takes precedence over the configured level. Output goes to
/// stdout, as JSON lines or in the human-readable format. Must be called once.
pub fn init_telemetry(settings: &TelemetrySettings) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let json_layer = settings
        .json
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stdout).json());
    let pretty_layer = (!settings.json)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stdout));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .init();
}
