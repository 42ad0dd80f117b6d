//! Tracing subscriber setup.

use crate::LoggingSettings;
use kustonl_error::{ServerError, ServerErrorKind};
use tracing_subscriber::{
    EnvFilter,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over [`LoggingSettings::level`]. Call once,
/// at process start.
pub fn init_tracing(settings: &LoggingSettings) -> Result<(), ServerError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| {
            ServerError::new(ServerErrorKind::Configuration(format!(
                "Invalid log filter '{}': {}",
                settings.level, e
            )))
        })?;

    let fmt_layer = if settings.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| {
            ServerError::new(ServerErrorKind::Configuration(format!(
                "Tracing already initialised: {}",
                e
            )))
        })
}
