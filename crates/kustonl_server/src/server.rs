//! Running the HTTP service.

use crate::{AppState, NlQueryPipeline, Settings, create_router};
use kustonl_error::{KustoNlResult, ServerError, ServerErrorKind};
use tracing::{info, instrument, warn};

/// Bind the configured address and serve until Ctrl-C.
#[instrument(skip_all, fields(bind = %settings.server.bind))]
pub async fn serve(settings: &Settings) -> KustoNlResult<()> {
    let pipeline = NlQueryPipeline::from_settings(settings);
    let app = create_router(AppState::new(pipeline, settings.server.debug_query.as_str()));

    let listener = tokio::net::TcpListener::bind(settings.server.bind)
        .await
        .map_err(|e| {
            ServerError::new(ServerErrorKind::Bind(format!(
                "{}: {}",
                settings.server.bind, e
            )))
        })?;

    info!(
        cluster = %settings.cluster.kusto_uri,
        database = %settings.cluster.database_name,
        "kustonl listening on http://{}",
        settings.server.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::Serve(e.to_string())))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
