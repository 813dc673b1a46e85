use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::settings::SettingsConfig;
use crate::observability::metrics::get_metrics;
use crate::observability::routes::MetricsState;

/// Start the metrics HTTP server when metrics are enabled. Stops on cancellation.
pub async fn start(settings_config: &SettingsConfig, cancel: CancellationToken) -> Result<()> {
    if !settings_config.metrics.is_enabled {
        info!("metrics disabled, http server not started");
        return Ok(());
    }

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding metrics server to {}", bind_addr))?;
    serve(listener, settings_config, cancel).await
}

pub async fn serve(listener: TcpListener, settings_config: &SettingsConfig, cancel: CancellationToken) -> Result<()> {
    let metrics = get_metrics();
    let app = MetricsState::new(metrics.registry.clone()).router(&settings_config.metrics);

    info!(
        "metrics server listening on {}{}",
        listener.local_addr()?,
        settings_config.metrics.path
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;
    info!("metrics server stopped");
    Ok(())
}
