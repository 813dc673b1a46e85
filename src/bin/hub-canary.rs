use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::arg;
use clap::command;
use clap::Parser;
use hub_canary::probe::ProbeLoop;
use hub_canary::publisher::{EndpointOrigin, Publisher};
use hub_canary::server;
use hub_canary::utils::config_loader;
use hub_canary::utils::constants::DEFAULT_CONFIG_PATH;
use hub_canary::utils::logging;
use hub_canary::utils::logging::LogLevel;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, start logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config)?;
    logging::run(&service_config, args.log_level.to_owned());

    // -------------------------------
    // 2. Resolve secret and build the publisher
    //
    // a malformed secret stops the process here
    // -------------------------------

    let secret = service_config
        .connection
        .secret
        .resolve()
        .context("resolving connection secret")?;

    let probe_settings = &service_config.settings.probe;
    let client = Client::builder()
        .timeout(Duration::from_millis(probe_settings.http_timeout_ms))
        .build()
        .context("building http client")?;

    let origin = probe_settings
        .endpoint_override
        .clone()
        .map(EndpointOrigin::Base)
        .unwrap_or(EndpointOrigin::Namespace);

    let publisher = Publisher::from_secret(client, &secret, origin)
        .inspect_err(|err| error!("cannot start probe: {}", err))?;

    // -------------------------------
    // 3. Wire termination signals to cancellation
    // -------------------------------

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_shutdown_signal(cancel.clone()));

    // -------------------------------
    // 4. Start metrics server and probe loop
    // -------------------------------

    let metrics_server = server::server::start(&service_config.settings, cancel.clone());

    let mut probe = ProbeLoop::with_interval(
        Arc::new(publisher),
        Duration::from_millis(probe_settings.interval_ms),
    );
    let probe_run = async {
        probe.begin(cancel.clone()).await;
        // the probe only returns once cancelled; make sure the server follows
        cancel.cancel();
        Ok::<(), anyhow::Error>(())
    };

    info!("Service starting...");
    tokio::try_join!(probe_run, metrics_server)?;

    Ok(())
}

async fn cancel_on_shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("ctrl-c received, stopping"),
        () = terminate => info!("SIGTERM received, stopping"),
    }
    cancel.cancel();
}
