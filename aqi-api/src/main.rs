use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aqi_api::{
    build_app, cache,
    config::{Args, Config},
    fetcher::PurpleAirClient,
    refresh::RefreshCycle,
    schedule::{Schedule, run_scheduler},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_result = dotenv::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aqi_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = dotenv_result {
        tracing::debug!(%err, "no .env file loaded");
    }

    let config = Config::try_from(Args::parse()).context("invalid configuration")?;
    tracing::debug!(?config, "configuration loaded");

    let (writer, reader) = cache::shared(config.stale_after());
    let client = PurpleAirClient::new(config.provider_url.clone(), config.fetch_timeout)
        .context("failed to build provider client")?;
    let cycle = Arc::new(RefreshCycle::new(
        client,
        config.sensor_id.clone(),
        config.api_key.clone(),
        writer,
        config.fetch_timeout,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let schedule = Schedule::aligned_to_next_hour(Utc::now(), config.refresh_interval);
    let scheduler = tokio::spawn(run_scheduler(
        cycle,
        schedule,
        shutdown_rx,
        config.fetch_timeout,
    ));

    let app = build_app(reader, config.cors);
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    tracing::info!("AQI API server starting on http://{}", config.listen_addr);
    tracing::info!("Swagger UI available at http://{}/docs", config.listen_addr);
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /aqi        - Latest AQI value");
    tracing::info!("  GET  /aqi/status - Cache status");
    tracing::info!("  GET  /health     - Health check");
    tracing::info!("  GET  /docs       - Swagger UI");
    tracing::info!("");
    tracing::info!("Configuration:");
    tracing::info!("  Sensor: {}", config.sensor_id);
    tracing::info!("  Provider: {}", config.provider_url);
    tracing::info!("  Refresh interval: {:?}", config.refresh_interval);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error");

    let _ = shutdown_tx.send(true);
    if let Err(err) = scheduler.await {
        tracing::error!(%err, "scheduler task failed");
    }

    tracing::info!("shut down");
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for Ctrl-C");
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
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("got shutdown signal");
}
