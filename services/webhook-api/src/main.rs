//! Subhook Webhook API binary
//!
//! Loads configuration from the environment, connects to Postgres and serves
//! the Stripe webhook endpoint until SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use subhook_billing_core::{StripeProvider, SubscriptionSync, WebhookService};
use subhook_db::Repositories;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use webhook_api::{build_router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("webhook_api=debug".parse()?)
                .add_directive("subhook_billing_core=debug".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Subhook Webhook API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        metrics_enabled = config.metrics_enabled,
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Create database pool
    let pool = subhook_db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    if config.run_migrations {
        subhook_db::run_migrations(&pool).await?;
    }

    // Wire the subscription store behind the webhook service
    let provider = Arc::new(StripeProvider::new(&config.billing));
    let store = Arc::new(SubscriptionSync::from_repositories(
        provider,
        Repositories::new(pool),
    ));
    let webhooks = WebhookService::from_config(&config.billing, store);

    let state = AppState::new(webhooks, config.clone());
    let app = build_router(state, metrics_handle);

    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    run_http_server(app, http_addr).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn run_http_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Webhook handling is one DB round-trip plus one Stripe call
    let webhook_latency_buckets = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("webhook_processing_duration_seconds".to_string()),
            webhook_latency_buckets,
        )?
        .install_recorder()?;

    metrics::describe_counter!(
        "webhooks_received_total",
        "Total webhook deliveries by outcome"
    );
    metrics::describe_histogram!(
        "webhook_processing_duration_seconds",
        "Webhook handling latency in seconds"
    );

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
