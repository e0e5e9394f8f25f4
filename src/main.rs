use adagen::{
    config::Config,
    handlers::*,
    services::*,
};
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting adagen API v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {:?}", config.environment);
    tracing::info!("Receiving address: {}", config.receiving_address);

    // Initialize services
    let ledger = Arc::new(PaymentLedger::new());
    let pricing = Arc::new(PricingService::new(
        config.coingecko_base_url.clone(),
        config.base_cost_ada,
        config.per_second_cost_usd,
    )?);
    let chain = Arc::new(BlockfrostClient::new(
        config.blockfrost_base_url.clone(),
        config.blockfrost_project_id.clone(),
    )?);
    let verifier = Arc::new(PaymentVerifier::new(
        chain.clone(),
        config.receiving_address.clone(),
    ));
    let video = Arc::new(VideoApiClient::new(
        config.video_api_base_url.clone(),
        config.video_api_key.clone(),
        config.video_model.clone(),
    )?);

    // Sweep stale payment claims in the background
    ledger.spawn_sweeper(
        Duration::from_secs(config.ledger_sweep_interval_secs),
        Duration::from_secs(config.ledger_max_age_secs),
    );

    // Build application state
    let state = AppState {
        ledger,
        pricing,
        verifier,
        video,
        chain,
        started_at: Instant::now(),
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/price", get(get_price))
        .route("/api/payments", post(submit_claim))
        .route("/api/payments/:tx_hash", get(check_payment))
        .route("/api/videos", post(start_generation))
        .route("/api/videos/:id/status", get(job_status))
        .route("/api/videos/:id/content", get(download_content))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::default().include_headers(true)),
                )
                .layer(CorsLayer::permissive()),
        );

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Price quotes: http://{}/api/price", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl+c");
    tracing::info!("Shutting down gracefully...");
}
