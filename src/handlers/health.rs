use crate::handlers::AppState;
use crate::models::HealthStatus;
use axum::extract::State;
use axum::Json;
use chrono::Utc;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let chain_ok = state.chain.health().await;
    let oracle_ok = state.pricing.ping().await;

    let status = if chain_ok && oracle_ok {
        "healthy"
    } else if chain_ok || oracle_ok {
        "degraded"
    } else {
        "unhealthy"
    };

    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        chain_indexer: chain_ok,
        price_oracle: oracle_ok,
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        BlockfrostClient, PaymentLedger, PaymentVerifier, PricingService, VideoApiClient,
    };
    use std::sync::Arc;
    use std::time::Instant;

    fn test_state(upstream_url: &str) -> AppState {
        let chain = Arc::new(
            BlockfrostClient::new(upstream_url.to_string(), "test-project".to_string()).unwrap(),
        );
        AppState {
            ledger: Arc::new(PaymentLedger::new()),
            pricing: Arc::new(PricingService::new(upstream_url.to_string(), 1.0, 0.10).unwrap()),
            verifier: Arc::new(PaymentVerifier::new(chain.clone(), "addr1x".to_string())),
            video: Arc::new(
                VideoApiClient::new(
                    upstream_url.to_string(),
                    "test-key".to_string(),
                    "sora-2".to_string(),
                )
                .unwrap(),
            ),
            chain,
            started_at: Instant::now(),
        }
    }

    #[tokio::test]
    async fn healthy_when_both_upstreams_answer() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"is_healthy":true}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/ping")
            .with_status(200)
            .with_body(r#"{"gecko_says":"(V3) To the Moon!"}"#)
            .create_async()
            .await;

        let Json(health) = health_check(State(test_state(&server.url()))).await;

        assert_eq!(health.status, "healthy");
        assert!(health.chain_indexer);
        assert!(health.price_oracle);
    }

    #[tokio::test]
    async fn degraded_when_the_oracle_is_down() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"is_healthy":true}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/ping")
            .with_status(500)
            .create_async()
            .await;

        let Json(health) = health_check(State(test_state(&server.url()))).await;

        assert_eq!(health.status, "degraded");
        assert!(health.chain_indexer);
        assert!(!health.price_oracle);
    }
}
