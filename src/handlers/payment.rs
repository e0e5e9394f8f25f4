use crate::error::AdagenError;
use crate::handlers::AppState;
use crate::models::{
    PaymentClaimBody, PaymentClaimResponse, PaymentRecord, PaymentStatusResponse,
    DEFAULT_FRAME_SIZE,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

/// POST /api/payments: record a broadcast transaction as a pending claim.
/// Confirmation happens later, through the payment-check endpoint.
pub async fn submit_claim(
    State(state): State<AppState>,
    body: Result<Json<PaymentClaimBody>, JsonRejection>,
) -> Result<Json<PaymentClaimResponse>, AdagenError> {
    // Unparseable bodies get the standard envelope, not the extractor's
    // plain-text rejection.
    let Json(claim) = body.map_err(|e| AdagenError::InvalidRequest(e.body_text()))?;

    let tx_hash = claim.tx_hash.unwrap_or_default();
    validate_tx_hash(&tx_hash)?;

    let duration = claim.duration.unwrap_or(0);
    if duration == 0 {
        return Err(AdagenError::InvalidRequest(
            "duration must be greater than zero".to_string(),
        ));
    }
    let prompt = match claim.prompt.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => return Err(AdagenError::InvalidRequest("Prompt is required".to_string())),
    };
    let expected_amount = claim.expected_amount.unwrap_or(0);
    if expected_amount == 0 {
        return Err(AdagenError::InvalidRequest(
            "expectedAmount must be greater than zero".to_string(),
        ));
    }

    let record = PaymentRecord::new(
        tx_hash.clone(),
        duration,
        prompt,
        claim
            .size
            .unwrap_or_else(|| DEFAULT_FRAME_SIZE.to_string()),
        claim.image,
        expected_amount,
    );
    state.ledger.record(record).await;

    tracing::info!(
        "Recorded payment claim {} ({} lovelace expected)",
        tx_hash,
        expected_amount
    );

    Ok(Json(PaymentClaimResponse {
        success: true,
        tx_hash,
    }))
}

/// GET /api/payments/:tx_hash: poll one claim's confirmation state. A
/// cached confirmation short-circuits; otherwise the chain is consulted
/// and a confirmed result is applied back to the ledger.
pub async fn check_payment(
    State(state): State<AppState>,
    Path(tx_hash): Path<String>,
) -> Result<Json<PaymentStatusResponse>, AdagenError> {
    validate_tx_hash(&tx_hash)?;

    let record = state.ledger.get(&tx_hash).await;
    if let Some(record) = &record {
        if record.confirmed {
            return Ok(Json(PaymentStatusResponse {
                confirmed: true,
                tx_hash,
                amount: record.verified_lovelace,
                error: None,
            }));
        }
    }

    // Claims we never saw still get an existence-only check; the chain is
    // the source of truth.
    let expected = record.as_ref().map(|r| r.expected_lovelace).unwrap_or(0);
    let verification = state.verifier.verify(&tx_hash, expected).await;

    if verification.confirmed && record.is_some() {
        state
            .ledger
            .mark_confirmed(&tx_hash, verification.amount.unwrap_or_default())
            .await;
    }

    Ok(Json(PaymentStatusResponse::from_verification(
        tx_hash,
        verification,
    )))
}

pub(crate) fn validate_tx_hash(tx_hash: &str) -> Result<(), AdagenError> {
    if tx_hash.len() == 64 && hex::decode(tx_hash).is_ok() {
        Ok(())
    } else {
        Err(AdagenError::InvalidRequest(
            "Transaction hash must be 64 hex characters".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        BlockfrostClient, PaymentLedger, PaymentVerifier, PricingService, VideoApiClient,
    };
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use std::sync::Arc;
    use std::time::Instant;
    use tower::ServiceExt;

    const TX: &str = "8f2e4a1b0c9d7e6f5a4b3c2d1e0f9a8b7c6d5e4f3a2b1c0d9e8f7a6b5c4d3e2f";
    const RECEIVER: &str = "addr1qxtest0receiver";

    fn test_state(upstream_url: &str) -> AppState {
        let chain = Arc::new(
            BlockfrostClient::new(upstream_url.to_string(), "test-project".to_string()).unwrap(),
        );
        AppState {
            ledger: Arc::new(PaymentLedger::new()),
            pricing: Arc::new(PricingService::new(upstream_url.to_string(), 1.0, 0.10).unwrap()),
            verifier: Arc::new(PaymentVerifier::new(chain.clone(), RECEIVER.to_string())),
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

    fn claim() -> PaymentClaimBody {
        PaymentClaimBody {
            tx_hash: Some(TX.to_string()),
            duration: Some(4),
            prompt: Some("  a lighthouse at dawn  ".to_string()),
            size: None,
            image: None,
            expected_amount: Some(1_800_000),
        }
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/api/payments", post(submit_claim))
            .with_state(state)
    }

    fn json_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/payments")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn mock_payment(server: &mut mockito::Server, lovelace: u64) {
        server
            .mock("GET", format!("/txs/{TX}").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"hash":"{TX}","block_height":1}}"#))
            .create_async()
            .await;
        server
            .mock("GET", format!("/txs/{TX}/utxos").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"hash":"{TX}","outputs":[{{"address":"{RECEIVER}","amount":[{{"unit":"lovelace","quantity":"{lovelace}"}}]}}]}}"#
            ))
            .create_async()
            .await;
    }

    #[test]
    fn tx_hash_validation() {
        assert!(validate_tx_hash(TX).is_ok());
        assert!(validate_tx_hash("").is_err());
        assert!(validate_tx_hash("abc123").is_err());
        assert!(validate_tx_hash(&"g".repeat(64)).is_err());
        assert!(validate_tx_hash(&TX[..63]).is_err());
    }

    #[tokio::test]
    async fn submit_claim_records_with_defaults() {
        let state = test_state("http://unused");

        let Json(response) = submit_claim(State(state.clone()), Ok(Json(claim())))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.tx_hash, TX);

        let record = state.ledger.get(TX).await.unwrap();
        assert_eq!(record.prompt, "a lighthouse at dawn");
        assert_eq!(record.frame_size, "1280x720");
        assert_eq!(record.expected_lovelace, 1_800_000);
        assert!(!record.confirmed);
    }

    #[tokio::test]
    async fn submit_claim_rejects_bad_input() {
        let state = test_state("http://unused");

        let mut bad_hash = claim();
        bad_hash.tx_hash = Some("not-hex".to_string());
        assert!(submit_claim(State(state.clone()), Ok(Json(bad_hash)))
            .await
            .is_err());

        let mut empty_prompt = claim();
        empty_prompt.prompt = Some("   ".to_string());
        assert!(submit_claim(State(state.clone()), Ok(Json(empty_prompt)))
            .await
            .is_err());

        let mut zero_amount = claim();
        zero_amount.expected_amount = Some(0);
        assert!(submit_claim(State(state.clone()), Ok(Json(zero_amount)))
            .await
            .is_err());

        let mut zero_duration = claim();
        zero_duration.duration = Some(0);
        assert!(submit_claim(State(state.clone()), Ok(Json(zero_duration)))
            .await
            .is_err());

        // Absent fields fail the same checks as empty or zero values.
        let mut no_prompt = claim();
        no_prompt.prompt = None;
        assert!(submit_claim(State(state.clone()), Ok(Json(no_prompt)))
            .await
            .is_err());

        let mut no_amount = claim();
        no_amount.expected_amount = None;
        assert!(submit_claim(State(state), Ok(Json(no_amount)))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn empty_claim_body_gets_the_error_envelope() {
        let response = app(test_state("http://127.0.0.1:1"))
            .oneshot(json_request("{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], serde_json::json!(false));
        assert_eq!(json["errorCode"], serde_json::json!("INVALID_REQUEST"));
        assert_eq!(
            json["error"],
            serde_json::json!("Transaction hash must be 64 hex characters")
        );
    }

    #[tokio::test]
    async fn malformed_claim_body_gets_the_error_envelope() {
        let response = app(test_state("http://127.0.0.1:1"))
            .oneshot(json_request(r#"{"txHash":5}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], serde_json::json!(false));
        assert_eq!(json["errorCode"], serde_json::json!("INVALID_REQUEST"));
    }

    #[tokio::test]
    async fn cached_confirmation_short_circuits() {
        // No chain mocks: any indexer call would fail, so a confirmed
        // response proves the ledger answered.
        let state = test_state("http://127.0.0.1:1");
        submit_claim(State(state.clone()), Ok(Json(claim()))).await.unwrap();
        state.ledger.mark_confirmed(TX, 1_850_000).await;

        let Json(status) = check_payment(State(state), Path(TX.to_string()))
            .await
            .unwrap();

        assert!(status.confirmed);
        assert_eq!(status.amount, Some(1_850_000));
        assert!(status.error.is_none());
    }

    #[tokio::test]
    async fn verified_payment_is_applied_to_the_ledger() {
        let mut server = mockito::Server::new_async().await;
        mock_payment(&mut server, 1_800_000).await;
        let state = test_state(&server.url());
        submit_claim(State(state.clone()), Ok(Json(claim()))).await.unwrap();

        let Json(status) = check_payment(State(state.clone()), Path(TX.to_string()))
            .await
            .unwrap();

        assert!(status.confirmed);
        assert_eq!(status.amount, Some(1_800_000));

        let record = state.ledger.get(TX).await.unwrap();
        assert!(record.confirmed);
        assert_eq!(record.verified_lovelace, Some(1_800_000));
    }

    #[tokio::test]
    async fn unknown_claim_gets_existence_only_check() {
        let mut server = mockito::Server::new_async().await;
        mock_payment(&mut server, 42).await;
        let state = test_state(&server.url());

        let Json(status) = check_payment(State(state.clone()), Path(TX.to_string()))
            .await
            .unwrap();

        // 42 lovelace passes because no recorded claim means no expected
        // amount to hold it against.
        assert!(status.confirmed);
        assert_eq!(status.amount, Some(42));
        assert!(state.ledger.get(TX).await.is_none());
    }

    #[tokio::test]
    async fn unconfirmed_payment_reports_the_verifier_error() {
        let mut server = mockito::Server::new_async().await;
        mock_payment(&mut server, 1_000).await;
        let state = test_state(&server.url());
        submit_claim(State(state.clone()), Ok(Json(claim()))).await.unwrap();

        let Json(status) = check_payment(State(state.clone()), Path(TX.to_string()))
            .await
            .unwrap();

        assert!(!status.confirmed);
        assert!(status.error.unwrap().contains("Insufficient payment amount"));
        assert!(!state.ledger.get(TX).await.unwrap().confirmed);
    }
}
