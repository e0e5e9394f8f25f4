use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AdagenError {
    #[error("{0}")]
    PaymentRequired(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{service}: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AdagenError {
    pub fn upstream(service: &'static str, err: reqwest::Error) -> Self {
        // Transport details go to the log; the caller gets a short message.
        tracing::warn!(service, error = %err, "upstream call failed");
        Self::Upstream {
            service,
            message: format!("failed to reach {}", service),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub request_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_required: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_instructions: Option<PaymentInstructions>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInstructions {
    pub address: String,
    pub unit: String,
    pub quote_path: String,
}

impl IntoResponse for AdagenError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();

        let (status, error_code, payment_required) = match &self {
            AdagenError::PaymentRequired(_) => {
                (StatusCode::PAYMENT_REQUIRED, "PAYMENT_REQUIRED", true)
            }
            AdagenError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", false),
            AdagenError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", false),
            AdagenError::Upstream { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE", false),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", false),
        };

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            error_code: error_code.to_string(),
            timestamp: Utc::now(),
            request_id,
            payment_required: payment_required.then_some(true),
            payment_instructions: payment_required.then(payment_instructions),
        };

        tracing::error!(
            error = ?self,
            error_code = error_code,
            "Request failed"
        );

        (status, Json(body)).into_response()
    }
}

fn payment_instructions() -> PaymentInstructions {
    // Pulled from env; Config is not threaded into IntoResponse.
    let address = std::env::var("RECEIVING_ADDRESS")
        .unwrap_or_else(|_| crate::config::DEFAULT_RECEIVING_ADDRESS.to_string());

    PaymentInstructions {
        address,
        unit: "lovelace".to_string(),
        quote_path: "/api/price".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AdagenError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn payment_required_maps_to_402_with_flag() {
        let (status, body) = body_of(AdagenError::PaymentRequired("Payment required".into())).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body.payment_required, Some(true));
        assert_eq!(body.error_code, "PAYMENT_REQUIRED");
        let instructions = body.payment_instructions.expect("instructions");
        assert_eq!(instructions.unit, "lovelace");
        assert!(instructions.address.starts_with("addr"));
    }

    #[tokio::test]
    async fn upstream_maps_to_502_without_flag() {
        let (status, body) = body_of(AdagenError::Upstream {
            service: "price oracle",
            message: "failed to reach price oracle".into(),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.error_code, "UPSTREAM_UNAVAILABLE");
        assert_eq!(body.payment_required, None);
        assert!(!body.success);
    }

    #[tokio::test]
    async fn invalid_request_maps_to_400() {
        let (status, body) = body_of(AdagenError::InvalidRequest("Prompt is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Prompt is required");
    }
}
