use crate::models::{
    JobStatusResponse, PaymentClaim, PaymentClaimResponse, PaymentStatusResponse, PriceQuote,
    StartGenerationResponse,
};
use anyhow::Result;
use reqwest::multipart::Form;
use reqwest::StatusCode;

/// Outcome of a generation attempt: either the job started or the server
/// answered 402 with a reason.
#[derive(Debug)]
pub enum StartOutcome {
    Started(StartGenerationResponse),
    PaymentRequired(String),
}

/// Typed client for the gateway API, used by the flow agent.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub async fn fetch_quote(&self, duration: u32) -> Result<PriceQuote> {
        let url = format!("{}/api/price?duration={}", self.base_url, duration);
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Quote request failed: {}", error_message(response).await);
        }
        Ok(response.json().await?)
    }

    pub async fn submit_claim(&self, claim: &PaymentClaim) -> Result<PaymentClaimResponse> {
        let url = format!("{}/api/payments", self.base_url);
        let response = self.http.post(&url).json(claim).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Claim submission failed: {}", error_message(response).await);
        }
        Ok(response.json().await?)
    }

    pub async fn check_payment(&self, tx_hash: &str) -> Result<PaymentStatusResponse> {
        let url = format!("{}/api/payments/{}", self.base_url, tx_hash);
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Payment check failed: {}", error_message(response).await);
        }
        Ok(response.json().await?)
    }

    pub async fn start_generation(
        &self,
        prompt: &str,
        seconds: u32,
        size: &str,
        tx_hash: &str,
    ) -> Result<StartOutcome> {
        let url = format!("{}/api/videos", self.base_url);
        let form = Form::new()
            .text("prompt", prompt.to_string())
            .text("seconds", seconds.to_string())
            .text("size", size.to_string())
            .text("txHash", tx_hash.to_string());

        let response = self.http.post(&url).multipart(form).send().await?;

        if response.status() == StatusCode::PAYMENT_REQUIRED {
            return Ok(StartOutcome::PaymentRequired(error_message(response).await));
        }
        if !response.status().is_success() {
            anyhow::bail!("Generation request failed: {}", error_message(response).await);
        }
        Ok(StartOutcome::Started(response.json().await?))
    }

    pub async fn job_status(&self, video_id: &str) -> Result<JobStatusResponse> {
        let url = format!("{}/api/videos/{}/status", self.base_url, video_id);
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Status check failed: {}", error_message(response).await);
        }
        Ok(response.json().await?)
    }

    /// Streamable response for the finished MP4.
    pub async fn download(&self, video_id: &str) -> Result<reqwest::Response> {
        let url = format!("{}/api/videos/{}/content", self.base_url, video_id);
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Download failed: {}", error_message(response).await);
        }
        Ok(response)
    }
}

/// Pull the `error` field out of the gateway's JSON error envelope, falling
/// back to the HTTP status.
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("error")
                .and_then(|e| e.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| format!("HTTP {}", status))
}
