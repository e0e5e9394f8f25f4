use crate::error::AdagenError;
use crate::models::VideoJobStatus;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct CreateJobRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    seconds: String,
    size: &'a str,
}

/// A generation job as the video API reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoJob {
    pub id: String,
    pub status: VideoJobStatus,
    pub progress: Option<u8>,
    pub error: Option<VideoJobFault>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoJobFault {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Client for the hosted video-generation API (the `/v1/videos` family,
/// bearer-authenticated). Connect timeout only: content downloads stream
/// and can run well past any sane total timeout.
pub struct VideoApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl VideoApiClient {
    pub fn new(base_url: String, api_key: String, model: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key,
            model,
        })
    }

    /// Submit a generation job. `seconds` travels as a string, as the API
    /// expects.
    pub async fn create_job(
        &self,
        prompt: &str,
        seconds: u32,
        size: &str,
    ) -> Result<VideoJob, AdagenError> {
        let url = format!("{}/v1/videos", self.base_url);
        let request = CreateJobRequest {
            model: &self.model,
            prompt,
            seconds: seconds.to_string(),
            size,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AdagenError::upstream("video service", e))?;

        let job: VideoJob = Self::read_json(response).await?;
        tracing::info!("Video job {} created ({}s, {})", job.id, seconds, size);
        Ok(job)
    }

    pub async fn job_status(&self, video_id: &str) -> Result<VideoJob, AdagenError> {
        let url = format!("{}/v1/videos/{}", self.base_url, video_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AdagenError::upstream("video service", e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AdagenError::NotFound(format!(
                "Video job {} not found",
                video_id
            )));
        }

        Self::read_json(response).await
    }

    /// Fetch the finished MP4. The body is left unread so the caller can
    /// stream it through.
    pub async fn download(&self, video_id: &str) -> Result<reqwest::Response, AdagenError> {
        let url = format!("{}/v1/videos/{}/content", self.base_url, video_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AdagenError::upstream("video service", e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AdagenError::NotFound(format!(
                "Video job {} not found",
                video_id
            )));
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(response)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AdagenError> {
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| AdagenError::upstream("video service", e))
    }

    async fn api_error(response: reqwest::Response) -> AdagenError {
        let status = response.status();
        let message = response
            .json::<ApiErrorEnvelope>()
            .await
            .ok()
            .and_then(|envelope| envelope.error)
            .and_then(|body| body.message)
            .unwrap_or_else(|| format!("video API returned HTTP {}", status.as_u16()));

        AdagenError::Upstream {
            service: "video service",
            message,
        }
    }
}
