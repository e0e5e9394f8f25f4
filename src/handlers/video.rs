use crate::error::AdagenError;
use crate::handlers::AppState;
use crate::models::{
    JobStatusResponse, StartGenerationResponse, VideoJobStatus, ALLOWED_DURATIONS, ALLOWED_SIZES,
    DEFAULT_DURATION_SECONDS, DEFAULT_FRAME_SIZE,
};
use crate::services::{PaymentLedger, PaymentVerifier};
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;

#[derive(Debug, Default)]
struct GenerationForm {
    prompt: Option<String>,
    size: Option<String>,
    seconds: Option<String>,
    tx_hash: Option<String>,
}

/// POST /api/videos: submit a generation job from a multipart form
/// (`prompt`, `seconds`, `size`, `txHash`). Unpaid requests get a 402.
pub async fn start_generation(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StartGenerationResponse>, AdagenError> {
    let mut form = GenerationForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AdagenError::InvalidRequest("Invalid multipart form data".to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "prompt" | "size" | "seconds" | "txHash" => {
                let value = field.text().await.map_err(|_| {
                    AdagenError::InvalidRequest("Invalid multipart form data".to_string())
                })?;
                match name.as_str() {
                    "prompt" => form.prompt = Some(value),
                    "size" => form.size = Some(value),
                    "seconds" => form.seconds = Some(value),
                    _ => form.tx_hash = Some(value),
                }
            }
            // File parts (e.g. a reference image) are accepted but unused.
            _ => continue,
        }
    }

    let prompt = match form.prompt.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => return Err(AdagenError::InvalidRequest("Prompt is required".to_string())),
    };

    let seconds = match form.seconds.as_deref() {
        None | Some("") => DEFAULT_DURATION_SECONDS,
        Some(raw) => match raw.parse::<u32>() {
            Ok(s) if ALLOWED_DURATIONS.contains(&s) => s,
            _ => {
                return Err(AdagenError::InvalidRequest(
                    "duration must be one of 4, 8, 12".to_string(),
                ))
            }
        },
    };

    let size = match form.size.as_deref() {
        None | Some("") => DEFAULT_FRAME_SIZE.to_string(),
        Some(s) if ALLOWED_SIZES.contains(&s) => s.to_string(),
        Some(_) => {
            return Err(AdagenError::InvalidRequest(
                "size must be one of 1280x720, 720x1280".to_string(),
            ))
        }
    };

    ensure_payment_confirmed(&state.ledger, &state.verifier, form.tx_hash.as_deref()).await?;

    let job = state.video.create_job(&prompt, seconds, &size).await?;

    Ok(Json(StartGenerationResponse { video_id: job.id }))
}

// Payment gate: cached confirmation, else an existence-only chain check.
// Never writes the ledger; only the payment-check endpoint applies results.
pub(crate) async fn ensure_payment_confirmed(
    ledger: &PaymentLedger,
    verifier: &PaymentVerifier,
    tx_hash: Option<&str>,
) -> Result<(), AdagenError> {
    let Some(tx_hash) = tx_hash.filter(|t| !t.is_empty()) else {
        return Err(AdagenError::PaymentRequired("Payment required".to_string()));
    };

    if let Some(record) = ledger.get(tx_hash).await {
        if record.confirmed {
            tracing::debug!("Payment {} confirmed from cache", tx_hash);
            return Ok(());
        }
    }

    let verification = verifier.verify(tx_hash, 0).await;
    if verification.confirmed {
        return Ok(());
    }

    Err(AdagenError::PaymentRequired(
        verification
            .error
            .unwrap_or_else(|| "Payment not confirmed".to_string()),
    ))
}

/// GET /api/videos/:id/status: job progress for the polling frontend.
pub async fn job_status(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Json<JobStatusResponse>, AdagenError> {
    let job = state.video.job_status(&video_id).await?;

    let video_url = (job.status == VideoJobStatus::Completed)
        .then(|| format!("/api/videos/{}/content", video_id));

    Ok(Json(JobStatusResponse {
        status: job.status,
        progress: job.progress.unwrap_or(0),
        error_message: job.error.and_then(|e| e.message),
        video_url,
    }))
}

/// GET /api/videos/:id/content: stream the finished MP4 through unbuffered.
pub async fn download_content(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Response, AdagenError> {
    let upstream = state.video.download(&video_id).await?;
    let content_length = upstream.content_length();

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"video-{}.mp4\"", video_id),
        );
    if let Some(length) = content_length {
        response = response.header(header::CONTENT_LENGTH, length);
    }

    response
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| AdagenError::Internal(e.to_string()))
}
