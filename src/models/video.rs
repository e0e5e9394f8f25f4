use serde::{Deserialize, Serialize};

/// Durations the generation service accepts, in seconds.
pub const ALLOWED_DURATIONS: [u32; 3] = [4, 8, 12];

/// Frame sizes offered to callers; first entry is the default.
pub const ALLOWED_SIZES: [&str; 2] = ["1280x720", "720x1280"];

pub const DEFAULT_DURATION_SECONDS: u32 = 4;
pub const DEFAULT_FRAME_SIZE: &str = "1280x720";

/// Lifecycle of a generation job as the external service reports it. The
/// upstream's `in_progress` surfaces as `processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoJobStatus {
    Queued,
    #[serde(alias = "in_progress")]
    Processing,
    Completed,
    Failed,
}

impl VideoJobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoJobStatus::Completed | VideoJobStatus::Failed)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGenerationResponse {
    pub video_id: String,
}

/// Status view returned to the frontend. `errorMessage` is always present
/// (null while healthy, matching the original contract); `videoUrl` appears
/// only once the job completed.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub status: VideoJobStatus,
    pub progress: u8,
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}
