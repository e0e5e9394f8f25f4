use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Fixed-cadence polling bounds. No backoff: the watched jobs take tens of
/// seconds to minutes, so a constant interval is deliberate.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollConfig {
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// On-chain payment confirmation: 30 x 5s (~2.5 minutes).
    pub const fn payment_confirmation() -> Self {
        Self::new(Duration::from_secs(5), 30)
    }

    /// Video generation: 60 x 5s (~5 minutes).
    pub const fn video_generation() -> Self {
        Self::new(Duration::from_secs(5), 60)
    }
}

/// One observation of the polled operation.
#[derive(Debug)]
pub enum PollOutcome<T> {
    /// Terminal success.
    Ready(T),
    /// Not finished; try again after the interval. Transport faults belong
    /// here so that they consume an attempt instead of retrying unbounded.
    Pending,
    /// Terminal failure reported by the operation itself.
    Failed(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError {
    #[error("{0}")]
    Failed(String),

    #[error("timed out after {attempts} attempts")]
    TimedOut { attempts: u32 },

    #[error("cancelled")]
    Cancelled,
}

/// Run `op` at a fixed interval until it is terminal, the attempt bound is
/// reached, or `cancel` fires. The attempt counter is passed to `op`
/// (1-based) for logging.
pub async fn poll_until<T, F, Fut>(
    config: PollConfig,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, PollError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = PollOutcome<T>>,
{
    for attempt in 1..=config.max_attempts {
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled);
        }

        match op(attempt).await {
            PollOutcome::Ready(value) => return Ok(value),
            PollOutcome::Failed(message) => return Err(PollError::Failed(message)),
            PollOutcome::Pending => {}
        }

        if attempt < config.max_attempts {
            tokio::select! {
                _ = cancel.cancelled() => return Err(PollError::Cancelled),
                _ = tokio::time::sleep(config.interval) => {}
            }
        }
    }

    Err(PollError::TimedOut {
        attempts: config.max_attempts,
    })
}
