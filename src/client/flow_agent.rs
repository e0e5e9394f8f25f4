use adagen::client::{ApiClient, StartOutcome};
use adagen::models::{PaymentClaim, VideoJobStatus};
use adagen::poll::{poll_until, PollConfig, PollError, PollOutcome};
use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    // Load configuration
    dotenvy::dotenv().ok();

    let base_url =
        std::env::var("ADAGEN_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let tx_hash = std::env::var("TX_HASH")
        .context("TX_HASH is required: pay the receiving address with your wallet first")?;
    let prompt = std::env::var("PROMPT")
        .unwrap_or_else(|_| "A serene lighthouse on a cliff at golden hour".to_string());
    let duration: u32 = std::env::var("DURATION")
        .ok()
        .and_then(|d| d.parse().ok())
        .unwrap_or(4);
    let size = std::env::var("SIZE").unwrap_or_else(|_| "1280x720".to_string());

    println!("adagen Flow Agent");
    println!("=================");
    println!("Server: {}", base_url);
    println!("Transaction: {}", tx_hash);
    println!("Prompt: {}", prompt);
    println!("Duration: {}s, size: {}", duration, size);
    println!();

    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    let api = ApiClient::new(base_url);

    println!("Step 1: Fetching price quote...");
    let quote = api.fetch_quote(duration).await?;
    println!(
        "   [OK] {} ADA (${} at {} USD/ADA) for {}s",
        quote.total_ada, quote.total_usd, quote.unit_price, quote.duration_seconds
    );
    let expected_lovelace = quote.expected_lovelace();
    println!("   Expected payment: {} lovelace", expected_lovelace);
    println!();

    println!("Step 2: Submitting payment claim...");
    let claim = PaymentClaim {
        tx_hash: tx_hash.clone(),
        duration,
        prompt: prompt.clone(),
        size: Some(size.clone()),
        image: None,
        expected_amount: expected_lovelace,
    };
    let submitted = api.submit_claim(&claim).await?;
    println!("   [OK] Claim recorded for {}", submitted.tx_hash);
    println!();

    println!("Step 3: Waiting for on-chain confirmation (up to 150s)...");
    let api_ref = &api;
    let tx_ref = tx_hash.as_str();
    let confirmation = poll_until(
        PollConfig::payment_confirmation(),
        &cancel,
        |attempt| async move {
            match api_ref.check_payment(tx_ref).await {
                Ok(status) if status.confirmed => PollOutcome::Ready(status),
                Ok(status) => {
                    if let Some(hint) = &status.error {
                        println!("   Attempt {}: {}", attempt, hint);
                    }
                    PollOutcome::Pending
                }
                // Transport hiccups burn an attempt rather than aborting
                Err(e) => {
                    println!("   Attempt {}: {}", attempt, e);
                    PollOutcome::Pending
                }
            }
        },
    )
    .await;

    match confirmation {
        Ok(status) => {
            println!(
                "   [OK] Payment confirmed ({} lovelace)",
                status.amount.unwrap_or_default()
            );
        }
        Err(PollError::TimedOut { attempts }) => {
            println!(
                "   [FAILED] Payment not confirmed after {} attempts",
                attempts
            );
            return Ok(());
        }
        Err(PollError::Cancelled) => {
            println!("   Cancelled.");
            return Ok(());
        }
        Err(PollError::Failed(message)) => {
            println!("   [FAILED] {}", message);
            return Ok(());
        }
    }
    println!();

    println!("Step 4: Starting video generation...");
    let video_id = match api.start_generation(&prompt, duration, &size, &tx_hash).await? {
        StartOutcome::Started(response) => response.video_id,
        StartOutcome::PaymentRequired(reason) => {
            println!("   [FAILED] Payment required: {}", reason);
            println!("   Restart the payment flow and try again.");
            return Ok(());
        }
    };
    println!("   [OK] Job created: {}", video_id);
    println!();

    println!("Step 5: Waiting for generation (up to 300s)...");
    let id_ref = video_id.as_str();
    let generated = poll_until(
        PollConfig::video_generation(),
        &cancel,
        |attempt| async move {
            match api_ref.job_status(id_ref).await {
                Ok(job) => match job.status {
                    VideoJobStatus::Completed => PollOutcome::Ready(job.video_url),
                    VideoJobStatus::Failed => PollOutcome::Failed(
                        job.error_message
                            .unwrap_or_else(|| "Video generation failed".to_string()),
                    ),
                    _ => {
                        println!("   Attempt {}: {}% complete", attempt, job.progress);
                        PollOutcome::Pending
                    }
                },
                Err(e) => {
                    println!("   Attempt {}: {}", attempt, e);
                    PollOutcome::Pending
                }
            }
        },
    )
    .await;

    match generated {
        Ok(url) => {
            if let Some(url) = url {
                println!("   [OK] Video ready at {}", url);
            } else {
                println!("   [OK] Video ready");
            }
        }
        Err(PollError::Failed(message)) => {
            println!("   [FAILED] {}", message);
            return Ok(());
        }
        Err(PollError::TimedOut { .. }) => {
            println!("   [FAILED] Video generation timed out. Please try again.");
            return Ok(());
        }
        Err(PollError::Cancelled) => {
            println!("   Cancelled.");
            return Ok(());
        }
    }
    println!();

    println!("Step 6: Downloading video...");
    let response = api.download(&video_id).await?;
    let bytes = response.bytes().await?;
    let filename = format!("video-{}.mp4", video_id);
    tokio::fs::write(&filename, &bytes).await?;
    println!("   [OK] Saved {} ({} bytes)", filename, bytes.len());

    Ok(())
}
