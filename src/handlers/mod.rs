pub mod health;
pub mod payment;
pub mod quote;
pub mod video;

pub use health::*;
pub use payment::*;
pub use quote::*;
pub use video::*;

use crate::services::{
    BlockfrostClient, PaymentLedger, PaymentVerifier, PricingService, VideoApiClient,
};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<PaymentLedger>,
    pub pricing: Arc<PricingService>,
    pub verifier: Arc<PaymentVerifier>,
    pub video: Arc<VideoApiClient>,
    pub chain: Arc<BlockfrostClient>,
    pub started_at: Instant,
}
