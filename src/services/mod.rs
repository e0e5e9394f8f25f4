pub mod blockfrost;
pub mod ledger;
pub mod pricing;
pub mod verifier;
pub mod video;

pub use blockfrost::BlockfrostClient;
pub use ledger::PaymentLedger;
pub use pricing::PricingService;
pub use verifier::PaymentVerifier;
pub use video::VideoApiClient;
