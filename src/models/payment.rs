use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A claimed payment awaiting (or past) on-chain confirmation, keyed by its
/// transaction hash in the ledger. Exclusively owned by the ledger; the
/// verifier only reports results for it to apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub tx_hash: String,
    pub duration_seconds: u32,
    pub prompt: String,
    pub frame_size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub confirmed: bool,
    pub expected_lovelace: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_lovelace: Option<u64>,
}

impl PaymentRecord {
    pub fn new(
        tx_hash: String,
        duration_seconds: u32,
        prompt: String,
        frame_size: String,
        image_ref: Option<String>,
        expected_lovelace: u64,
    ) -> Self {
        Self {
            tx_hash,
            duration_seconds,
            prompt,
            frame_size,
            image_ref,
            created_at: Utc::now(),
            confirmed: false,
            expected_lovelace,
            verified_lovelace: None,
        }
    }
}

/// Claim body submitted right after the wallet broadcast the transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentClaim {
    pub tx_hash: String,
    pub duration: u32,
    pub prompt: String,
    pub size: Option<String>,
    pub image: Option<String>,
    pub expected_amount: u64,
}

/// `PaymentClaim` with every field optional. The claim handler checks
/// presence itself so missing fields get the standard 400 envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentClaimBody {
    pub tx_hash: Option<String>,
    pub duration: Option<u32>,
    pub prompt: Option<String>,
    pub size: Option<String>,
    pub image: Option<String>,
    pub expected_amount: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentClaimResponse {
    pub success: bool,
    pub tx_hash: String,
}

/// Outcome of one on-chain verification. Never persisted; the ledger applies
/// a confirmed result, everything else flows straight back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationResult {
    pub fn confirmed(amount: u64) -> Self {
        Self {
            confirmed: true,
            amount: Some(amount),
            error: None,
        }
    }

    pub fn rejected(amount: Option<u64>, error: String) -> Self {
        Self {
            confirmed: false,
            amount,
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub confirmed: bool,
    pub tx_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PaymentStatusResponse {
    pub fn from_verification(tx_hash: String, verification: VerificationResult) -> Self {
        Self {
            confirmed: verification.confirmed,
            tx_hash,
            amount: verification.amount,
            error: verification.error,
        }
    }
}
