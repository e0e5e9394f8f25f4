use serde::{Deserialize, Serialize};

/// Price of one generation, quoted fresh on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    /// ADA/USD spot rate used for this quote.
    #[serde(rename = "rate")]
    pub unit_price: f64,
    /// Total to pay, in ADA, rounded to 6 decimal places.
    #[serde(rename = "totalPaymentCurrency")]
    pub total_ada: f64,
    /// Total in USD, rounded to 2 decimal places.
    #[serde(rename = "totalFiat")]
    pub total_usd: f64,
    #[serde(rename = "duration")]
    pub duration_seconds: u32,
    #[serde(rename = "baseCost")]
    pub base_cost_ada: f64,
    #[serde(rename = "perSecondFiatCost")]
    pub per_second_cost_usd: f64,
}

impl PriceQuote {
    /// Expected payment in lovelace (floored, as wallets submit it).
    pub fn expected_lovelace(&self) -> u64 {
        (self.total_ada * 1_000_000.0).floor() as u64
    }
}
