use crate::error::AdagenError;
use crate::models::PriceQuote;
use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    cardano: CardanoPrice,
}

#[derive(Debug, Deserialize)]
struct CardanoPrice {
    usd: f64,
}

/// Quotes video prices in ADA from a flat base fee plus a per-second USD
/// charge converted at the live CoinGecko rate. Quotes are recomputed on
/// every request; the spot rate is never cached.
pub struct PricingService {
    http: reqwest::Client,
    base_url: String,
    base_cost_ada: f64,
    per_second_cost_usd: f64,
}

impl PricingService {
    pub fn new(base_url: String, base_cost_ada: f64, per_second_cost_usd: f64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url,
            base_cost_ada,
            per_second_cost_usd,
        })
    }

    /// Current ADA/USD spot rate from the price oracle.
    pub async fn ada_usd_rate(&self) -> Result<f64, AdagenError> {
        let url = format!(
            "{}/simple/price?ids=cardano&vs_currencies=usd",
            self.base_url
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AdagenError::upstream("price oracle", e))?;

        if !response.status().is_success() {
            return Err(AdagenError::Upstream {
                service: "price oracle",
                message: "Failed to fetch ADA price from CoinGecko".to_string(),
            });
        }

        let body: SimplePriceResponse = response
            .json()
            .await
            .map_err(|e| AdagenError::upstream("price oracle", e))?;

        Ok(body.cardano.usd)
    }

    pub async fn quote(&self, duration_seconds: u32) -> Result<PriceQuote, AdagenError> {
        let rate = self.ada_usd_rate().await?;
        let quote = self.compute_quote(rate, duration_seconds);

        tracing::debug!(
            "Quoted {}s video at {} ADA (rate: {} USD/ADA)",
            duration_seconds,
            quote.total_ada,
            rate
        );

        Ok(quote)
    }

    /// Pure price computation: base fee in ADA, duration charge in USD
    /// converted at `rate`. ADA rounds to 6 decimals, USD to 2.
    pub fn compute_quote(&self, rate: f64, duration_seconds: u32) -> PriceQuote {
        let duration_cost_usd = self.per_second_cost_usd * duration_seconds as f64;
        let total_usd = self.base_cost_ada * rate + duration_cost_usd;
        let total_ada = self.base_cost_ada + duration_cost_usd / rate;

        PriceQuote {
            unit_price: rate,
            total_ada: round_to(total_ada, 1_000_000.0),
            total_usd: round_to(total_usd, 100.0),
            duration_seconds,
            base_cost_ada: self.base_cost_ada,
            per_second_cost_usd: self.per_second_cost_usd,
        }
    }

    /// Oracle reachability check for the health endpoint.
    pub async fn ping(&self) -> bool {
        let url = format!("{}/ping", self.base_url);
        match self.http.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

fn round_to(value: f64, scale: f64) -> f64 {
    (value * scale).round() / scale
}
