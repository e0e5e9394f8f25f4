use crate::error::AdagenError;
use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct TxInfo {
    pub hash: String,
    pub block_height: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxUtxos {
    pub hash: String,
    pub outputs: Vec<TxOutput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxOutput {
    pub address: String,
    pub amount: Vec<AssetAmount>,
}

/// One asset bundled in a transaction output. Plain ADA carries
/// `unit == "lovelace"`; native tokens use policy-id units.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetAmount {
    pub unit: String,
    pub quantity: String,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    is_healthy: bool,
}

/// Thin client over the Blockfrost REST API, authenticated with the
/// `project_id` header. 404s surface as `None` so callers can tell
/// "transaction not on chain" apart from indexer faults.
pub struct BlockfrostClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
}

impl BlockfrostClient {
    pub fn new(base_url: String, project_id: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url,
            project_id,
        })
    }

    pub async fn transaction(&self, tx_hash: &str) -> Result<Option<TxInfo>, AdagenError> {
        self.get_json(&format!("/txs/{}", tx_hash)).await
    }

    pub async fn transaction_utxos(&self, tx_hash: &str) -> Result<Option<TxUtxos>, AdagenError> {
        self.get_json(&format!("/txs/{}/utxos", tx_hash)).await
    }

    /// Indexer reachability check for the health endpoint.
    pub async fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("project_id", &self.project_id)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => resp
                .json::<HealthResponse>()
                .await
                .map(|h| h.is_healthy)
                .unwrap_or(false),
            _ => false,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, AdagenError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .header("project_id", &self.project_id)
            .send()
            .await
            .map_err(|e| AdagenError::upstream("chain indexer", e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AdagenError::Upstream {
                service: "chain indexer",
                message: format!("Blockfrost returned HTTP {}", response.status().as_u16()),
            });
        }

        let body = response
            .json::<T>()
            .await
            .map_err(|e| AdagenError::upstream("chain indexer", e))?;

        Ok(Some(body))
    }
}
