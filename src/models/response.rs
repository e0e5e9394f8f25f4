use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Service health report, including reachability of the two upstreams the
/// payment flow depends on.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub chain_indexer: bool,
    pub price_oracle: bool,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}
