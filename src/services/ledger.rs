use crate::models::PaymentRecord;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// In-memory store of submitted payment claims, keyed by transaction hash.
/// Not durable; a lost record is re-derived by re-verifying on chain.
pub struct PaymentLedger {
    entries: RwLock<HashMap<String, PaymentRecord>>,
}

impl PaymentLedger {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or overwrite a claim. A re-recorded claim starts unconfirmed.
    pub async fn record(&self, record: PaymentRecord) {
        let mut entries = self.entries.write().await;
        entries.insert(record.tx_hash.clone(), record);
    }

    pub async fn get(&self, tx_hash: &str) -> Option<PaymentRecord> {
        let entries = self.entries.read().await;
        entries.get(tx_hash).cloned()
    }

    /// Mark a claim confirmed. Idempotent: later calls keep the first
    /// verified amount. Returns false when no such claim exists.
    pub async fn mark_confirmed(&self, tx_hash: &str, verified_lovelace: u64) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(tx_hash) {
            Some(record) => {
                if !record.confirmed {
                    record.confirmed = true;
                    record.verified_lovelace = Some(verified_lovelace);
                }
                true
            }
            None => false,
        }
    }

    /// Remove entries older than `max_age`, returning how many were dropped.
    pub async fn evict_older_than(&self, max_age: Duration) -> usize {
        let now = chrono::Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, record| {
            let age = now
                .signed_duration_since(record.created_at)
                .to_std()
                .unwrap_or_default();
            age <= max_age
        });
        before - entries.len()
    }

    /// Background task that sweeps stale claims on a fixed period.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        period: Duration,
        max_age: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let ledger = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            loop {
                tick.tick().await;
                let evicted = ledger.evict_older_than(max_age).await;
                if evicted > 0 {
                    tracing::info!("Evicted {} stale payment record(s)", evicted);
                }
            }
        })
    }
}

impl Default for PaymentLedger {
    fn default() -> Self {
        Self::new()
    }
}
