use crate::error::AdagenError;
use crate::models::VerificationResult;
use crate::services::BlockfrostClient;
use std::sync::Arc;

const LOVELACE_UNIT: &str = "lovelace";

/// Checks submitted payment claims against the chain. Verification never
/// fails with an exception: indexer faults fold into a rejected result so
/// the payment-check endpoint can keep polling.
pub struct PaymentVerifier {
    chain: Arc<BlockfrostClient>,
    receiving_address: String,
}

impl PaymentVerifier {
    pub fn new(chain: Arc<BlockfrostClient>, receiving_address: String) -> Self {
        Self {
            chain,
            receiving_address,
        }
    }

    /// Verify that `tx_hash` paid at least 99% of `expected_lovelace` to the
    /// receiving address. `expected_lovelace == 0` checks existence only.
    pub async fn verify(&self, tx_hash: &str, expected_lovelace: u64) -> VerificationResult {
        match self.check_chain(tx_hash, expected_lovelace).await {
            Ok(result) => result,
            Err(e) => VerificationResult::rejected(None, e.to_string()),
        }
    }

    async fn check_chain(
        &self,
        tx_hash: &str,
        expected_lovelace: u64,
    ) -> Result<VerificationResult, AdagenError> {
        if self.chain.transaction(tx_hash).await?.is_none() {
            return Ok(VerificationResult::rejected(
                None,
                "Transaction not found on blockchain".to_string(),
            ));
        }

        let Some(utxos) = self.chain.transaction_utxos(tx_hash).await? else {
            return Ok(VerificationResult::rejected(
                None,
                "Transaction not found on blockchain".to_string(),
            ));
        };

        let Some(output) = utxos
            .outputs
            .iter()
            .find(|o| o.address == self.receiving_address)
        else {
            return Ok(VerificationResult::rejected(
                None,
                "Payment not sent to correct address".to_string(),
            ));
        };

        let paid = output
            .amount
            .iter()
            .find(|a| a.unit == LOVELACE_UNIT)
            .and_then(|a| a.quantity.parse::<u64>().ok())
            .unwrap_or(0);

        // 1% underpayment tolerance, in integer math so large amounts cannot
        // lose precision: paid >= 0.99 * expected.
        if expected_lovelace > 0 && (paid as u128) * 100 < (expected_lovelace as u128) * 99 {
            return Ok(VerificationResult::rejected(
                Some(paid),
                format!(
                    "Insufficient payment amount. Expected: {}, Received: {}",
                    expected_lovelace, paid
                ),
            ));
        }

        tracing::info!(
            "Payment verified: {} lovelace to {} ({})",
            paid,
            self.receiving_address,
            tx_hash
        );

        Ok(VerificationResult::confirmed(paid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TX: &str = "8f2e4a1b0c9d7e6f5a4b3c2d1e0f9a8b7c6d5e4f3a2b1c0d9e8f7a6b5c4d3e2f";
    const RECEIVER: &str = "addr1qxtest0receiver";

    async fn mock_chain(
        server: &mut mockito::Server,
        tx_status: usize,
        utxo_body: Option<&str>,
    ) -> PaymentVerifier {
        server
            .mock("GET", format!("/txs/{TX}").as_str())
            .with_status(tx_status)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"hash":"{TX}","block_height":1}}"#))
            .create_async()
            .await;

        if let Some(body) = utxo_body {
            server
                .mock("GET", format!("/txs/{TX}/utxos").as_str())
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(body.to_string())
                .create_async()
                .await;
        }

        let chain = Arc::new(
            BlockfrostClient::new(server.url(), "test-project".to_string()).unwrap(),
        );
        PaymentVerifier::new(chain, RECEIVER.to_string())
    }

    fn utxos_paying(address: &str, lovelace: u64) -> String {
        format!(
            r#"{{"hash":"{TX}","outputs":[{{"address":"{address}","amount":[{{"unit":"lovelace","quantity":"{lovelace}"}}]}}]}}"#
        )
    }

    #[tokio::test]
    async fn exact_payment_confirms() {
        let mut server = mockito::Server::new_async().await;
        let verifier = mock_chain(&mut server, 200, Some(&utxos_paying(RECEIVER, 1_800_000))).await;

        let result = verifier.verify(TX, 1_800_000).await;

        assert!(result.confirmed);
        assert_eq!(result.amount, Some(1_800_000));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn one_percent_underpayment_is_tolerated() {
        let mut server = mockito::Server::new_async().await;
        let verifier = mock_chain(&mut server, 200, Some(&utxos_paying(RECEIVER, 1_782_000))).await;

        // 1_782_000 == 0.99 * 1_800_000 exactly, the lowest accepted amount
        let result = verifier.verify(TX, 1_800_000).await;

        assert!(result.confirmed);
        assert_eq!(result.amount, Some(1_782_000));
    }

    #[tokio::test]
    async fn underpayment_past_tolerance_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let verifier = mock_chain(&mut server, 200, Some(&utxos_paying(RECEIVER, 1_781_999))).await;

        let result = verifier.verify(TX, 1_800_000).await;

        assert!(!result.confirmed);
        assert_eq!(result.amount, Some(1_781_999));
        let error = result.error.unwrap();
        assert!(error.contains("Expected: 1800000"));
        assert!(error.contains("Received: 1781999"));
    }

    #[tokio::test]
    async fn zero_expected_checks_existence_only() {
        let mut server = mockito::Server::new_async().await;
        let verifier = mock_chain(&mut server, 200, Some(&utxos_paying(RECEIVER, 42))).await;

        let result = verifier.verify(TX, 0).await;

        assert!(result.confirmed);
        assert_eq!(result.amount, Some(42));
    }

    #[tokio::test]
    async fn unknown_transaction_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let verifier = mock_chain(&mut server, 404, None).await;

        let result = verifier.verify(TX, 1_800_000).await;

        assert!(!result.confirmed);
        assert!(result.amount.is_none());
        assert_eq!(
            result.error.as_deref(),
            Some("Transaction not found on blockchain")
        );
    }

    #[tokio::test]
    async fn payment_to_other_address_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let verifier =
            mock_chain(&mut server, 200, Some(&utxos_paying("addr1other", 9_999_999))).await;

        let result = verifier.verify(TX, 1_800_000).await;

        assert!(!result.confirmed);
        assert_eq!(
            result.error.as_deref(),
            Some("Payment not sent to correct address")
        );
    }

    #[tokio::test]
    async fn indexer_fault_folds_into_result() {
        let mut server = mockito::Server::new_async().await;
        let verifier = mock_chain(&mut server, 500, None).await;

        let result = verifier.verify(TX, 1_800_000).await;

        assert!(!result.confirmed);
        assert!(result.error.unwrap().contains("chain indexer"));
    }

    #[tokio::test]
    async fn huge_amounts_do_not_overflow_the_tolerance_check() {
        let mut server = mockito::Server::new_async().await;
        let verifier =
            mock_chain(&mut server, 200, Some(&utxos_paying(RECEIVER, u64::MAX))).await;

        let result = verifier.verify(TX, u64::MAX).await;

        assert!(result.confirmed);
        assert_eq!(result.amount, Some(u64::MAX));
    }
}
