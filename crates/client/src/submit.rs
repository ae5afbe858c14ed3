//! Gas-padded, confirm-or-fail transaction submission.
//!
//! Every state-advancing transaction in the withdrawal lifecycle goes
//! through [`send_padded`]: estimate gas, scale the estimate by a safety
//! multiplier, broadcast, and block until a successful receipt arrives.
//! Failures are never retried here; a fresh call re-estimates gas since
//! nonce and fee state may have moved.

use alloy_primitives::TxHash;
use alloy_provider::Provider;
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Multiplier applied to gas estimates before submission.
pub const GAS_PAD_MULTIPLIER: f64 = 1.5;

/// Default bound on the receipt wait.
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Error, Debug)]
pub enum SubmitError {
    /// Gas estimation failed; the transaction was never broadcast
    #[error("gas estimation failed: {0}")]
    Estimate(String),

    /// Broadcast failed; the transaction may or may not be in the mempool
    #[error("failed to send transaction: {0}")]
    Send(String),

    /// The transaction was included but reverted
    #[error("transaction {tx_hash} reverted")]
    Reverted {
        tx_hash: TxHash,
        /// Execution trace when the endpoint supports `debug_traceTransaction`
        trace: Option<serde_json::Value>,
    },

    /// No receipt arrived within the waiting period
    #[error("timed out waiting for receipt of transaction {tx_hash}")]
    ReceiptTimeout { tx_hash: TxHash },

    /// Receipt retrieval failed for a reason other than the deadline
    #[error("failed to get transaction receipt: {0}")]
    Receipt(String),
}

/// Scale a gas estimate by `multiplier`, rounding down after scaling.
pub fn pad_gas(estimate: u64, multiplier: f64) -> u64 {
    (estimate as f64 * multiplier) as u64
}

/// Estimate, pad, sign (via the wallet provider), broadcast, and wait for a
/// successful receipt.
///
/// On revert the execution trace is fetched best-effort and attached to the
/// error. On timeout the transaction hash is surfaced so the caller can
/// re-poll.
pub async fn send_padded<P>(
    provider: &P,
    mut tx: TransactionRequest,
    multiplier: f64,
    receipt_timeout: Duration,
) -> Result<TransactionReceipt, SubmitError>
where
    P: Provider + Clone,
{
    let estimate = provider
        .estimate_gas(tx.clone())
        .await
        .map_err(|e| SubmitError::Estimate(format!("{}", e)))?;

    let gas_limit = pad_gas(estimate, multiplier);
    tx.gas = Some(gas_limit);

    debug!(estimate, gas_limit, multiplier, "padded gas estimate");

    let pending = provider
        .send_transaction(tx)
        .await
        .map_err(|e| SubmitError::Send(format!("{}", e)))?;
    let tx_hash = *pending.tx_hash();

    info!(%tx_hash, "transaction sent, waiting for receipt");

    let receipt = match tokio::time::timeout(receipt_timeout, pending.get_receipt()).await {
        Ok(Ok(receipt)) => receipt,
        Ok(Err(e)) => return Err(SubmitError::Receipt(format!("{}", e))),
        Err(_) => return Err(SubmitError::ReceiptTimeout { tx_hash }),
    };

    if !receipt.status() {
        let trace = fetch_trace(provider, tx_hash).await;
        return Err(SubmitError::Reverted { tx_hash, trace });
    }

    Ok(receipt)
}

/// Best-effort execution trace for revert diagnostics.
async fn fetch_trace<P>(provider: &P, tx_hash: TxHash) -> Option<serde_json::Value>
where
    P: Provider,
{
    let result: Result<serde_json::Value, _> = provider
        .raw_request("debug_traceTransaction".into(), (tx_hash,))
        .await;

    match result {
        Ok(trace) => Some(trace),
        Err(e) => {
            debug!(%tx_hash, error = %e, "could not fetch execution trace");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_gas_default_multiplier() {
        assert_eq!(pad_gas(100_000, GAS_PAD_MULTIPLIER), 150_000);
        assert!(pad_gas(100_000, GAS_PAD_MULTIPLIER) >= 150_000);
    }

    #[test]
    fn test_pad_gas_deterministic() {
        let a = pad_gas(21_000, 1.5);
        let b = pad_gas(21_000, 1.5);
        assert_eq!(a, b);
        assert_eq!(a, 31_500);
    }

    #[test]
    fn test_pad_gas_rounds_down() {
        // 3 * 1.1 = 3.3000000000000003 in f64; scaling truncates
        assert_eq!(pad_gas(3, 1.1), 3);
        assert_eq!(pad_gas(7, 1.5), 10);
    }

    #[test]
    fn test_pad_gas_identity_multiplier() {
        assert_eq!(pad_gas(42_000, 1.0), 42_000);
    }
}
