//! Chain-facing withdrawal state.
//!
//! Scans L2 for withdrawal events and collects the L1 facts that
//! [`crate::status::classify`] projects into a lifecycle stage. The process
//! holds no authoritative copy of anything: every query re-derives from
//! fresh reads, so calls are idempotent and safe to repeat.

use crate::{
    game,
    hash::compute_withdrawal_hash,
    status::{classify, StatusFacts},
    types::{BridgeDetails, ProvenRecord, WithdrawalHash, WithdrawalRecord, WithdrawalStatus},
};
use alloy_contract::private::Provider;
use alloy_primitives::Address;
use alloy_rpc_types_eth::BlockNumberOrTag;
use binding::opstack::{
    IL2StandardBridge, IL2ToL1MessagePasser, IOptimismPortal2, WithdrawalTransaction,
    LEGACY_ERC20_ETH_ADDRESS, L2_STANDARD_BRIDGE_ADDRESS, MESSAGE_PASSER_ADDRESS,
};
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::{debug, error, warn};

/// Which L2 event stream a scan reads.
///
/// Both produce the same record type; the bridge stream additionally
/// carries token details and is joined against the MessagePassed log in the
/// same receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanSource {
    /// L2StandardBridge WithdrawalInitiated events (ETH withdrawals)
    StandardBridge,
    /// Raw L2ToL1MessagePasser MessagePassed events
    MessagePasser,
}

pub struct WithdrawalStateProvider<P1, P2> {
    l1_provider: P1,
    l2_provider: P2,
    portal_address: Address,
}

// Use 9,500 block chunks (500 block safety margin for RPC limits)
const CHUNK_SIZE: u64 = 9_500;

fn chunk_ranges(from: u64, to: u64) -> Vec<(u64, u64)> {
    let mut ranges = Vec::new();
    let mut current = from;

    while current <= to {
        let end = (current + CHUNK_SIZE - 1).min(to);
        ranges.push((current, end));
        current = end + 1;
    }

    ranges
}

// Exponential backoff: 100ms, 200ms, 400ms, 800ms, 1.6s (max 5 attempts)
fn retry_strategy() -> impl Iterator<Item = std::time::Duration> {
    ExponentialBackoff::from_millis(100).take(5)
}

impl<P1, P2> WithdrawalStateProvider<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    pub const fn new(l1_provider: P1, l2_provider: P2, portal_address: Address) -> Self {
        Self {
            l1_provider,
            l2_provider,
            portal_address,
        }
    }

    /// Scan for the account's withdrawals in the given block range.
    ///
    /// `Latest` bounds are resolved to concrete block numbers first so the
    /// whole scan sees one snapshot even behind an out-of-sync load
    /// balancer. Chunks that fail are retried with exponential backoff.
    pub async fn scan_withdrawals(
        &self,
        source: ScanSource,
        account: Address,
        from_block: BlockNumberOrTag,
        to_block: BlockNumberOrTag,
    ) -> eyre::Result<Vec<WithdrawalRecord>> {
        let from = self.resolve_block_number(from_block).await?;
        let to = self.resolve_block_number(to_block).await?;

        if from > to {
            return Err(eyre::eyre!(
                "from_block ({}) must be <= to_block ({})",
                from,
                to
            ));
        }

        debug!(?source, from, to, "scanning for withdrawals (snapshot taken)");

        let mut records = Vec::new();
        for (start, end) in chunk_ranges(from, to) {
            debug!(from = start, to = end, "scanning chunk for withdrawals");

            let chunk = Retry::spawn(retry_strategy(), || async move {
                let result = match source {
                    ScanSource::StandardBridge => self.scan_bridge_chunk(account, start, end).await,
                    ScanSource::MessagePasser => {
                        self.scan_message_passed_chunk(account, start, end).await
                    }
                };
                result.map_err(|e| {
                    warn!(from = start, to = end, error = %e, "chunk scan failed, will retry");
                    e
                })
            })
            .await?;

            records.extend(chunk);
        }

        Ok(records)
    }

    /// Resolve BlockNumberOrTag to a concrete block number.
    async fn resolve_block_number(&self, block: BlockNumberOrTag) -> eyre::Result<u64> {
        match block {
            BlockNumberOrTag::Number(n) => Ok(n),
            BlockNumberOrTag::Earliest => Ok(0),
            BlockNumberOrTag::Latest => Ok(self.l2_provider.get_block_number().await?),
            _ => Err(eyre::eyre!("Unsupported block tag: {:?}", block)),
        }
    }

    /// Scan one chunk of MessagePassed events where the account is both
    /// sender and target.
    async fn scan_message_passed_chunk(
        &self,
        account: Address,
        from_block: u64,
        to_block: u64,
    ) -> eyre::Result<Vec<WithdrawalRecord>> {
        let contract = IL2ToL1MessagePasser::new(MESSAGE_PASSER_ADDRESS, &self.l2_provider);

        let filter = contract
            .MessagePassed_filter()
            .topic2(account.into_word())
            .topic3(account.into_word())
            .from_block(from_block)
            .to_block(to_block);
        let events = filter.query().await?;

        let mut records = Vec::new();
        for (event, log) in events {
            let tx = WithdrawalTransaction {
                nonce: event.nonce,
                sender: event.sender,
                target: event.target,
                value: event.value,
                gasLimit: event.gasLimit,
                data: event.data,
            };

            let computed = compute_withdrawal_hash(&tx);
            if computed != event.withdrawalHash {
                error!(
                    block = ?log.block_number,
                    computed = %computed,
                    event_hash = %event.withdrawalHash,
                    "withdrawal hash mismatch, skipping event"
                );
                // don't fail the entire scan
                continue;
            }

            let block_number = log.block_number.unwrap_or_default();
            let timestamp = match log.block_timestamp {
                Some(timestamp) => timestamp,
                None => self.l2_block_timestamp(block_number).await?,
            };

            records.push(WithdrawalRecord {
                transaction: tx,
                hash: event.withdrawalHash,
                tx_hash: log.transaction_hash.unwrap_or_default(),
                block_number,
                timestamp,
                bridge: None,
            });
        }

        Ok(records)
    }

    /// Scan one chunk of standard-bridge ETH withdrawals, joining each
    /// against the MessagePassed log in the same receipt.
    async fn scan_bridge_chunk(
        &self,
        account: Address,
        from_block: u64,
        to_block: u64,
    ) -> eyre::Result<Vec<WithdrawalRecord>> {
        let bridge = IL2StandardBridge::new(L2_STANDARD_BRIDGE_ADDRESS, &self.l2_provider);

        let filter = bridge
            .WithdrawalInitiated_filter()
            .topic1(Address::ZERO.into_word())
            .topic2(LEGACY_ERC20_ETH_ADDRESS.into_word())
            .topic3(account.into_word())
            .from_block(from_block)
            .to_block(to_block);
        let events = filter.query().await?;

        let mut records = Vec::new();
        for (event, log) in events {
            let tx_hash = log
                .transaction_hash
                .ok_or_else(|| eyre::eyre!("bridge event log missing transaction hash"))?;

            let receipt = self
                .l2_provider
                .get_transaction_receipt(tx_hash)
                .await?
                .ok_or_else(|| eyre::eyre!("no receipt for bridge withdrawal tx {tx_hash}"))?;

            let (tx, hash) = crate::event::find_message_passed(&receipt)?;

            let block_number = receipt.block_number.unwrap_or_default();
            let timestamp = match log.block_timestamp {
                Some(timestamp) => timestamp,
                None => self.l2_block_timestamp(block_number).await?,
            };

            records.push(WithdrawalRecord {
                transaction: tx,
                hash,
                tx_hash,
                block_number,
                timestamp,
                bridge: Some(BridgeDetails {
                    l1_token: event.l1Token,
                    l2_token: event.l2Token,
                    amount: event.amount,
                }),
            });
        }

        Ok(records)
    }

    async fn l2_block_timestamp(&self, number: u64) -> eyre::Result<u64> {
        let block = self
            .l2_provider
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .await?
            .ok_or_else(|| eyre::eyre!("block {} not found", number))?;
        Ok(block.header.timestamp)
    }

    /// Collect the facts for one withdrawal and classify them.
    ///
    /// `anchored_l2_block` is passed in so a caller scanning many
    /// withdrawals locates the latest game once per sweep.
    pub async fn status(
        &self,
        hash: WithdrawalHash,
        withdrawal_block: u64,
        proof_submitter: Address,
        anchored_l2_block: Option<u64>,
    ) -> eyre::Result<WithdrawalStatus> {
        let facts = self
            .collect_facts(hash, withdrawal_block, proof_submitter, anchored_l2_block)
            .await?;
        Ok(classify(&facts))
    }

    /// One snapshot of every fact the classifier consumes.
    pub async fn collect_facts(
        &self,
        hash: WithdrawalHash,
        withdrawal_block: u64,
        proof_submitter: Address,
        anchored_l2_block: Option<u64>,
    ) -> eyre::Result<StatusFacts> {
        let finalized = self.is_finalized(hash).await?;
        let proven = self.is_proven(hash, proof_submitter).await?;

        let game = match &proven {
            Some(record) => Some(
                game::read_game_facts(&self.l1_provider, record.dispute_game_proxy).await?,
            ),
            None => None,
        };

        Ok(StatusFacts {
            withdrawal_block,
            anchored_l2_block,
            proven,
            game,
            finalized,
        })
    }

    pub async fn is_finalized(&self, hash: WithdrawalHash) -> eyre::Result<bool> {
        let portal = IOptimismPortal2::new(self.portal_address, &self.l1_provider);
        let finalized = portal.finalizedWithdrawals(hash).call().await?;
        Ok(finalized)
    }

    pub async fn is_proven(
        &self,
        hash: WithdrawalHash,
        proof_submitter: Address,
    ) -> eyre::Result<Option<ProvenRecord>> {
        let portal = IOptimismPortal2::new(self.portal_address, &self.l1_provider);
        let proven = portal
            .provenWithdrawals(hash, proof_submitter)
            .call()
            .await?;

        if proven.timestamp == 0 {
            Ok(None)
        } else {
            Ok(Some(ProvenRecord {
                timestamp: proven.timestamp,
                dispute_game_proxy: proven.disputeGameProxy,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_ranges_single() {
        assert_eq!(chunk_ranges(100, 200), vec![(100, 200)]);
    }

    #[test]
    fn test_chunk_ranges_splits_on_chunk_size() {
        let ranges = chunk_ranges(0, 20_000);
        assert_eq!(ranges, vec![(0, 9_499), (9_500, 18_999), (19_000, 20_000)]);
    }

    #[test]
    fn test_chunk_ranges_exact_boundary() {
        let ranges = chunk_ranges(0, CHUNK_SIZE - 1);
        assert_eq!(ranges, vec![(0, CHUNK_SIZE - 1)]);
    }

    #[test]
    fn test_chunk_ranges_single_block() {
        assert_eq!(chunk_ranges(7, 7), vec![(7, 7)]);
    }
}
