//! Finalize-withdrawal action.
//!
//! Finalization is gated twice: the proof must have matured for the
//! portal's maturity delay, and the dispute game's resolution must have
//! aged past the finality delay. Both waits are computed and reported
//! separately since one is usually dominant.

use crate::{tx_result, Action, Outcome, Readiness};
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::BlockNumberOrTag;
use binding::opstack::{IOptimismPortal2, WithdrawalTransaction};
use client::submit::{self, DEFAULT_RECEIPT_TIMEOUT, GAS_PAD_MULTIPLIER};
use tracing::info;
use withdrawal::{game::read_game_facts, state::WithdrawalStateProvider, types::WithdrawalHash};

/// The two time conditions gating finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizeGate {
    /// Timestamp the proof landed
    pub proven_timestamp: u64,
    /// Portal's proof maturity delay, seconds
    pub proof_maturity_delay: u64,
    /// Timestamp the dispute game resolved
    pub game_resolved_at: u64,
    /// Portal's dispute game finality delay, seconds
    pub finality_delay: u64,
}

/// Gate evaluation at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    /// Both delays have elapsed
    Open,
    /// Remaining waits, zero when that condition is already satisfied
    Closed {
        maturity_remaining: u64,
        finality_remaining: u64,
    },
}

impl FinalizeGate {
    /// Earliest time the proof is mature.
    pub const fn proof_maturity_time(&self) -> u64 {
        self.proven_timestamp + self.proof_maturity_delay
    }

    /// Earliest time the game's resolution is final.
    pub const fn finality_time(&self) -> u64 {
        self.game_resolved_at + self.finality_delay
    }

    /// Evaluate the gate at `now`. Both deadlines are inclusive.
    pub const fn evaluate(&self, now: u64) -> GateStatus {
        let maturity_remaining = self.proof_maturity_time().saturating_sub(now);
        let finality_remaining = self.finality_time().saturating_sub(now);

        if maturity_remaining == 0 && finality_remaining == 0 {
            GateStatus::Open
        } else {
            GateStatus::Closed {
                maturity_remaining,
                finality_remaining,
            }
        }
    }
}

/// Why the withdrawal cannot be finalized yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeWait {
    /// No proof recorded for (hash, proof submitter)
    NotProven,
    /// The proof's dispute game has not resolved yet
    GameUnresolved,
    /// One or both of the time gates is still closed
    GateClosed {
        maturity_remaining: u64,
        finality_remaining: u64,
    },
}

/// Input data for finalizing a withdrawal on L1.
#[derive(Clone, Debug)]
pub struct Finalize {
    /// OptimismPortal2 contract address on L1
    pub portal_address: Address,
    /// The withdrawal transaction details
    pub withdrawal: WithdrawalTransaction,
    /// Hash of the withdrawal
    pub withdrawal_hash: WithdrawalHash,
    /// Address that submitted the proof
    pub proof_submitter: Address,
    /// Address that will submit the finalize transaction
    pub from: Address,
}

/// Action to finalize a proven withdrawal on L1.
pub struct FinalizeAction<P1, P2> {
    l1_provider: P1,
    l2_provider: P2,
    action: Finalize,
}

impl<P1, P2> FinalizeAction<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    pub const fn new(l1_provider: P1, l2_provider: P2, action: Finalize) -> Self {
        Self {
            l1_provider,
            l2_provider,
            action,
        }
    }

    /// Get the withdrawal hash for this action.
    pub const fn withdrawal_hash(&self) -> WithdrawalHash {
        self.action.withdrawal_hash
    }

    fn state(&self) -> WithdrawalStateProvider<P1, P2> {
        WithdrawalStateProvider::new(
            self.l1_provider.clone(),
            self.l2_provider.clone(),
            self.action.portal_address,
        )
    }

    /// Portal's (proof maturity, game finality) delays in seconds.
    async fn portal_delays(&self) -> eyre::Result<(u64, u64)> {
        let portal = IOptimismPortal2::new(self.action.portal_address, &self.l1_provider);

        let maturity: U256 = portal.proofMaturityDelaySeconds().call().await?;
        let finality: U256 = portal.disputeGameFinalityDelaySeconds().call().await?;

        Ok((
            maturity.try_into().unwrap_or(u64::MAX),
            finality.try_into().unwrap_or(u64::MAX),
        ))
    }

    /// Current L1 block timestamp; chain time, not wall time, decides the
    /// gate.
    async fn current_timestamp(&self) -> eyre::Result<u64> {
        let block = self
            .l1_provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await?
            .ok_or_else(|| eyre::eyre!("Failed to get latest block"))?;
        Ok(block.header.timestamp)
    }
}

impl<P1, P2> Action for FinalizeAction<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    type Wait = FinalizeWait;

    async fn check(&self) -> eyre::Result<Readiness<FinalizeWait>> {
        let state = self.state();

        if state.is_finalized(self.action.withdrawal_hash).await? {
            return Ok(Readiness::Completed);
        }

        let Some(proven) = state
            .is_proven(self.action.withdrawal_hash, self.action.proof_submitter)
            .await?
        else {
            return Ok(Readiness::Waiting(FinalizeWait::NotProven));
        };

        let game = read_game_facts(&self.l1_provider, proven.dispute_game_proxy).await?;
        if game.resolved_at == 0 {
            return Ok(Readiness::Waiting(FinalizeWait::GameUnresolved));
        }

        let (proof_maturity_delay, finality_delay) = self.portal_delays().await?;
        let gate = FinalizeGate {
            proven_timestamp: proven.timestamp,
            proof_maturity_delay,
            game_resolved_at: game.resolved_at,
            finality_delay,
        };

        match gate.evaluate(self.current_timestamp().await?) {
            GateStatus::Open => Ok(Readiness::Ready),
            GateStatus::Closed {
                maturity_remaining,
                finality_remaining,
            } => {
                info!(
                    withdrawal_hash = %self.action.withdrawal_hash,
                    maturity_remaining,
                    finality_remaining,
                    "finalization gate closed"
                );
                Ok(Readiness::Waiting(FinalizeWait::GateClosed {
                    maturity_remaining,
                    finality_remaining,
                }))
            }
        }
    }

    async fn execute(&mut self) -> eyre::Result<Outcome<FinalizeWait>> {
        match self.check().await? {
            Readiness::Ready => {}
            Readiness::Waiting(wait) => return Ok(Outcome::Waiting(wait)),
            Readiness::Completed => return Ok(Outcome::AlreadyCompleted),
        }

        // Dry-run the portal's own validity check to fail fast on revert
        // conditions without spending a transaction fee.
        let portal = IOptimismPortal2::new(self.action.portal_address, &self.l1_provider);
        portal
            .checkWithdrawal(self.action.withdrawal_hash, self.action.proof_submitter)
            .call()
            .await
            .map_err(|e| eyre::eyre!("portal rejected the withdrawal as unfinalizable: {e}"))?;

        info!(
            withdrawal_hash = %self.action.withdrawal_hash,
            proof_submitter = %self.action.proof_submitter,
            "finalizing withdrawal"
        );

        let call = portal.finalizeWithdrawalTransaction(self.action.withdrawal.clone());
        let tx_request = call.into_transaction_request().from(self.action.from);

        let receipt = submit::send_padded(
            &self.l1_provider,
            tx_request,
            GAS_PAD_MULTIPLIER,
            DEFAULT_RECEIPT_TIMEOUT,
        )
        .await?;

        info!(
            tx_hash = %receipt.transaction_hash,
            block_number = receipt.block_number,
            gas_used = receipt.gas_used,
            withdrawal_hash = %self.action.withdrawal_hash,
            "withdrawal finalized on L1"
        );

        Ok(Outcome::Executed(tx_result(&receipt)))
    }

    fn description(&self) -> String {
        format!(
            "Finalizing withdrawal {} on L1",
            self.action.withdrawal_hash
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockProvider;
    use alloy_primitives::{address, b256, Bytes};

    #[test]
    fn test_gate_closed_on_maturity() {
        // Finality passed at 1090 but maturity runs to 1100.
        let gate = FinalizeGate {
            proven_timestamp: 1000,
            proof_maturity_delay: 100,
            game_resolved_at: 1050,
            finality_delay: 40,
        };

        assert_eq!(
            gate.evaluate(1099),
            GateStatus::Closed {
                maturity_remaining: 1,
                finality_remaining: 0,
            }
        );
    }

    #[test]
    fn test_gate_opens_at_exact_boundary() {
        let gate = FinalizeGate {
            proven_timestamp: 1000,
            proof_maturity_delay: 100,
            game_resolved_at: 1050,
            finality_delay: 40,
        };

        assert_eq!(gate.proof_maturity_time(), 1100);
        assert_eq!(gate.finality_time(), 1090);
        assert_eq!(gate.evaluate(1100), GateStatus::Open);
    }

    #[test]
    fn test_gate_closed_on_finality() {
        let gate = FinalizeGate {
            proven_timestamp: 1000,
            proof_maturity_delay: 10,
            game_resolved_at: 1050,
            finality_delay: 500,
        };

        assert_eq!(
            gate.evaluate(1200),
            GateStatus::Closed {
                maturity_remaining: 0,
                finality_remaining: 350,
            }
        );
    }

    #[test]
    fn test_gate_reports_both_waits() {
        let gate = FinalizeGate {
            proven_timestamp: 1000,
            proof_maturity_delay: 300,
            game_resolved_at: 1100,
            finality_delay: 300,
        };

        assert_eq!(
            gate.evaluate(1150),
            GateStatus::Closed {
                maturity_remaining: 150,
                finality_remaining: 250,
            }
        );
    }

    fn create_test_finalize_action() -> FinalizeAction<MockProvider, MockProvider> {
        let finalize = Finalize {
            portal_address: address!("0d83dab629f0e0F9d36c0Cbc89B69a489f0751bD"),
            withdrawal: WithdrawalTransaction {
                nonce: U256::from(1),
                sender: address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"),
                target: address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"),
                value: U256::from(1000000000000000u64), // 0.001 ETH
                gasLimit: U256::from(100000),
                data: Bytes::new(),
            },
            withdrawal_hash: b256!(
                "1111111111111111111111111111111111111111111111111111111111111111"
            ),
            proof_submitter: address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"),
            from: address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"),
        };

        FinalizeAction::new(MockProvider, MockProvider, finalize)
    }

    #[test]
    fn test_finalize_action_description() {
        let action = create_test_finalize_action();
        let desc = action.description();
        assert!(desc.contains("Finalizing withdrawal"));
        assert!(desc.contains("1111111111111111111111111111111111111111111111111111111111111111"));
    }

    #[test]
    fn test_finalize_action_withdrawal_hash() {
        let action = create_test_finalize_action();
        assert_eq!(
            action.withdrawal_hash(),
            b256!("1111111111111111111111111111111111111111111111111111111111111111")
        );
    }
}
