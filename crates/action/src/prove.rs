//! Prove-withdrawal action.
//!
//! Submits a proof to L1 that a withdrawal was initiated on L2, anchored to
//! the latest dispute game that covers the withdrawal's block.

use crate::{tx_result, Action, Outcome, Readiness};
use alloy_primitives::Address;
use alloy_provider::Provider;
use binding::opstack::IOptimismPortal2;
use client::submit::{self, DEFAULT_RECEIPT_TIMEOUT, GAS_PAD_MULTIPLIER};
use tracing::info;
use withdrawal::{
    game::{find_latest_game, LatestGame},
    proof::prove_params,
    state::WithdrawalStateProvider,
    types::{WithdrawalHash, WithdrawalRecord},
};

/// Input data for proving a withdrawal on L1.
#[derive(Clone, Debug)]
pub struct Prove {
    /// OptimismPortal2 contract address on L1
    pub portal_address: Address,
    /// DisputeGameFactory contract address on L1
    pub factory_address: Address,
    /// The withdrawal to prove
    pub record: WithdrawalRecord,
    /// Address submitting the proof transaction
    pub from: Address,
}

/// Why the proof cannot be submitted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProveWait {
    /// No dispute game of the respected type exists
    NoGameProposed,
    /// The latest game's claimed block is behind the withdrawal
    GameBehind { blocks_remaining: u64 },
}

/// Action to prove a withdrawal on L1.
pub struct ProveAction<P1, P2> {
    l1_provider: P1,
    l2_provider: P2,
    action: Prove,
}

impl<P1, P2> ProveAction<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    pub const fn new(l1_provider: P1, l2_provider: P2, action: Prove) -> Self {
        Self {
            l1_provider,
            l2_provider,
            action,
        }
    }

    /// Get the withdrawal hash for this action.
    pub const fn withdrawal_hash(&self) -> WithdrawalHash {
        self.action.record.hash
    }

    async fn check_is_proven(&self) -> eyre::Result<bool> {
        let state = WithdrawalStateProvider::new(
            self.l1_provider.clone(),
            self.l2_provider.clone(),
            self.action.portal_address,
        );

        let proven = state
            .is_proven(self.action.record.hash, self.action.from)
            .await?;

        Ok(proven.is_some())
    }

    /// Readiness plus the game a ready proof would anchor to.
    async fn disposition(&self) -> eyre::Result<(Readiness<ProveWait>, Option<LatestGame>)> {
        if self.check_is_proven().await? {
            return Ok((Readiness::Completed, None));
        }

        let Some(game) = find_latest_game(
            &self.l1_provider,
            self.action.factory_address,
            self.action.portal_address,
        )
        .await?
        else {
            return Ok((Readiness::Waiting(ProveWait::NoGameProposed), None));
        };

        if game.l2_block < self.action.record.block_number {
            let blocks_remaining = self.action.record.block_number - game.l2_block;
            return Ok((
                Readiness::Waiting(ProveWait::GameBehind { blocks_remaining }),
                Some(game),
            ));
        }

        Ok((Readiness::Ready, Some(game)))
    }
}

impl<P1, P2> Action for ProveAction<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    type Wait = ProveWait;

    async fn check(&self) -> eyre::Result<Readiness<ProveWait>> {
        let (readiness, _) = self.disposition().await?;
        Ok(readiness)
    }

    async fn execute(&mut self) -> eyre::Result<Outcome<ProveWait>> {
        let game = match self.disposition().await? {
            (Readiness::Ready, Some(game)) => game,
            (Readiness::Ready, None) => unreachable!("ready disposition always carries a game"),
            (Readiness::Waiting(wait), _) => return Ok(Outcome::Waiting(wait)),
            (Readiness::Completed, _) => return Ok(Outcome::AlreadyCompleted),
        };

        info!(
            withdrawal_hash = %self.action.record.hash,
            l2_block = self.action.record.block_number,
            game_index = %game.index,
            game_l2_block = game.l2_block,
            "generating withdrawal proof"
        );

        let params = prove_params(
            &self.l2_provider,
            self.action.record.transaction.clone(),
            self.action.record.hash,
            &game,
        )
        .await?;

        info!(
            dispute_game_index = %params.dispute_game_index,
            proof_nodes = params.withdrawal_proof.len(),
            "proof generated, submitting to L1"
        );

        let portal = IOptimismPortal2::new(self.action.portal_address, &self.l1_provider);
        let call = portal.proveWithdrawalTransaction(
            params.withdrawal,
            params.dispute_game_index,
            params.output_root_proof,
            params.withdrawal_proof,
        );
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
            withdrawal_hash = %self.action.record.hash,
            "withdrawal proven on L1"
        );

        Ok(Outcome::Executed(tx_result(&receipt)))
    }

    fn description(&self) -> String {
        format!("Proving withdrawal {} on L1", self.action.record.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockProvider;
    use alloy_primitives::{address, b256, Bytes, U256};
    use binding::opstack::WithdrawalTransaction;

    fn create_test_prove_action() -> ProveAction<MockProvider, MockProvider> {
        let prove = Prove {
            portal_address: address!("0d83dab629f0e0F9d36c0Cbc89B69a489f0751bD"),
            factory_address: address!("eff73e5aa3B9AEC32c659Aa3E00444d20a84394b"),
            record: WithdrawalRecord {
                transaction: WithdrawalTransaction {
                    nonce: U256::from(1),
                    sender: address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"),
                    target: address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"),
                    value: U256::from(1000000000000000u64), // 0.001 ETH
                    gasLimit: U256::from(100000),
                    data: Bytes::new(),
                },
                hash: b256!("1111111111111111111111111111111111111111111111111111111111111111"),
                tx_hash: b256!("2222222222222222222222222222222222222222222222222222222222222222"),
                block_number: 42276959,
                timestamp: 1_700_000_000,
                bridge: None,
            },
            from: address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"),
        };

        ProveAction::new(MockProvider, MockProvider, prove)
    }

    #[test]
    fn test_prove_action_description() {
        let action = create_test_prove_action();
        let desc = action.description();
        assert!(desc.contains("Proving withdrawal"));
        assert!(desc.contains("1111111111111111111111111111111111111111111111111111111111111111"));
    }

    #[test]
    fn test_prove_action_withdrawal_hash() {
        let action = create_test_prove_action();
        assert_eq!(
            action.withdrawal_hash(),
            b256!("1111111111111111111111111111111111111111111111111111111111111111")
        );
    }
}
