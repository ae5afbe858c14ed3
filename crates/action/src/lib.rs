pub mod finalize;
pub mod init;
pub mod prove;
pub mod resolve;

use alloy_primitives::{TxHash, U256};
use std::future::Future;

/// Result of a submitted and confirmed transaction.
#[derive(Debug, Clone)]
pub struct TxResult {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block number where transaction was included
    pub block_number: Option<u64>,
    /// Gas used
    pub gas_used: Option<U256>,
}

pub(crate) fn tx_result(receipt: &alloy_rpc_types_eth::TransactionReceipt) -> TxResult {
    TxResult {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        gas_used: Some(U256::from(receipt.gas_used)),
    }
}

/// Disposition of an action derived from fresh chain reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness<W> {
    /// Preconditions hold; executing should submit a transaction
    Ready,
    /// Preconditions not met yet; retry later
    Waiting(W),
    /// The action's effect is already on chain
    Completed,
}

/// What one execution attempt did.
///
/// A precondition that does not hold is an outcome, not an error: callers
/// and tests can match on the typed reason instead of parsing log output.
#[derive(Debug, Clone)]
pub enum Outcome<W> {
    /// A transaction was submitted and confirmed
    Executed(TxResult),
    /// Nothing submitted: preconditions not met yet
    Waiting(W),
    /// Nothing submitted: the effect was already on chain
    AlreadyCompleted,
}

/// Trait for executable onchain actions.
pub trait Action: Send + Sync {
    /// Typed reason the action may decline to act.
    type Wait;

    /// Re-derive the action's disposition from fresh chain reads.
    fn check(&self) -> impl Future<Output = eyre::Result<Readiness<Self::Wait>>> + Send;

    /// Execute the action.
    ///
    /// Preconditions are re-checked immediately before submission so a
    /// concurrent actor advancing the same withdrawal turns into a
    /// [`Outcome::Waiting`] or [`Outcome::AlreadyCompleted`] instead of a
    /// wasted transaction.
    fn execute(&mut self) -> impl Future<Output = eyre::Result<Outcome<Self::Wait>>> + Send;

    /// Get a human-readable description of this action.
    fn description(&self) -> String;
}

#[cfg(test)]
pub(crate) mod test_utils {
    use alloy_provider::{network::Ethereum, Provider, RootProvider};

    /// Mock provider for unit tests that never reach the network.
    #[derive(Clone)]
    pub struct MockProvider;

    impl Provider for MockProvider {
        fn root(&self) -> &RootProvider<Ethereum> {
            todo!()
        }
    }
}
