//! Prove-parameter generation for L2→L1 withdrawals.
//!
//! Produces everything `OptimismPortal2.proveWithdrawalTransaction` needs:
//! the storage proof that the withdrawal is recorded in the message passer
//! at the dispute game's claimed L2 block, and the output root preimage for
//! that block.

use crate::{game::LatestGame, types::WithdrawalHash};
use alloy_contract::private::Provider;
use alloy_primitives::{keccak256, Bytes, B256, U256};
use alloy_rpc_types_eth::BlockNumberOrTag;
use binding::opstack::{
    OutputRootProof, WithdrawalTransaction, MESSAGE_PASSER_ADDRESS, OUTPUT_VERSION_V0,
};
use eyre::{eyre, Result};
use tracing::debug;

/// Parameters for the portal's prove call.
#[derive(Debug, Clone)]
pub struct ProveParams {
    pub withdrawal: WithdrawalTransaction,
    pub dispute_game_index: U256,
    pub output_root_proof: OutputRootProof,
    pub withdrawal_proof: Vec<Bytes>,
}

/// Generate prove parameters against an anchored dispute game.
///
/// The caller has already located the game and checked that its claimed L2
/// block covers the withdrawal; the proof must be generated at the *game's*
/// block, not the withdrawal's, so it matches the claimed state.
pub async fn prove_params<P>(
    l2_provider: &P,
    withdrawal: WithdrawalTransaction,
    withdrawal_hash: WithdrawalHash,
    game: &LatestGame,
) -> Result<ProveParams>
where
    P: Provider + Clone,
{
    debug!(
        block = game.l2_block,
        "fetching L2 block header at the game's claimed block"
    );
    let block = l2_provider
        .get_block_by_number(BlockNumberOrTag::Number(game.l2_block))
        .await?
        .ok_or_else(|| eyre!("Block not found: {}", game.l2_block))?;

    let state_root = block.header.state_root;
    let block_hash = block.header.hash;

    let storage_slot = compute_storage_slot(withdrawal_hash);
    debug!(
        block = game.l2_block,
        slot = %storage_slot,
        "generating storage proof"
    );
    let proof_result = l2_provider
        .get_proof(MESSAGE_PASSER_ADDRESS, vec![storage_slot])
        .block_id(BlockNumberOrTag::Number(game.l2_block).into())
        .await?;

    let message_passer_storage_root = proof_result.storage_hash;
    let withdrawal_proof = proof_result
        .storage_proof
        .first()
        .ok_or_else(|| eyre!("No storage proof returned"))?
        .proof
        .clone();

    debug!(
        proof_nodes = withdrawal_proof.len(),
        "generated storage proof"
    );

    let output_root_proof = OutputRootProof {
        version: OUTPUT_VERSION_V0,
        stateRoot: state_root,
        messagePasserStorageRoot: message_passer_storage_root,
        latestBlockhash: block_hash,
    };

    Ok(ProveParams {
        withdrawal,
        dispute_game_index: game.index,
        output_root_proof,
        withdrawal_proof,
    })
}

/// Storage slot of a withdrawal hash in the message passer's
/// `mapping(bytes32 => bool) sentMessages` (slot 0):
/// `keccak256(withdrawalHash ++ uint256(0))`.
pub fn compute_storage_slot(withdrawal_hash: B256) -> B256 {
    let mut data = [0u8; 64];
    data[0..32].copy_from_slice(withdrawal_hash.as_slice());
    // data[32..64] stays zero: the mapping lives at slot 0
    keccak256(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_slot_deterministic() {
        let hash = B256::from([1u8; 32]);
        assert_eq!(compute_storage_slot(hash), compute_storage_slot(hash));
        assert_ne!(
            compute_storage_slot(hash),
            compute_storage_slot(B256::from([2u8; 32]))
        );
    }

    #[test]
    fn test_storage_slot_is_keyed_at_slot_zero() {
        // keccak256(hash ++ 0x00..00)
        let slot = compute_storage_slot(B256::ZERO);
        assert_eq!(slot, keccak256([0u8; 64]));
    }
}
