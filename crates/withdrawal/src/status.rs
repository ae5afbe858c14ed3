//! Withdrawal status classification.
//!
//! A pure projection from on-chain facts to a lifecycle stage. All chain
//! reads happen in [`crate::state`]; keeping the mapping free of I/O makes
//! the promotion logic testable against fixed snapshots.

use crate::types::{GameFacts, ProvenRecord, WithdrawalStatus};
use alloy_primitives::Address;

/// The facts a single classification is computed from.
///
/// Every field is a point-in-time read of remote state; the classifier never
/// mutates anything, so classifying the same snapshot twice yields the same
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFacts {
    /// L2 block the withdrawal was included in
    pub withdrawal_block: u64,
    /// Claimed L2 block of the latest anchored dispute game, `None` when no
    /// game of the respected type has ever been created
    pub anchored_l2_block: Option<u64>,
    /// Portal record for (withdrawal hash, prover)
    pub proven: Option<ProvenRecord>,
    /// Snapshot of the dispute game the proof was anchored to
    pub game: Option<GameFacts>,
    /// Portal's finalized-withdrawals flag for the hash
    pub finalized: bool,
}

/// Map a snapshot of facts to the single applicable status.
///
/// Promotions are checked independently so a later fact always dominates:
/// a finalized withdrawal classifies as `Finalized` even if the proof or
/// game records read stale in the same snapshot.
pub fn classify(facts: &StatusFacts) -> WithdrawalStatus {
    let mut status = WithdrawalStatus::Initialized;

    if let Some(anchored) = facts.anchored_l2_block {
        // Equality counts: the claimed state already includes the withdrawal.
        if anchored >= facts.withdrawal_block {
            status = WithdrawalStatus::Provable;
        }
    }

    if let Some(proven) = &facts.proven {
        if proven.timestamp != 0 && proven.dispute_game_proxy != Address::ZERO {
            status = WithdrawalStatus::Proven;

            if let Some(game) = &facts.game {
                if game.subgame_resolved {
                    status = WithdrawalStatus::ClaimResolved;
                }
                if game.resolved_at != 0 {
                    status = WithdrawalStatus::GameResolved;
                }
            }
        }
    }

    if facts.finalized {
        status = WithdrawalStatus::Finalized;
    }

    status
}
