use alloy_primitives::{Address, TxHash, B256, U256};
use binding::opstack::WithdrawalTransaction;
use std::fmt;

pub type WithdrawalHash = B256;

/// Lifecycle stage of a withdrawal, derived from on-chain facts.
///
/// The ordering is the promotion order; on-chain state only ever moves a
/// withdrawal forward through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WithdrawalStatus {
    /// The initiating event exists on L2
    Initialized,
    /// An anchored dispute game covers the withdrawal's L2 block
    Provable,
    /// A proof has been submitted to the portal
    Proven,
    /// The root-claim subgame of the proof's dispute game is resolved
    ClaimResolved,
    /// The dispute game itself is resolved
    GameResolved,
    /// The portal has executed the withdrawal
    Finalized,
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initialized => "initialized",
            Self::Provable => "provable",
            Self::Proven => "proven",
            Self::ClaimResolved => "claim-resolved",
            Self::GameResolved => "game-resolved",
            Self::Finalized => "finalized",
        };
        f.write_str(name)
    }
}

/// Token details attached when a withdrawal was observed via the standard
/// bridge scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeDetails {
    pub l1_token: Address,
    pub l2_token: Address,
    pub amount: U256,
}

/// One observed withdrawal. Immutable once read from the chain.
#[derive(Debug, Clone)]
pub struct WithdrawalRecord {
    /// The withdrawal transaction as committed to by the message passer
    pub transaction: WithdrawalTransaction,
    /// Content hash, checked against the event's own hash on extraction
    pub hash: WithdrawalHash,
    /// L2 transaction that initiated the withdrawal
    pub tx_hash: TxHash,
    /// L2 block the withdrawal was included in
    pub block_number: u64,
    /// Timestamp of that block
    pub timestamp: u64,
    /// Present when the record came from the standard-bridge scan
    pub bridge: Option<BridgeDetails>,
}

impl WithdrawalRecord {
    /// Sequence number with the version bits masked off.
    pub fn nonce(&self) -> U256 {
        decode_versioned_nonce(self.transaction.nonce)
    }
}

/// Proven-withdrawal record from the portal, keyed by (hash, prover).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvenRecord {
    /// Timestamp the proof landed; zero means not proven
    pub timestamp: u64,
    /// Dispute game the proof was anchored to
    pub dispute_game_proxy: Address,
}

/// Snapshot of a dispute game's clock and resolution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameFacts {
    pub created_at: u64,
    pub status: u8,
    /// Zero while the game is unresolved
    pub resolved_at: u64,
    pub max_clock_duration: u64,
    pub challenger_duration: u64,
    /// Whether the root-claim subgame has been resolved
    pub subgame_resolved: bool,
}

impl GameFacts {
    /// The challenge window has run out and the root claim is resolvable.
    pub const fn challenge_window_elapsed(&self) -> bool {
        self.challenger_duration >= self.max_clock_duration
    }
}

/// Number of low bits carrying the sequence number in a versioned nonce;
/// the 16 bits above them carry the encoding version.
const NONCE_BITS: usize = 240;

/// Strip the version from a versioned message nonce, keeping the low 240
/// bits.
pub fn decode_versioned_nonce(nonce: U256) -> U256 {
    let mask = (U256::from(1u8) << NONCE_BITS) - U256::from(1u8);
    nonce & mask
}

/// The encoding version from the top 16 bits of a versioned nonce.
pub fn nonce_version(nonce: U256) -> u16 {
    (nonce >> NONCE_BITS).to::<u16>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_versioned_nonce_masks_version() {
        // Version marker at bit 240 plus a small sequence number in bits 0-3
        let nonce = (U256::from(1u8) << 240) | U256::from(0b1111u8);
        assert_eq!(decode_versioned_nonce(nonce), U256::from(15u8));
        assert_eq!(nonce_version(nonce), 1);
    }

    #[test]
    fn test_decode_versioned_nonce_unversioned() {
        let nonce = U256::from(2072u64);
        assert_eq!(decode_versioned_nonce(nonce), nonce);
        assert_eq!(nonce_version(nonce), 0);
    }

    #[test]
    fn test_decode_versioned_nonce_keeps_all_low_bits() {
        // All 240 sequence bits set survive the mask, all version bits drop
        let low = (U256::from(1u8) << 240) - U256::from(1u8);
        let nonce = low | (U256::from(0xffffu16) << 240);
        assert_eq!(decode_versioned_nonce(nonce), low);
        assert_eq!(nonce_version(nonce), 0xffff);
    }

    #[test]
    fn test_status_ordering() {
        use WithdrawalStatus::*;
        assert!(Initialized < Provable);
        assert!(Provable < Proven);
        assert!(Proven < ClaimResolved);
        assert!(ClaimResolved < GameResolved);
        assert!(GameResolved < Finalized);
    }

    #[test]
    fn test_challenge_window_elapsed() {
        let mut game = GameFacts {
            max_clock_duration: 302_400,
            challenger_duration: 302_399,
            ..Default::default()
        };
        assert!(!game.challenge_window_elapsed());

        game.challenger_duration = 302_400;
        assert!(game.challenge_window_elapsed());
    }
}
