//! Dispute game lookups.
//!
//! Finds the newest anchored game of the portal's respected type and reads
//! per-game clock/resolution snapshots.

use crate::types::GameFacts;
use alloy_contract::private::Provider;
use alloy_primitives::{Address, B256, U256};
use binding::opstack::{IDisputeGameFactory, IFaultDisputeGame, IOptimismPortal2};
use eyre::eyre;
use tracing::debug;

/// The newest game of the respected type known to the factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestGame {
    /// Factory-assigned, monotonic index
    pub index: U256,
    /// Game proxy address (unpacked from the factory's GameId)
    pub address: Address,
    /// Creation timestamp
    pub timestamp: u64,
    /// L2 block the game claims state for
    pub l2_block: u64,
}

/// Unpack the proxy address from a GameId.
///
/// GameId layout: game type (32 bits) | creation timestamp (64 bits) |
/// proxy address (160 bits).
pub fn game_proxy_address(metadata: B256) -> Address {
    Address::from_slice(&metadata.as_slice()[12..32])
}

/// Decode the claimed L2 block number from a game's extra data.
///
/// The first 32 bytes are the big-endian claimed block number.
pub fn decode_extra_data_block(extra_data: &[u8]) -> eyre::Result<u64> {
    if extra_data.len() < 32 {
        eyre::bail!(
            "game extra data too short: {} bytes, expected at least 32",
            extra_data.len()
        );
    }

    let claimed = U256::from_be_slice(&extra_data[0..32]);
    u64::try_from(claimed).map_err(|_| eyre!("claimed L2 block number {claimed} overflows u64"))
}

/// Find the newest game of the portal's respected type.
///
/// Returns `None` when no such game exists yet; withdrawals then stay
/// unprovable, which is expected on young deployments rather than an error.
pub async fn find_latest_game<P>(
    l1_provider: &P,
    factory_address: Address,
    portal_address: Address,
) -> eyre::Result<Option<LatestGame>>
where
    P: Provider + Clone,
{
    let portal = IOptimismPortal2::new(portal_address, l1_provider);
    let game_type = portal.respectedGameType().call().await?;

    let factory = IDisputeGameFactory::new(factory_address, l1_provider);
    let game_count = factory.gameCount().call().await?;
    if game_count == U256::ZERO {
        return Ok(None);
    }

    let start = game_count - U256::from(1u8);
    let games = factory
        .findLatestGames(game_type, start, U256::from(1u8))
        .call()
        .await?;

    let Some(game) = games.first() else {
        // Games exist but none of the respected type
        return Ok(None);
    };

    let l2_block = decode_extra_data_block(&game.extraData)?;
    let address = game_proxy_address(game.metadata);

    debug!(
        game_type,
        index = %game.index,
        %address,
        l2_block,
        "found latest anchored game"
    );

    Ok(Some(LatestGame {
        index: game.index,
        address,
        timestamp: game.timestamp,
        l2_block,
    }))
}

/// Check that the factory has an implementation registered for a game type.
pub async fn game_implementation_registered<P>(
    l1_provider: &P,
    factory_address: Address,
    game_type: u32,
) -> eyre::Result<bool>
where
    P: Provider + Clone,
{
    let factory = IDisputeGameFactory::new(factory_address, l1_provider);
    let implementation = factory.gameImpls(game_type).call().await?;
    Ok(implementation != Address::ZERO)
}

/// Snapshot a dispute game's clock and resolution state.
///
/// Claim index 0 is the root claim; its subgame gates the overall
/// resolution.
pub async fn read_game_facts<P>(l1_provider: &P, game_address: Address) -> eyre::Result<GameFacts>
where
    P: Provider + Clone,
{
    let game = IFaultDisputeGame::new(game_address, l1_provider);

    let created_at = game.createdAt().call().await?;
    let status = game.status().call().await?;
    let resolved_at = game.resolvedAt().call().await?;
    let max_clock_duration = game.maxClockDuration().call().await?;
    let challenger_duration = game.getChallengerDuration(U256::ZERO).call().await?;
    let subgame_resolved = game.resolvedSubgames(U256::ZERO).call().await?;

    Ok(GameFacts {
        created_at,
        status,
        resolved_at,
        max_clock_duration,
        challenger_duration,
        subgame_resolved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};

    #[test]
    fn test_decode_extra_data_block() {
        let mut extra = [0u8; 32];
        extra[24..32].copy_from_slice(&42_276_959u64.to_be_bytes());
        assert_eq!(decode_extra_data_block(&extra).unwrap(), 42_276_959);
    }

    #[test]
    fn test_decode_extra_data_with_trailing_bytes() {
        // Some game types append data after the block number; only the
        // 32-byte prefix matters.
        let mut extra = vec![0u8; 64];
        extra[24..32].copy_from_slice(&7u64.to_be_bytes());
        extra[32..].fill(0xff);
        assert_eq!(decode_extra_data_block(&extra).unwrap(), 7);
    }

    #[test]
    fn test_decode_extra_data_too_short() {
        assert!(decode_extra_data_block(&[0u8; 31]).is_err());
    }

    #[test]
    fn test_decode_extra_data_overflow() {
        let extra = [0xffu8; 32];
        assert!(decode_extra_data_block(&extra).is_err());
    }

    #[test]
    fn test_game_proxy_address_unpacking() {
        let metadata =
            b256!("0000000100000000675c1f205cffa347b0ae99cc01e5c01714ca5658e54a23d1");
        assert_eq!(
            game_proxy_address(metadata),
            address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1")
        );
    }
}
