//! Chain readiness gate.
//!
//! Polls endpoints until each reports a non-genesis head. Used before any
//! withdrawal operation so commands fail with a clear timeout instead of
//! obscure RPC errors when a devnet is still starting up.

use crate::ClientError;
use alloy_provider::Provider;
use alloy_rpc_types_eth::BlockNumberOrTag;
use std::{collections::HashSet, time::Duration};
use tracing::{debug, warn};

/// Interval between readiness sweeps.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Wait until every client has produced at least one block.
///
/// `ready` is the caller-owned accumulator of endpoint indices that already
/// reported block production; endpoints in it are not re-polled. Passing a
/// fresh set starts an independent wait; passing a previous wait's set
/// resumes it.
///
/// Per-tick RPC errors are logged and tolerated. Returns
/// [`ClientError::ReadyTimeout`] if the deadline elapses first.
pub async fn wait_for_chains_start<P>(
    clients: &[P],
    ready: &mut HashSet<usize>,
    deadline: Duration,
) -> Result<(), ClientError>
where
    P: Provider,
{
    match tokio::time::timeout(deadline, sweep_until_ready(clients, ready)).await {
        Ok(()) => Ok(()),
        Err(_) => Err(ClientError::ReadyTimeout {
            waited_secs: deadline.as_secs(),
        }),
    }
}

async fn sweep_until_ready<P>(clients: &[P], ready: &mut HashSet<usize>)
where
    P: Provider,
{
    let mut ticker = tokio::time::interval(POLL_INTERVAL);

    loop {
        ticker.tick().await;

        for (index, client) in clients.iter().enumerate() {
            // Skip clients that already reported block production
            if ready.contains(&index) {
                continue;
            }

            match client.get_block_by_number(BlockNumberOrTag::Latest).await {
                Ok(Some(block)) => {
                    if block.header.number > 0 {
                        debug!(endpoint = index, head = block.header.number, "chain ready");
                        ready.insert(index);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(endpoint = index, error = %e, "received error fetching header");
                }
            }
        }

        if ready.len() == clients.len() {
            return;
        }
    }
}
