//! Chain connection layer.
//!
//! Provider construction (read-only and wallet-backed), the chain readiness
//! gate, and the gas-padded confirm-or-fail transaction submitter.

pub mod ready;
pub mod submit;

use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Default deadline for the readiness gate when connecting.
pub const DEFAULT_READY_DEADLINE: Duration = Duration::from_secs(120);

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error talking to the RPC endpoint
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error with private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// The readiness deadline elapsed before every endpoint produced a block
    #[error("timed out after {waited_secs}s waiting for all chains to report block production")]
    ReadyTimeout { waited_secs: u64 },
}

/// Convenience function to create an ethereum rpc provider from url.
pub fn create_provider(rpc_url: &str) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider)
}

/// Create a provider with wallet signing capability from a private key.
///
/// Returns the provider together with the signing address.
pub fn create_wallet_provider(
    rpc_url: &str,
    private_key: &str,
) -> Result<(impl Provider + Clone, Address), ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;

    let signer: PrivateKeySigner = private_key
        .parse()
        .map_err(|e| ClientError::InvalidPrivateKey(format!("{}", e)))?;
    let account = signer.address();

    let wallet = EthereumWallet::from(signer);
    let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

    Ok((provider, account))
}

/// Connect to an endpoint: build a provider, wait for the chain to produce
/// blocks, and fetch its chain id.
pub async fn connect(
    rpc_url: &str,
    deadline: Duration,
) -> Result<(impl Provider + Clone, u64), ClientError> {
    let provider = create_provider(rpc_url)?;

    let mut ready = std::collections::HashSet::new();
    ready::wait_for_chains_start(std::slice::from_ref(&provider), &mut ready, deadline).await?;

    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| ClientError::Connection(format!("{}", e)))?;

    info!(url = rpc_url, chain_id, "connected to chain");

    Ok((provider, chain_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url() {
        let result = create_provider("not a url");
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn test_invalid_private_key() {
        let result = create_wallet_provider("http://localhost:8545", "zz-not-a-key");
        assert!(matches!(result, Err(ClientError::InvalidPrivateKey(_))));
    }
}
