use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional file-based configuration.
///
/// Every field can also be given as a CLI flag; flags win over the file,
/// the file wins over the `--network` preset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    /// L1 RPC endpoint url
    pub l1_rpc_url: Option<String>,

    /// L2 RPC endpoint url
    pub l2_rpc_url: Option<String>,

    /// L1 OptimismPortal2 address
    pub portal_address: Option<Address>,

    /// L1 DisputeGameFactory address
    pub dispute_game_factory_address: Option<Address>,
}

impl FileConfig {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }
}
