//! Network configuration for withdrawal operations.
//!
//! Provides the L1 contract addresses and chain parameters for the networks
//! this tool can drive (OP Mainnet, OP Sepolia, custom devnets).

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

/// Network type (mainnet or testnet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkType {
    Mainnet,
    Testnet,
}

/// L1 (settlement) chain configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct L1Config {
    /// Chain ID
    pub chain_id: u64,
    /// OptimismPortal2 proxy address
    pub portal: Address,
    /// DisputeGameFactory proxy address
    pub dispute_game_factory: Address,
    /// L1StandardBridge proxy address
    pub standard_bridge: Address,
    /// Block time in seconds (12 for Ethereum mainnet)
    pub block_time_secs: u64,
}

impl L1Config {
    /// Ethereum mainnet configuration (OP Mainnet deployment).
    pub const fn mainnet() -> Self {
        Self {
            chain_id: 1,
            // https://etherscan.io/address/0xbEb5Fc579115071764c7423A4f12eDde41f106Ed
            portal: address!("0xbeb5fc579115071764c7423a4f12edde41f106ed"),
            // https://etherscan.io/address/0xe5965Ab5962eDc7477C8520243A95517CD252fA9
            dispute_game_factory: address!("0xe5965ab5962edc7477c8520243a95517cd252fa9"),
            // https://etherscan.io/address/0x99C9fc46f92E8a1c0deC1b1747d010903E884bE1
            standard_bridge: address!("0x99c9fc46f92e8a1c0dec1b1747d010903e884be1"),
            block_time_secs: 12,
        }
    }

    /// Ethereum Sepolia configuration (OP Sepolia deployment).
    pub const fn sepolia() -> Self {
        Self {
            chain_id: 11155111,
            // https://sepolia.etherscan.io/address/0x16Fc5058F25648194471939df75CF27A2fdC48BC
            portal: address!("0x16fc5058f25648194471939df75cf27a2fdc48bc"),
            // https://sepolia.etherscan.io/address/0x05F9613aDB30026FFd634f38e5C4dFd30a197Fa1
            dispute_game_factory: address!("0x05f9613adb30026ffd634f38e5c4dfd30a197fa1"),
            // https://sepolia.etherscan.io/address/0xFBb0621E0B23b5478B630BD55a5f21f67730B0F1
            standard_bridge: address!("0xfbb0621e0b23b5478b630bd55a5f21f67730b0f1"),
            block_time_secs: 12,
        }
    }
}

/// L2 (execution) chain configuration. Withdrawal contracts on L2 are
/// predeploys at fixed addresses, so only chain parameters live here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct L2Config {
    /// Chain ID
    pub chain_id: u64,
    /// Block time in seconds (2 for OP Stack chains)
    pub block_time_secs: u64,
}

impl L2Config {
    /// OP Mainnet configuration.
    pub const fn mainnet() -> Self {
        Self {
            chain_id: 10,
            block_time_secs: 2,
        }
    }

    /// OP Sepolia configuration.
    pub const fn sepolia() -> Self {
        Self {
            chain_id: 11155420,
            block_time_secs: 2,
        }
    }
}

/// Complete network configuration for withdrawal operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network type (mainnet or testnet)
    pub network_type: NetworkType,
    /// L1 configuration
    pub l1: L1Config,
    /// L2 configuration
    pub l2: L2Config,
}

impl NetworkConfig {
    /// Create mainnet configuration.
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            l1: L1Config::mainnet(),
            l2: L2Config::mainnet(),
        }
    }

    /// Create testnet (Sepolia) configuration.
    pub const fn sepolia() -> Self {
        Self {
            network_type: NetworkType::Testnet,
            l1: L1Config::sepolia(),
            l2: L2Config::sepolia(),
        }
    }

    /// Create configuration from network type.
    pub const fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::sepolia(),
        }
    }
}

/// Builder for custom network configurations (devnets and forks keep the
/// predeploys but deploy their own L1 contracts).
#[derive(Debug, Clone)]
pub struct NetworkConfigBuilder {
    network_type: NetworkType,
    l1: L1Config,
    l2: L2Config,
}

impl NetworkConfigBuilder {
    /// Start with mainnet defaults.
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            l1: L1Config::mainnet(),
            l2: L2Config::mainnet(),
        }
    }

    /// Start with testnet defaults.
    pub const fn testnet() -> Self {
        Self {
            network_type: NetworkType::Testnet,
            l1: L1Config::sepolia(),
            l2: L2Config::sepolia(),
        }
    }

    /// Override the OptimismPortal2 address.
    pub const fn portal(mut self, address: Address) -> Self {
        self.l1.portal = address;
        self
    }

    /// Override the DisputeGameFactory address.
    pub const fn dispute_game_factory(mut self, address: Address) -> Self {
        self.l1.dispute_game_factory = address;
        self
    }

    /// Override the L1StandardBridge address.
    pub const fn standard_bridge(mut self, address: Address) -> Self {
        self.l1.standard_bridge = address;
        self
    }

    /// Override the L1 chain id.
    pub const fn l1_chain_id(mut self, chain_id: u64) -> Self {
        self.l1.chain_id = chain_id;
        self
    }

    /// Override the L2 chain id.
    pub const fn l2_chain_id(mut self, chain_id: u64) -> Self {
        self.l2.chain_id = chain_id;
        self
    }

    /// Build the network configuration.
    pub const fn build(self) -> NetworkConfig {
        NetworkConfig {
            network_type: self.network_type,
            l1: self.l1,
            l2: self.l2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_config() {
        let config = NetworkConfig::mainnet();
        assert_eq!(config.l1.chain_id, 1);
        assert_eq!(config.l2.chain_id, 10);
        assert_eq!(config.network_type, NetworkType::Mainnet);
    }

    #[test]
    fn test_sepolia_config() {
        let config = NetworkConfig::sepolia();
        assert_eq!(config.l1.chain_id, 11155111);
        assert_eq!(config.l2.chain_id, 11155420);
        assert_eq!(config.network_type, NetworkType::Testnet);
    }

    #[test]
    fn test_custom_config_builder() {
        let custom_portal = address!("1111111111111111111111111111111111111111");

        let config = NetworkConfigBuilder::testnet()
            .portal(custom_portal)
            .l1_chain_id(900)
            .l2_chain_id(901)
            .build();

        assert_eq!(config.l1.portal, custom_portal);
        assert_eq!(config.l1.chain_id, 900);
        assert_eq!(config.l2.chain_id, 901);
        assert_eq!(config.network_type, NetworkType::Testnet);
    }
}
