//! Configuration types for the withdrawal tool.
//!
//! This crate provides:
//! - Network configurations (OP Mainnet, OP Sepolia)
//! - L1 contract addresses per network
//! - A builder for custom/devnet deployments

pub mod network;

pub use network::{L1Config, L2Config, NetworkConfig, NetworkConfigBuilder, NetworkType};
