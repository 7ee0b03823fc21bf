//! Relayer configuration.

use std::time::Duration;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Number of headers submitted per transaction while catching up.
pub const DEFAULT_SYNC_CHUNK_SIZE: usize = 10;

/// Interval at which the destination's height is polled.
pub const DEFAULT_DESTINATION_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// A source contract to register and watch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractEntry {
    /// Contract address on the source chain.
    pub address: Address,

    /// Code identifier it is registered under.
    pub code: String,
}

/// Parameters of the relay loops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Headers per update transaction while catching up.
    pub sync_chunk_size: usize,

    /// Interval at which the destination loop polls.
    pub destination_poll_interval: Duration,

    /// Contracts to register and watch.
    pub contracts: Vec<ContractEntry>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            sync_chunk_size: DEFAULT_SYNC_CHUNK_SIZE,
            destination_poll_interval: DEFAULT_DESTINATION_POLL_INTERVAL,
            contracts: Vec::new(),
        }
    }
}

/// Connection to the source chain's JSON-RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRpcConfig {
    /// HTTP URL of the node.
    pub url: String,

    /// Interval at which the node is polled for new heads.
    pub poll_interval: Duration,
}

/// Connection to the destination chain's Tendermint RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationRpcConfig {
    /// HTTP URL of the node.
    pub url: String,

    /// Interval at which the node's height is polled.
    pub poll_interval: Duration,
}
