use std::path::PathBuf;

use bridge_codemap::{CodeEntry, CodeError, Codemap};
use bridge_relayer::{
    config::{DEFAULT_DESTINATION_POLL_INTERVAL, DEFAULT_SYNC_CHUNK_SIZE},
    ContractEntry, DestinationRpcConfig, RelayConfig, SourceRpcConfig,
};
use bridge_sm::config::DEFAULT_CONFIRMATIONS;
use serde::{Deserialize, Serialize};

/// The configuration values that dictate the behavior of the relayer.
///
/// `confirmations` and `codes` must match what the destination chain runs with; in standalone
/// mode they define it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RelayerConfig {
    /// The directory the embedded chain keeps its state in, in standalone mode.
    pub datadir: PathBuf,

    /// Headers per update transaction while catching up.
    #[serde(default = "default_sync_chunk_size")]
    pub sync_chunk_size: usize,

    /// Depth at which source headers are final.
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,

    /// Worker threads of the runtime.
    pub num_threads: Option<u8>,

    /// Stack size of the runtime's threads, in bytes.
    pub thread_stack_size: Option<usize>,

    /// The source chain's JSON-RPC endpoint.
    pub source: SourceRpcConfig,

    /// The destination chain's Tendermint RPC endpoint. Required in relay mode.
    pub destination: Option<DestinationRpcConfig>,

    /// Code identifiers and the built-in kinds they stand for.
    #[serde(default)]
    pub codes: Vec<CodeEntry>,

    /// Contracts to register and watch.
    #[serde(default)]
    pub contracts: Vec<ContractEntry>,
}

fn default_sync_chunk_size() -> usize {
    DEFAULT_SYNC_CHUNK_SIZE
}

fn default_confirmations() -> u64 {
    DEFAULT_CONFIRMATIONS
}

impl RelayerConfig {
    /// Builds the code registry.
    pub(crate) fn codemap(&self) -> Result<Codemap, CodeError> {
        Codemap::from_entries(&self.codes)
    }

    /// Parameters of the relay loops.
    pub(crate) fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            sync_chunk_size: self.sync_chunk_size.max(1),
            destination_poll_interval: self
                .destination
                .as_ref()
                .map(|dest| dest.poll_interval)
                .unwrap_or(DEFAULT_DESTINATION_POLL_INTERVAL),
            contracts: self.contracts.clone(),
        }
    }
}
