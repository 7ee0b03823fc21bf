//! Relays source-chain headers and proven events to the destination chain.
//!
//! The [`RelayOrchestrator`] follows the source chain through a [`SourceChain`] client, keeps the
//! destination's header chain current, and posts a proof for every watched event once its block
//! is final. All writes to the destination go through one [`Submitter`].

pub mod config;
pub mod destination;
pub mod errors;
pub mod eth_rpc;
pub mod local;
mod orchestrator;
pub mod source;
mod submitter;
pub mod subscription;
pub mod tendermint;

pub use config::{ContractEntry, DestinationRpcConfig, RelayConfig, SourceRpcConfig};
pub use destination::{DestinationChain, DestinationExt};
pub use errors::{DestinationError, RelayerError, SourceError};
pub use eth_rpc::EthRpcSource;
pub use local::LocalChain;
pub use orchestrator::{destination_loop, RelayOrchestrator};
pub use source::{LocatedLog, SourceChain};
pub use submitter::Submitter;
pub use tendermint::TendermintRpc;
