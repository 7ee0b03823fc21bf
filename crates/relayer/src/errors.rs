//! Relayer errors.

use bridge_codemap::CodeError;
use bridge_primitives::header::HeaderDecodeError;
use bridge_receipt_proof::ProofError;
use bridge_sm::TxResult;
use thiserror::Error;

/// Errors raised by a source-chain client.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The RPC call failed.
    #[error("rpc: {0}")]
    Rpc(#[from] jsonrpsee::core::ClientError),

    /// A header returned by the node does not decode.
    #[error("header: {0}")]
    Header(#[from] HeaderDecodeError),

    /// A receipt returned by the node does not decode.
    #[error("receipt: {0}")]
    Receipt(#[from] alloy_rlp::Error),

    /// The node does not know the block.
    #[error("block {0} not found")]
    BlockNotFound(u64),
}

/// Errors raised by a destination-chain client.
#[derive(Debug, Error)]
pub enum DestinationError {
    /// The RPC call failed.
    #[error("rpc: {0}")]
    Rpc(#[from] jsonrpsee::core::ClientError),

    /// The node answered with something that does not decode.
    #[error("unexpected response: {0}")]
    Response(String),

    /// A stored value does not decode.
    #[error("codec: {0}")]
    Codec(#[from] bincode::Error),

    /// The query itself failed on the node.
    #[error("query failed with code {code}: {log}")]
    Query {
        /// ABCI code.
        code: u32,
        /// Node log line.
        log: String,
    },

    /// The embedded state machine failed.
    #[error("local chain: {0}")]
    Local(String),
}

impl From<base64::DecodeError> for DestinationError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Response(err.to_string())
    }
}

/// Errors that stop, or interrupt, a relay loop.
#[derive(Debug, Error)]
pub enum RelayerError {
    /// The source chain failed.
    #[error("source: {0}")]
    Source(#[from] SourceError),

    /// The destination chain failed.
    #[error("destination: {0}")]
    Destination(#[from] DestinationError),

    /// The header subscription ended.
    #[error("header subscription closed")]
    SubscriptionClosed,

    /// The submission task is gone.
    #[error("submitter aborted")]
    SubmitterAborted,

    /// A transaction could not be encoded.
    #[error("encoding: {0}")]
    Encoding(#[from] bincode::Error),

    /// A configured code or contract is invalid.
    #[error("code: {0}")]
    Code(#[from] CodeError),

    /// A receipt proof could not be built.
    #[error("proof: {0}")]
    Proof(#[from] ProofError),

    /// A located log is absent from the receipt it was reported in.
    #[error("log not found in receipt {tx_index} of block {block}")]
    LogNotInReceipt {
        /// Height of the block.
        block: u64,
        /// Position of the receipt in the block.
        tx_index: u64,
    },

    /// A header the destination reports as finalized could not be read back.
    #[error("finalized header {0} missing on destination")]
    MissingFinalized(u64),

    /// The destination refused a transaction the relayer cannot do without.
    #[error("rejected: {0}")]
    Rejected(TxResult),
}

impl RelayerError {
    /// Whether the loop must stop rather than carry on with the next header.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SubscriptionClosed | Self::SubmitterAborted | Self::Encoding(_)
        )
    }
}
