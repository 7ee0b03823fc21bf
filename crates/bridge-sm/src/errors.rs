//! Errors raised while handling bridge transactions.

use alloy_primitives::Address;
use bridge_codemap::CodeError;
use bridge_db::DbError;
use bridge_header_chain::HeaderChainError;
use bridge_receipt_proof::ProofError;
use thiserror::Error;

use crate::result::{ResultCode, TxResult};

/// Reasons a transaction is rejected.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The transaction or something it carries does not decode or is self-inconsistent.
    #[error("malformed transaction: {0}")]
    Malformed(String),

    /// The header chain has no genesis yet.
    #[error("header chain not initialized")]
    NotInitialized,

    /// The headers are not linked or do not connect to the finalized frontier.
    #[error("non-contiguous header list: {0}")]
    NonContiguousHeaderList(String),

    /// The headers conflict with the finalized chain.
    #[error("conflicting chain at height {0}")]
    ConflictingChain(u64),

    /// The code identifier is unknown.
    #[error("invalid code {0}")]
    InvalidCode(String),

    /// The contract is already registered under another code.
    #[error("contract {address} is registered as {registered}, not {requested}")]
    ContractCodeMismatch {
        /// Contract address.
        address: Address,
        /// Code it is registered under.
        registered: String,
        /// Code requested by the transaction.
        requested: String,
    },

    /// The emitter of the proven log is not registered.
    #[error("contract {0} not registered")]
    ContractNotRegistered(Address),

    /// The code has no event of that name.
    #[error("invalid event name: {0}")]
    InvalidEventName(String),

    /// The log does not match the event's ABI.
    #[error("decode error: {0}")]
    Decode(String),

    /// The packet was applied before.
    #[error("packet {sequence} from {contract} already exists")]
    PacketAlreadyExists {
        /// Emitting contract.
        contract: Address,
        /// Packet sequence.
        sequence: u64,
    },

    /// The proof refers to a block that is not finalized.
    #[error("block {0} not finalized")]
    BlockNotFinalized(u64),

    /// The proof does not verify against the finalized header.
    #[error("receipt proof does not verify against block {0}")]
    InvalidProof(u64),

    /// A balance would overflow.
    #[error("balance overflow")]
    Overflow,

    /// The store failed.
    #[error("internal: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Status reported for this error.
    pub fn code(&self) -> ResultCode {
        match self {
            Self::Malformed(_) => ResultCode::Malformed,
            Self::NotInitialized => ResultCode::NotInitialized,
            Self::NonContiguousHeaderList(_) => ResultCode::NonContiguousHeaderList,
            Self::ConflictingChain(_) => ResultCode::ConflictingChain,
            Self::InvalidCode(_) => ResultCode::InvalidCode,
            Self::ContractCodeMismatch { .. } => ResultCode::ContractCodeMismatch,
            Self::ContractNotRegistered(_) => ResultCode::ContractNotRegistered,
            Self::InvalidEventName(_) => ResultCode::InvalidEventName,
            Self::Decode(_) => ResultCode::DecodeError,
            Self::PacketAlreadyExists { .. } => ResultCode::PacketAlreadyExists,
            Self::BlockNotFinalized(_) => ResultCode::BlockNotFinalized,
            Self::InvalidProof(_) => ResultCode::InvalidProof,
            Self::Overflow => ResultCode::Overflow,
            Self::Internal(_) => ResultCode::Internal,
        }
    }
}

impl From<BridgeError> for TxResult {
    fn from(err: BridgeError) -> Self {
        Self {
            code: err.code(),
            log: err.to_string(),
        }
    }
}

impl From<DbError> for BridgeError {
    fn from(err: DbError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<HeaderChainError> for BridgeError {
    fn from(err: HeaderChainError) -> Self {
        match err {
            HeaderChainError::NotInitialized => Self::NotInitialized,
            HeaderChainError::NonContiguousHeaderList(reason) => {
                Self::NonContiguousHeaderList(reason)
            }
            HeaderChainError::ParentNotFound(hash) => {
                Self::NonContiguousHeaderList(format!("parent {hash} not found"))
            }
            HeaderChainError::ConflictingChain(number)
            | HeaderChainError::AlreadyFinalized { number, .. } => Self::ConflictingChain(number),
            HeaderChainError::DuplicateHeader(hash) => {
                Self::Malformed(format!("duplicate header {hash}"))
            }
            HeaderChainError::AlreadyInitialized => {
                Self::Internal("header chain already initialized".to_string())
            }
            HeaderChainError::Db(err) => err.into(),
        }
    }
}

impl From<CodeError> for BridgeError {
    fn from(err: CodeError) -> Self {
        match err {
            CodeError::UnknownCode(id) => Self::InvalidCode(id),
            CodeError::InvalidEventName { event, .. } => Self::InvalidEventName(event),
            CodeError::Decode(err) => Self::Decode(err.to_string()),
            CodeError::PacketAlreadyExists { contract, sequence } => {
                Self::PacketAlreadyExists { contract, sequence }
            }
            CodeError::Overflow => Self::Overflow,
            CodeError::DuplicateCode(id) => Self::Internal(format!("duplicate code {id}")),
            CodeError::Storage(err) => err.into(),
        }
    }
}

impl From<ProofError> for BridgeError {
    fn from(err: ProofError) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl From<bincode::Error> for BridgeError {
    fn from(err: bincode::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
