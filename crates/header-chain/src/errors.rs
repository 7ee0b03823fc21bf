use alloy_primitives::B256;
use bridge_db::DbError;
use thiserror::Error;

/// Errors raised by the header-chain store.
#[derive(Debug, Error)]
pub enum HeaderChainError {
    /// A genesis header is already set.
    #[error("header chain already initialized")]
    AlreadyInitialized,

    /// No genesis header is set.
    #[error("header chain not initialized")]
    NotInitialized,

    /// The header is already in the buffer.
    #[error("header {0} already buffered")]
    DuplicateHeader(B256),

    /// The parent of a header is not in the buffer.
    #[error("parent {0} not found")]
    ParentNotFound(B256),

    /// A different header is already finalized at this height.
    #[error("a different header is already finalized at height {number}: {existing}")]
    AlreadyFinalized {
        /// Contested height.
        number: u64,
        /// Hash of the header already finalized there.
        existing: B256,
    },

    /// The batch is not a linked chain or does not connect to the finalized frontier.
    #[error("non-contiguous header list: {0}")]
    NonContiguousHeaderList(String),

    /// The batch would finalize a header that conflicts with the finalized chain.
    #[error("conflicting chain at height {0}")]
    ConflictingChain(u64),

    /// The backing store failed.
    #[error("storage: {0}")]
    Db(#[from] DbError),
}

/// Result type of header-chain operations.
pub type HeaderChainResult<T> = Result<T, HeaderChainError>;
