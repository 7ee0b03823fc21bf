use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum DbError {
    /// The sled backend failed.
    #[error("sled: {0}")]
    Sled(#[from] sled::Error),

    /// A stored value could not be encoded or decoded.
    #[error("codec: {0}")]
    Codec(#[from] bincode::Error),

    /// The store could not be opened.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type of storage operations.
pub type DbResult<T> = Result<T, DbError>;
